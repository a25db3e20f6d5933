use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 出勤率统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRate {
    pub rate_percent: f64,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

// 班级考勤报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub class_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64, // 区间内的自然日数（含首尾），与实际记录数无关
    pub rate: AttendanceRate,
}

// 学生考勤概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttendanceSummary {
    pub student_id: Uuid,
    pub class_id: Option<Uuid>,
    pub total: u32,
    pub present: u32,
    pub attendance_rate: f64, // 0.0 ~ 1.0
}
