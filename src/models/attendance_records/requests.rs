use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::entities::AttendanceStatus;

// 教师直接点名
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendanceRequest {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: Uuid,
    pub notes: Option<String>,
}

// 课代表收集的单条考勤
#[derive(Debug, Clone, Deserialize)]
pub struct CollectEntry {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// 按班级查询记录
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassRecordQuery {
    pub date: Option<NaiveDate>,
}

// 按学生查询记录
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentRecordQuery {
    pub class_id: Option<Uuid>,
}
