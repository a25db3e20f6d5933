use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use super::{AttendanceService, rate};
use crate::errors::Result;
use crate::models::attendance_records::entities::AttendanceStatus;
use crate::models::reports::responses::{AttendanceReport, StudentAttendanceSummary};
use crate::utils::validate_date_range;

/// 班级考勤报表
///
/// `total_days` 为区间内自然日数（含首尾），即便某些日期没有任何记录。
pub async fn generate_class_report(
    service: &AttendanceService,
    class_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AttendanceReport> {
    validate_date_range(start, end)?;

    let records = service
        .storage()
        .list_records_in_range(class_id, start, end)
        .await?;

    let rate = rate::rate_for_range(&records, start, end);
    debug!(
        "班级 {} 报表 [{} ~ {}]: {} 条记录，出勤率 {}%",
        class_id, start, end, rate.total, rate.rate_percent
    );

    Ok(AttendanceReport {
        class_id,
        start,
        end,
        total_days: (end - start).num_days() + 1,
        rate,
    })
}

/// 学生考勤概览，可限定班级
pub async fn generate_student_summary(
    service: &AttendanceService,
    student_id: Uuid,
    class_id: Option<Uuid>,
) -> Result<StudentAttendanceSummary> {
    let records = service
        .storage()
        .list_records_by_student(student_id, class_id)
        .await?;

    let present = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u32;

    Ok(StudentAttendanceSummary {
        student_id,
        class_id,
        total: records.len() as u32,
        present,
        attendance_rate: rate::student_rate(&records, student_id),
    })
}
