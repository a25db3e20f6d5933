use chrono::Utc;
use tracing::info;

use super::AttendanceService;
use crate::errors::Result;
use crate::models::attendance_records::{
    entities::{AttendanceRecord, RecordUpsert, RecordWriter},
    requests::MarkAttendanceRequest,
};
use crate::services::events::AttendanceEvent;

/// 教师直接点名
///
/// 同一 (学生, 班级, 日期) 重复点名只会覆盖原记录；若原记录来自会话收集，
/// 会话关联与审批一并清除。
pub async fn mark_attendance(
    service: &AttendanceService,
    req: MarkAttendanceRequest,
) -> Result<AttendanceRecord> {
    let upsert = RecordUpsert {
        student_id: req.student_id,
        class_id: req.class_id,
        date: req.date,
        status: req.status,
        writer: RecordWriter::TeacherMark {
            teacher_id: req.marked_by,
        },
        notes: req.notes,
    };

    let record = service
        .storage()
        .upsert_record(upsert)
        .await
        .inspect_err(|e| {
            service.log_failure(&format!("为学生 {} 点名失败", req.student_id), e)
        })?;

    info!(
        "教师 {} 为学生 {} 点名: 班级 {}，日期 {}，状态 {}",
        req.marked_by, record.student_id, record.class_id, record.date, record.status
    );

    service.publish(AttendanceEvent::RecordMarked {
        record_id: record.id,
        student_id: record.student_id,
        class_id: record.class_id,
        date: record.date,
        status: record.status,
        marked_by: req.marked_by,
        occurred_at: Utc::now(),
    });

    Ok(record)
}
