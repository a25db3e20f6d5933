use uuid::Uuid;

use super::AttendanceService;
use crate::errors::{AttendanceError, Result};
use crate::models::attendance_records::{
    entities::AttendanceRecord,
    requests::{ClassRecordQuery, StudentRecordQuery},
};

pub async fn get_records_by_class(
    service: &AttendanceService,
    class_id: Uuid,
    query: ClassRecordQuery,
) -> Result<Vec<AttendanceRecord>> {
    service
        .storage()
        .list_records_by_class(class_id, query.date)
        .await
}

pub async fn get_records_by_student(
    service: &AttendanceService,
    student_id: Uuid,
    query: StudentRecordQuery,
) -> Result<Vec<AttendanceRecord>> {
    service
        .storage()
        .list_records_by_student(student_id, query.class_id)
        .await
}

/// 会话不存在时返回 NotFound，存在但尚未收集时返回空列表
pub async fn get_records_by_session(
    service: &AttendanceService,
    session_id: i64,
) -> Result<Vec<AttendanceRecord>> {
    let storage = service.storage();

    if storage.get_session_by_id(session_id).await?.is_none() {
        return Err(AttendanceError::not_found(format!(
            "考勤会话不存在: {session_id}"
        )));
    }

    storage.list_records_by_session(session_id).await
}
