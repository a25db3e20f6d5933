use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::AttendanceService;
use crate::errors::{AttendanceError, Result};
use crate::models::attendance_records::requests::CollectEntry;
use crate::models::attendance_sessions::entities::AttendanceSession;
use crate::services::events::AttendanceEvent;

/// 课代表提交收集结果
///
/// 状态转换与全部记录写入在同一事务内提交，任一条失败则整体回滚。
pub async fn collect_attendance(
    service: &AttendanceService,
    session_id: i64,
    leader_id: Uuid,
    entries: Vec<CollectEntry>,
) -> Result<AttendanceSession> {
    if entries.is_empty() {
        return Err(AttendanceError::validation(
            "collected attendance must contain at least one entry",
        ));
    }

    let (session, records) = service
        .storage()
        .collect_session(session_id, leader_id, entries)
        .await
        .inspect_err(|e| {
            service.log_failure(&format!("会话 {session_id} 收集失败 (leader={leader_id})"), e)
        })?;

    info!(
        "考勤会话 {} 已由 {} 收集，共 {} 条记录",
        session.id,
        leader_id,
        records.len()
    );

    service.publish(AttendanceEvent::SessionCollected {
        session_id: session.id,
        class_id: session.class_id,
        leader_id,
        record_count: records.len(),
        occurred_at: Utc::now(),
    });

    Ok(session)
}
