//! 教师审核：通过、驳回、驳回后重新提交

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::AttendanceService;
use crate::errors::Result;
use crate::models::attendance_sessions::entities::{AttendanceSession, SessionTransition};
use crate::services::events::AttendanceEvent;

/// 审批通过，会话下的收集记录同时标记审批人
pub async fn approve_session(
    service: &AttendanceService,
    session_id: i64,
    teacher_id: Uuid,
) -> Result<AttendanceSession> {
    let session = service
        .storage()
        .transition_session(session_id, SessionTransition::Approve { teacher_id })
        .await
        .inspect_err(|e| service.log_failure(&format!("审批会话 {session_id} 失败"), e))?;

    info!("考勤会话 {} 已由 {} 审批通过", session.id, teacher_id);

    service.publish(AttendanceEvent::SessionApproved {
        session_id: session.id,
        class_id: session.class_id,
        teacher_id,
        occurred_at: Utc::now(),
    });

    Ok(session)
}

pub async fn reject_session(
    service: &AttendanceService,
    session_id: i64,
    teacher_id: Uuid,
    reason: &str,
) -> Result<AttendanceSession> {
    let transition = SessionTransition::Reject {
        teacher_id,
        reason: reason.to_string(),
    };

    let session = service
        .storage()
        .transition_session(session_id, transition)
        .await
        .inspect_err(|e| service.log_failure(&format!("驳回会话 {session_id} 失败"), e))?;

    let reason = session.rejection_reason.clone().unwrap_or_default();
    info!(
        "考勤会话 {} 已被 {} 驳回: {}",
        session.id, teacher_id, reason
    );

    service.publish(AttendanceEvent::SessionRejected {
        session_id: session.id,
        class_id: session.class_id,
        teacher_id,
        reason,
        occurred_at: Utc::now(),
    });

    Ok(session)
}

pub async fn resubmit_session(
    service: &AttendanceService,
    session_id: i64,
) -> Result<AttendanceSession> {
    let session = service
        .storage()
        .transition_session(session_id, SessionTransition::Resubmit)
        .await
        .inspect_err(|e| service.log_failure(&format!("重新提交会话 {session_id} 失败"), e))?;

    info!("考勤会话 {} 已重新提交", session.id);

    service.publish(AttendanceEvent::SessionResubmitted {
        session_id: session.id,
        class_id: session.class_id,
        occurred_at: Utc::now(),
    });

    Ok(session)
}
