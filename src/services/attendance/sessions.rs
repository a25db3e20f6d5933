use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::AttendanceService;
use crate::errors::{AttendanceError, Result};
use crate::models::attendance_sessions::{
    entities::{AttendanceSession, SessionTransition},
    requests::{CreateSessionRequest, SessionListQuery},
};
use crate::services::events::AttendanceEvent;

pub async fn create_session(
    service: &AttendanceService,
    req: CreateSessionRequest,
) -> Result<AttendanceSession> {
    let (class_id, date) = (req.class_id, req.date);
    let session = service
        .storage()
        .create_session(req)
        .await
        .inspect_err(|e| {
            service.log_failure(&format!("创建班级 {class_id} {date} 的考勤会话失败"), e)
        })?;

    info!(
        "考勤会话 {} 已创建: 班级 {}，日期 {}",
        session.id, session.class_id, session.date
    );

    service.publish(AttendanceEvent::SessionCreated {
        session_id: session.id,
        class_id: session.class_id,
        date: session.date,
        created_by: session.created_by,
        occurred_at: Utc::now(),
    });

    Ok(session)
}

/// 委派给课代表，PENDING 状态下可重复委派
pub async fn delegate_session(
    service: &AttendanceService,
    session_id: i64,
    class_id: Uuid,
    leader_id: Uuid,
) -> Result<AttendanceSession> {
    let transition = SessionTransition::Delegate {
        class_id,
        leader_id,
    };

    let session = service
        .storage()
        .transition_session(session_id, transition)
        .await
        .inspect_err(|e| service.log_failure(&format!("委派会话 {session_id} 失败"), e))?;

    info!("考勤会话 {} 已委派给 {}", session.id, leader_id);

    service.publish(AttendanceEvent::SessionDelegated {
        session_id: session.id,
        class_id: session.class_id,
        leader_id,
        occurred_at: Utc::now(),
    });

    Ok(session)
}

pub async fn get_session(service: &AttendanceService, session_id: i64) -> Result<AttendanceSession> {
    service
        .storage()
        .get_session_by_id(session_id)
        .await?
        .ok_or_else(|| AttendanceError::not_found(format!("考勤会话不存在: {session_id}")))
}

pub async fn list_class_sessions(
    service: &AttendanceService,
    class_id: Uuid,
    query: SessionListQuery,
) -> Result<Vec<AttendanceSession>> {
    service.storage().list_class_sessions(class_id, query).await
}
