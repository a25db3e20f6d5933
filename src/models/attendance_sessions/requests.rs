use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::entities::SessionStatus;

// 创建考勤会话
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub created_by: Uuid,
}

// 班级会话列表筛选
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionListQuery {
    pub status: Option<SessionStatus>,
}
