use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AttendanceError, Result};
use crate::utils::validate::validate_not_blank;

// 会话状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,   // 待收集
    Collected, // 已收集，待审批
    Approved,  // 已审批（终态）
    Rejected,  // 已驳回，可重新收集或重新提交
}

impl SessionStatus {
    pub const PENDING: &'static str = "pending";
    pub const COLLECTED: &'static str = "collected";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "{}", Self::PENDING),
            SessionStatus::Collected => write!(f, "{}", Self::COLLECTED),
            SessionStatus::Approved => write!(f, "{}", Self::APPROVED),
            SessionStatus::Rejected => write!(f, "{}", Self::REJECTED),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(SessionStatus::Pending),
            Self::COLLECTED => Ok(SessionStatus::Collected),
            Self::APPROVED => Ok(SessionStatus::Approved),
            Self::REJECTED => Ok(SessionStatus::Rejected),
            _ => Err(format!("Invalid session status: {s}")),
        }
    }
}

/// 会话状态机上的一次转换请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    Delegate { class_id: Uuid, leader_id: Uuid },
    Collect { leader_id: Uuid },
    Approve { teacher_id: Uuid },
    Reject { teacher_id: Uuid, reason: String },
    Resubmit,
}

impl SessionTransition {
    pub fn name(&self) -> &'static str {
        match self {
            SessionTransition::Delegate { .. } => "delegate",
            SessionTransition::Collect { .. } => "collect",
            SessionTransition::Approve { .. } => "approve",
            SessionTransition::Reject { .. } => "reject",
            SessionTransition::Resubmit => "resubmit",
        }
    }
}

impl std::fmt::Display for SessionTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: SessionStatus,
    pub delegated_to: Option<Uuid>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub rejected_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub collected_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
}

impl AttendanceSession {
    /// 计算转换后的会话状态，不修改自身
    ///
    /// 守卫不满足时返回 `InvalidSessionTransition`；收集者不是被委派的课代表时返回
    /// `UnauthorizedCollector`；驳回理由为空时返回 `Validation`。
    /// 成功时 `version` 加一，供存储层做乐观并发校验。
    pub fn apply(&self, transition: &SessionTransition, now: DateTime<Utc>) -> Result<Self> {
        let mut next = self.clone();

        match transition {
            SessionTransition::Delegate {
                class_id,
                leader_id,
            } => {
                self.expect_status(&[SessionStatus::Pending], transition)?;
                if self.class_id != *class_id {
                    return Err(AttendanceError::invalid_session_transition(format!(
                        "cannot delegate session {}: it belongs to class {}, not {}",
                        self.id, self.class_id, class_id
                    )));
                }
                next.delegated_to = Some(*leader_id);
            }
            SessionTransition::Collect { leader_id } => {
                self.expect_status(
                    &[SessionStatus::Pending, SessionStatus::Rejected],
                    transition,
                )?;
                if self.delegated_to != Some(*leader_id) {
                    return Err(AttendanceError::unauthorized_collector(format!(
                        "session {} is not delegated to {}",
                        self.id, leader_id
                    )));
                }
                next.status = SessionStatus::Collected;
                next.collected_at = Some(now);
            }
            SessionTransition::Approve { teacher_id } => {
                self.expect_status(&[SessionStatus::Collected], transition)?;
                next.status = SessionStatus::Approved;
                next.approved_by = Some(*teacher_id);
                next.approved_at = Some(now);
                next.rejected_by = None;
                next.rejection_reason = None;
            }
            SessionTransition::Reject { teacher_id, reason } => {
                validate_not_blank("rejection reason", reason)?;
                self.expect_status(&[SessionStatus::Collected], transition)?;
                next.status = SessionStatus::Rejected;
                next.rejected_by = Some(*teacher_id);
                next.rejection_reason = Some(reason.trim().to_string());
                next.rejected_at = Some(now);
                next.collected_at = None;
            }
            SessionTransition::Resubmit => {
                self.expect_status(&[SessionStatus::Rejected], transition)?;
                next.status = SessionStatus::Collected;
                next.collected_at = Some(now);
                next.rejected_by = None;
                next.rejection_reason = None;
            }
        }

        next.updated_at = now;
        next.version = self.version + 1;
        Ok(next)
    }

    fn expect_status(&self, allowed: &[SessionStatus], transition: &SessionTransition) -> Result<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(AttendanceError::transition(self.status, transition))
        }
    }
}
