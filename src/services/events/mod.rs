/*!
 * 考勤领域事件
 *
 * 工作流每次成功转换后发布一条事件，下游（通知、成绩、统计等）自行订阅。
 * 发布是尽力而为的：失败只记录日志，不回滚已提交的状态；没有订阅者时事件被丢弃。
 *
 * ## 消息格式
 *
 * ```json
 * {
 *     "type": "session_rejected",
 *     "session_id": 12,
 *     "class_id": "3f0c6c9e-5d1c-4f59-9c4b-2a1f0d1e7a11",
 *     "teacher_id": "a6f1b7d2-0c44-4b8e-8f2d-6c1f2e3d4b5a",
 *     "reason": "incomplete",
 *     "occurred_at": "2025-03-03T08:00:00Z"
 * }
 * ```
 */

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AttendanceError, Result};
use crate::models::attendance_records::entities::AttendanceStatus;

/// 考勤事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttendanceEvent {
    /// 教师直接点名
    RecordMarked {
        record_id: i64,
        student_id: Uuid,
        class_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        marked_by: Uuid,
        occurred_at: DateTime<Utc>,
    },
    /// 会话创建
    SessionCreated {
        session_id: i64,
        class_id: Uuid,
        date: NaiveDate,
        created_by: Uuid,
        occurred_at: DateTime<Utc>,
    },
    /// 会话委派给课代表
    SessionDelegated {
        session_id: i64,
        class_id: Uuid,
        leader_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
    /// 课代表提交收集结果
    SessionCollected {
        session_id: i64,
        class_id: Uuid,
        leader_id: Uuid,
        record_count: usize,
        occurred_at: DateTime<Utc>,
    },
    /// 教师审批通过
    SessionApproved {
        session_id: i64,
        class_id: Uuid,
        teacher_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
    /// 教师驳回
    SessionRejected {
        session_id: i64,
        class_id: Uuid,
        teacher_id: Uuid,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
    /// 驳回后重新提交
    SessionResubmitted {
        session_id: i64,
        class_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
}

impl AttendanceEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AttendanceEvent::RecordMarked { .. } => "record_marked",
            AttendanceEvent::SessionCreated { .. } => "session_created",
            AttendanceEvent::SessionDelegated { .. } => "session_delegated",
            AttendanceEvent::SessionCollected { .. } => "session_collected",
            AttendanceEvent::SessionApproved { .. } => "session_approved",
            AttendanceEvent::SessionRejected { .. } => "session_rejected",
            AttendanceEvent::SessionResubmitted { .. } => "session_resubmitted",
        }
    }

    pub fn class_id(&self) -> Uuid {
        match self {
            AttendanceEvent::RecordMarked { class_id, .. }
            | AttendanceEvent::SessionCreated { class_id, .. }
            | AttendanceEvent::SessionDelegated { class_id, .. }
            | AttendanceEvent::SessionCollected { class_id, .. }
            | AttendanceEvent::SessionApproved { class_id, .. }
            | AttendanceEvent::SessionRejected { class_id, .. }
            | AttendanceEvent::SessionResubmitted { class_id, .. } => *class_id,
        }
    }

    /// 直接点名的事件不关联会话
    pub fn session_id(&self) -> Option<i64> {
        match self {
            AttendanceEvent::RecordMarked { .. } => None,
            AttendanceEvent::SessionCreated { session_id, .. }
            | AttendanceEvent::SessionDelegated { session_id, .. }
            | AttendanceEvent::SessionCollected { session_id, .. }
            | AttendanceEvent::SessionApproved { session_id, .. }
            | AttendanceEvent::SessionRejected { session_id, .. }
            | AttendanceEvent::SessionResubmitted { session_id, .. } => Some(*session_id),
        }
    }
}

/// 事件发布器
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &AttendanceEvent) -> Result<()>;
}

/// 基于 tokio broadcast 的进程内发布器
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<AttendanceEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 订阅事件流
    pub fn subscribe(&self) -> broadcast::Receiver<AttendanceEvent> {
        self.sender.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for BroadcastEventPublisher {
    /// 没有订阅者时直接丢弃事件
    fn publish(&self, event: &AttendanceEvent) -> Result<()> {
        if self.sender.receiver_count() == 0 {
            debug!("无订阅者，丢弃 {} 事件", event.event_type());
            return Ok(());
        }

        // 检查与发送之间订阅者全部退出时仍会失败
        self.sender.send(event.clone()).map(|_| ()).map_err(|_| {
            AttendanceError::event_publish(format!(
                "no subscriber for {} event",
                event.event_type()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved_event() -> AttendanceEvent {
        AttendanceEvent::SessionApproved {
            session_id: 4,
            class_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_without_subscriber_is_dropped() {
        let publisher = BroadcastEventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);
        assert!(publisher.publish(&approved_event()).is_ok());
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let publisher = BroadcastEventPublisher::new(8);
        publisher.publish(&approved_event()).unwrap();

        let mut rx = publisher.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscriber_receives_event() {
        let publisher = BroadcastEventPublisher::new(8);
        let mut rx = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);

        let event = approved_event();
        publisher.publish(&event).unwrap();
        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(approved_event()).unwrap();
        assert_eq!(json["type"], "session_approved");
        assert_eq!(json["session_id"], 4);
    }
}
