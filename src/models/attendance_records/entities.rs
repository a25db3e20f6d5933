use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AttendanceError, Result};
use crate::utils::validate::validate_not_future;

// 考勤状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present, // 出勤
    Absent,  // 缺勤
    Late,    // 迟到
    Excused, // 请假
}

impl AttendanceStatus {
    pub const PRESENT: &'static str = "present";
    pub const ABSENT: &'static str = "absent";
    pub const LATE: &'static str = "late";
    pub const EXCUSED: &'static str = "excused";
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "{}", Self::PRESENT),
            AttendanceStatus::Absent => write!(f, "{}", Self::ABSENT),
            AttendanceStatus::Late => write!(f, "{}", Self::LATE),
            AttendanceStatus::Excused => write!(f, "{}", Self::EXCUSED),
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            Self::PRESENT => Ok(AttendanceStatus::Present),
            Self::ABSENT => Ok(AttendanceStatus::Absent),
            Self::LATE => Ok(AttendanceStatus::Late),
            Self::EXCUSED => Ok(AttendanceStatus::Excused),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

/// 写入路径：教师直接点名，或课代表通过会话收集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordWriter {
    TeacherMark { teacher_id: Uuid },
    LeaderCollect { leader_id: Uuid, session_id: i64 },
}

/// 记录的写入来源
///
/// `marked_by` 与 `collected_by` 互斥；`session_id` 仅随收集路径出现，
/// `approved_by` 仅在存在 `session_id` 时出现。非法组合无法构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum RecordProvenance {
    Marked {
        marked_by: Uuid,
    },
    Collected {
        collected_by: Uuid,
        session_id: i64,
        approved_by: Option<Uuid>,
    },
}

impl RecordProvenance {
    /// 从扁平字段构造，校验写入路径不变量
    pub fn from_parts(
        marked_by: Option<Uuid>,
        collected_by: Option<Uuid>,
        session_id: Option<i64>,
        approved_by: Option<Uuid>,
    ) -> Result<Self> {
        match (marked_by, collected_by, session_id) {
            (Some(_), Some(_), _) => Err(AttendanceError::invalid_record_state(
                "markedBy and collectedBy are mutually exclusive",
            )),
            (None, None, _) => Err(AttendanceError::invalid_record_state(
                "a record must be either marked by a teacher or collected by a class leader",
            )),
            (Some(_), None, Some(_)) => Err(AttendanceError::invalid_record_state(
                "sessionId requires collectedBy",
            )),
            (Some(_), None, None) if approved_by.is_some() => Err(
                AttendanceError::invalid_record_state("approvedBy requires sessionId"),
            ),
            (Some(marked_by), None, None) => Ok(RecordProvenance::Marked { marked_by }),
            (None, Some(_), None) => Err(AttendanceError::invalid_record_state(
                "collectedBy requires sessionId",
            )),
            (None, Some(collected_by), Some(session_id)) => Ok(RecordProvenance::Collected {
                collected_by,
                session_id,
                approved_by,
            }),
        }
    }

    pub fn marked_by(&self) -> Option<Uuid> {
        match self {
            RecordProvenance::Marked { marked_by } => Some(*marked_by),
            RecordProvenance::Collected { .. } => None,
        }
    }

    pub fn collected_by(&self) -> Option<Uuid> {
        match self {
            RecordProvenance::Collected { collected_by, .. } => Some(*collected_by),
            RecordProvenance::Marked { .. } => None,
        }
    }

    pub fn session_id(&self) -> Option<i64> {
        match self {
            RecordProvenance::Collected { session_id, .. } => Some(*session_id),
            RecordProvenance::Marked { .. } => None,
        }
    }

    pub fn approved_by(&self) -> Option<Uuid> {
        match self {
            RecordProvenance::Collected { approved_by, .. } => *approved_by,
            RecordProvenance::Marked { .. } => None,
        }
    }
}

// 新的写入总是清除之前的审批
impl From<RecordWriter> for RecordProvenance {
    fn from(writer: RecordWriter) -> Self {
        match writer {
            RecordWriter::TeacherMark { teacher_id } => RecordProvenance::Marked {
                marked_by: teacher_id,
            },
            RecordWriter::LeaderCollect {
                leader_id,
                session_id,
            } => RecordProvenance::Collected {
                collected_by: leader_id,
                session_id,
                approved_by: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(flatten)]
    pub provenance: RecordProvenance,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn marked_by(&self) -> Option<Uuid> {
        self.provenance.marked_by()
    }

    pub fn collected_by(&self) -> Option<Uuid> {
        self.provenance.collected_by()
    }

    pub fn session_id(&self) -> Option<i64> {
        self.provenance.session_id()
    }

    pub fn approved_by(&self) -> Option<Uuid> {
        self.provenance.approved_by()
    }

    /// 直接点名的记录，或已审批会话收集的记录，视为最终结果
    pub fn is_final(&self) -> bool {
        match self.provenance {
            RecordProvenance::Marked { .. } => true,
            RecordProvenance::Collected { approved_by, .. } => approved_by.is_some(),
        }
    }
}

/// 一次针对 (student_id, class_id, date) 的写入
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpsert {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub writer: RecordWriter,
    pub notes: Option<String>,
}

impl RecordUpsert {
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        validate_not_future(self.date, today)
    }

    pub fn provenance(&self) -> RecordProvenance {
        RecordProvenance::from(self.writer)
    }

    /// 空白备注按未填写处理
    pub fn normalized_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}
