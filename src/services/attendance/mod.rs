pub mod collect;
pub mod mark;
pub mod rate;
pub mod records;
pub mod report;
pub mod review;
pub mod sessions;

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AttendanceError, Result};
use crate::models::attendance_records::{
    entities::AttendanceRecord,
    requests::{ClassRecordQuery, CollectEntry, MarkAttendanceRequest, StudentRecordQuery},
};
use crate::models::attendance_sessions::{
    entities::{AttendanceSession, SessionStatus},
    requests::{CreateSessionRequest, SessionListQuery},
};
use crate::models::reports::responses::{AttendanceReport, StudentAttendanceSummary};
use crate::services::events::{AttendanceEvent, EventPublisher};
use crate::storage::Storage;

/// 考勤服务，编排存储写入与事件发布
///
/// 授权由调用方完成，这里只校验数据与状态机。
pub struct AttendanceService {
    storage: Arc<dyn Storage>,
    publisher: Arc<dyn EventPublisher>,
}

impl AttendanceService {
    pub fn new(storage: Arc<dyn Storage>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { storage, publisher }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// 发布事件，失败只记录日志，不影响已提交的状态
    pub(crate) fn publish(&self, event: AttendanceEvent) {
        if let Err(e) = self.publisher.publish(&event) {
            warn!(
                "发布 {} 事件失败 (class_id={}): {}",
                event.event_type(),
                event.class_id(),
                e
            );
        }
    }

    /// 守卫、校验等领域错误记为 debug，数据库等基础设施故障记为 warn
    pub(crate) fn log_failure(&self, context: &str, err: &AttendanceError) {
        if err.is_domain_error() {
            debug!("{}: {}", context, err);
        } else {
            warn!("{}: {}", context, err);
        }
    }

    pub async fn mark_attendance(&self, req: MarkAttendanceRequest) -> Result<AttendanceRecord> {
        mark::mark_attendance(self, req).await
    }

    pub async fn create_session(&self, req: CreateSessionRequest) -> Result<AttendanceSession> {
        sessions::create_session(self, req).await
    }

    pub async fn delegate_session(
        &self,
        session_id: i64,
        class_id: Uuid,
        leader_id: Uuid,
    ) -> Result<AttendanceSession> {
        sessions::delegate_session(self, session_id, class_id, leader_id).await
    }

    pub async fn get_session(&self, session_id: i64) -> Result<AttendanceSession> {
        sessions::get_session(self, session_id).await
    }

    pub async fn list_class_sessions(
        &self,
        class_id: Uuid,
        status: Option<SessionStatus>,
    ) -> Result<Vec<AttendanceSession>> {
        sessions::list_class_sessions(self, class_id, SessionListQuery { status }).await
    }

    pub async fn collect_attendance(
        &self,
        session_id: i64,
        leader_id: Uuid,
        entries: Vec<CollectEntry>,
    ) -> Result<AttendanceSession> {
        collect::collect_attendance(self, session_id, leader_id, entries).await
    }

    pub async fn approve_session(
        &self,
        session_id: i64,
        teacher_id: Uuid,
    ) -> Result<AttendanceSession> {
        review::approve_session(self, session_id, teacher_id).await
    }

    pub async fn reject_session(
        &self,
        session_id: i64,
        teacher_id: Uuid,
        reason: &str,
    ) -> Result<AttendanceSession> {
        review::reject_session(self, session_id, teacher_id, reason).await
    }

    pub async fn resubmit_session(&self, session_id: i64) -> Result<AttendanceSession> {
        review::resubmit_session(self, session_id).await
    }

    pub async fn get_records_by_class(
        &self,
        class_id: Uuid,
        query: ClassRecordQuery,
    ) -> Result<Vec<AttendanceRecord>> {
        records::get_records_by_class(self, class_id, query).await
    }

    pub async fn get_records_by_student(
        &self,
        student_id: Uuid,
        query: StudentRecordQuery,
    ) -> Result<Vec<AttendanceRecord>> {
        records::get_records_by_student(self, student_id, query).await
    }

    pub async fn get_records_by_session(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        records::get_records_by_session(self, session_id).await
    }

    pub async fn generate_class_report(
        &self,
        class_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceReport> {
        report::generate_class_report(self, class_id, start, end).await
    }

    pub async fn generate_student_summary(
        &self,
        student_id: Uuid,
        class_id: Option<Uuid>,
    ) -> Result<StudentAttendanceSummary> {
        report::generate_student_summary(self, student_id, class_id).await
    }
}
