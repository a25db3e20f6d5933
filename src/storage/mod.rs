use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{
    attendance_records::{
        entities::{AttendanceRecord, RecordUpsert},
        requests::CollectEntry,
    },
    attendance_sessions::{
        entities::{AttendanceSession, SessionTransition},
        requests::{CreateSessionRequest, SessionListQuery},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 考勤记录方法
    // 按 (student_id, class_id, date) 原子写入，已存在则原地更新
    async fn upsert_record(&self, upsert: RecordUpsert) -> Result<AttendanceRecord>;
    // 列出班级记录，可按日期筛选
    async fn list_records_by_class(
        &self,
        class_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>>;
    // 列出学生记录，可按班级筛选
    async fn list_records_by_student(
        &self,
        student_id: Uuid,
        class_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceRecord>>;
    // 列出经由某会话收集的记录
    async fn list_records_by_session(&self, session_id: i64) -> Result<Vec<AttendanceRecord>>;
    // 列出班级在闭区间 [start, end] 内的记录
    async fn list_records_in_range(
        &self,
        class_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>>;

    /// 考勤会话方法
    // 创建会话，(class_id, date) 已存在时返回 DuplicateSession
    async fn create_session(&self, req: CreateSessionRequest) -> Result<AttendanceSession>;
    // 通过ID获取会话
    async fn get_session_by_id(&self, session_id: i64) -> Result<Option<AttendanceSession>>;
    // 通过班级和日期获取会话
    async fn get_session_by_class_and_date(
        &self,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>>;
    // 列出班级会话
    async fn list_class_sessions(
        &self,
        class_id: Uuid,
        query: SessionListQuery,
    ) -> Result<Vec<AttendanceSession>>;
    // 执行不涉及记录写入的状态转换（委派、审批、驳回、重新提交）
    async fn transition_session(
        &self,
        session_id: i64,
        transition: SessionTransition,
    ) -> Result<AttendanceSession>;
    // 课代表收集考勤：状态转换与记录写入在同一事务内提交
    async fn collect_session(
        &self,
        session_id: i64,
        leader_id: Uuid,
        entries: Vec<CollectEntry>,
    ) -> Result<(AttendanceSession, Vec<AttendanceRecord>)>;
}

pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_with_config(config).await?;
    Ok(Arc::new(storage))
}
