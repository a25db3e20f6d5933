//! 考勤会话存储操作

use super::SeaOrmStorage;
use crate::entity::attendance_sessions::{
    ActiveModel, Column, Entity as AttendanceSessions, Model,
};
use crate::errors::{AttendanceError, Result};
use crate::models::{
    attendance_records::{
        entities::{AttendanceRecord, RecordUpsert, RecordWriter},
        requests::CollectEntry,
    },
    attendance_sessions::{
        entities::{AttendanceSession, SessionStatus, SessionTransition},
        requests::{CreateSessionRequest, SessionListQuery},
    },
};
use crate::utils::{today, validate_not_future};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

impl SeaOrmStorage {
    /// 创建考勤会话
    pub async fn create_session_impl(&self, req: CreateSessionRequest) -> Result<AttendanceSession> {
        validate_not_future(req.date, today())?;

        // 先查重给出明确错误，并发创建由唯一索引兜底
        if self
            .get_session_by_class_and_date_impl(req.class_id, req.date)
            .await?
            .is_some()
        {
            return Err(Self::duplicate_session_error(req.class_id, req.date));
        }

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(req.class_id.to_string()),
            date: Set(req.date),
            status: Set(SessionStatus::Pending.to_string()),
            delegated_to: Set(None),
            created_by: Set(req.created_by.to_string()),
            approved_by: Set(None),
            rejected_by: Set(None),
            rejection_reason: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            collected_at: Set(None),
            approved_at: Set(None),
            rejected_at: Set(None),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::duplicate_session_error(req.class_id, req.date)
            }
            _ => AttendanceError::database_operation(format!("创建考勤会话失败: {e}")),
        })?;

        result.try_into_session()
    }

    /// 通过 ID 获取会话
    pub async fn get_session_by_id_impl(
        &self,
        session_id: i64,
    ) -> Result<Option<AttendanceSession>> {
        Self::find_session_on(&self.db, session_id).await
    }

    /// 通过班级和日期获取会话
    pub async fn get_session_by_class_and_date_impl(
        &self,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>> {
        let result = AttendanceSessions::find()
            .filter(Column::ClassId.eq(class_id.to_string()))
            .filter(Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤会话失败: {e}")))?;

        result.map(Model::try_into_session).transpose()
    }

    /// 列出班级会话
    pub async fn list_class_sessions_impl(
        &self,
        class_id: Uuid,
        query: SessionListQuery,
    ) -> Result<Vec<AttendanceSession>> {
        let mut select = AttendanceSessions::find().filter(Column::ClassId.eq(class_id.to_string()));

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let sessions = select
            .order_by_desc(Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询班级会话列表失败: {e}")))?;

        sessions.into_iter().map(Model::try_into_session).collect()
    }

    /// 执行状态转换（委派、审批、驳回、重新提交）
    pub async fn transition_session_impl(
        &self,
        session_id: i64,
        transition: SessionTransition,
    ) -> Result<AttendanceSession> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let next = Self::compare_and_transition(&txn, session_id, &transition).await?;

        if let SessionTransition::Approve { teacher_id } = transition {
            let stamped = Self::stamp_session_approval_on(&txn, session_id, teacher_id).await?;
            debug!("会话 {} 审批通过，{} 条记录已标记审批人", session_id, stamped);
        }

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(next)
    }

    /// 课代表收集考勤
    pub async fn collect_session_impl(
        &self,
        session_id: i64,
        leader_id: Uuid,
        entries: Vec<CollectEntry>,
    ) -> Result<(AttendanceSession, Vec<AttendanceRecord>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("开启事务失败: {e}")))?;

        let next = Self::compare_and_transition(
            &txn,
            session_id,
            &SessionTransition::Collect { leader_id },
        )
        .await?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let upsert = RecordUpsert {
                student_id: entry.student_id,
                class_id: next.class_id,
                date: next.date,
                status: entry.status,
                writer: RecordWriter::LeaderCollect {
                    leader_id,
                    session_id,
                },
                notes: entry.notes,
            };
            records.push(Self::upsert_record_on(&txn, &upsert).await?);
        }

        txn.commit()
            .await
            .map_err(|e| AttendanceError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((next, records))
    }

    /// 读取会话、校验守卫并以 version 做比较后转换
    ///
    /// 读取前先占住会话行的写锁，同一会话上的并发转换在此排队，
    /// 后到者读到的是先到者提交后的状态，由守卫给出真实的失败原因。
    /// 版本不匹配说明并发的另一转换已先提交，重新读取后以当前状态报告失败。
    async fn compare_and_transition<C: ConnectionTrait>(
        conn: &C,
        session_id: i64,
        transition: &SessionTransition,
    ) -> Result<AttendanceSession> {
        Self::claim_session_on(conn, session_id).await?;

        let current = Self::find_session_on(conn, session_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found(format!("考勤会话不存在: {session_id}")))?;

        let next = current.apply(transition, chrono::Utc::now())?;

        let result = AttendanceSessions::update_many()
            .col_expr(Column::Status, Expr::value(next.status.to_string()))
            .col_expr(
                Column::DelegatedTo,
                Expr::value(next.delegated_to.map(|id| id.to_string())),
            )
            .col_expr(
                Column::ApprovedBy,
                Expr::value(next.approved_by.map(|id| id.to_string())),
            )
            .col_expr(
                Column::RejectedBy,
                Expr::value(next.rejected_by.map(|id| id.to_string())),
            )
            .col_expr(
                Column::RejectionReason,
                Expr::value(next.rejection_reason.clone()),
            )
            .col_expr(
                Column::CollectedAt,
                Expr::value(next.collected_at.map(|t| t.timestamp())),
            )
            .col_expr(
                Column::ApprovedAt,
                Expr::value(next.approved_at.map(|t| t.timestamp())),
            )
            .col_expr(
                Column::RejectedAt,
                Expr::value(next.rejected_at.map(|t| t.timestamp())),
            )
            .col_expr(Column::UpdatedAt, Expr::value(next.updated_at.timestamp()))
            .col_expr(Column::Version, Expr::value(next.version))
            .filter(Column::Id.eq(session_id))
            .filter(Column::Version.eq(current.version))
            .exec(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新考勤会话失败: {e}")))?;

        if result.rows_affected == 0 {
            let latest = Self::find_session_on(conn, session_id)
                .await?
                .ok_or_else(|| AttendanceError::not_found(format!("考勤会话不存在: {session_id}")))?;
            debug!(
                "会话 {} 版本冲突: 期望 {}，当前 {}",
                session_id, current.version, latest.version
            );
            return Err(AttendanceError::transition(latest.status, transition));
        }

        Ok(next)
    }

    /// 以一次空更新获取会话行的写锁
    ///
    /// SQLite 的延迟事务先读后写时，锁升级失败会直接返回 SQLITE_BUSY，不经过
    /// busy_timeout；事务的第一条语句是写入则会按 busy_timeout 等待。
    /// PostgreSQL / MySQL 上等价于对该行加行锁。
    async fn claim_session_on<C: ConnectionTrait>(conn: &C, session_id: i64) -> Result<()> {
        AttendanceSessions::update_many()
            .col_expr(Column::Version, Expr::col(Column::Version).into())
            .filter(Column::Id.eq(session_id))
            .exec(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("锁定考勤会话失败: {e}")))?;

        Ok(())
    }

    async fn find_session_on<C: ConnectionTrait>(
        conn: &C,
        session_id: i64,
    ) -> Result<Option<AttendanceSession>> {
        let result = AttendanceSessions::find_by_id(session_id)
            .one(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤会话失败: {e}")))?;

        result.map(Model::try_into_session).transpose()
    }

    fn duplicate_session_error(class_id: Uuid, date: NaiveDate) -> AttendanceError {
        AttendanceError::duplicate_session(format!(
            "class {class_id} already has an attendance session on {date}"
        ))
    }
}
