//! 考勤记录存储操作

use super::SeaOrmStorage;
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords, Model};
use crate::errors::{AttendanceError, Result};
use crate::models::attendance_records::entities::{AttendanceRecord, RecordUpsert};
use crate::utils::today;
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 写入一条考勤记录
    pub async fn upsert_record_impl(&self, upsert: RecordUpsert) -> Result<AttendanceRecord> {
        Self::upsert_record_on(&self.db, &upsert).await
    }

    /// 在给定连接（或事务）上执行原子 upsert
    ///
    /// 依赖 (student_id, class_id, date) 唯一索引，单条 `INSERT ... ON CONFLICT DO UPDATE`
    /// 完成读-判-写。每次写入都整体覆盖写入来源字段，切换为直接点名时
    /// session_id / approved_by 随之清空，重新收集时旧的审批也被清除。
    pub(crate) async fn upsert_record_on<C: ConnectionTrait>(
        conn: &C,
        upsert: &RecordUpsert,
    ) -> Result<AttendanceRecord> {
        upsert.validate(today())?;

        let provenance = upsert.provenance();
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(upsert.student_id.to_string()),
            class_id: Set(upsert.class_id.to_string()),
            date: Set(upsert.date),
            status: Set(upsert.status.to_string()),
            marked_by: Set(provenance.marked_by().map(|id| id.to_string())),
            collected_by: Set(provenance.collected_by().map(|id| id.to_string())),
            session_id: Set(provenance.session_id()),
            approved_by: Set(None),
            notes: Set(upsert.normalized_notes()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        AttendanceRecords::insert(model)
            .on_conflict(
                OnConflict::columns([Column::StudentId, Column::ClassId, Column::Date])
                    .update_columns([
                        Column::Status,
                        Column::MarkedBy,
                        Column::CollectedBy,
                        Column::SessionId,
                        Column::ApprovedBy,
                        Column::Notes,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("写入考勤记录失败: {e}")))?;

        let stored = AttendanceRecords::find()
            .filter(Column::StudentId.eq(upsert.student_id.to_string()))
            .filter(Column::ClassId.eq(upsert.class_id.to_string()))
            .filter(Column::Date.eq(upsert.date))
            .one(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("查询考勤记录失败: {e}")))?
            .ok_or_else(|| AttendanceError::database_operation("写入后未找到考勤记录"))?;

        stored.try_into_record()
    }

    /// 为会话下的全部收集记录盖上审批人
    pub(crate) async fn stamp_session_approval_on<C: ConnectionTrait>(
        conn: &C,
        session_id: i64,
        teacher_id: Uuid,
    ) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let result = AttendanceRecords::update_many()
            .col_expr(Column::ApprovedBy, Expr::value(teacher_id.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::CollectedBy.is_not_null())
            .exec(conn)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("更新记录审批人失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 列出班级记录
    pub async fn list_records_by_class_impl(
        &self,
        class_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut select = AttendanceRecords::find().filter(Column::ClassId.eq(class_id.to_string()));

        // 日期筛选
        if let Some(date) = date {
            select = select.filter(Column::Date.eq(date));
        }

        self.fetch_records(select, "查询班级考勤记录失败").await
    }

    /// 列出学生记录
    pub async fn list_records_by_student_impl(
        &self,
        student_id: Uuid,
        class_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut select =
            AttendanceRecords::find().filter(Column::StudentId.eq(student_id.to_string()));

        // 班级筛选
        if let Some(class_id) = class_id {
            select = select.filter(Column::ClassId.eq(class_id.to_string()));
        }

        self.fetch_records(select, "查询学生考勤记录失败").await
    }

    /// 列出会话记录
    pub async fn list_records_by_session_impl(
        &self,
        session_id: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let select = AttendanceRecords::find().filter(Column::SessionId.eq(session_id));

        self.fetch_records(select, "查询会话考勤记录失败").await
    }

    /// 列出班级在日期区间内的记录
    pub async fn list_records_in_range_impl(
        &self,
        class_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let select = AttendanceRecords::find()
            .filter(Column::ClassId.eq(class_id.to_string()))
            .filter(Column::Date.between(start, end));

        self.fetch_records(select, "查询区间考勤记录失败").await
    }

    async fn fetch_records(
        &self,
        select: Select<AttendanceRecords>,
        context: &str,
    ) -> Result<Vec<AttendanceRecord>> {
        let models = select
            .order_by_asc(Column::Date)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("{context}: {e}")))?;

        models.into_iter().map(Model::try_into_record).collect()
    }
}
