//! 考勤记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: String,
    pub class_id: String,
    pub date: Date,
    pub status: String,
    pub marked_by: Option<String>,
    pub collected_by: Option<String>,
    pub session_id: Option<i64>,
    pub approved_by: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_sessions::Entity",
        from = "Column::SessionId",
        to = "super::attendance_sessions::Column::Id"
    )]
    Session,
}

impl Related<super::attendance_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// 转换时重新校验写入来源不变量，脏数据以 `InvalidRecordState` 报出
    pub fn try_into_record(
        self,
    ) -> crate::errors::Result<crate::models::attendance_records::entities::AttendanceRecord> {
        use crate::errors::AttendanceError;
        use crate::models::attendance_records::entities::{
            AttendanceRecord, AttendanceStatus, RecordProvenance,
        };
        use crate::utils::{from_timestamp, parse_uuid, parse_uuid_opt};

        let provenance = RecordProvenance::from_parts(
            parse_uuid_opt(self.marked_by.as_deref())?,
            parse_uuid_opt(self.collected_by.as_deref())?,
            self.session_id,
            parse_uuid_opt(self.approved_by.as_deref())?,
        )
        .map_err(|e| {
            AttendanceError::invalid_record_state(format!("记录 {} 数据异常: {}", self.id, e.message()))
        })?;

        Ok(AttendanceRecord {
            id: self.id,
            student_id: parse_uuid(&self.student_id)?,
            class_id: parse_uuid(&self.class_id)?,
            date: self.date,
            status: self
                .status
                .parse::<AttendanceStatus>()
                .map_err(AttendanceError::invalid_record_state)?,
            provenance,
            notes: self.notes,
            created_at: from_timestamp(self.created_at)?,
            updated_at: from_timestamp(self.updated_at)?,
        })
    }
}
