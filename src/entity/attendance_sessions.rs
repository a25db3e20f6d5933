//! 考勤会话实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: String,
    pub date: Date,
    pub status: String,
    pub delegated_to: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub rejected_by: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub version: i32,
    pub created_at: i64,
    pub updated_at: i64,
    pub collected_at: Option<i64>,
    pub approved_at: Option<i64>,
    pub rejected_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_records::Entity")]
    Records,
}

impl Related<super::attendance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn try_into_session(
        self,
    ) -> crate::errors::Result<crate::models::attendance_sessions::entities::AttendanceSession>
    {
        use crate::errors::AttendanceError;
        use crate::models::attendance_sessions::entities::{AttendanceSession, SessionStatus};
        use crate::utils::{from_timestamp, from_timestamp_opt, parse_uuid, parse_uuid_opt};

        Ok(AttendanceSession {
            id: self.id,
            class_id: parse_uuid(&self.class_id)?,
            date: self.date,
            status: self
                .status
                .parse::<SessionStatus>()
                .map_err(AttendanceError::database_operation)?,
            delegated_to: parse_uuid_opt(self.delegated_to.as_deref())?,
            created_by: parse_uuid(&self.created_by)?,
            approved_by: parse_uuid_opt(self.approved_by.as_deref())?,
            rejected_by: parse_uuid_opt(self.rejected_by.as_deref())?,
            rejection_reason: self.rejection_reason,
            version: self.version,
            created_at: from_timestamp(self.created_at)?,
            updated_at: from_timestamp(self.updated_at)?,
            collected_at: from_timestamp_opt(self.collected_at)?,
            approved_at: from_timestamp_opt(self.approved_at)?,
            rejected_at: from_timestamp_opt(self.rejected_at)?,
        })
    }
}
