use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 考勤会话表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::ClassId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::Date).date().not_null())
                    .col(ColumnDef::new(AttendanceSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(AttendanceSessions::DelegatedTo)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::ApprovedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::RejectedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::RejectionReason)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CollectedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::ApprovedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::RejectedAt)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个班级每天最多一个会话
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_attendance_sessions_class_date")
                    .table(AttendanceSessions::Table)
                    .col(AttendanceSessions::ClassId)
                    .col(AttendanceSessions::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::ClassId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Date).date().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Status).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::MarkedBy).string().null())
                    .col(
                        ColumnDef::new(AttendanceRecords::CollectedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::SessionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::ApprovedBy)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Notes).text().null())
                    .col(
                        ColumnDef::new(AttendanceRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::SessionId)
                            .to(AttendanceSessions::Table, AttendanceSessions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 自然键：(student_id, class_id, date)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_attendance_records_student_class_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::StudentId)
                    .col(AttendanceRecords::ClassId)
                    .col(AttendanceRecords::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_records_class_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::ClassId)
                    .col(AttendanceRecords::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_records_session_id")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceSessions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AttendanceSessions {
    #[sea_orm(iden = "attendance_sessions")]
    Table,
    Id,
    ClassId,
    Date,
    Status,
    DelegatedTo,
    CreatedBy,
    ApprovedBy,
    RejectedBy,
    RejectionReason,
    Version,
    CreatedAt,
    UpdatedAt,
    CollectedAt,
    ApprovedAt,
    RejectedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    #[sea_orm(iden = "attendance_records")]
    Table,
    Id,
    StudentId,
    ClassId,
    Date,
    Status,
    MarkedBy,
    CollectedBy,
    SessionId,
    ApprovedBy,
    Notes,
    CreatedAt,
    UpdatedAt,
}
