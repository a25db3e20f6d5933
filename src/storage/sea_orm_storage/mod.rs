//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendance_records;
mod attendance_sessions;

use crate::config::DatabaseConfig;
use crate::errors::{AttendanceError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置创建存储实例并运行迁移
    pub async fn new_with_config(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 基于已有连接创建存储实例（运行迁移）
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| AttendanceError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AttendanceError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存库的每个连接都是独立数据库，只能保留一个长连接
        let (max_connections, idle_timeout) = if in_memory {
            (1, None)
        } else {
            (config.pool_size, Some(Duration::from_secs(300)))
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(idle_timeout)
            .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| AttendanceError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AttendanceError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 考勤记录模块
    async fn upsert_record(&self, upsert: RecordUpsert) -> Result<AttendanceRecord> {
        self.upsert_record_impl(upsert).await
    }

    async fn list_records_by_class(
        &self,
        class_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.list_records_by_class_impl(class_id, date).await
    }

    async fn list_records_by_student(
        &self,
        student_id: Uuid,
        class_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.list_records_by_student_impl(student_id, class_id)
            .await
    }

    async fn list_records_by_session(&self, session_id: i64) -> Result<Vec<AttendanceRecord>> {
        self.list_records_by_session_impl(session_id).await
    }

    async fn list_records_in_range(
        &self,
        class_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        self.list_records_in_range_impl(class_id, start, end).await
    }

    // 考勤会话模块
    async fn create_session(&self, req: CreateSessionRequest) -> Result<AttendanceSession> {
        self.create_session_impl(req).await
    }

    async fn get_session_by_id(&self, session_id: i64) -> Result<Option<AttendanceSession>> {
        self.get_session_by_id_impl(session_id).await
    }

    async fn get_session_by_class_and_date(
        &self,
        class_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceSession>> {
        self.get_session_by_class_and_date_impl(class_id, date)
            .await
    }

    async fn list_class_sessions(
        &self,
        class_id: Uuid,
        query: SessionListQuery,
    ) -> Result<Vec<AttendanceSession>> {
        self.list_class_sessions_impl(class_id, query).await
    }

    async fn transition_session(
        &self,
        session_id: i64,
        transition: SessionTransition,
    ) -> Result<AttendanceSession> {
        self.transition_session_impl(session_id, transition).await
    }

    async fn collect_session(
        &self,
        session_id: i64,
        leader_id: Uuid,
        entries: Vec<CollectEntry>,
    ) -> Result<(AttendanceSession, Vec<AttendanceRecord>)> {
        self.collect_session_impl(session_id, leader_id, entries)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("attendance.db").unwrap(),
            "sqlite://attendance.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/att").unwrap(),
            "postgres://u:p@localhost/att"
        );
        let err = SeaOrmStorage::build_database_url("redis://localhost").unwrap_err();
        assert!(matches!(err, AttendanceError::DatabaseConfig(_)));
    }
}
