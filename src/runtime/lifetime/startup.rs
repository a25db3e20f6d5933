use crate::config::{AppConfig, EventConfig};
use crate::errors::Result;
use crate::services::{AttendanceService, BroadcastEventPublisher};
use crate::storage::Storage;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub publisher: Arc<BroadcastEventPublisher>,
    pub service: Arc<AttendanceService>,
    /// 非阻塞日志写入器的守卫，丢弃后缓冲中的日志不再输出
    pub log_guard: Option<WorkerGuard>,
}

/// 初始化日志
///
/// 开发环境输出带文件与行号的文本格式，其他环境输出 JSON。
/// 全局订阅者已存在时不覆盖，返回 None。
pub fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    let installed = if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        tracing_builder.json().try_init()
    };

    installed.ok().map(|_| guard)
}

/// 基于已有存储组装服务
pub fn build_context(storage: Arc<dyn Storage>, events: &EventConfig) -> StartupContext {
    let publisher = Arc::new(BroadcastEventPublisher::new(events.channel_capacity));
    let service = Arc::new(AttendanceService::new(storage.clone(), publisher.clone()));

    debug!(
        "Attendance service assembled, event channel capacity {}",
        events.channel_capacity
    );

    StartupContext {
        storage,
        publisher,
        service,
        log_guard: None,
    }
}

/// 准备启动上下文
/// 包括 .env、配置、日志、存储与迁移
pub async fn prepare_startup() -> Result<StartupContext> {
    dotenv().ok();

    let start = chrono::Utc::now();

    AppConfig::init()?;
    let config = AppConfig::get();
    let log_guard = init_tracing(config);

    warn!(
        "Starting pre-startup processing...
        Project: {}
        Version: {}
        Environment: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    let storage = crate::storage::create_storage(&config.database).await?;
    warn!("Storage backend initialized and migrations completed");

    let mut context = build_context(storage, &config.events);
    context.log_guard = log_guard;

    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start)
            .num_milliseconds()
    );

    Ok(context)
}
