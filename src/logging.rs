//! 日志初始化和配置模块
//!
//! 这个模块提供了统一的日志初始化功能，使用 tracing 库。
//! 读取器本身从不初始化日志，由调用方（加载任务的编排进程）决定何时调用。

use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志配置结构体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 是否输出到控制台
    pub enable_stdout: bool,
    /// 日志文件目录，`None` 表示不写文件
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    /// 创建新的日志配置，使用默认级别
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 设置日志文件目录（按天滚动）
    pub fn log_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// 是否输出到控制台
    pub fn stdout(mut self, enable: bool) -> Self {
        self.enable_stdout = enable;
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: Level::INFO, enable_stdout: true, log_dir: None }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
    #[error("日志配置错误: {0}")]
    Config(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - 环境变量 `RUST_LOG` 优先，否则使用配置的级别
/// - 可选的控制台输出
/// - 可选的按天滚动日志文件（非阻塞写入）
///
/// 已经初始化过时直接返回 `Ok(())`。
///
/// # Examples
///
/// ```no_run
/// use sqldump_reader::logging::{init_logging, LogConfig};
/// use tracing::Level;
///
/// let config = LogConfig::new().level(Level::DEBUG).log_dir("logs");
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> LogResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let console_layer = config.enable_stdout.then(|| {
        fmt::layer()
            .with_timer(SystemTime)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_ansi(true)
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "sqldump");
            let (non_blocking, guard) =
                tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_timer(SystemTime)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    match Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        Ok(()) => {
            // guard 被丢弃后 appender 会停止写入
            if let Some(guard) = guard {
                std::mem::forget(guard);
            }
            tracing::info!("日志系统初始化完成: level = {}", config.level);
            Ok(())
        }
        // 已经初始化过了，这不是错误
        Err(_) => Ok(()),
    }
}

/// 使用默认配置初始化日志系统（INFO 级别，仅控制台）
pub fn init_default_logging() -> LogResult<()> {
    init_logging(LogConfig::default())
}

/// 将配置文件中的级别名称转换为 `Level`
pub fn parse_level(name: &str) -> LogResult<Level> {
    match name {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LogError::Config(format!("无效的日志级别: {other}"))),
    }
}
