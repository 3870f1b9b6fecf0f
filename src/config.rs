//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能

use crate::dump::charset::SUPPORTED_CHARACTER_SETS;
use crate::dump::header::DEFAULT_READ_BLOCK_SIZE;
use crate::error::{DumpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 主配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub log: LogSection,
    /// 读取配置
    #[serde(default)]
    pub reader: ReaderConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录，空字符串表示不写文件
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

/// 区间读取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// 每次 `read` 请求的字节数
    pub read_block_size: u64,
    /// schema 文件的字符集
    pub character_set: String,
    /// 并发读取区间的线程数
    pub thread_count: usize,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: String::new(),
            level: "info".to_string(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_block_size: DEFAULT_READ_BLOCK_SIZE as u64,
            character_set: "auto".to_string(),
            thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

#[cfg(feature = "logging")]
impl LogSection {
    /// 转换为 [`crate::logging::LogConfig`]
    pub fn to_log_config(&self) -> Result<crate::logging::LogConfig> {
        let level = crate::logging::parse_level(&self.level)?;
        let mut config = crate::logging::LogConfig::new()
            .level(level)
            .stdout(self.enable_stdout);
        if !self.log_dir.is_empty() {
            config = config.log_dir(&self.log_dir);
        }
        Ok(config)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// 从字符串加载配置
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(DumpError::config(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        if !SUPPORTED_CHARACTER_SETS.contains(&self.reader.character_set.as_str())
        {
            return Err(DumpError::config(format!(
                "不支持的字符集: {}",
                self.reader.character_set
            )));
        }

        if self.reader.read_block_size == 0 {
            return Err(DumpError::config("read_block_size 不能为0"));
        }

        if self.reader.thread_count == 0 {
            return Err(DumpError::config("线程数不能为0"));
        }

        Ok(())
    }
}
