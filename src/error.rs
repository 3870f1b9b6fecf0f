//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。
//! 单条语句级别的异常（开头/结尾不合法）不在这里，它们通过
//! [`crate::dump::AnomalyReporter`] 上报后直接丢弃，不会中断整个区间的读取。

use std::path::PathBuf;

/// dump 读取器的结果类型
pub type Result<T> = std::result::Result<T, DumpError>;

/// dump 读取错误类型
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// IO错误（打开、定位、读取文件）
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 文件中找不到 `INSERT INTO ... VALUES` 语句头，无法切分
    #[error("insert statement not found: {}", path.display())]
    HeaderNotFound { path: PathBuf },

    /// 读取器已经关闭
    #[error("读取器已关闭")]
    ReaderClosed,

    /// 内容与声明的字符集不符
    #[error("invalid schema encoding: {character_set}")]
    InvalidEncoding { character_set: String },

    /// 不支持的字符集
    #[error("Unsupported encoding {0}")]
    UnsupportedEncoding(String),

    /// 解码 schema 文件失败
    #[error("failed to decode {} as {character_set}: {source}", path.display())]
    Decode {
        path: PathBuf,
        character_set: String,
        #[source]
        source: Box<DumpError>,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 配置文件解析错误
    #[error("配置解析错误: {0}")]
    Toml(#[from] toml::de::Error),

    /// 配置序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// 日志错误（仅在启用 logging feature 时可用）
    #[cfg(feature = "logging")]
    #[error("日志错误: {0}")]
    Log(#[from] crate::logging::LogError),
}

impl DumpError {
    /// 创建一个找不到语句头的错误，是否作为错误输出由调用方决定
    pub fn header_not_found<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        #[cfg(feature = "logging")]
        tracing::debug!("文件中找不到 INSERT 语句头: {}", path.display());
        Self::HeaderNotFound { path }
    }

    /// 创建一个配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, DumpError::Io(_))
    }

    /// 检查是否为找不到语句头
    pub fn is_header_not_found(&self) -> bool {
        matches!(self, DumpError::HeaderNotFound { .. })
    }

    /// 检查是否为字符集相关错误（包括包装后的解码错误）
    pub fn is_encoding_error(&self) -> bool {
        match self {
            DumpError::InvalidEncoding { .. }
            | DumpError::UnsupportedEncoding(_) => true,
            DumpError::Decode { source, .. } => source.is_encoding_error(),
            _ => false,
        }
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DumpError::Config(_) | DumpError::Toml(_) | DumpError::TomlSer(_)
        )
    }
}
