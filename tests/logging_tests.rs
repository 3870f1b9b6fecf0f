#![cfg(feature = "logging")]

use sqldump_reader::dump::{RegionReader, StatementReader};
use sqldump_reader::logging::{LogConfig, init_default_logging, init_logging};
use std::fs;
use tempfile::TempDir;
use tracing::Level;

/// 测试默认日志初始化
#[test]
fn test_init_default_logging() {
    let result = init_default_logging();
    assert!(result.is_ok());
}

/// 重复初始化不是错误
#[test]
fn test_init_logging_twice() {
    assert!(init_logging(LogConfig::new().level(Level::DEBUG)).is_ok());
    assert!(init_logging(LogConfig::new().level(Level::TRACE)).is_ok());
}

/// 测试日志配置的创建和设置
#[test]
fn test_log_config_creation() {
    let config1 = LogConfig::new();
    assert_eq!(config1.level, Level::INFO);
    assert!(config1.enable_stdout);

    let config2 = LogConfig::new().level(Level::ERROR).log_dir("logs");
    assert_eq!(config2.level, Level::ERROR);
    assert!(config2.log_dir.is_some());
}

/// 初始化时创建日志目录
#[test]
fn test_log_dir_created() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("nested").join("logs");
    let config = LogConfig::new().stdout(false).log_dir(&log_dir);

    assert!(init_logging(config).is_ok());
    assert!(log_dir.is_dir());
}

/// 开启日志后读取器照常工作（异常语句写入日志而不是报错）
#[test]
fn test_reader_with_logging() {
    let _ = init_default_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.sql");
    fs::write(&path, "INSERT INTO t VALUES\n(1),\n(2) broken\n").unwrap();

    let mut reader = StatementReader::open(&path, 0).unwrap();
    assert_eq!(reader.read(1024).unwrap().unwrap(), Vec::<Vec<u8>>::new());

    let mut region = RegionReader::new(&path, 0, 21).unwrap();
    assert!(region.read(1024).unwrap().unwrap().is_empty());
    assert!(region.read(1024).unwrap().is_none());
}
