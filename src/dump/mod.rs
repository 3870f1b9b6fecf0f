//! SQL dump 文件读取模块
//!
//! 提供按字节区间切分读取 dump 数据文件、探测语句头、schema 文件解码等功能

pub mod charset;
pub mod concurrent;
pub mod header;
pub mod reader;
pub mod region;
pub mod schema;
pub mod utils;

// 重新导出核心类型和函数
pub use charset::{SUPPORTED_CHARACTER_SETS, decode_character_set};
pub use concurrent::{
    RegionSummary, RegionTask, load_region, load_regions_concurrent,
};
pub use header::{DEFAULT_READ_BLOCK_SIZE, find_insert_statement_header};
pub use reader::{
    AnomalyReporter, Statement, StatementAnomaly, StatementReader,
    TracingReporter,
};
pub use region::RegionReader;
pub use schema::{export_statement, export_statement_with_config};
