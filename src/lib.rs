//! SQL dump 数据文件的区间读取库
//!
//! 大型 dump 文件按字节区间分配给多个工作线程，每个线程只凭
//! `(path, offset, size)` 就能读出区间内完整、可独立执行的 INSERT 语句。
//!
//! ```no_run
//! use sqldump_reader::dump::RegionReader;
//!
//! let mut region = RegionReader::new("db.tbl.sql", 0, 256 * 1024 * 1024)?;
//! while let Some(stmts) = region.read(64 * 1024)? {
//!     for stmt in &stmts {
//!         // 交给写入端执行
//!         let _ = stmt;
//!     }
//! }
//! region.close()?;
//! # Ok::<(), sqldump_reader::DumpError>(())
//! ```

pub mod config;
pub mod dump;
pub mod error;

#[cfg(feature = "logging")]
pub mod logging;

pub use error::{DumpError, Result};
