//! 语句头探测
//!
//! 整个 dump 文件只在开头出现一次 `INSERT INTO <table> VALUES`，
//! 切分出来的每条语句都需要带上它。

use crate::error::Result;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// 探测语句头时使用的预读缓冲大小
pub const DEFAULT_READ_BLOCK_SIZE: usize = 64 * 1024;

lazy_static! {
    // 按字节匹配，GB18030 等非 UTF-8 数据文件同样适用
    static ref INSERT_STMT_RE: Regex =
        Regex::new(r"(?i-u)INSERT INTO .* VALUES").unwrap();
}

/// 在单行中查找语句头，返回匹配到的原始字节。
#[must_use]
pub fn match_insert_header(line: &[u8]) -> Option<&[u8]> {
    INSERT_STMT_RE.find(line).map(|m| m.as_bytes())
}

/// 从头扫描文件，返回第一处匹配的语句头。
///
/// 该函数每次都重新打开文件，不影响任何读取器的位置。
///
/// # Errors
/// - `DumpError::Io(_)` - 文件打开或读取失败
///
/// 返回 `Ok(None)` 表示整个文件中都没有语句头。
pub fn find_insert_statement_header<P: AsRef<Path>>(
    path: P,
) -> Result<Option<Vec<u8>>> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::with_capacity(DEFAULT_READ_BLOCK_SIZE, file);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if let Some(header) = match_insert_header(&line) {
            #[cfg(feature = "logging")]
            tracing::trace!(
                "{}: 找到语句头 {}",
                path.as_ref().display(),
                String::from_utf8_lossy(header)
            );
            return Ok(Some(header.to_vec()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_match_insert_header() {
        assert_eq!(
            match_insert_header(b"INSERT INTO `t` VALUES\n"),
            Some(&b"INSERT INTO `t` VALUES"[..])
        );
        assert_eq!(
            match_insert_header(b"insert into t values (1);"),
            Some(&b"insert into t values"[..])
        );
        assert!(match_insert_header(b"(1,'a'),").is_none());
        assert!(match_insert_header(b"INSERT INTO t\n").is_none());
    }

    #[test]
    fn test_find_header_after_annotations() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "/*!40101 SET NAMES binary*/;\n\nINSERT INTO `db`.`t` VALUES\n(1),\n(2);\n"
        )
        .unwrap();

        let header = find_insert_statement_header(file.path()).unwrap();
        assert_eq!(header.as_deref(), Some(&b"INSERT INTO `db`.`t` VALUES"[..]));
    }

    #[test]
    fn test_no_header() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "/* only comments */;\n(1),\n").unwrap();
        assert!(find_insert_statement_header(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = find_insert_statement_header("/nonexistent/dump.sql")
            .unwrap_err();
        assert!(err.is_io_error());
    }
}
