//! 读取与数据文件配套的 schema 文件（建表语句）

use crate::config::ReaderConfig;
use crate::dump::charset::decode_character_set;
use crate::dump::utils::is_annotation_block;
use crate::error::{DumpError, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// 读取 schema 文件中所有可执行语句，去掉注释块后按 `character_set` 解码。
///
/// 多行语句的各行之间以 `\n` 连接；语句之间直接拼接。文件末尾没有以 `;`
/// 结尾的残留内容会被丢弃。
///
/// # Errors
/// - `DumpError::Io(_)` - 文件打开或读取失败
/// - `DumpError::Decode` - 内容无法按指定字符集解码
pub fn export_statement<P: AsRef<Path>>(
    path: P,
    character_set: &str,
) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let capacity = usize::try_from(file_size).unwrap_or(0).saturating_add(1);

    let mut reader = BufReader::new(file);
    let mut data: Vec<u8> = Vec::with_capacity(capacity);
    let mut buffer: Vec<u8> = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        buffer.extend_from_slice(trimmed);
        if buffer.last() == Some(&b';') {
            if !is_annotation_block(&buffer) {
                data.extend_from_slice(&buffer);
            }
            buffer.clear();
        } else {
            buffer.push(b'\n');
        }
    }

    decode_character_set(data, character_set).map_err(|e| {
        #[cfg(feature = "logging")]
        tracing::error!(
            "cannot decode input file as {} encoding, please convert it manually: {}",
            character_set,
            path.display()
        );
        DumpError::Decode {
            path: path.to_path_buf(),
            character_set: character_set.to_string(),
            source: Box::new(e),
        }
    })
}

/// 按配置中的 `character_set` 读取 schema 文件，见 [`export_statement`]。
pub fn export_statement_with_config<P: AsRef<Path>>(
    path: P,
    config: &ReaderConfig,
) -> Result<Vec<u8>> {
    export_statement(path, &config.character_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_statement_drops_annotations() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "/*!40101 SET NAMES binary*/;\n\nCREATE TABLE `t` (\n  `a` int\n);\n"
        )
        .unwrap();

        let data = export_statement(file.path(), "utf8mb4").unwrap();
        assert_eq!(data, b"CREATE TABLE `t` (\n`a` int\n);");
    }

    #[test]
    fn test_export_statement_decode_failure() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'C', 0xFF, b';', b'\n']).unwrap();

        let err = export_statement(file.path(), "utf8mb4").unwrap_err();
        assert!(matches!(err, DumpError::Decode { .. }));
        assert!(err.is_encoding_error());
    }
}
