//! 字符集校验与转换
//!
//! 只用于 schema 文件这类小文本，不参与数据文件的读取。

use crate::error::{DumpError, Result};
use encoding_rs::GB18030;

/// 支持的字符集名称
pub const SUPPORTED_CHARACTER_SETS: [&str; 4] =
    ["binary", "utf8mb4", "auto", "gb18030"];

/// 按指定字符集校验 `data`，必要时转换为 UTF-8。
///
/// - `binary`：原样返回
/// - `utf8mb4`：必须是合法 UTF-8
/// - `auto`：合法 UTF-8 直接返回，否则按 GB18030 尝试
/// - `gb18030`：按 GB18030 解码，结果中出现 U+FFFD 即视为解码失败
///
/// # Errors
/// - `DumpError::InvalidEncoding` - 内容与字符集不符
/// - `DumpError::UnsupportedEncoding` - 不支持的字符集名称
pub fn decode_character_set(
    data: Vec<u8>,
    character_set: &str,
) -> Result<Vec<u8>> {
    match character_set {
        "binary" => Ok(data),
        "utf8mb4" | "auto" if std::str::from_utf8(&data).is_ok() => Ok(data),
        "utf8mb4" => Err(DumpError::InvalidEncoding {
            character_set: character_set.to_string(),
        }),
        // 支持的编码再多时应该考虑先做 chardet
        "auto" | "gb18030" => decode_gb18030(&data, character_set),
        other => Err(DumpError::UnsupportedEncoding(other.to_string())),
    }
}

fn decode_gb18030(data: &[u8], character_set: &str) -> Result<Vec<u8>> {
    let (decoded, _had_errors) = GB18030.decode_without_bom_handling(data);
    // 替换字符是判断源数据并非 GB18030 的唯一可靠信号
    if decoded.contains('\u{FFFD}') {
        return Err(DumpError::InvalidEncoding {
            character_set: character_set.to_string(),
        });
    }
    Ok(decoded.into_owned().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // "中文" 的 GB18030 编码
    const GB_ZHONGWEN: &[u8] = &[0xD6, 0xD0, 0xCE, 0xC4];

    #[test]
    fn test_binary_passthrough() {
        let data = vec![0xFF, 0x00, 0xFE];
        assert_eq!(decode_character_set(data.clone(), "binary").unwrap(), data);
    }

    #[test]
    fn test_utf8mb4() {
        let data = "CREATE TABLE `中文` (a int);".as_bytes().to_vec();
        assert_eq!(decode_character_set(data.clone(), "utf8mb4").unwrap(), data);

        let err = decode_character_set(GB_ZHONGWEN.to_vec(), "utf8mb4")
            .unwrap_err();
        assert!(matches!(err, DumpError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_auto_falls_back_to_gb18030() {
        let decoded =
            decode_character_set(GB_ZHONGWEN.to_vec(), "auto").unwrap();
        assert_eq!(decoded, "中文".as_bytes());

        let ascii = b"CREATE TABLE t (a int);".to_vec();
        assert_eq!(decode_character_set(ascii.clone(), "auto").unwrap(), ascii);
    }

    #[test]
    fn test_gb18030_rejects_replacement() {
        // 0xFF 在 GB18030 中不是合法字节
        let err =
            decode_character_set(vec![b'a', 0xFF, b'b'], "gb18030").unwrap_err();
        assert!(err.is_encoding_error());
    }

    #[test]
    fn test_unsupported() {
        let err = decode_character_set(b"abc".to_vec(), "latin1").unwrap_err();
        match err {
            DumpError::UnsupportedEncoding(name) => assert_eq!(name, "latin1"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
