//! 集成测试公共模块

use regex::Regex;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// 示例 dump 的语句头
#[allow(dead_code)]
pub const SAMPLE_HEADER: &[u8] = b"INSERT INTO t VALUES";

/// 最小的 dump 内容，共 36 字节：语句头 21 字节，每行数据 5 字节
#[allow(dead_code)]
pub const SAMPLE_DUMP: &str = "INSERT INTO t VALUES\n(1),\n(2),\n(3);\n";

/// 生成 dump 时使用的语句头
#[allow(dead_code)]
pub const GENERATED_HEADER: &[u8] = b"INSERT INTO `db`.`t` VALUES";

/// 在临时目录中创建 dump 文件
pub fn create_dump_file(
    dir: &TempDir,
    filename: &str,
    content: &[u8],
) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 生成 `rows` 行数据的 dump 内容，数据行为 `(i,'v-i')`，i 从 1 开始
#[allow(dead_code)]
pub fn generate_dump(rows: usize) -> String {
    let mut content = String::from("/*!40101 SET NAMES binary*/;\n");
    content.push_str("INSERT INTO `db`.`t` VALUES\n");
    for i in 1..=rows {
        let end = if i == rows { ';' } else { ',' };
        content.push_str(&format!("({i},'v-{i}'){end}\n"));
    }
    content
}

/// 从语句中按顺序提取数据行编号
#[allow(dead_code)]
pub fn extract_row_ids(stmt: &[u8]) -> Vec<usize> {
    let re = Regex::new(r"\((\d+),'v-\d+'\)").unwrap();
    let text = String::from_utf8_lossy(stmt);
    re.captures_iter(&text)
        .map(|caps| caps[1].parse().unwrap())
        .collect()
}

/// 每一行结束后的字节偏移（包括 0），即所有按行对齐的区间边界
#[allow(dead_code)]
pub fn line_boundaries(content: &str) -> Vec<u64> {
    let mut offsets = vec![0u64];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i as u64 + 1);
        }
    }
    offsets
}

/// 校验语句以语句头开头、以 `;` 结尾
#[allow(dead_code)]
pub fn assert_well_formed(stmt: &[u8], header: &[u8]) {
    assert!(
        stmt.starts_with(header),
        "语句头不正确: {}",
        String::from_utf8_lossy(stmt)
    );
    assert_eq!(stmt.last(), Some(&b';'), "语句未以 ; 结尾");
}
