//! 行级别的判断与辅助函数

use std::io::{self, Read};

/// 判断一行（已去除首尾空白）是否为单行注释块 `/* ... */;`。
///
/// 同时接受不带分号的 `/* ... */`。跨多行的注释无法识别，会被当作普通内容。
#[must_use]
pub fn is_annotation_block(line: &[u8]) -> bool {
    line.starts_with(b"/*") && (line.ends_with(b"*/;") || line.ends_with(b"*/"))
}

/// 取语句开头最多 `n` 个字节用于日志，避免把整条语句写进日志。
#[must_use]
pub fn head_snippet(sql: &[u8], n: usize) -> String {
    let end = n.min(sql.len());
    String::from_utf8_lossy(&sql[..end]).into_owned()
}

/// 取语句结尾最多 `n` 个字节用于日志。
#[must_use]
pub fn tail_snippet(sql: &[u8], n: usize) -> String {
    let start = sql.len().saturating_sub(n);
    String::from_utf8_lossy(&sql[start..]).into_owned()
}

/// 原地去除首尾 ASCII 空白，不重新分配。
pub fn trim_in_place(buf: &mut Vec<u8>) {
    let end = buf.trim_ascii_end().len();
    buf.truncate(end);
    let start = buf.len() - buf.trim_ascii_start().len();
    if start > 0 {
        buf.drain(..start);
    }
}

/// 基于调用方提供的缓冲区按行读取。
///
/// 每次构造时视图为空，第一次读取即从底层句柄的当前位置开始填充，
/// 因此上一次调用预读的内容不会泄漏到下一次调用。
pub(crate) struct LineCursor<'a, R> {
    inner: R,
    buf: &'a mut [u8],
    pos: usize,
    filled: usize,
}

impl<'a, R: Read> LineCursor<'a, R> {
    pub(crate) fn new(inner: R, buf: &'a mut [u8]) -> Self {
        debug_assert!(!buf.is_empty());
        Self { inner, buf, pos: 0, filled: 0 }
    }

    /// 读取一行（包含换行符）到 `out`，返回读取的字节数，0 表示已到文件末尾。
    ///
    /// 比缓冲区更长的行会被完整拼接到 `out` 中。
    pub(crate) fn read_line(&mut self, out: &mut Vec<u8>) -> io::Result<usize> {
        out.clear();
        loop {
            if self.pos == self.filled {
                self.filled = self.fill()?;
                self.pos = 0;
                if self.filled == 0 {
                    return Ok(out.len());
                }
            }

            let available = &self.buf[self.pos..self.filled];
            if let Some(i) = available.iter().position(|&b| b == b'\n') {
                out.extend_from_slice(&available[..=i]);
                self.pos += i + 1;
                return Ok(out.len());
            }
            out.extend_from_slice(available);
            self.pos = self.filled;
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        loop {
            match self.inner.read(self.buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
