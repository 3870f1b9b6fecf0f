//! 区间读取器：把语句读取器限制在 `[offset, offset + size)` 之内

use crate::dump::reader::{
    AnomalyReporter, Statement, StatementReader, TracingReporter,
};
use crate::error::Result;
use std::path::Path;

/// 每个工作线程持有一个，内部的文件句柄不与其它区间共享。
#[derive(Debug)]
pub struct RegionReader {
    file_reader: StatementReader,
    offset: u64,
    size: u64,
    pos: u64,
}

impl RegionReader {
    /// 为 `path` 的 `[offset, offset + size)` 区间创建读取器。
    ///
    /// # Errors
    /// 与 [`StatementReader::open`] 相同。
    pub fn new<P: AsRef<Path>>(path: P, offset: u64, size: u64) -> Result<Self> {
        Self::with_reporter(path, offset, size, TracingReporter)
    }

    /// 与 [`RegionReader::new`] 相同，但语句异常交给 `reporter` 处理。
    pub fn with_reporter<P, R>(
        path: P,
        offset: u64,
        size: u64,
        reporter: R,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        R: AnomalyReporter + 'static,
    {
        #[cfg(feature = "logging")]
        tracing::debug!(
            "[{}] offset = {} / size = {}",
            path.as_ref().display(),
            offset,
            size
        );

        let file_reader =
            StatementReader::open_with_reporter(path, offset, reporter)?;
        let mut region = Self { file_reader, offset, size, pos: 0 };
        region.pos = region.clamp(region.file_reader.tell()?);
        Ok(region)
    }

    /// 区间结束位置（不含）
    fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    /// 跨越区间末尾的最后一行会被完整读取，但对外报告的位置不超过区间末尾。
    fn clamp(&self, pos: u64) -> u64 {
        pos.min(self.end())
    }

    /// 读取不超过区间剩余字节数、不超过 `max_block_size` 的内容。
    ///
    /// 返回 `Ok(None)` 表示区间（或文件）已经读完。
    pub fn read(
        &mut self,
        max_block_size: u64,
    ) -> Result<Option<Vec<Statement>>> {
        let end = self.end();
        if self.pos >= end {
            return Ok(None);
        }

        let read_size = (end - self.pos).min(max_block_size);
        let stmts = self.file_reader.read(read_size)?;
        self.pos = self.clamp(self.file_reader.tell()?);

        Ok(stmts)
    }

    /// 当前位置，可用于断点续读
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// 定位到 `pos`（会跳过该处的注释行），返回新的位置。
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        let pos = self.file_reader.seek(pos)?;
        self.pos = self.clamp(pos);
        Ok(self.pos)
    }

    /// 区间起点
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// 区间大小
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 语句头
    pub fn header(&self) -> &[u8] {
        self.file_reader.header()
    }

    /// 释放文件句柄，可重复调用。
    pub fn close(&mut self) -> Result<()> {
        self.file_reader.close()
    }
}
