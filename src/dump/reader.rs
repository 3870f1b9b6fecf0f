//! 按字节预算切分 INSERT 语句的读取器
//!
//! dump 数据文件的格式：
//!
//! ```text
//! /*!40101 SET NAMES binary*/;
//! INSERT INTO `t` VALUES
//! (1,'a'),
//! (2,'b'),
//! (3,'c');
//! ```
//!
//! 一个巨大的 INSERT 语句会被拆成若干条独立可执行的小语句：
//! 每批的第一行若不带语句头就补上，批次末尾的 `,` 改成 `;`。
//!
//! 位置（`tell`）总是精确指向下一个未读取的字节：每次读取结束后都会
//! 显式 seek 回 `起点 + 已消费字节数`，抵消缓冲区多读的部分。

use crate::dump::header::find_insert_statement_header;
use crate::dump::utils::{
    LineCursor, head_snippet, is_annotation_block, tail_snippet,
    trim_in_place,
};
use crate::error::{DumpError, Result};
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
};

/// 一条切分出来的、可独立执行的 INSERT 语句
pub type Statement = Vec<u8>;

/// 预读缓冲的最小容量
const MIN_READ_BUFFER: usize = 4096;
/// 语句缓冲在预算之外预留的空间
const STATEMENT_SLACK: usize = 4096;
/// 异常日志中保留的语句片段长度
const SNIPPET_LEN: usize = 10;

/// 单条语句级别的异常，语句会被丢弃，读取继续。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementAnomaly {
    /// 语句不以语句头开头
    UnexpectedStart { snippet: String },
    /// 语句结尾既不是 `;` 也不是 `,`
    UnexpectedEnd { snippet: String },
}

impl fmt::Display for StatementAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedStart { snippet } => {
                write!(f, "Unexpected statement start : '{snippet} ..'")
            }
            Self::UnexpectedEnd { snippet } => {
                write!(f, "Unexpected statement end : '.. {snippet}'")
            }
        }
    }
}

/// 接收语句异常的回调。闭包 `Fn(&StatementAnomaly) + Send` 可直接使用。
pub trait AnomalyReporter: Send {
    fn report(&self, anomaly: &StatementAnomaly);
}

impl<F> AnomalyReporter for F
where
    F: Fn(&StatementAnomaly) + Send,
{
    fn report(&self, anomaly: &StatementAnomaly) {
        self(anomaly);
    }
}

/// 默认的上报方式：写 error 日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl AnomalyReporter for TracingReporter {
    fn report(&self, anomaly: &StatementAnomaly) {
        #[cfg(feature = "logging")]
        tracing::error!("{}", anomaly);
        #[cfg(not(feature = "logging"))]
        let _ = anomaly;
    }
}

/// 持有一个独立文件句柄的语句读取器
pub struct StatementReader {
    file: Option<File>,
    path: PathBuf,
    file_size: u64,
    start: u64,
    stmt_header: Vec<u8>,

    buffer: Vec<u8>,
    buffer_capacity: usize,
    reporter: Box<dyn AnomalyReporter>,
}

impl fmt::Debug for StatementReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementReader")
            .field("path", &self.path)
            .field("file_size", &self.file_size)
            .field("start", &self.start)
            .field("stmt_header", &String::from_utf8_lossy(&self.stmt_header))
            .field("buffer_capacity", &self.buffer_capacity)
            .field("closed", &self.file.is_none())
            .finish()
    }
}

impl StatementReader {
    /// 打开文件并定位到 `offset` 之后的第一行有效内容，异常语句写 error 日志。
    ///
    /// # Errors
    /// - `DumpError::Io(_)` - 打开、定位或获取文件大小失败
    /// - `DumpError::HeaderNotFound` - 文件中没有 INSERT 语句头
    pub fn open<P: AsRef<Path>>(path: P, offset: u64) -> Result<Self> {
        Self::open_with_reporter(path, offset, TracingReporter)
    }

    /// 与 [`StatementReader::open`] 相同，但异常语句交给 `reporter` 处理。
    pub fn open_with_reporter<P, R>(
        path: P,
        offset: u64,
        reporter: R,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        R: AnomalyReporter + 'static,
    {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        let file_size = file.metadata()?.len();

        let stmt_header = find_insert_statement_header(path)?
            .ok_or_else(|| DumpError::header_not_found(path))?;

        let mut reader = Self {
            file: Some(file),
            path: path.to_path_buf(),
            file_size,
            start: offset,
            stmt_header,
            buffer: Vec::new(),
            buffer_capacity: 0,
            reporter: Box::new(reporter),
        };
        let pos = reader.skip_annotation(offset)?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            "[{}] 打开读取器: offset = {}, 实际起点 = {}, 文件大小 = {}",
            reader.path.display(),
            offset,
            pos,
            file_size
        );
        #[cfg(not(feature = "logging"))]
        let _ = pos;

        Ok(reader)
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 构造时传入的偏移
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 文件大小
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// 探测到的语句头
    pub fn header(&self) -> &[u8] {
        &self.stmt_header
    }

    /// 预读缓冲当前容量（只增不减）
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// 当前位置
    ///
    /// # Errors
    /// - `DumpError::ReaderClosed` - 读取器已关闭
    /// - `DumpError::Io(_)` - 获取位置失败
    pub fn tell(&self) -> Result<u64> {
        let mut file = self.file.as_ref().ok_or(DumpError::ReaderClosed)?;
        Ok(file.stream_position()?)
    }

    /// 定位到 `offset` 之后的第一行有效内容，返回新的位置。
    pub fn seek(&mut self, offset: u64) -> Result<u64> {
        self.skip_annotation(offset)
    }

    /// 释放文件句柄和缓冲，可重复调用。
    pub fn close(&mut self) -> Result<()> {
        if self.file.take().is_some() {
            #[cfg(feature = "logging")]
            tracing::trace!("[{}] 关闭读取器", self.path.display());
        }
        self.buffer = Vec::new();
        self.buffer_capacity = 0;
        Ok(())
    }

    /// 从 `offset` 开始跳过整行的注释块，把句柄定位到第一行非注释内容。
    ///
    /// 只有从行首开始的 `/* ... */;` 才会被跳过。扫描到文件末尾时位置为文件大小。
    fn skip_annotation(&mut self, offset: u64) -> Result<u64> {
        let file_size = self.file_size;
        let file = self.file.as_mut().ok_or(DumpError::ReaderClosed)?;
        file.seek(SeekFrom::Start(offset))?;

        let target = {
            let mut reader = BufReader::new(&mut *file);
            let mut line = Vec::new();
            let mut skip_size = 0u64;
            loop {
                line.clear();
                let size = reader.read_until(b'\n', &mut line)?;
                if size == 0 {
                    break file_size;
                }
                if !is_annotation_block(line.trim_ascii()) {
                    break offset.saturating_add(skip_size).min(file_size);
                }
                skip_size += size as u64;
            }
        };

        // BufReader 可能多读了，必须显式定位
        file.seek(SeekFrom::Start(target))?;
        Ok(target)
    }

    /// 准备至少 `size` 字节的预读缓冲，只增不减，按倍数扩容。
    fn acquire_buffer(&mut self, size: usize) {
        if size > self.buffer_capacity {
            let capacity = size.max(self.buffer_capacity.saturating_mul(2));
            self.buffer = vec![0u8; capacity];
            self.buffer_capacity = capacity;
        }
    }

    /// 读取至少 `min_size` 字节（补全最后一行）的内容，返回切分出的语句。
    ///
    /// 返回 `Ok(None)` 表示调用时已处于文件末尾。整批都是注释或空行时
    /// 返回 `Ok(Some(vec![]))`。
    ///
    /// # Errors
    /// - `DumpError::ReaderClosed` - 读取器已关闭
    /// - `DumpError::Io(_)` - 读取或定位失败
    pub fn read(&mut self, min_size: u64) -> Result<Option<Vec<Statement>>> {
        let begin_pos = self.tell()?;
        if begin_pos >= self.file_size {
            return Ok(None);
        }

        // 缓冲不会超过剩余字节数
        let remaining = self.file_size - begin_pos;
        let lookahead = min_size.saturating_mul(2).min(remaining);
        let lookahead = usize::try_from(lookahead)
            .unwrap_or(usize::MAX)
            .max(MIN_READ_BUFFER);
        self.acquire_buffer(lookahead);

        let statement_capacity = usize::try_from(min_size.min(remaining))
            .unwrap_or(0)
            .saturating_add(STATEMENT_SLACK);

        let Self { file, buffer, stmt_header, reporter, .. } = self;
        let file = file.as_mut().ok_or(DumpError::ReaderClosed)?;
        let header = stmt_header.as_slice();
        let reporter: &dyn AnomalyReporter = &**reporter;

        let mut stmts: Vec<Statement> = Vec::with_capacity(8);
        let mut statement: Vec<u8> = Vec::with_capacity(statement_capacity);
        let mut read_size = 0u64;
        {
            let mut cursor = LineCursor::new(&mut *file, &mut buffer[..]);
            let mut line = Vec::new();
            loop {
                let line_size = cursor.read_line(&mut line)?;
                if line_size == 0 {
                    break;
                }
                read_size += line_size as u64;

                trim_in_place(&mut line);
                if !line.is_empty() && !is_annotation_block(&line) {
                    if statement.is_empty() && !line.starts_with(header) {
                        statement.extend_from_slice(header);
                    }
                    statement.extend_from_slice(&line);

                    if statement.last() == Some(&b';') {
                        let complete = std::mem::replace(
                            &mut statement,
                            Vec::with_capacity(statement_capacity),
                        );
                        append_statement(complete, header, reporter, &mut stmts);
                    }
                }

                if read_size >= min_size {
                    break;
                }
            }
        }

        // 缓冲读取器会多读，回到实际消费的位置
        file.seek(SeekFrom::Start(begin_pos + read_size))?;

        if !statement.is_empty() {
            append_statement(statement, header, reporter, &mut stmts);
        }

        #[cfg(feature = "logging")]
        tracing::trace!(
            "读取 [{}, {}) 共 {} 字节，得到 {} 条语句",
            begin_pos,
            begin_pos + read_size,
            read_size,
            stmts.len()
        );

        Ok(Some(stmts))
    }
}

impl Drop for StatementReader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// 校验一条候选语句，合法则追加到 `stmts`。
///
/// - 不以语句头开头：上报 `UnexpectedStart` 并丢弃
/// - 只有语句头、没有任何值：静默丢弃
/// - 以 `,` 结尾：改为 `;`
/// - 其它结尾：上报 `UnexpectedEnd` 并丢弃
pub(crate) fn append_statement(
    mut sql: Vec<u8>,
    header: &[u8],
    reporter: &dyn AnomalyReporter,
    stmts: &mut Vec<Statement>,
) {
    trim_in_place(&mut sql);
    if sql.is_empty() {
        return;
    }

    if !sql.starts_with(header) {
        reporter.report(&StatementAnomaly::UnexpectedStart {
            snippet: head_snippet(&sql, SNIPPET_LEN),
        });
        return;
    }
    if sql.len() == header.len() {
        return;
    }

    match sql.last_mut() {
        Some(b';') => {}
        Some(last @ b',') => *last = b';',
        _ => {
            reporter.report(&StatementAnomaly::UnexpectedEnd {
                snippet: tail_snippet(&sql, SNIPPET_LEN),
            });
            return;
        }
    }

    stmts.push(sql);
}
