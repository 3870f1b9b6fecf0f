//! 多区间并发读取
//!
//! 每个区间一个 [`RegionReader`]、一个文件句柄，线程之间只共享任务队列。

use crate::config::ReaderConfig;
use crate::dump::reader::Statement;
use crate::dump::region::RegionReader;
use crate::error::Result;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::{panic, thread};

/// 由外部切分得到的一个读取任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTask {
    /// dump 文件路径
    pub path: PathBuf,
    /// 区间起点
    pub offset: u64,
    /// 区间大小
    pub size: u64,
}

impl RegionTask {
    pub fn new<P: Into<PathBuf>>(path: P, offset: u64, size: u64) -> Self {
        Self { path: path.into(), offset, size }
    }
}

/// 单个区间的读取统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSummary {
    /// 输出的语句条数
    pub statements: usize,
    /// 非空批次数
    pub batches: usize,
    /// 输出的语句总字节数
    pub bytes: usize,
    /// 读取结束时的位置
    pub end_pos: u64,
}

/// 顺序读取一个区间，每得到一批非空语句调用一次 `hook`。
///
/// # Errors
/// 打开或读取区间失败时返回对应错误，已回调的批次不会撤回。
pub fn load_region<F>(
    task: &RegionTask,
    block_size: u64,
    mut hook: F,
) -> Result<RegionSummary>
where
    F: FnMut(&[Statement]),
{
    let mut reader = RegionReader::new(&task.path, task.offset, task.size)?;
    let mut summary = RegionSummary::default();

    while let Some(stmts) = reader.read(block_size)? {
        if stmts.is_empty() {
            continue;
        }
        summary.batches += 1;
        summary.statements += stmts.len();
        summary.bytes += stmts.iter().map(Vec::len).sum::<usize>();
        hook(&stmts);
    }

    summary.end_pos = reader.tell();
    reader.close()?;

    #[cfg(feature = "logging")]
    tracing::debug!(
        "[{}] 区间 [{}, {}) 读取完成: {} 批, {} 条语句",
        task.path.display(),
        task.offset,
        task.offset.saturating_add(task.size),
        summary.batches,
        summary.statements
    );

    Ok(summary)
}

/// 用 `min(thread_count, tasks.len())` 个线程并发读取所有区间。
///
/// 返回结果与 `tasks` 一一对应；某个区间失败不影响其它区间，由调用方决定
/// 是否放弃整个导入。`hook` 会在各工作线程中被调用。
pub fn load_regions_concurrent<F>(
    tasks: &[RegionTask],
    config: &ReaderConfig,
    hook: F,
) -> Vec<Result<RegionSummary>>
where
    F: Fn(&RegionTask, &[Statement]) + Sync,
{
    if tasks.is_empty() {
        return Vec::new();
    }

    let thread_count = config.thread_count.clamp(1, tasks.len());
    let block_size = config.read_block_size.max(1);

    #[cfg(feature = "logging")]
    tracing::info!(
        "开始并发读取 {} 个区间，线程数: {}",
        tasks.len(),
        thread_count
    );

    let queue: Mutex<VecDeque<usize>> = Mutex::new((0..tasks.len()).collect());

    // 每个任务只会被取出一次，各线程返回自己完成的 (序号, 结果)
    let mut finished: Vec<(usize, Result<RegionSummary>)> =
        thread::scope(|scope| {
            let handles: Vec<_> = (0..thread_count)
                .map(|worker_id| {
                    let queue = &queue;
                    let hook = &hook;
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let next = queue
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .pop_front();
                            let Some(index) = next else { break };
                            let task = &tasks[index];

                            #[cfg(feature = "logging")]
                            tracing::trace!(
                                "工作线程 {} 读取区间 {}: offset = {}, size = {}",
                                worker_id,
                                index,
                                task.offset,
                                task.size
                            );
                            #[cfg(not(feature = "logging"))]
                            let _ = worker_id;

                            let result = load_region(task, block_size, |stmts| {
                                hook(task, stmts)
                            });

                            if let Err(_e) = &result {
                                #[cfg(feature = "logging")]
                                tracing::error!(
                                    "区间 {} ({}) 读取失败: {}",
                                    index,
                                    task.path.display(),
                                    _e
                                );
                            }

                            done.push((index, result));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle.join().unwrap_or_else(|e| panic::resume_unwind(e))
                })
                .collect()
        });

    finished.sort_unstable_by_key(|(index, _)| *index);
    debug_assert_eq!(finished.len(), tasks.len());
    finished.into_iter().map(|(_, result)| result).collect()
}
