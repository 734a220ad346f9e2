//! # 批量执行器
//!
//! 并行处理文件列表，收集每个文件的带类型结果。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，作业数可配置
//! - 进度条显示
//! - 按输入顺序返回逐文件结果，便于汇总成表
//!
//! ## 依赖关系
//! - 被 `commands/analyze/core_width.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 单个文件的处理结果，成功时携带计算值
#[derive(Debug, Clone)]
pub enum FileOutcome<T> {
    /// 处理成功
    Success(T),
    /// 处理失败（附错误信息）
    Failed(String),
}

/// 批量处理的逐文件结果
#[derive(Debug)]
pub struct BatchReport<T> {
    /// (文件路径, 结果)，顺序与输入文件列表一致
    pub entries: Vec<(PathBuf, FileOutcome<T>)>,
}

impl<T> BatchReport<T> {
    /// 成功数量
    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Success(_)))
            .count()
    }

    /// 失败数量
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Failed(_)))
            .count()
    }

    /// 失败详情：(路径, 错误信息)
    pub fn failures(&self) -> Vec<(&Path, &str)> {
        self.entries
            .iter()
            .filter_map(|(path, o)| match o {
                FileOutcome::Failed(err) => Some((path.as_path(), err.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建执行器，`jobs == 0` 时取 CPU 核数
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: Vec<PathBuf>, processor: F) -> BatchReport<T>
    where
        T: Send,
        F: Fn(&Path) -> FileOutcome<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Processing");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .unwrap();

        let entries: Vec<(PathBuf, FileOutcome<T>)> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    let outcome = processor(&file);
                    pb.inc(1);
                    (file, outcome)
                })
                .collect()
        });

        pb.finish_and_clear();
        BatchReport { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_order() {
        let files: Vec<PathBuf> = ["a", "b", "c"].iter().map(PathBuf::from).collect();
        let runner = BatchRunner::new(2);
        let report = runner.run(files, |path| match path.to_str() {
            Some("a") | Some("b") => FileOutcome::Success(1.0_f64),
            _ => FileOutcome::Failed("boom".to_string()),
        });
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failed_count(), 1);
        // 结果顺序与输入一致
        let order: Vec<&str> = report
            .entries
            .iter()
            .map(|(p, _)| p.to_str().unwrap())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(report.failures().len(), 1);
    }
}
