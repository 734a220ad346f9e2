//! # 统一错误处理模块
//!
//! 定义 spacecharge 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// spacecharge 统一错误类型
#[derive(Error, Debug)]
pub enum SpaceChargeError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse site data: {path}, line {line}\nReason: {reason}")]
    ParseError {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Unknown defect species: '{label}' (no --species definition given for it)")]
    UnknownDefectSpecies { label: String },

    // ─────────────────────────────────────────────────────────────
    // 数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("No site records in range [{x_min}, {x_max}] of: {path}")]
    EmptyInputData {
        path: String,
        x_min: f64,
        x_max: f64,
    },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Potential array length {found} does not match grid length {expected}")]
    GridMismatch { expected: usize, found: usize },

    #[error("Core region is empty: every site energy was flattened to zero in {path}")]
    DegenerateCore { path: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SpaceChargeError>;
