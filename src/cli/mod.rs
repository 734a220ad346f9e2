//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `analyze`: 分析功能（嵌套子命令）
//!   - `profile`: 网格化空间电荷剖面计算
//!   - `core-width`: 芯区宽度分析
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: analyze

pub mod analyze;

use clap::{Parser, Subcommand};

/// spacecharge - 一维晶界空间电荷建模工具
#[derive(Parser)]
#[command(name = "spacecharge")]
#[command(version)]
#[command(about = "A one-dimensional grain-boundary space-charge site modelling toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze grain-boundary site data
    Analyze(analyze::AnalyzeArgs),
}
