//! # analyze 命令分发
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 子模块: profile, core_width

pub mod core_width;
pub mod profile;

use crate::cli::analyze::{AnalyzeArgs, AnalyzeCommands};
use crate::error::Result;

/// 执行 analyze 子命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Profile(args) => profile::execute(args),
        AnalyzeCommands::CoreWidth(args) => core_width::execute(args),
    }
}
