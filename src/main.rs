//! # spacecharge - 一维晶界空间电荷建模工具
//!
//! 把晶界附近离散的缺陷站点聚合到一维网格上，得到网格化的
//! 能量、占据概率和缺陷密度，供外部 Poisson 自洽迭代消费。
//!
//! ## 子命令
//! - `analyze` - 分析功能
//!   - `profile` - 网格化空间电荷剖面计算
//!   - `core-width` - 芯区宽度分析
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── profiles/  (站点聚合计算)
//!   │     ├── parsers/   (站点数据解析)
//!   │     └── models/    (网格与站点模型)
//!   ├── batch/      (批量处理)
//!   ├── utils/      (工具函数)
//!   ├── constants.rs (物理常数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod constants;
mod error;
mod models;
mod parsers;
mod profiles;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
