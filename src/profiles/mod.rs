//! # 剖面计算模块
//!
//! 空间电荷层的核心：把离散站点聚合到一维网格上，得到网格化
//! 的能量、占据概率和缺陷密度，供外部 Poisson 自洽迭代消费。
//!
//! ## 子模块
//! - `set_of_sites`: 站点集合与四个聚合计算
//! - `core_width`: 展平后的芯区宽度诊断
//! - `export`: 数据导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/analyze/` 调用
//! - 使用 `models/` 和 `parsers/`

pub mod core_width;
pub mod export;
pub mod plot;
pub mod set_of_sites;

pub use core_width::{core_width_analysis, core_width_of_records};
pub use set_of_sites::{ProfileData, SetOfSites, SpeciesProfile};
