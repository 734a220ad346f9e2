//! # 物理常数
//!
//! 集中定义计算中使用的物理常数。
//!
//! ## 依赖关系
//! - 被 `models/site.rs` 和 `parsers/site_data.rs` 使用

/// Boltzmann 常数 (eV/K)，CODATA 2018
pub const BOLTZMANN_EV: f64 = 8.617_333_262e-5;
