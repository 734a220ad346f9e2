//! # 数据模型模块
//!
//! 定义网格、缺陷种类和站点的统一数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `profiles/` 和 `commands/` 使用
//! - 子模块: grid, defect_species, site

pub mod defect_species;
pub mod grid;
pub mod site;

pub use defect_species::DefectSpecies;
pub use grid::{energy_at_x, index_of_grid_at_x, phi_at_x, Grid};
pub use site::{DefectAtSite, Site};
