//! # 解析器模块
//!
//! 站点数据文件的读取、镜像和芯区展平。
//!
//! ## 依赖关系
//! - 被 `profiles/` 和 `commands/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: site_data

pub mod site_data;

pub use site_data::{
    apply_core_model, load_site_data, mirror_site_data, site_from_record, CoreModel, DefectEntry,
    SiteRecord,
};
