//! # 缺陷种类数据模型
//!
//! 描述一种点缺陷在体相中的属性：电荷数、位点摩尔分数、
//! 以及是否对静电势响应。
//!
//! ## 依赖关系
//! - 被 `models/site.rs` 和 `parsers/site_data.rs` 使用
//! - 被 `commands/analyze/profile.rs` 从 CLI 参数构建

use serde::{Deserialize, Serialize};

/// 缺陷种类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectSpecies {
    /// 种类标签，与站点数据文件中的缺陷列对应
    pub label: String,

    /// 电荷数（以基本电荷为单位）
    pub valence: f64,

    /// 体相位点摩尔分数，(0, 1]
    pub mole_fraction: f64,

    /// 固定种类不对静电势响应，占据概率钉在摩尔分数
    #[serde(default)]
    pub fixed: bool,
}

impl DefectSpecies {
    /// 创建可迁移的缺陷种类
    pub fn new(label: &str, valence: f64, mole_fraction: f64) -> Self {
        Self {
            label: label.to_string(),
            valence,
            mole_fraction,
            fixed: false,
        }
    }

    /// 创建固定的缺陷种类
    pub fn fixed(label: &str, valence: f64, mole_fraction: f64) -> Self {
        Self {
            label: label.to_string(),
            valence,
            mole_fraction,
            fixed: true,
        }
    }
}
