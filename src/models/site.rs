//! # 站点数据模型
//!
//! 一个站点是晶界附近的一个离散点，携带空间坐标、所属缺陷
//! 种类和各自的偏析能，并给出在给定局部静电势和温度下的
//! 占据概率。
//!
//! ## 占据统计
//! 同一站点上的多个缺陷相互竞争，占据概率遵循位点排斥的
//! Fermi-Dirac 型统计：
//!
//! ```text
//! p_i = x_i * exp(-E_i / kT) / (1 + Σ_j x_j * (exp(-E_j / kT) - 1))
//! ```
//!
//! 其中 `E_i = z_i * φ + e_i` 为缺陷 i 的位形能。固定种类不参与
//! 竞争，概率钉在其摩尔分数。
//!
//! ## 依赖关系
//! - 被 `profiles/set_of_sites.rs` 聚合计算使用
//! - 使用 `models/defect_species.rs` 和 `constants.rs`

use crate::constants::BOLTZMANN_EV;
use crate::models::DefectSpecies;

/// 驻留在某个站点上的一种缺陷
#[derive(Debug, Clone, PartialEq)]
pub struct DefectAtSite {
    /// 种类标签
    pub label: String,
    /// 电荷数
    pub valence: f64,
    /// 体相摩尔分数
    pub mole_fraction: f64,
    /// 是否固定（不对势响应）
    pub fixed: bool,
    /// 偏析能 (eV)
    pub energy: f64,
}

impl DefectAtSite {
    /// 由缺陷种类和该站点的偏析能构建
    pub fn from_species(species: &DefectSpecies, energy: f64) -> Self {
        Self {
            label: species.label.clone(),
            valence: species.valence,
            mole_fraction: species.mole_fraction,
            fixed: species.fixed,
            energy,
        }
    }

    /// 位形能：静电项加偏析能 (eV)
    pub fn potential_energy(&self, phi: f64) -> f64 {
        phi * self.valence + self.energy
    }

    /// exp(-E/kT)
    pub fn boltzmann_one(&self, phi: f64, temp: f64) -> f64 {
        (-self.potential_energy(phi) / (BOLTZMANN_EV * temp)).exp()
    }

    /// x * (exp(-E/kT) - 1)，竞争统计的分母贡献
    pub fn boltzmann_two(&self, phi: f64, temp: f64) -> f64 {
        self.mole_fraction * (self.boltzmann_one(phi, temp) - 1.0)
    }

    /// x * exp(-E/kT)，竞争统计的分子
    pub fn boltzmann_three(&self, phi: f64, temp: f64) -> f64 {
        self.mole_fraction * self.boltzmann_one(phi, temp)
    }
}

/// 晶界附近的一个缺陷站点
///
/// 坐标是连续量，不要求与任何网格点重合。构建后不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// 站点标签（缺陷种类标记）
    pub label: String,
    /// 空间坐标 (Å)
    pub x: f64,
    /// 站点电荷数
    pub valence: f64,
    /// 驻留缺陷
    pub defects: Vec<DefectAtSite>,
    /// 各缺陷的偏析能快照，与 `defects` 顺序一致
    pub defect_energies: Vec<f64>,
}

impl Site {
    /// 创建站点，能量快照由缺陷列表导出
    pub fn new(label: &str, x: f64, valence: f64, defects: Vec<DefectAtSite>) -> Self {
        let defect_energies = defects.iter().map(|d| d.energy).collect();
        Self {
            label: label.to_string(),
            x,
            valence,
            defects,
            defect_energies,
        }
    }

    /// 每个驻留缺陷的占据概率，顺序与 `defects` 一致
    ///
    /// `phi` 为站点处的局部静电势 (V)，`temp` 为绝对温度 (K)。
    /// 每个条目以及各条目之和都落在 [0, 1]。
    pub fn probabilities(&self, phi: f64, temp: f64) -> Vec<f64> {
        let denominator = 1.0
            + self
                .defects
                .iter()
                .map(|d| d.boltzmann_two(phi, temp))
                .sum::<f64>();
        self.defects
            .iter()
            .map(|d| {
                if d.fixed {
                    d.mole_fraction
                } else {
                    d.boltzmann_three(phi, temp) / denominator
                }
            })
            .collect()
    }

    /// 站点被任一驻留缺陷占据的总概率
    pub fn probability(&self, phi: f64, temp: f64) -> f64 {
        let denominator = 1.0
            + self
                .defects
                .iter()
                .map(|d| d.boltzmann_two(phi, temp))
                .sum::<f64>();
        self.defects
            .iter()
            .map(|d| {
                if d.fixed {
                    d.mole_fraction
                } else {
                    d.boltzmann_three(phi, temp) / denominator
                }
            })
            .sum()
    }
}
