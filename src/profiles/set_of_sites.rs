//! # 站点集合与网格聚合
//!
//! `SetOfSites` 把全部站点组织为一个有序集合，并提供把离散站点
//! 聚合到一维网格上的四个计算：网格能量、占据概率、缺陷密度和
//! 子网格缺陷密度。
//!
//! ## 累加与覆写
//! 多个站点落到同一网格点时，能量和缺陷密度按物理量可加性
//! **累加**；占据概率不是独立站点概率之和，按迭代顺序**覆写**，
//! 最后一个站点生效。这一区别是刻意的设计，相应测试防止回归。
//!
//! ## 依赖关系
//! - 使用 `models/` 的网格对齐函数和站点概率
//! - 使用 `parsers/site_data.rs` 装载与展平记录
//! - 被 `commands/analyze/profile.rs` 驱动

use crate::error::{Result, SpaceChargeError};
use crate::models::{energy_at_x, index_of_grid_at_x, phi_at_x, DefectSpecies, Grid, Site};
use crate::parsers::{
    apply_core_model, load_site_data, mirror_site_data, site_from_record, CoreModel, SiteRecord,
};

use std::collections::HashMap;
use std::ops::{Add, Index};
use std::path::Path;

/// 有序的站点集合
///
/// 顺序为构建顺序（数据文件中按坐标排序后的顺序）。聚合计算
/// 不依赖顺序，除了占据概率的"最后写入者生效"覆写语义。
#[derive(Debug, Clone)]
pub struct SetOfSites {
    sites: Vec<Site>,
}

impl SetOfSites {
    /// 从站点列表构建
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    /// 站点数量
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// 集合是否为空
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// 按原始顺序迭代站点
    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    /// 带有给定标签的站点，原始顺序的非占有视图
    pub fn subset(&self, label: &str) -> Vec<&Site> {
        self.sites.iter().filter(|s| s.label == label).collect()
    }

    /// 带有给定标签的站点坐标，顺序与 [`subset`](Self::subset) 一致
    pub fn coordinates(&self, label: &str) -> Vec<f64> {
        self.sites
            .iter()
            .filter(|s| s.label == label)
            .map(|s| s.x)
            .collect()
    }

    /// 集合中出现过的站点标签，按首次出现顺序去重
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for site in &self.sites {
            if !labels.iter().any(|l| l == &site.label) {
                labels.push(site.label.clone());
            }
        }
        labels
    }

    /// 站点能量在网格上的分布
    ///
    /// 每个站点的能量贡献**累加**到它最近的网格点上；没有站点
    /// 落入的网格点保持零。
    pub fn calculate_energies_on_grid(&self, grid: &Grid, phi: &[f64]) -> Result<Vec<f64>> {
        check_phi_length(grid, phi)?;
        let mut energies_on_grid = vec![0.0; grid.len()];
        for site in &self.sites {
            let i = index_of_grid_at_x(&grid.x, site.x);
            energies_on_grid[i] += energy_at_x(&site.defect_energies, &grid.x, site.x);
        }
        Ok(energies_on_grid)
    }

    /// 站点占据概率在网格上的读出
    ///
    /// 每个站点在其坐标处插值局部静电势，向站点询问占据概率，
    /// **覆写**到最近的网格点；多个站点落到同一点时迭代顺序中
    /// 最后一个生效。所有条目落在 [0, 1]。
    pub fn calculate_probabilities(&self, grid: &Grid, phi: &[f64], temp: f64) -> Result<Vec<f64>> {
        check_phi_length(grid, phi)?;
        let mut probability = vec![0.0; grid.len()];
        for site in &self.sites {
            let i = index_of_grid_at_x(&grid.x, site.x);
            probability[i] = site.probability(phi_at_x(phi, &grid.x, site.x), temp);
        }
        Ok(probability)
    }

    /// 缺陷密度在网格上的分布
    ///
    /// 占据概率除以网格点的单元体积后**累加**：一个网格点的缺陷
    /// 密度是落到该点的全部站点贡献之和。
    pub fn calculate_defect_density(&self, grid: &Grid, phi: &[f64], temp: f64) -> Result<Vec<f64>> {
        check_phi_length(grid, phi)?;
        let mut defect_density = vec![0.0; grid.len()];
        for site in &self.sites {
            let i = index_of_grid_at_x(&grid.x, site.x);
            defect_density[i] +=
                site.probability(phi_at_x(phi, &grid.x, site.x), temp) / grid.volumes[i];
        }
        Ok(defect_density)
    }

    /// 子网格上的缺陷密度
    ///
    /// 与 [`calculate_defect_density`](Self::calculate_defect_density)
    /// 相同，但静电势在完整网格 `full_grid` 的坐标系中插值，网格点
    /// 索引和体积归一化取自受限区域 `sub_grid`。用于多区域模拟：
    /// 站点子集聚合到更细或受限的网格上，同时采样全局一致的势。
    pub fn subgrid_calculate_defect_density(
        &self,
        sub_grid: &Grid,
        full_grid: &Grid,
        phi: &[f64],
        temp: f64,
    ) -> Result<Vec<f64>> {
        check_phi_length(full_grid, phi)?;
        let mut defect_density = vec![0.0; sub_grid.len()];
        for site in &self.sites {
            let i = index_of_grid_at_x(&sub_grid.x, site.x);
            defect_density[i] +=
                site.probability(phi_at_x(phi, &full_grid.x, site.x), temp) / sub_grid.volumes[i];
        }
        Ok(defect_density)
    }

    /// 由已展平的记录构建站点集合
    pub fn from_records(
        records: &[SiteRecord],
        defect_species: &HashMap<String, DefectSpecies>,
    ) -> Result<Self> {
        let sites = records
            .iter()
            .map(|r| site_from_record(r, defect_species))
            .collect::<Result<Vec<Site>>>()?;
        Ok(Self::new(sites))
    }

    /// 从数据文件构建站点集合
    ///
    /// 装载 [limits.0, limits.1] 范围内的记录，应用芯区展平策略，
    /// 再逐记录构建站点。
    #[allow(clippy::too_many_arguments)]
    pub fn from_input_data(
        path: &Path,
        limits: (f64, f64),
        defect_species: &HashMap<String, DefectSpecies>,
        site_charge: bool,
        core: CoreModel,
        temperature: f64,
        offset: f64,
    ) -> Result<Self> {
        let mut records = load_site_data(path, limits.0, limits.1, site_charge, offset)?;
        apply_core_model(&mut records, core, temperature);
        Self::from_records(&records, defect_species)
    }

    /// 从数据文件构建镜像的站点集合
    ///
    /// 记录先关于对称面镜像再展平，用于对称边界模拟。
    #[allow(clippy::too_many_arguments)]
    pub fn mirrored_from_input_data(
        path: &Path,
        limits: (f64, f64),
        defect_species: &HashMap<String, DefectSpecies>,
        site_charge: bool,
        core: CoreModel,
        temperature: f64,
        offset: f64,
    ) -> Result<Self> {
        let records = load_site_data(path, limits.0, limits.1, site_charge, offset)?;
        let mut records = mirror_site_data(&records);
        apply_core_model(&mut records, core, temperature);
        Self::from_records(&records, defect_species)
    }
}

/// 拼接两个站点集合，保持先左后右的顺序和站点同一性
impl Add for SetOfSites {
    type Output = SetOfSites;

    fn add(mut self, other: SetOfSites) -> SetOfSites {
        self.sites.extend(other.sites);
        self
    }
}

impl Index<usize> for SetOfSites {
    type Output = Site;

    fn index(&self, index: usize) -> &Site {
        &self.sites[index]
    }
}

impl<'a> IntoIterator for &'a SetOfSites {
    type Item = &'a Site;
    type IntoIter = std::slice::Iter<'a, Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}

fn check_phi_length(grid: &Grid, phi: &[f64]) -> Result<()> {
    if phi.len() != grid.len() {
        return Err(SpaceChargeError::GridMismatch {
            expected: grid.len(),
            found: phi.len(),
        });
    }
    Ok(())
}

/// 一次剖面计算的网格化结果
#[derive(Debug, Clone)]
pub struct ProfileData {
    /// 网格坐标 (Å)
    pub x: Vec<f64>,
    /// 网格上的静电势 (V)
    pub phi: Vec<f64>,
    /// 网格能量 (eV)
    pub energies: Vec<f64>,
    /// 占据概率
    pub probabilities: Vec<f64>,
    /// 缺陷密度 (Å⁻³)
    pub density: Vec<f64>,
    /// 按种类在各自子网格上的缺陷密度
    pub species: Vec<SpeciesProfile>,
    /// 绝对温度 (K)
    pub temperature: f64,
}

/// 单一种类在其子网格上的缺陷密度
#[derive(Debug, Clone)]
pub struct SpeciesProfile {
    /// 站点标签
    pub label: String,
    /// 子网格坐标 (Å)
    pub x: Vec<f64>,
    /// 缺陷密度 (Å⁻³)
    pub density: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DefectAtSite;
    use crate::parsers::site_data::parse_site_content;

    /// 能量为零、摩尔分数 p 的站点在零势下概率恰为 p
    fn site_with_probability(label: &str, x: f64, p: f64) -> Site {
        let species = DefectSpecies::new(label, 2.0, p);
        Site::new(label, x, 0.0, vec![DefectAtSite::from_species(&species, 0.0)])
    }

    fn site_with_energy(label: &str, x: f64, energy: f64) -> Site {
        let species = DefectSpecies::new(label, 2.0, 0.5);
        Site::new(
            label,
            x,
            0.0,
            vec![DefectAtSite::from_species(&species, energy)],
        )
    }

    fn unit_grid() -> Grid {
        Grid::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![1.0; 5]).unwrap()
    }

    #[test]
    fn test_defect_density_accumulates_colocated_sites() {
        let grid = unit_grid();
        let phi = vec![0.0; 5];
        let set = SetOfSites::new(vec![
            site_with_probability("A", 1.05, 0.5),
            site_with_probability("A", 0.96, 0.5),
        ]);
        let density = set.calculate_defect_density(&grid, &phi, 300.0).unwrap();
        assert!((density[1] - 1.0).abs() < 1e-12);
        for (i, &d) in density.iter().enumerate() {
            if i != 1 {
                assert_eq!(d, 0.0);
            }
        }
    }

    #[test]
    fn test_defect_density_is_additive() {
        let grid = unit_grid();
        let phi = vec![0.0; 5];
        let a = site_with_probability("A", 1.05, 0.3);
        let b = site_with_probability("B", 0.96, 0.2);
        let together = SetOfSites::new(vec![a.clone(), b.clone()])
            .calculate_defect_density(&grid, &phi, 300.0)
            .unwrap();
        let alone_a = SetOfSites::new(vec![a])
            .calculate_defect_density(&grid, &phi, 300.0)
            .unwrap();
        let alone_b = SetOfSites::new(vec![b])
            .calculate_defect_density(&grid, &phi, 300.0)
            .unwrap();
        for i in 0..grid.len() {
            assert!((together[i] - (alone_a[i] + alone_b[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_probabilities_overwrite_last_writer_wins() {
        let grid = unit_grid();
        let phi = vec![0.0; 5];
        let set = SetOfSites::new(vec![
            site_with_probability("A", 1.05, 0.3),
            site_with_probability("B", 0.96, 0.7),
        ]);
        let probability = set.calculate_probabilities(&grid, &phi, 300.0).unwrap();
        assert!((probability[1] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_length_and_bounds() {
        let grid = unit_grid();
        let phi = vec![0.1, -0.1, 0.2, 0.0, 0.05];
        let set = SetOfSites::new(vec![
            site_with_energy("A", 0.2, -0.4),
            site_with_energy("A", 2.9, 0.1),
        ]);
        let probability = set.calculate_probabilities(&grid, &phi, 300.0).unwrap();
        assert_eq!(probability.len(), grid.len());
        assert!(probability.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_energies_accumulate_on_grid() {
        let grid = unit_grid();
        let phi = vec![0.0; 5];
        let set = SetOfSites::new(vec![
            site_with_energy("A", 2.1, -0.2),
            site_with_energy("A", 1.9, -0.3),
            site_with_energy("A", 0.0, 0.1),
        ]);
        let energies = set.calculate_energies_on_grid(&grid, &phi).unwrap();
        assert!((energies[2] - (-0.5)).abs() < 1e-12);
        assert!((energies[0] - 0.1).abs() < 1e-12);
        assert_eq!(energies[3], 0.0);
    }

    #[test]
    fn test_subgrid_density_samples_full_grid_potential() {
        let full_grid = unit_grid();
        let phi = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let sub_grid = Grid::new(vec![0.0, 2.0], vec![2.0, 2.0]).unwrap();
        let site = site_with_energy("A", 1.8, -0.1);
        let set = SetOfSites::new(vec![site.clone()]);

        let density = set
            .subgrid_calculate_defect_density(&sub_grid, &full_grid, &phi, 300.0)
            .unwrap();

        // 势在完整网格坐标系中插值，索引与体积取自子网格
        let expected = site.probability(phi_at_x(&phi, &full_grid.x, 1.8), 300.0) / 2.0;
        assert!((density[1] - expected).abs() < 1e-12);
        assert_eq!(density[0], 0.0);
    }

    #[test]
    fn test_subgrid_matches_full_calculation_on_same_grid() {
        let grid = unit_grid();
        let phi = vec![0.05, 0.0, -0.05, 0.0, 0.05];
        let set = SetOfSites::new(vec![
            site_with_energy("A", 0.4, -0.2),
            site_with_energy("A", 3.3, -0.1),
        ]);
        let full = set.calculate_defect_density(&grid, &phi, 300.0).unwrap();
        let sub = set
            .subgrid_calculate_defect_density(&grid, &grid, &phi, 300.0)
            .unwrap();
        assert_eq!(full, sub);
    }

    #[test]
    fn test_phi_length_mismatch_is_error() {
        let grid = unit_grid();
        let set = SetOfSites::new(vec![site_with_probability("A", 1.0, 0.5)]);
        assert!(matches!(
            set.calculate_defect_density(&grid, &[0.0; 3], 300.0),
            Err(SpaceChargeError::GridMismatch {
                expected: 5,
                found: 3
            })
        ));
        assert!(matches!(
            set.calculate_probabilities(&grid, &[0.0; 4], 300.0),
            Err(SpaceChargeError::GridMismatch { .. })
        ));
        assert!(matches!(
            set.calculate_energies_on_grid(&grid, &[0.0; 6]),
            Err(SpaceChargeError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_concatenation_preserves_order_and_identity() {
        let a = SetOfSites::new(vec![
            site_with_probability("A", 0.0, 0.1),
            site_with_probability("A", 1.0, 0.2),
        ]);
        let b = SetOfSites::new(vec![site_with_probability("B", 2.0, 0.3)]);
        let combined = a.clone() + b.clone();
        assert_eq!(combined.len(), 3);
        let expected: Vec<&Site> = a.iter().chain(b.iter()).collect();
        for (got, want) in combined.iter().zip(expected) {
            assert_eq!(got, want);
        }
    }

    #[test]
    fn test_subset_and_coordinates() {
        let set = SetOfSites::new(vec![
            site_with_probability("Vo", 0.0, 0.1),
            site_with_probability("Gd", 1.0, 0.2),
            site_with_probability("Vo", 2.0, 0.3),
        ]);
        let subset = set.subset("Vo");
        assert_eq!(subset.len(), 2);
        assert_eq!(set.coordinates("Vo"), vec![0.0, 2.0]);
        assert_eq!(set.labels(), vec!["Vo".to_string(), "Gd".to_string()]);
        assert_eq!(set[1].label, "Gd");
    }

    #[test]
    fn test_from_records_with_flattening() {
        let mut records = parse_site_content(
            "Vo 2.0 0.0 Vo -0.2\nVo 2.0 1.0 Vo -0.2\nVo 2.0 2.0 Vo 0.1",
            "inline",
        )
        .unwrap();
        apply_core_model(&mut records, CoreModel::Single, 300.0);
        let mut species = HashMap::new();
        species.insert("Vo".to_string(), DefectSpecies::new("Vo", 2.0, 0.05));
        let set = SetOfSites::from_records(&records, &species).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set[0].defect_energies, vec![-0.2]);
        assert_eq!(set[2].defect_energies, vec![0.0]);
    }
}
