//! # 站点数据文件解析器
//!
//! 读取晶界站点数据文件。每行一个站点记录，空白分隔的定位列：
//!
//! ```text
//! 列 0: 站点标签
//! 列 1: 站点电荷数
//! 列 2: 空间坐标 x
//! 列 3, 4: 缺陷标签、偏析能 (eV)
//! 列 5, 6, ...: 追加的缺陷标签、偏析能对
//! ```
//!
//! 即展平后索引 2 是坐标、索引 4 是首个能量。该定位模式与既有
//! 数据文件保持兼容，不得改动。空行和以 `#` 开头的行被跳过。
//!
//! ## 依赖关系
//! - 被 `profiles/set_of_sites.rs` 和 `profiles/core_width.rs` 使用
//! - 使用 `models/` 数据模型和 `constants.rs`

use crate::constants::BOLTZMANN_EV;
use crate::error::{Result, SpaceChargeError};
use crate::models::{DefectAtSite, DefectSpecies, Site};

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 记录中的一个缺陷条目：标签和偏析能
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectEntry {
    /// 缺陷种类标签
    pub label: String,
    /// 偏析能 (eV)
    pub energy: f64,
}

/// 站点数据文件中的一行记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRecord {
    /// 站点标签
    pub label: String,
    /// 站点电荷数
    pub valence: f64,
    /// 空间坐标 (Å)
    pub x: f64,
    /// 缺陷条目，至少一个
    pub defects: Vec<DefectEntry>,
}

impl SiteRecord {
    /// 首个能量条目（展平索引 4），芯区展平策略作用于此
    pub fn energy(&self) -> f64 {
        self.defects[0].energy
    }

    /// 改写首个能量条目
    pub fn set_energy(&mut self, energy: f64) {
        self.defects[0].energy = energy;
    }
}

/// 芯区能量展平模型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreModel {
    /// 不改动数据
    None,
    /// 单站点芯：严格高于最低能量的记录被置零
    Single,
    /// 多站点芯：落在 [-kT, +kT] 内的能量被置零
    MultiSite,
}

/// 解析站点数据文本
///
/// `source` 仅用于错误信息中的文件定位。
pub fn parse_site_content(content: &str, source: &str) -> Result<Vec<SiteRecord>> {
    let mut records = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 5 {
            return Err(SpaceChargeError::ParseError {
                path: source.to_string(),
                line: lineno + 1,
                reason: format!(
                    "expected at least 5 columns (label, charge, x, defect, energy), found {}",
                    columns.len()
                ),
            });
        }
        if columns.len() % 2 == 0 {
            return Err(SpaceChargeError::ParseError {
                path: source.to_string(),
                line: lineno + 1,
                reason: "trailing defect label without an energy column".to_string(),
            });
        }

        let parse_f64 = |column: usize, what: &str| -> Result<f64> {
            columns[column]
                .parse::<f64>()
                .map_err(|_| SpaceChargeError::ParseError {
                    path: source.to_string(),
                    line: lineno + 1,
                    reason: format!("invalid {} '{}' in column {}", what, columns[column], column),
                })
        };

        let valence = parse_f64(1, "site charge")?;
        let x = parse_f64(2, "coordinate")?;

        let mut defects = Vec::with_capacity((columns.len() - 3) / 2);
        for pair in (3..columns.len()).step_by(2) {
            defects.push(DefectEntry {
                label: columns[pair].to_string(),
                energy: parse_f64(pair + 1, "defect energy")?,
            });
        }

        records.push(SiteRecord {
            label: columns[0].to_string(),
            valence,
            x,
            defects,
        });
    }

    Ok(records)
}

/// 把记录限制在坐标范围 [x_min, x_max] 内并按 x 升序排序
pub fn restrict_to_range(records: Vec<SiteRecord>, x_min: f64, x_max: f64) -> Vec<SiteRecord> {
    let mut records: Vec<SiteRecord> = records
        .into_iter()
        .filter(|r| r.x >= x_min && r.x <= x_max)
        .collect();
    records.sort_by(|a, b| a.x.total_cmp(&b.x));
    records
}

/// 从文本装载站点记录：应用电荷开关和能量偏移，范围过滤后排序
///
/// `site_charge` 为 false 时站点电荷列被置零。`offset` 加到每个
/// 能量条目上。过滤后没有任何记录时返回数据错误。
pub fn load_site_records(
    content: &str,
    source: &str,
    x_min: f64,
    x_max: f64,
    site_charge: bool,
    offset: f64,
) -> Result<Vec<SiteRecord>> {
    let mut records = parse_site_content(content, source)?;

    for record in &mut records {
        if !site_charge {
            record.valence = 0.0;
        }
        if offset != 0.0 {
            for defect in &mut record.defects {
                defect.energy += offset;
            }
        }
    }

    let records = restrict_to_range(records, x_min, x_max);
    if records.is_empty() {
        return Err(SpaceChargeError::EmptyInputData {
            path: source.to_string(),
            x_min,
            x_max,
        });
    }
    Ok(records)
}

/// 从文件装载站点记录
pub fn load_site_data(
    path: &Path,
    x_min: f64,
    x_max: f64,
    site_charge: bool,
    offset: f64,
) -> Result<Vec<SiteRecord>> {
    let content = fs::read_to_string(path).map_err(|e| SpaceChargeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_site_records(
        &content,
        &path.display().to_string(),
        x_min,
        x_max,
        site_charge,
        offset,
    )
}

/// 把记录集关于其最大坐标处的对称面镜像
///
/// 用于对称边界模拟：数据只覆盖边界一侧时，镜像出另一侧。
/// 恰好位于对称面上的记录不重复。返回的记录按 x 升序。
pub fn mirror_site_data(records: &[SiteRecord]) -> Vec<SiteRecord> {
    let plane = match records.iter().map(|r| r.x).reduce(f64::max) {
        Some(plane) => plane,
        None => return Vec::new(),
    };

    let mut mirrored: Vec<SiteRecord> = records.to_vec();
    for record in records {
        if record.x < plane {
            let mut reflection = record.clone();
            reflection.x = 2.0 * plane - record.x;
            mirrored.push(reflection);
        }
    }
    mirrored.sort_by(|a, b| a.x.total_cmp(&b.x));
    mirrored
}

/// 应用芯区能量展平策略
///
/// `Single`: 严格高于全体最低能量的记录被置零，并列最低的全部
/// 保留。`MultiSite`: 能量落在 [-kT, +kT] 的记录被置零，滤除
/// 热学上不可分辨的近零能量。`None`: 原样通过。
pub fn apply_core_model(records: &mut [SiteRecord], core: CoreModel, temperature: f64) {
    match core {
        CoreModel::None => {}
        CoreModel::Single => {
            let min_energy = records
                .iter()
                .map(|r| r.energy())
                .fold(f64::INFINITY, f64::min);
            for record in records.iter_mut() {
                if record.energy() > min_energy {
                    record.set_energy(0.0);
                }
            }
        }
        CoreModel::MultiSite => {
            let kt = BOLTZMANN_EV * temperature;
            for record in records.iter_mut() {
                let energy = record.energy();
                if (-kt..=kt).contains(&energy) {
                    record.set_energy(0.0);
                }
            }
        }
    }
}

/// 由一条记录构建站点，缺陷标签在种类表中解析
pub fn site_from_record(
    record: &SiteRecord,
    defect_species: &HashMap<String, DefectSpecies>,
) -> Result<Site> {
    let mut defects = Vec::with_capacity(record.defects.len());
    for entry in &record.defects {
        let species = defect_species.get(&entry.label).ok_or_else(|| {
            SpaceChargeError::UnknownDefectSpecies {
                label: entry.label.clone(),
            }
        })?;
        defects.push(DefectAtSite::from_species(species, entry.energy));
    }
    Ok(Site::new(&record.label, record.x, record.valence, defects))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# label charge x defect energy
Vo   2.0  -4.0e0  Vo  -0.10
Vo   2.0  -2.0e0  Vo  -0.20
Gd  -1.0   0.0e0  Gd   0.10
Vo   2.0   3.0e0  Vo   0.05
";

    #[test]
    fn test_parse_site_content() {
        let records = parse_site_content(SAMPLE, "sample").unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].label, "Vo");
        assert_eq!(records[2].valence, -1.0);
        assert_eq!(records[1].x, -2.0);
        assert_eq!(records[1].energy(), -0.2);
        assert_eq!(records[2].defects[0].label, "Gd");
    }

    #[test]
    fn test_parse_multi_defect_line() {
        let records = parse_site_content("S 1.0 0.5 A -0.1 B 0.2", "inline").unwrap();
        assert_eq!(records[0].defects.len(), 2);
        assert_eq!(records[0].defects[1].label, "B");
        assert_eq!(records[0].defects[1].energy, 0.2);
        // 展平索引 4 = 首个能量
        assert_eq!(records[0].energy(), -0.1);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_site_content("Vo 2.0 0.0", "short").is_err());
        assert!(parse_site_content("Vo 2.0 0.0 Vo", "dangling").is_err());
        assert!(parse_site_content("Vo 2.0 zero Vo -0.1", "badfloat").is_err());
    }

    #[test]
    fn test_restrict_to_range_sorts_ascending() {
        let records = parse_site_content(SAMPLE, "sample").unwrap();
        let restricted = restrict_to_range(records, -3.0, 3.0);
        assert_eq!(restricted.len(), 3);
        let xs: Vec<f64> = restricted.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![-2.0, 0.0, 3.0]);
    }

    #[test]
    fn test_load_site_records_empty_range_is_error() {
        let err = load_site_records(SAMPLE, "sample", 10.0, 20.0, true, 0.0);
        assert!(matches!(
            err,
            Err(SpaceChargeError::EmptyInputData { .. })
        ));
    }

    #[test]
    fn test_load_site_records_site_charge_off() {
        let records =
            load_site_records(SAMPLE, "sample", -5.0, 5.0, false, 0.0).unwrap();
        assert!(records.iter().all(|r| r.valence == 0.0));
    }

    #[test]
    fn test_load_site_records_offset_shifts_energies() {
        let records =
            load_site_records(SAMPLE, "sample", -5.0, 5.0, true, 0.05).unwrap();
        let gd = records.iter().find(|r| r.label == "Gd").unwrap();
        assert!((gd.energy() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_mirror_about_symmetry_plane() {
        let records = parse_site_content(
            "A 0.0 -2.0 A -0.1\nA 0.0 -1.0 A -0.2\nA 0.0 0.0 A -0.3",
            "inline",
        )
        .unwrap();
        let mirrored = mirror_site_data(&records);
        let xs: Vec<f64> = mirrored.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
        // 对称面上的记录不重复
        assert_eq!(mirrored.iter().filter(|r| r.x == 0.0).count(), 1);
        // 能量随记录一起镜像
        assert_eq!(mirrored[4].energy(), -0.1);
    }

    #[test]
    fn test_core_single_preserves_ties_at_minimum() {
        let mut records = parse_site_content(
            "A 0.0 0.0 A -0.2\nA 0.0 1.0 A -0.2\nA 0.0 2.0 A 0.1",
            "inline",
        )
        .unwrap();
        apply_core_model(&mut records, CoreModel::Single, 300.0);
        let energies: Vec<f64> = records.iter().map(|r| r.energy()).collect();
        assert_eq!(energies, vec![-0.2, -0.2, 0.0]);
    }

    #[test]
    fn test_core_multi_site_zeroes_thermal_window() {
        let mut records = parse_site_content(
            "A 0.0 0.0 A -0.01\nA 0.0 1.0 A 0.03\nA 0.0 2.0 A -0.05",
            "inline",
        )
        .unwrap();
        // kT = 0.025 eV
        let temperature = 0.025 / BOLTZMANN_EV;
        apply_core_model(&mut records, CoreModel::MultiSite, temperature);
        let energies: Vec<f64> = records.iter().map(|r| r.energy()).collect();
        assert_eq!(energies, vec![0.0, 0.03, -0.05]);
    }

    #[test]
    fn test_core_none_passes_through() {
        let mut records = parse_site_content("A 0.0 0.0 A -0.01", "inline").unwrap();
        apply_core_model(&mut records, CoreModel::None, 300.0);
        assert_eq!(records[0].energy(), -0.01);
    }

    #[test]
    fn test_site_from_record_resolves_species() {
        let mut species = HashMap::new();
        species.insert("Vo".to_string(), DefectSpecies::new("Vo", 2.0, 0.05));
        let records = parse_site_content("Vo 2.0 1.5 Vo -0.25", "inline").unwrap();
        let site = site_from_record(&records[0], &species).unwrap();
        assert_eq!(site.x, 1.5);
        assert_eq!(site.defects.len(), 1);
        assert_eq!(site.defects[0].mole_fraction, 0.05);
        assert_eq!(site.defect_energies, vec![-0.25]);
    }

    #[test]
    fn test_site_from_record_unknown_species() {
        let species = HashMap::new();
        let records = parse_site_content("Vo 2.0 1.5 Vo -0.25", "inline").unwrap();
        assert!(matches!(
            site_from_record(&records[0], &species),
            Err(SpaceChargeError::UnknownDefectSpecies { .. })
        ));
    }
}
