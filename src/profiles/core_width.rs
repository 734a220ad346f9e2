//! # 芯区宽度分析
//!
//! 对装载的站点记录应用芯区展平策略后，测量保留非零能量的
//! 记录所跨越的空间范围 `max(x) - min(x)`。这是一个诊断量，
//! 反映展平后"芯"区域的宽度。
//!
//! ## 依赖关系
//! - 使用 `parsers/site_data.rs` 装载与展平记录
//! - 被 `commands/analyze/core_width.rs` 驱动

use crate::error::{Result, SpaceChargeError};
use crate::parsers::{apply_core_model, load_site_data, CoreModel, SiteRecord};

use std::path::Path;

/// 展平记录并测量非零能量记录的空间跨度
///
/// 全部能量被展平为零时芯区不存在，返回退化芯错误。
/// `source` 用于错误信息中的文件定位。
pub fn core_width_of_records(
    records: &mut [SiteRecord],
    core: CoreModel,
    temperature: f64,
    source: &str,
) -> Result<f64> {
    apply_core_model(records, core, temperature);

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut found = false;
    for record in records.iter() {
        if record.energy() != 0.0 {
            min_x = min_x.min(record.x);
            max_x = max_x.max(record.x);
            found = true;
        }
    }
    if !found {
        return Err(SpaceChargeError::DegenerateCore {
            path: source.to_string(),
        });
    }
    Ok(max_x - min_x)
}

/// 从数据文件计算芯区宽度
pub fn core_width_analysis(
    path: &Path,
    limits: (f64, f64),
    site_charge: bool,
    core: CoreModel,
    temperature: f64,
) -> Result<f64> {
    let mut records = load_site_data(path, limits.0, limits.1, site_charge, 0.0)?;
    core_width_of_records(
        &mut records,
        core,
        temperature,
        &path.display().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BOLTZMANN_EV;
    use crate::parsers::site_data::parse_site_content;

    #[test]
    fn test_single_core_width_spans_tied_minima() {
        let mut records = parse_site_content(
            "A 0.0 -1.5 A -0.2\nA 0.0 0.0 A 0.1\nA 0.0 2.5 A -0.2",
            "inline",
        )
        .unwrap();
        let width =
            core_width_of_records(&mut records, CoreModel::Single, 300.0, "inline").unwrap();
        // 并列最低的两条记录都保留非零能量
        assert!((width - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_multi_site_core_width_excludes_thermal_window() {
        let mut records = parse_site_content(
            "A 0.0 -2.0 A -0.01\nA 0.0 -1.0 A -0.30\nA 0.0 1.0 A -0.40\nA 0.0 2.0 A 0.02",
            "inline",
        )
        .unwrap();
        let temperature = 0.025 / BOLTZMANN_EV;
        let width =
            core_width_of_records(&mut records, CoreModel::MultiSite, temperature, "inline")
                .unwrap();
        // 只有 -0.30 和 -0.40 在热窗之外存活
        assert!((width - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_core_is_error() {
        let mut records =
            parse_site_content("A 0.0 -1.0 A -0.01\nA 0.0 1.0 A 0.01", "inline").unwrap();
        let temperature = 0.025 / BOLTZMANN_EV;
        assert!(matches!(
            core_width_of_records(&mut records, CoreModel::MultiSite, temperature, "inline"),
            Err(SpaceChargeError::DegenerateCore { .. })
        ));
    }
}
