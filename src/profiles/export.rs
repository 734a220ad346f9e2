//! # 剖面数据导出
//!
//! 导出网格化剖面到 CSV 和 XY 格式。
//!
//! ## 支持格式
//! - CSV: 包含 x, phi, energy, probability, density 的完整数据
//! - XY: 两列数据交换格式（x, density）
//! - 种类 CSV: 单一种类在其子网格上的 x, density
//!
//! ## 依赖关系
//! - 被 `commands/analyze/profile.rs` 调用
//! - 使用 `profiles/set_of_sites.rs` 的 ProfileData 结构
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, SpaceChargeError};
use crate::profiles::{ProfileData, SpeciesProfile};

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 导出剖面为 CSV 格式
pub fn to_csv(profile: &ProfileData, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["x", "phi", "energy", "probability", "density"])?;

    for i in 0..profile.x.len() {
        wtr.write_record(&[
            format!("{:.6e}", profile.x[i]),
            format!("{:.6e}", profile.phi[i]),
            format!("{:.6e}", profile.energies[i]),
            format!("{:.6e}", profile.probabilities[i]),
            format!("{:.6e}", profile.density[i]),
        ])?;
    }

    wtr.flush().map_err(|e| SpaceChargeError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出单一种类的子网格密度为 CSV 格式
pub fn species_to_csv(species: &SpeciesProfile, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["x", "density"])?;
    for (x, density) in species.x.iter().zip(&species.density) {
        wtr.write_record(&[format!("{:.6e}", x), format!("{:.6e}", density)])?;
    }

    wtr.flush().map_err(|e| SpaceChargeError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出剖面为 XY 格式（x, density）
pub fn to_xy(profile: &ProfileData, output_path: &Path) -> Result<()> {
    let write_err = |e: std::io::Error| SpaceChargeError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let mut file = File::create(output_path).map_err(write_err)?;

    writeln!(file, "# Space-charge defect density profile").map_err(write_err)?;
    writeln!(file, "# Temperature: {:.2} K", profile.temperature).map_err(write_err)?;
    writeln!(file, "# Columns: x (Angstrom), density (Angstrom^-3)").map_err(write_err)?;
    writeln!(file, "#").map_err(write_err)?;

    for (x, density) in profile.x.iter().zip(&profile.density) {
        writeln!(file, "{:.6e}\t{:.6e}", x, density).map_err(write_err)?;
    }

    Ok(())
}
