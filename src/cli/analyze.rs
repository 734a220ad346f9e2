//! # analyze 子命令 CLI 定义
//!
//! 分析功能统一入口，包含两个子命令：
//! - `profile`: 网格化空间电荷剖面计算
//! - `core-width`: 芯区宽度分析
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze/` 相应模块

use crate::models::DefectSpecies;
use crate::parsers::CoreModel;

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Analyze 主命令
// ─────────────────────────────────────────────────────────────

/// analyze 主命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

/// analyze 子命令
#[derive(Subcommand, Debug)]
pub enum AnalyzeCommands {
    /// Calculate grid-resolved space-charge profiles from a site data file
    Profile(ProfileArgs),

    /// Measure the core width of the flattened energy landscape
    CoreWidth(CoreWidthArgs),
}

// ─────────────────────────────────────────────────────────────
// 共用参数类型
// ─────────────────────────────────────────────────────────────

/// 芯区展平模型（CLI 侧）
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum CoreModelArg {
    /// No flattening
    #[default]
    None,
    /// Keep only the single lowest-energy record
    Single,
    /// Zero energies inside the thermal window [-kT, +kT]
    MultiSite,
}

impl CoreModelArg {
    /// 转换为解析层的芯区模型
    pub fn to_core_model(self) -> CoreModel {
        match self {
            CoreModelArg::None => CoreModel::None,
            CoreModelArg::Single => CoreModel::Single,
            CoreModelArg::MultiSite => CoreModel::MultiSite,
        }
    }
}

impl std::fmt::Display for CoreModelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreModelArg::None => write!(f, "none"),
            CoreModelArg::Single => write!(f, "single"),
            CoreModelArg::MultiSite => write!(f, "multi-site"),
        }
    }
}

/// 剖面输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProfileOutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (x, phi, energy, probability, density)
    Csv,
    /// XY data file (x, density)
    Xy,
}

/// 解析缺陷种类定义 `label:valence:mole_fraction[:fixed]`
pub fn parse_species(input: &str) -> Result<DefectSpecies, String> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!(
            "Invalid species '{}'. Use label:valence:mole_fraction[:fixed], e.g. Vo:2:0.0307",
            input
        ));
    }

    let label = parts[0].trim();
    if label.is_empty() {
        return Err(format!("Invalid species '{}': empty label", input));
    }

    let valence: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("Invalid species '{}': bad valence '{}'", input, parts[1]))?;

    let mole_fraction: f64 = parts[2].trim().parse().map_err(|_| {
        format!(
            "Invalid species '{}': bad mole fraction '{}'",
            input, parts[2]
        )
    })?;
    if !(mole_fraction > 0.0 && mole_fraction <= 1.0) {
        return Err(format!(
            "Invalid species '{}': mole fraction must be in (0, 1], got {}",
            input, mole_fraction
        ));
    }

    let fixed = match parts.get(3).map(|s| s.trim()) {
        None => false,
        Some("fixed") => true,
        Some(other) => {
            return Err(format!(
                "Invalid species '{}': trailing flag must be 'fixed', got '{}'",
                input, other
            ))
        }
    };

    Ok(if fixed {
        DefectSpecies::fixed(label, valence, mole_fraction)
    } else {
        DefectSpecies::new(label, valence, mole_fraction)
    })
}

// ─────────────────────────────────────────────────────────────
// profile 子命令
// ─────────────────────────────────────────────────────────────

/// profile 子命令参数
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Input site data file (label, charge, x, defect/energy pairs per line)
    pub input: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "profile.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<ProfileOutputFormat>,

    /// Defect species definition label:valence:mole_fraction[:fixed] (repeatable)
    #[arg(short = 's', long = "species")]
    pub species: Vec<String>,

    /// Absolute temperature (K)
    #[arg(short = 't', long, default_value_t = 773.15)]
    pub temperature: f64,

    /// Lower coordinate bound for loaded sites (Å)
    #[arg(long, allow_negative_numbers = true)]
    pub x_min: Option<f64>,

    /// Upper coordinate bound for loaded sites (Å)
    #[arg(long, allow_negative_numbers = true)]
    pub x_max: Option<f64>,

    /// Core-region energy flattening model
    #[arg(long, value_enum, default_value = "none")]
    pub core: CoreModelArg,

    /// Use the site-charge column from the data file (zeroed otherwise)
    #[arg(long, default_value_t = false)]
    pub site_charge: bool,

    /// Energy offset added to every segregation energy (eV)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,

    /// Mirror the site data about its symmetry plane before construction
    #[arg(long, default_value_t = false)]
    pub mirror: bool,

    /// Optional potential file (CSV: x, phi) defining the full-grid frame
    #[arg(long)]
    pub potential: Option<PathBuf>,

    /// Number of uniform grid points (0 = grid from site coordinates)
    #[arg(long, default_value_t = 0)]
    pub grid_points: usize,

    /// Cell cross-section edge b (Å)
    #[arg(long, default_value_t = 1.0)]
    pub b: f64,

    /// Cell cross-section edge c (Å)
    #[arg(long, default_value_t = 1.0)]
    pub c: f64,

    /// Also compute per-species densities on their own sub-grids
    #[arg(long, default_value_t = false)]
    pub per_species: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: input file stem)
    #[arg(long)]
    pub title: Option<String>,
}

// ─────────────────────────────────────────────────────────────
// core-width 子命令
// ─────────────────────────────────────────────────────────────

/// core-width 子命令参数
#[derive(Args, Debug)]
pub struct CoreWidthArgs {
    /// Input: site data file or directory containing site data files
    pub input: PathBuf,

    /// Absolute temperature (K)
    #[arg(short = 't', long, default_value_t = 773.15)]
    pub temperature: f64,

    /// Core-region energy flattening model
    #[arg(long, value_enum, default_value = "single")]
    pub core: CoreModelArg,

    /// Lower coordinate bound for loaded sites (Å)
    #[arg(long, allow_negative_numbers = true)]
    pub x_min: Option<f64>,

    /// Upper coordinate bound for loaded sites (Å)
    #[arg(long, allow_negative_numbers = true)]
    pub x_max: Option<f64>,

    /// Use the site-charge column from the data file (zeroed otherwise)
    #[arg(long, default_value_t = false)]
    pub site_charge: bool,

    /// Glob pattern for input files (batch mode, e.g., "*.txt,gb_*.dat")
    #[arg(long, default_value = "*.txt,*.dat")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Write per-file widths to a CSV file (batch mode)
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}
