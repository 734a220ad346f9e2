//! # profile 子命令实现
//!
//! 从站点数据文件计算网格化空间电荷剖面。
//!
//! ## 功能
//! - 从站点坐标或均匀划分构建计算网格
//! - 可选读入外部势文件作为完整网格坐标系
//! - 网格能量、占据概率、缺陷密度，按种类的子网格密度（rayon）
//! - 输出图像 (PNG/SVG) 或数据文件 (CSV/XY)
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 ProfileArgs
//! - 使用 `profiles/` 模块进行计算、导出和绘图
//! - 使用 `models/` 的网格构建和插值

use crate::cli::analyze::{parse_species, ProfileArgs, ProfileOutputFormat};
use crate::error::{Result, SpaceChargeError};
use crate::models::{phi_at_x, DefectSpecies, Grid};
use crate::profiles::{export, plot, ProfileData, SetOfSites, SpeciesProfile};
use crate::utils::output;

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 执行 profile 分析
pub fn execute(args: ProfileArgs) -> Result<()> {
    output::print_header("Space-Charge Profile Calculation");

    if !args.input.is_file() {
        return Err(SpaceChargeError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    // 缺陷种类表
    if args.species.is_empty() {
        return Err(SpaceChargeError::InvalidArgument(
            "at least one --species definition is required, e.g. --species Vo:2:0.0307"
                .to_string(),
        ));
    }
    let mut defect_species: HashMap<String, DefectSpecies> = HashMap::new();
    for definition in &args.species {
        let species = parse_species(definition).map_err(SpaceChargeError::InvalidArgument)?;
        defect_species.insert(species.label.clone(), species);
    }

    let limits = (
        args.x_min.unwrap_or(f64::NEG_INFINITY),
        args.x_max.unwrap_or(f64::INFINITY),
    );
    let core = args.core.to_core_model();

    output::print_info(&format!(
        "T = {:.2} K, core model: {}, site charge: {}",
        args.temperature, args.core, args.site_charge
    ));

    // 站点集合
    let set = if args.mirror {
        SetOfSites::mirrored_from_input_data(
            &args.input,
            limits,
            &defect_species,
            args.site_charge,
            core,
            args.temperature,
            args.offset,
        )?
    } else {
        SetOfSites::from_input_data(
            &args.input,
            limits,
            &defect_species,
            args.site_charge,
            core,
            args.temperature,
            args.offset,
        )?
    };
    output::print_success(&format!(
        "Loaded {} sites from '{}'",
        set.len(),
        args.input.display()
    ));

    // 计算网格
    let coordinates = unique_coordinates(set.iter().map(|s| s.x));
    let grid = if args.grid_points >= 2 {
        let first = coordinates.first().copied().unwrap_or(0.0);
        let last = coordinates.last().copied().unwrap_or(1.0);
        Grid::uniform(first, last, args.grid_points, args.b, args.c)?
    } else {
        Grid::from_coordinates(coordinates, args.b, args.c)?
    };
    output::print_info(&format!("Calculation grid: {} points", grid.len()));

    // 静电势：外部文件定义完整网格坐标系，缺省为零势
    let (full_grid, phi_full) = match &args.potential {
        Some(path) => {
            let (full_grid, phi) = read_potential(path, args.b, args.c)?;
            output::print_info(&format!(
                "Potential frame: {} points from '{}'",
                full_grid.len(),
                path.display()
            ));
            (full_grid, phi)
        }
        None => (grid.clone(), vec![0.0; grid.len()]),
    };

    // 势重采样到计算网格
    let phi_on_grid: Vec<f64> = grid
        .x
        .iter()
        .map(|&x| phi_at_x(&phi_full, &full_grid.x, x))
        .collect();

    let energies = set.calculate_energies_on_grid(&grid, &phi_on_grid)?;
    let probabilities = set.calculate_probabilities(&grid, &phi_on_grid, args.temperature)?;
    let density = set.calculate_defect_density(&grid, &phi_on_grid, args.temperature)?;

    let species = if args.per_species {
        compute_species_profiles(
            &set,
            &full_grid,
            &phi_full,
            args.b,
            args.c,
            args.temperature,
        )?
    } else {
        Vec::new()
    };

    print_species_table(&set);

    let profile = ProfileData {
        x: grid.x.clone(),
        phi: phi_on_grid,
        energies,
        probabilities,
        density,
        species,
        temperature: args.temperature,
    };

    // 输出
    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));

    match format {
        ProfileOutputFormat::Png | ProfileOutputFormat::Svg => {
            let title = args.title.clone().unwrap_or_else(|| {
                args.input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("profile")
                    .to_string()
            });
            plot::generate_profile_plot(
                &profile,
                &args.output,
                &title,
                args.width,
                args.height,
                format == ProfileOutputFormat::Svg,
            )?;
        }
        ProfileOutputFormat::Csv => {
            export::to_csv(&profile, &args.output)?;
            for species_profile in &profile.species {
                let path = species_output_path(&args.output, &species_profile.label);
                export::species_to_csv(species_profile, &path)?;
                output::print_info(&format!(
                    "Species '{}' density saved to '{}'",
                    species_profile.label,
                    path.display()
                ));
            }
        }
        ProfileOutputFormat::Xy => {
            export::to_xy(&profile, &args.output)?;
        }
    }

    output::print_success(&format!("Profile saved to '{}'", args.output.display()));
    Ok(())
}

/// 按种类在各自子网格上并行计算缺陷密度
///
/// 每个种类写入自己新分配的数组，结果与并行顺序无关。
fn compute_species_profiles(
    set: &SetOfSites,
    full_grid: &Grid,
    phi: &[f64],
    b: f64,
    c: f64,
    temperature: f64,
) -> Result<Vec<SpeciesProfile>> {
    let labels = set.labels();

    let profiles: Vec<Option<SpeciesProfile>> = labels
        .par_iter()
        .map(|label| -> Result<Option<SpeciesProfile>> {
            let coordinates = unique_coordinates(set.coordinates(label).into_iter());
            if coordinates.len() < 2 {
                return Ok(None);
            }
            let sub_grid = Grid::from_coordinates(coordinates, b, c)?;
            let subset = SetOfSites::new(set.subset(label).into_iter().cloned().collect());
            let density =
                subset.subgrid_calculate_defect_density(&sub_grid, full_grid, phi, temperature)?;
            Ok(Some(SpeciesProfile {
                label: label.clone(),
                x: sub_grid.x,
                density,
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut kept = Vec::new();
    for (label, profile) in labels.into_iter().zip(profiles) {
        match profile {
            Some(profile) => kept.push(profile),
            None => output::print_warning(&format!(
                "Species '{}' has fewer than two distinct coordinates, skipping its sub-grid",
                label
            )),
        }
    }
    Ok(kept)
}

/// 读入势文件：CSV 两列 (x, phi)，首行允许是表头
fn read_potential(path: &Path, b: f64, c: f64) -> Result<(Grid, Vec<f64>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut points: Vec<(f64, f64)> = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() < 2 {
            return Err(SpaceChargeError::ParseError {
                path: path.display().to_string(),
                line: i + 1,
                reason: format!("expected two columns (x, phi), found {}", record.len()),
            });
        }
        match (record[0].parse::<f64>(), record[1].parse::<f64>()) {
            (Ok(x), Ok(phi)) => points.push((x, phi)),
            // 首行解析失败按表头跳过
            _ if i == 0 => continue,
            _ => {
                return Err(SpaceChargeError::ParseError {
                    path: path.display().to_string(),
                    line: i + 1,
                    reason: format!("invalid numeric row: {} , {}", &record[0], &record[1]),
                })
            }
        }
    }

    if points.len() < 2 {
        return Err(SpaceChargeError::ParseError {
            path: path.display().to_string(),
            line: 0,
            reason: "potential file must contain at least two data rows".to_string(),
        });
    }

    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (x, phi): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
    let grid = Grid::from_coordinates(x, b, c)?;
    Ok((grid, phi))
}

/// 坐标去重并升序排序
fn unique_coordinates(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut coordinates: Vec<f64> = values.collect();
    coordinates.sort_by(|a, b| a.total_cmp(b));
    coordinates.dedup();
    coordinates
}

/// 打印种类汇总表格
fn print_species_table(set: &SetOfSites) {
    #[derive(Tabled)]
    struct SpeciesRow {
        #[tabled(rename = "Species")]
        label: String,
        #[tabled(rename = "Sites")]
        count: String,
        #[tabled(rename = "q")]
        valence: String,
        #[tabled(rename = "x min (Å)")]
        x_min: String,
        #[tabled(rename = "x max (Å)")]
        x_max: String,
        #[tabled(rename = "E min (eV)")]
        e_min: String,
        #[tabled(rename = "E max (eV)")]
        e_max: String,
    }

    let rows: Vec<SpeciesRow> = set
        .labels()
        .into_iter()
        .map(|label| {
            let subset = set.subset(&label);
            let xs: Vec<f64> = subset.iter().map(|s| s.x).collect();
            let energies: Vec<f64> = subset
                .iter()
                .flat_map(|s| s.defect_energies.iter().copied())
                .collect();
            SpeciesRow {
                count: subset.len().to_string(),
                valence: format!("{:+.1}", subset[0].valence),
                x_min: format!("{:.4}", xs.iter().copied().fold(f64::INFINITY, f64::min)),
                x_max: format!(
                    "{:.4}",
                    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                ),
                e_min: format!(
                    "{:.4}",
                    energies.iter().copied().fold(f64::INFINITY, f64::min)
                ),
                e_max: format!(
                    "{:.4}",
                    energies.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                ),
                label,
            }
        })
        .collect();

    if !rows.is_empty() {
        output::print_header("Site Summary");
        let table = Table::new(&rows);
        println!("{}", table);
    }
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> ProfileOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => ProfileOutputFormat::Svg,
        Some("csv") => ProfileOutputFormat::Csv,
        Some("xy") | Some("dat") | Some("txt") => ProfileOutputFormat::Xy,
        _ => ProfileOutputFormat::Png,
    }
}

/// 种类密度 CSV 的输出路径：主文件名加种类标签后缀
fn species_output_path(output: &Path, label: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");
    output.with_file_name(format!("{}_{}.csv", stem, label))
}
