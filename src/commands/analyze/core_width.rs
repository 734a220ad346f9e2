//! # core-width 子命令实现
//!
//! 测量展平后芯区的空间宽度。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 汇总表格与可选 CSV 导出
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 CoreWidthArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `profiles/core_width.rs` 进行计算

use crate::batch::{BatchRunner, FileCollector, FileOutcome};
use crate::cli::analyze::CoreWidthArgs;
use crate::error::{Result, SpaceChargeError};
use crate::parsers::CoreModel;
use crate::profiles::core_width_analysis;
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 执行 core-width 分析
pub fn execute(args: CoreWidthArgs) -> Result<()> {
    output::print_header("Core Width Analysis");

    let limits = (
        args.x_min.unwrap_or(f64::NEG_INFINITY),
        args.x_max.unwrap_or(f64::INFINITY),
    );
    let core = args.core.to_core_model();

    output::print_info(&format!(
        "Core model: {}, T = {:.2} K",
        args.core, args.temperature
    ));

    if args.input.is_file() {
        let width = core_width_analysis(
            &args.input,
            limits,
            args.site_charge,
            core,
            args.temperature,
        )?;
        output::print_success(&format!(
            "Core width of '{}': {:.4} Å",
            args.input.display(),
            width
        ));
        Ok(())
    } else if args.input.is_dir() {
        execute_batch(&args, limits, core)
    } else {
        Err(SpaceChargeError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 批量处理模式
fn execute_batch(args: &CoreWidthArgs, limits: (f64, f64), core: CoreModel) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let collector = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive);
    let files = collector.collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} site data files", files.len()));

    let site_charge = args.site_charge;
    let temperature = args.temperature;
    let runner = BatchRunner::new(args.jobs);
    let report = runner.run(files, |path| {
        match core_width_analysis(path, limits, site_charge, core, temperature) {
            Ok(width) => FileOutcome::Success(width),
            Err(e) => FileOutcome::Failed(e.to_string()),
        }
    });

    print_width_table(&report.entries);

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} failed",
        report.success_count(),
        report.failed_count()
    ));

    let failures = report.failures();
    if !failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path.display(), err));
        }
        if failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", failures.len() - 10));
        }
    }

    if let Some(csv_path) = &args.output_csv {
        write_widths_csv(&report.entries, csv_path)?;
        output::print_success(&format!("Widths saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// 打印逐文件宽度表格
fn print_width_table(entries: &[(std::path::PathBuf, FileOutcome<f64>)]) {
    #[derive(Tabled)]
    struct WidthRow {
        #[tabled(rename = "File")]
        file: String,
        #[tabled(rename = "Core width (Å)")]
        width: String,
    }

    let rows: Vec<WidthRow> = entries
        .iter()
        .filter_map(|(path, outcome)| match outcome {
            FileOutcome::Success(width) => Some(WidthRow {
                file: path.display().to_string(),
                width: format!("{:.4}", width),
            }),
            _ => None,
        })
        .collect();

    if !rows.is_empty() {
        let table = Table::new(&rows);
        println!("{}", table);
    }
}

/// 导出逐文件宽度为 CSV
fn write_widths_csv(entries: &[(std::path::PathBuf, FileOutcome<f64>)], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["file", "core_width"])?;
    for (file, outcome) in entries {
        if let FileOutcome::Success(width) = outcome {
            wtr.write_record(&[file.display().to_string(), format!("{:.6e}", width)])?;
        }
    }
    wtr.flush().map_err(|e| SpaceChargeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
