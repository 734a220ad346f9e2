//! # 剖面图表生成
//!
//! 使用 `plotters` 库绘制缺陷密度剖面。
//!
//! ## 功能
//! - 总密度曲线加各种类子网格密度曲线
//! - 图例与温度标注
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/analyze/profile.rs` 调用
//! - 使用 `profiles/set_of_sites.rs` 的 ProfileData 结构
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, SpaceChargeError};
use crate::profiles::ProfileData;

use plotters::prelude::*;
use std::path::Path;

/// 系列配色：总密度用深蓝，种类依次取后续颜色
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(0, 80, 180),
    RGBColor(200, 60, 40),
    RGBColor(30, 140, 70),
    RGBColor(150, 80, 180),
    RGBColor(200, 140, 20),
    RGBColor(60, 60, 60),
];

/// 生成缺陷密度剖面图
pub fn generate_profile_plot(
    profile: &ProfileData,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_profile_chart(&root, profile, title)?;
        root.present()
            .map_err(|e| SpaceChargeError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_profile_chart(&root, profile, title)?;
        root.present()
            .map_err(|e| SpaceChargeError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 绘制密度剖面的核心逻辑
fn draw_profile_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    profile: &ProfileData,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?;

    let x_min = profile.x.first().copied().unwrap_or(0.0);
    let x_max = profile.x.last().copied().unwrap_or(1.0);

    let mut density_max = profile.density.iter().copied().fold(0.0_f64, f64::max);
    for species in &profile.species {
        density_max = species.density.iter().copied().fold(density_max, f64::max);
    }
    if density_max <= 0.0 {
        density_max = 1.0;
    }

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0.0..density_max * 1.1)
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("x (Å)")
        .y_desc("Defect density (Å⁻³)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?;

    let total_color = SERIES_COLORS[0];
    chart
        .draw_series(LineSeries::new(
            profile.x.iter().zip(&profile.density).map(|(x, d)| (*x, *d)),
            total_color.stroke_width(2),
        ))
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?
        .label("total")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 18, y)], total_color.stroke_width(2))
        });

    for (i, species) in profile.species.iter().enumerate() {
        let color = SERIES_COLORS[(i + 1) % SERIES_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                species.x.iter().zip(&species.density).map(|(x, d)| (*x, *d)),
                color.stroke_width(2),
            ))
            .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?
            .label(species.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", 14))
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?;

    let temperature_text = format!("T = {:.1} K", profile.temperature);
    chart
        .draw_series(std::iter::once(Text::new(
            temperature_text,
            (x_min + (x_max - x_min) * 0.02, density_max * 1.05),
            ("sans-serif", 14).into_font().color(&BLACK),
        )))
        .map_err(|e| SpaceChargeError::Other(format!("{:?}", e)))?;

    Ok(())
}
