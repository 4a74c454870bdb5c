// src/report.rs
//
// Report artifacts for one evaluation run: a single-row summary CSV, the
// per-track visibility table, and two bar-chart PNGs rendered directly with
// the image crate (no plotting toolkit; bars and axes are plain pixel fills).

use crate::evaluation::EvaluationReport;
use crate::types::ReportConfig;
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const SUMMARY_BAR_COLORS: [[u8; 3]; 4] = [
    [31, 119, 180],  // possession: blue
    [44, 160, 44],   // tracking: green
    [148, 103, 189], // team: purple
    [23, 190, 207],  // coverage: teal
];
const VISIBILITY_BAR_COLOR: [u8; 3] = [255, 165, 0];
const AXIS_COLOR: [u8; 3] = [40, 40, 40];

/// Percent axes run to 110 so a full-scale bar never touches the border.
const AXIS_MAX_PERCENT: f64 = 110.0;

pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn write(&self, report: &EvaluationReport) -> Result<()> {
        let dir = Path::new(&self.config.output_dir);
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

        self.write_summary_csv(report, &dir.join(&self.config.summary_csv))?;
        self.write_visibility_csv(report, &dir.join(&self.config.visibility_csv))?;

        let (labels, values) = summary_bars(report);
        render_bar_chart(
            &values,
            &SUMMARY_BAR_COLORS[..labels.len()],
            600,
            400,
            &dir.join(&self.config.summary_chart),
        )?;

        let visibility: Vec<f64> = report.visibility.values().copied().collect();
        let colors = vec![VISIBILITY_BAR_COLOR; visibility.len()];
        render_bar_chart(
            &visibility,
            &colors,
            (120 + 60 * visibility.len().max(1)) as u32,
            400,
            &dir.join(&self.config.visibility_chart),
        )?;

        info!(dir = %dir.display(), "report artifacts written");
        Ok(())
    }

    fn write_summary_csv(&self, report: &EvaluationReport, path: &PathBuf) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create summary CSV: {}", path.display()))?;

        let (labels, values) = summary_bars(report);
        writer.write_record(&labels)?;
        writer.write_record(values.iter().map(|v| format!("{v:.2}")))?;
        writer.flush()?;
        Ok(())
    }

    /// Visibility table, most-visible tracks first.
    fn write_visibility_csv(&self, report: &EvaluationReport, path: &PathBuf) -> Result<()> {
        let mut rows: Vec<(u32, f64)> = report
            .visibility
            .iter()
            .map(|(&id, &visibility)| (id, visibility))
            .collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create visibility CSV: {}", path.display()))?;
        writer.write_record(["Player ID", "Visibility (%)"])?;
        for (id, visibility) in rows {
            writer.write_record([id.to_string(), format!("{visibility:.1}")])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn summary_bars(report: &EvaluationReport) -> (Vec<String>, Vec<f64>) {
    let mut labels = vec![
        "Ball Possession Accuracy (%)".to_string(),
        "Player Tracking Consistency (%)".to_string(),
        "Team Assignment Accuracy (%)".to_string(),
    ];
    let mut values = vec![
        report.summary.possession_accuracy,
        report.summary.tracking_consistency,
        report.summary.team_assignment_accuracy,
    ];
    if let Some(coverage) = report.summary.possession_coverage {
        labels.push("Possession Coverage (%)".to_string());
        values.push(coverage);
    }
    (labels, values)
}

fn render_bar_chart(
    values: &[f64],
    colors: &[[u8; 3]],
    width: u32,
    height: u32,
    path: &PathBuf,
) -> Result<()> {
    let mut chart = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    let margin = 40u32;
    let plot_width = width.saturating_sub(margin * 2).max(1);
    let plot_height = height.saturating_sub(margin * 2).max(1);
    let baseline = height - margin;

    // X axis.
    fill_rect(&mut chart, margin, baseline, width - margin, baseline + 1, AXIS_COLOR);
    // Y axis.
    fill_rect(&mut chart, margin - 1, margin, margin, baseline, AXIS_COLOR);

    if !values.is_empty() {
        let slot = plot_width as f64 / values.len() as f64;
        let bar_width = (slot * 0.6).max(1.0);

        for (i, &value) in values.iter().enumerate() {
            let clamped = value.clamp(0.0, AXIS_MAX_PERCENT);
            let bar_height = (clamped / AXIS_MAX_PERCENT * plot_height as f64).round() as u32;
            let x0 = margin + (slot * i as f64 + slot * 0.2) as u32;
            let x1 = x0 + bar_width as u32;
            let y0 = baseline.saturating_sub(bar_height);
            let color = colors.get(i).copied().unwrap_or([100, 100, 100]);
            fill_rect(&mut chart, x0, y0, x1, baseline, color);
        }
    }

    chart
        .save(path)
        .with_context(|| format!("Failed to write chart: {}", path.display()))?;
    Ok(())
}

fn fill_rect(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
    let color = Rgb(color);
    for x in x0..x1.min(image.width()) {
        for y in y0..y1.min(image.height()) {
            image.put_pixel(x, y, color);
        }
    }
}
