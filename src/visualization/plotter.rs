use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

use super::HeatmapData;

#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Plot error: {0}")]
    PlotError(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for VisualizationError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        VisualizationError::PlotError(err.to_string())
    }
}

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

const CELL_HEIGHT: u32 = 36;
const ROW_LABEL_WIDTH: u32 = 120;
const COLUMN_LABEL_HEIGHT: u32 = 80;
const COLOR_BAR_WIDTH: u32 = 110;

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> RGBColor {
    RGBColor(
        (a.0 + (b.0 - a.0) * t).round() as u8,
        (a.1 + (b.1 - a.1) * t).round() as u8,
        (a.2 + (b.2 - a.2) * t).round() as u8,
    )
}

/// Diverging blue-grey-red palette. `t` is clamped to [-1, 1]; 0 is neutral.
pub fn coolwarm(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(-1.0, 1.0) } else { 0.0 };
    if t < 0.0 {
        lerp(NEUTRAL, COOL, -t)
    } else {
        lerp(NEUTRAL, WARM, t)
    }
}

/// Black or white, whichever reads better on `background`.
fn annotation_color(background: &RGBColor) -> RGBColor {
    let luma = 0.299 * background.0 as f64 + 0.587 * background.1 as f64 + 0.114 * background.2 as f64;
    if luma < 128.0 {
        WHITE
    } else {
        BLACK
    }
}

fn centered() -> Pos {
    Pos::new(HPos::Center, VPos::Center)
}

/// Heatmap generator
pub struct Visualizer {
    /// Output directory for visualizations
    output_dir: PathBuf,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, VisualizationError> {
        let output_path = output_dir.as_ref().to_path_buf();

        if !output_path.exists() {
            fs::create_dir_all(&output_path)?;
        }

        Ok(Visualizer {
            output_dir: output_path,
        })
    }

    /// Renders `data` as an annotated SVG heatmap and returns its path.
    pub fn render_heatmap(
        &self,
        data: &HeatmapData,
        file_name: &str,
    ) -> Result<PathBuf, VisualizationError> {
        let output_file = self.output_dir.join(file_name);

        let n_rows = data.row_labels.len() as u32;
        let width = 1000;
        let height = (COLUMN_LABEL_HEIGHT + 120 + n_rows * CELL_HEIGHT).max(400);

        {
            let root = SVGBackend::new(&output_file, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            if data.is_empty() {
                draw_empty(&root, &data.title, (width, height))?;
            } else {
                let (main, bar) = root.split_horizontally(width - COLOR_BAR_WIDTH);
                draw_cells(&root, &main, data)?;
                draw_color_bar(&bar, data.color_range())?;
            }

            root.present()?;
        }
        info!("Heatmap written to {}", output_file.display());
        Ok(output_file)
    }
}

fn draw_empty<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    (width, height): (u32, u32),
) -> Result<(), VisualizationError>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(title, ("sans-serif", 24))?;
    area.draw(&Text::new(
        "No correlations passed the significance threshold",
        (width as i32 / 2, height as i32 / 2 - 40),
        ("sans-serif", 20).into_font().color(&BLACK).pos(centered()),
    ))?;
    Ok(())
}

fn draw_cells<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    data: &HeatmapData,
) -> Result<(), VisualizationError>
where
    DB::ErrorType: 'static,
{
    let (n_rows, n_cols) = data.values.dim();
    let vmax = data.color_range();
    debug!("Heatmap {}x{}, color range +/-{:.3}", n_rows, n_cols, vmax);

    let mut chart = ChartBuilder::on(area)
        .caption(&data.title, ("sans-serif", 24))
        .margin_top(10)
        .margin_right(10)
        .margin_left(ROW_LABEL_WIDTH)
        .margin_bottom(COLUMN_LABEL_HEIGHT)
        .build_cartesian_2d(0.0..n_cols as f64, 0.0..n_rows as f64)?;

    // first data row at the top
    let y_of = |row: usize| (n_rows - 1 - row) as f64;

    let mut cells = Vec::with_capacity(n_rows * n_cols);
    for ((row, col), &value) in data.values.indexed_iter() {
        cells.push((row, col, value));
    }

    chart.draw_series(cells.iter().map(|&(row, col, value)| {
        let fill = if value.is_finite() {
            coolwarm(value / vmax).filled()
        } else {
            WHITE.filled()
        };
        let (x, y) = (col as f64, y_of(row));
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], fill)
    }))?;

    chart.draw_series(cells.iter().map(|&(row, col, _)| {
        let (x, y) = (col as f64, y_of(row));
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], WHITE.stroke_width(1))
    }))?;

    chart.draw_series(
        cells
            .iter()
            .filter(|(_, _, value)| value.is_finite())
            .map(|&(row, col, value)| {
                let color = annotation_color(&coolwarm(value / vmax));
                Text::new(
                    format!("{:.2}", value),
                    (col as f64 + 0.5, y_of(row) + 0.5),
                    ("sans-serif", 14).into_font().color(&color).pos(centered()),
                )
            }),
    )?;

    // Labels sit outside the plotting area, so they are drawn on the root
    // area at the pixel positions of the cell centers.
    for (row, label) in data.row_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(0.0, y_of(row) + 0.5));
        root.draw(&Text::new(
            label.clone(),
            (px - 8, py),
            ("sans-serif", 14)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Center)),
        ))?;
    }
    for (col, label) in data.column_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(col as f64 + 0.5, 0.0));
        root.draw(&Text::new(
            label.clone(),
            (px, py + 10),
            ("sans-serif", 13)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;
    }

    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    vmax: f64,
) -> Result<(), VisualizationError>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin_top(50)
        .margin_bottom(COLUMN_LABEL_HEIGHT)
        .margin_right(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, -vmax..vmax)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v| format!("{:.2}", v))
        .draw()?;

    let steps = 100;
    let step = 2.0 * vmax / steps as f64;
    chart.draw_series((0..steps).map(|k| {
        let lo = -vmax + k as f64 * step;
        let mid = lo + step / 2.0;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], coolwarm(mid / vmax).filled())
    }))?;

    Ok(())
}
