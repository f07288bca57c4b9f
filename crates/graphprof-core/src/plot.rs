//! Plot rendering capability.
//!
//! The profiling core only knows the [`PlotRenderer`] trait: give it data
//! and a theme, get back a self-contained SVG string for embedding. The
//! default implementation draws with plotters' SVG backend.

use crate::{Error, Result};
use plotters::element::Pie;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Report color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    Light,
    Dark,
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Style::Light),
            "dark" => Ok(Style::Dark),
            other => Err(Error::UnknownConfigKey(format!("style: {other}"))),
        }
    }
}

/// Default accent colors, RGB in `[0, 1]`.
pub mod colors {
    pub const GREEN: (f64, f64, f64) = (0.003, 0.474, 0.435);
    pub const RED: (f64, f64, f64) = (0.501, 0.0, 0.0);
}

/// Visual theme for all plots of one report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub style: Style,
    /// Accent color, RGB in `[0, 1]`.
    pub color: (f64, f64, f64),
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            style: Style::Light,
            color: colors::GREEN,
        }
    }
}

impl Theme {
    pub fn new(style: Style, color: (f64, f64, f64)) -> Self {
        Theme { style, color }
    }

    fn rgb(c: (f64, f64, f64)) -> RGBColor {
        RGBColor(
            (c.0.clamp(0.0, 1.0) * 255.0) as u8,
            (c.1.clamp(0.0, 1.0) * 255.0) as u8,
            (c.2.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }

    pub(crate) fn accent(&self) -> RGBColor {
        Self::rgb(self.color)
    }

    pub(crate) fn background(&self) -> RGBColor {
        match self.style {
            Style::Light => RGBColor(255, 255, 255),
            Style::Dark => RGBColor(30, 30, 30),
        }
    }
}

/// The views rendered per measure. Partition measures additionally get the
/// pie view; correlation pairs get scatter plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureView {
    Distribution,
    Ranked,
    Pie,
}

impl MeasureView {
    /// Image-slot index within a measure.
    pub fn slot(self) -> usize {
        match self {
            MeasureView::Distribution => 0,
            MeasureView::Ranked => 1,
            MeasureView::Pie => 2,
        }
    }
}

/// Owned plot input, safe to move into a pool job.
#[derive(Debug, Clone)]
pub enum PlotData {
    Histogram {
        values: Vec<f64>,
        label: String,
        title: String,
    },
    Ranked {
        sorted: Vec<f64>,
        label: String,
        title: String,
    },
    Pie {
        sizes: Vec<f64>,
        title: String,
    },
    Scatter {
        xs: Vec<f64>,
        ys: Vec<f64>,
        label_x: String,
        label_y: String,
        title: String,
    },
}

/// Renders one plot to an image blob (SVG markup).
pub trait PlotRenderer: Send + Sync {
    fn render(&self, data: &PlotData, theme: &Theme) -> Result<String>;
}

/// Default renderer: plotters with the SVG string backend.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer {
            width: 480,
            height: 320,
        }
    }
}

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

impl SvgRenderer {
    fn draw_histogram(
        &self,
        svg: &mut String,
        values: &[f64],
        label: &str,
        title: &str,
        theme: &Theme,
    ) -> DrawResult {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let root = SVGBackend::with_string(svg, (self.width, self.height)).into_drawing_area();
        root.fill(&theme.background())?;
        if finite.is_empty() {
            root.present()?;
            return Ok(());
        }

        let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = if max > min { max - min } else { 1.0 };
        let bins = ((finite.len() as f64).sqrt().ceil() as usize).clamp(1, 50);
        let mut counts = vec![0usize; bins];
        for &v in &finite {
            let i = (((v - min) / span) * bins as f64) as usize;
            counts[i.min(bins - 1)] += 1;
        }
        let peak = counts.iter().copied().max().unwrap_or(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 15))
            .margin(8)
            .x_label_area_size(28)
            .y_label_area_size(40)
            .build_cartesian_2d(min..(min + span), 0.0..peak * 1.05)?;
        chart
            .configure_mesh()
            .x_desc(label)
            .y_desc("Count")
            .draw()?;

        let bin_width = span / bins as f64;
        chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, c as f64)],
                theme.accent().filled(),
            )
        }))?;
        root.present()?;
        Ok(())
    }

    fn draw_ranked(
        &self,
        svg: &mut String,
        sorted: &[f64],
        label: &str,
        title: &str,
        theme: &Theme,
    ) -> DrawResult {
        let root = SVGBackend::with_string(svg, (self.width, self.height)).into_drawing_area();
        root.fill(&theme.background())?;
        if sorted.is_empty() {
            root.present()?;
            return Ok(());
        }

        let min = sorted.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sorted.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = if max > min { max - min } else { 1.0 };
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 15))
            .margin(8)
            .x_label_area_size(28)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..sorted.len() as f64, min..(min + span * 1.05))?;
        chart.configure_mesh().x_desc("Rank").y_desc(label).draw()?;

        chart.draw_series(LineSeries::new(
            sorted.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            theme.accent().stroke_width(2),
        ))?;
        root.present()?;
        Ok(())
    }

    fn draw_pie(&self, svg: &mut String, sizes: &[f64], title: &str, theme: &Theme) -> DrawResult {
        let root = SVGBackend::with_string(svg, (self.width, self.height)).into_drawing_area();
        root.fill(&theme.background())?;
        let positive: Vec<f64> = sizes.iter().copied().filter(|&s| s > 0.0).collect();
        if positive.is_empty() {
            root.present()?;
            return Ok(());
        }

        let accent = theme.accent();
        let shades: Vec<RGBColor> = (0..positive.len())
            .map(|i| {
                let f = 0.35 + 0.65 * (i as f64 / positive.len().max(1) as f64);
                RGBColor(
                    (accent.0 as f64 * f) as u8,
                    (accent.1 as f64 * f) as u8,
                    (accent.2 as f64 * f) as u8,
                )
            })
            .collect();
        let labels: Vec<String> = positive.iter().map(|s| format!("{s:.0}")).collect();

        let root = root.titled(title, ("sans-serif", 15))?;
        let center = (self.width as i32 / 2, self.height as i32 / 2 + 8);
        let radius = (self.width.min(self.height) as f64) / 2.0 - 30.0;
        let pie = Pie::new(&center, &radius, &positive, &shades, &labels);
        root.draw(&pie)?;
        root.present()?;
        Ok(())
    }

    fn draw_scatter(
        &self,
        svg: &mut String,
        xs: &[f64],
        ys: &[f64],
        label_x: &str,
        label_y: &str,
        title: &str,
        theme: &Theme,
    ) -> DrawResult {
        let root = SVGBackend::with_string(svg, (self.width, self.height)).into_drawing_area();
        root.fill(&theme.background())?;
        let points: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
            .collect();
        if points.is_empty() {
            root.present()?;
            return Ok(());
        }

        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };
        let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 15))
            .margin(8)
            .x_label_area_size(28)
            .y_label_area_size(40)
            .build_cartesian_2d(x_min..(x_min + x_span), y_min..(y_min + y_span))?;
        chart.configure_mesh().x_desc(label_x).y_desc(label_y).draw()?;

        let accent = theme.accent();
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 2, accent.filled())),
        )?;
        root.present()?;
        Ok(())
    }
}

impl PlotRenderer for SvgRenderer {
    fn render(&self, data: &PlotData, theme: &Theme) -> Result<String> {
        let mut svg = String::new();
        let drawn = match data {
            PlotData::Histogram {
                values,
                label,
                title,
            } => self.draw_histogram(&mut svg, values, label, title, theme),
            PlotData::Ranked {
                sorted,
                label,
                title,
            } => self.draw_ranked(&mut svg, sorted, label, title, theme),
            PlotData::Pie { sizes, title } => self.draw_pie(&mut svg, sizes, title, theme),
            PlotData::Scatter {
                xs,
                ys,
                label_x,
                label_y,
                title,
            } => self.draw_scatter(&mut svg, xs, ys, label_x, label_y, title, theme),
        };
        drawn.map_err(|e| Error::PostProcessing(format!("plot rendering: {e}")))?;
        Ok(svg)
    }
}
