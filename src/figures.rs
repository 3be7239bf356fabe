//! The standard comparison and per-variant figures, rendered with the
//! bitmap backend so runs on headless machines need no display stack.

use std::path::{Path, PathBuf};

use plotters::coord::combinators::LogCoord;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use thiserror::Error;

/// A figure that could not be rendered.
#[derive(Debug, Error)]
#[error("failed to render {path}: {message}")]
pub struct FigureError {
    pub path: PathBuf,
    pub message: String,
}

/// The six Kepler-element series of one run, already in plot units.
#[derive(Debug, Clone)]
pub struct KeplerSeries {
    pub sma_km: Vec<f64>,
    pub eccentricity: Vec<f64>,
    pub inclination_deg: Vec<f64>,
    pub argp_deg: Vec<f64>,
    pub raan_deg: Vec<f64>,
    pub true_anomaly_deg: Vec<f64>,
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn caption_font() -> FontDesc<'static> {
    FontDesc::new(select_font_family(), 22.0, FontStyle::Bold)
}

fn label_font() -> FontDesc<'static> {
    FontDesc::new(select_font_family(), 16.0, FontStyle::Normal)
}

fn render_error<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> FigureError + '_ {
    move |source| FigureError {
        path: path.to_path_buf(),
        message: source.to_string(),
    }
}

fn ensure_parent(path: &Path) -> Result<(), FigureError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(render_error(path))?;
        }
    }
    Ok(())
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for v in values.filter(|v| v.is_finite()) {
        bounds = Some(match bounds {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    bounds
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        let pad = (hi - lo) * 0.02;
        (lo - pad, hi + pad)
    }
}

fn bin_counts(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let width = (hi - lo) / bins as f64;
    for &v in values {
        if !v.is_finite() || width <= 0.0 {
            continue;
        }
        let index = (((v - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

/// Overlaid log-frequency histogram of state and dependent-variable
/// relative differences, after outlier filtering.
pub fn relative_difference_histogram(
    path: &Path,
    title: &str,
    state_differences: &[f64],
    dependent_differences: &[f64],
    bins: usize,
) -> Result<(), FigureError> {
    ensure_parent(path)?;
    let err = render_error(path);

    let (lo, hi) = span(
        state_differences
            .iter()
            .chain(dependent_differences)
            .copied(),
    )
    .unwrap_or((-1.0, 1.0));
    let (lo, hi) = padded(lo, hi);
    let bins = bins.max(1);

    let state_counts = bin_counts(state_differences, lo, hi, bins);
    let dependent_counts = bin_counts(dependent_differences, lo, hi, bins);
    let peak = state_counts
        .iter()
        .chain(&dependent_counts)
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .caption(title, caption_font())
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, (0.8..peak * 2.0).log_scale())
        .map_err(&err)?;
    chart
        .configure_mesh()
        .x_desc("Relative difference [-]")
        .y_desc("Frequency")
        .label_style(label_font())
        .draw()
        .map_err(&err)?;

    let width = (hi - lo) / bins as f64;
    draw_count_bars(&mut chart, &dependent_counts, lo, width, BLUE.mix(0.5)).map_err(&err)?;
    draw_count_bars(&mut chart, &state_counts, lo, width, RED.mix(0.5)).map_err(&err)?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(lo, 0.8), (lo, 0.8)],
            BLUE.mix(0.5).filled(),
        )))
        .map_err(&err)?
        .label("Dependent variables")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BLUE.mix(0.5).filled()));
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(lo, 0.8), (lo, 0.8)],
            RED.mix(0.5).filled(),
        )))
        .map_err(&err)?
        .label("State")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], RED.mix(0.5).filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()
        .map_err(&err)?;

    root.present().map_err(&err)
}

fn draw_count_bars<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedCoordf64, LogCoord<f64>>>,
    counts: &[usize],
    lo: f64,
    width: f64,
    color: RGBAColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    chart.draw_series(
        counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(i, &count)| {
                let x0 = lo + i as f64 * width;
                Rectangle::new([(x0, 0.8), (x0 + width, count as f64)], color.filled())
            }),
    )?;
    Ok(())
}

/// Total acceleration norm over the course of the run.
pub fn total_acceleration_series(
    path: &Path,
    title: &str,
    time_hours: &[f64],
    acceleration_m_s2: &[f64],
) -> Result<(), FigureError> {
    ensure_parent(path)?;
    let err = render_error(path);

    let (t_lo, t_hi) = span(time_hours.iter().copied()).unwrap_or((0.0, 1.0));
    let (a_lo, a_hi) = span(acceleration_m_s2.iter().copied()).unwrap_or((0.0, 1.0));
    let (a_lo, a_hi) = padded(a_lo, a_hi);

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .caption(title, caption_font())
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(t_lo..t_hi, a_lo..a_hi)
        .map_err(&err)?;
    chart
        .configure_mesh()
        .x_desc("Time [hr]")
        .y_desc("Total acceleration [m/s^2]")
        .label_style(label_font())
        .draw()
        .map_err(&err)?;
    chart
        .draw_series(LineSeries::new(
            time_hours
                .iter()
                .zip(acceleration_m_s2)
                .map(|(&t, &a)| (t, a)),
            &BLUE,
        ))
        .map_err(&err)?;
    root.present().map_err(&err)
}

/// Latitude/longitude scatter of the first hours of the run.
pub fn ground_track(
    path: &Path,
    title: &str,
    longitude_deg: &[f64],
    latitude_deg: &[f64],
) -> Result<(), FigureError> {
    ensure_parent(path)?;
    let err = render_error(path);

    let root = BitMapBackend::new(path, (900, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .caption(title, caption_font())
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-180.0..180.0, -90.0..90.0)
        .map_err(&err)?;
    chart
        .configure_mesh()
        .x_desc("Longitude [deg]")
        .y_desc("Latitude [deg]")
        .y_labels(5)
        .label_style(label_font())
        .draw()
        .map_err(&err)?;
    chart
        .draw_series(
            longitude_deg
                .iter()
                .zip(latitude_deg)
                .map(|(&lon, &lat)| Circle::new((lon, lat), 1, BLUE.filled())),
        )
        .map_err(&err)?;
    root.present().map_err(&err)
}

/// 3x2 grid of the six Kepler elements over time.
pub fn kepler_elements_grid(
    path: &Path,
    title: &str,
    time_hours: &[f64],
    elements: &KeplerSeries,
) -> Result<(), FigureError> {
    ensure_parent(path)?;
    let err = render_error(path);

    let root = BitMapBackend::new(path, (900, 1100)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;
    let (title_area, grid_area) = root.split_vertically(40);
    title_area
        .titled(title, caption_font())
        .map_err(&err)?;

    let panels: [(&str, &[f64], bool); 6] = [
        ("Semi-major axis [km]", &elements.sma_km, false),
        ("Eccentricity [-]", &elements.eccentricity, false),
        ("Inclination [deg]", &elements.inclination_deg, false),
        ("Argument of periapsis [deg]", &elements.argp_deg, false),
        ("RAAN [deg]", &elements.raan_deg, false),
        ("True anomaly [deg]", &elements.true_anomaly_deg, true),
    ];

    let (t_lo, t_hi) = span(time_hours.iter().copied()).unwrap_or((0.0, 1.0));
    let areas = grid_area.split_evenly((3, 2));
    for (area, (label, values, scatter)) in areas.iter().zip(panels) {
        let (lo, hi) = span(values.iter().copied()).unwrap_or((0.0, 1.0));
        let (lo, hi) = padded(lo, hi);
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(70)
            .build_cartesian_2d(t_lo..t_hi, lo..hi)
            .map_err(&err)?;
        chart
            .configure_mesh()
            .x_desc("Time [hr]")
            .y_desc(label)
            .label_style(label_font())
            .draw()
            .map_err(&err)?;
        if scatter {
            chart
                .draw_series(
                    time_hours
                        .iter()
                        .zip(values)
                        .map(|(&t, &v)| Circle::new((t, v), 1, BLUE.filled())),
                )
                .map_err(&err)?;
        } else {
            chart
                .draw_series(LineSeries::new(
                    time_hours.iter().zip(values).map(|(&t, &v)| (t, v)),
                    &BLUE,
                ))
                .map_err(&err)?;
        }
    }
    root.present().map_err(&err)
}

/// Overlay of the per-source acceleration norms on a log scale.
pub fn acceleration_norms_overlay(
    path: &Path,
    title: &str,
    time_hours: &[f64],
    series: &[(String, Vec<f64>)],
) -> Result<(), FigureError> {
    ensure_parent(path)?;
    let err = render_error(path);

    let (t_lo, t_hi) = span(time_hours.iter().copied()).unwrap_or((0.0, 1.0));
    let positive = series
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .filter(|v| *v > 0.0);
    let (a_lo, a_hi) = span(positive).unwrap_or((1e-12, 1.0));
    let a_hi = if a_hi > a_lo { a_hi } else { a_lo * 10.0 };

    let root = BitMapBackend::new(path, (950, 550)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .caption(title, caption_font())
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(t_lo..t_hi, (a_lo..a_hi).log_scale())
        .map_err(&err)?;
    chart
        .configure_mesh()
        .x_desc("Time [hr]")
        .y_desc("Acceleration norm [m/s^2]")
        .label_style(label_font())
        .draw()
        .map_err(&err)?;

    for (index, (label, values)) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                time_hours
                    .iter()
                    .zip(values)
                    .filter(|&(_, &v)| v > 0.0)
                    .map(|(&t, &v)| (t, v)),
                color.stroke_width(1),
            ))
            .map_err(&err)?
            .label(label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()
        .map_err(&err)?;
    root.present().map_err(&err)
}
