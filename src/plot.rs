//! SVG chart rendering for workload traces
//!
//! Renders a utilisation step-curve over the trace span, with an optional
//! Gantt-style panel showing each job's execution interval. Output path and
//! geometry are explicit parameters; there is no process-global backend
//! state.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::stats;
use crate::workload::Workload;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const FONT: (&str, u32) = ("sans-serif", 16);

/// Render `workload` to an SVG file at `output`.
///
/// `details` adds a per-job Gantt panel below the utilisation curve.
pub fn render(workload: &Workload, output: &Path, details: bool, capacity: u32) -> Result<()> {
    let (span_start, span_end) = workload
        .span()
        .context("cannot plot an empty workload")?;
    anyhow::ensure!(span_end > span_start, "trace span has zero length");

    let root = SVGBackend::new(output, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    if details {
        let (top, bottom) = root.split_vertically((HEIGHT / 2) as i32);
        draw_utilisation(&top, workload, span_start, span_end, capacity)?;
        draw_gantt(&bottom, workload, span_start, span_end)?;
    } else {
        draw_utilisation(&root, workload, span_start, span_end, capacity)?;
    }

    root.present()
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

fn draw_utilisation(
    area: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    workload: &Workload,
    span_start: f64,
    span_end: f64,
    capacity: u32,
) -> Result<()> {
    let y_max = f64::from(capacity.max(stats::peak_usage(workload.jobs()))).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Resource usage", FONT.into_font())
        .x_label_area_size(40)
        .y_label_area_size(50)
        .margin(10)
        .build_cartesian_2d(to_hours(span_start, span_start)..to_hours(span_end, span_start), 0f64..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("time (hours)")
        .y_desc("busy resources")
        .label_style(FONT.into_font())
        .draw()?;

    // step curve of concurrent usage
    let series = stats::usage_series(workload.jobs());
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(series.len() * 2);
    let mut previous = 0f64;
    for (t, busy) in &series {
        let x = to_hours(*t, span_start);
        points.push((x, previous));
        previous = f64::from(*busy);
        points.push((x, previous));
    }
    points.push((to_hours(span_end, span_start), previous));
    chart
        .draw_series(AreaSeries::new(points, 0.0, BLUE.mix(0.3)).border_style(&BLUE))?
        .label("usage");

    // capacity line
    chart.draw_series(LineSeries::new(
        [
            (to_hours(span_start, span_start), f64::from(capacity)),
            (to_hours(span_end, span_start), f64::from(capacity)),
        ],
        RED.stroke_width(2),
    ))?;

    Ok(())
}

fn draw_gantt(
    area: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    workload: &Workload,
    span_start: f64,
    span_end: f64,
) -> Result<()> {
    let jobs = workload.jobs();
    let rows = jobs.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption("Jobs", FONT.into_font())
        .x_label_area_size(40)
        .y_label_area_size(50)
        .margin(10)
        .build_cartesian_2d(to_hours(span_start, span_start)..to_hours(span_end, span_start), 0f64..rows)?;

    chart
        .configure_mesh()
        .x_desc("time (hours)")
        .y_desc("job")
        .disable_y_mesh()
        .label_style(FONT.into_font())
        .draw()?;

    chart.draw_series(jobs.iter().enumerate().map(|(row, job)| {
        let y = row as f64;
        Rectangle::new(
            [
                (to_hours(job.start(), span_start), y + 0.1),
                (to_hours(job.finish(), span_start), y + 0.9),
            ],
            GREEN.mix(0.6).filled(),
        )
    }))?;

    Ok(())
}

fn to_hours(t: f64, origin: f64) -> f64 {
    (t - origin) / 3600.0
}
