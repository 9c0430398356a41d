//! Chart export to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::chart_data::{format_axis_label, ChartData, SeriesStyle};

/// Export format for chart: PNG or EPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Eps,
}

impl ChartExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }
}

/// Writes the chart in the requested format.
pub fn export_chart(
    path: &Path,
    format: ChartExportFormat,
    data: &ChartData,
    size: (u32, u32),
) -> Result<()> {
    match format {
        ChartExportFormat::Png => write_chart_png(path, data, size),
        ChartExportFormat::Eps => write_chart_eps(path, data, size),
    }?;
    tracing::debug!(
        path = %path.display(),
        format = format.extension(),
        series = data.series.len(),
        "exported chart"
    );
    Ok(())
}

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// "Nice" tick values in [min, max] with roughly max_ticks steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = max - min;
    if range <= 0.0 || max_ticks == 0 {
        return vec![min];
    }
    let raw_step = range / max_ticks as f64;
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    let ticks: Vec<f64> = (first..=last)
        .take(max_ticks + 2)
        .map(|i| i as f64 * step)
        .collect();
    if ticks.is_empty() {
        vec![min]
    } else {
        ticks
    }
}

fn ensure_data(data: &ChartData) -> Result<()> {
    if data.series.iter().all(|s| s.points.is_empty()) {
        return Err(eyre!("No data to export"));
    }
    Ok(())
}

/// Fixed palette (RGB 0-255), indexed by series position.
const PALETTE: [(u8, u8, u8); 6] = [
    (40, 40, 40),
    (0, 150, 200),
    (200, 0, 110),
    (0, 160, 0),
    (230, 140, 0),
    (110, 60, 200),
];

/// Write chart to EPS (Encapsulated PostScript). Size is in points.
pub fn write_chart_eps(path: &Path, data: &ChartData, size: (u32, u32)) -> Result<()> {
    ensure_data(data)?;

    let w = f64::from(size.0);
    let h = f64::from(size.1);
    const MARGIN_LEFT: f64 = 60.0;
    const MARGIN_RIGHT: f64 = 30.0;
    const MARGIN_BOTTOM: f64 = 45.0;
    const MARGIN_TOP: f64 = 30.0;
    const MAX_TICKS: usize = 8;
    const TICK_LEN: f64 = 4.0;
    const CHAR_W: f64 = 5.0;
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (h - MARGIN_BOTTOM - MARGIN_TOP).max(1.0);

    let b = &data.bounds;
    let x_range = b.x_max - b.x_min;
    let y_range = b.y_max - b.y_min;
    let to_x = |x: f64| MARGIN_LEFT + (x - b.x_min) / x_range * plot_w;
    let to_y = |y: f64| MARGIN_BOTTOM + (y - b.y_min) / y_range * plot_h;

    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(f, "%%BoundingBox: 0 0 {} {}", size.0, size.1)?;
    writeln!(f, "%%Creator: trendlens")?;
    writeln!(f, "%%EndComments")?;
    writeln!(f, "gsave")?;

    let x_ticks = nice_ticks(b.x_min, b.x_max, MAX_TICKS);
    let y_ticks = nice_ticks(b.y_min, b.y_max, MAX_TICKS);

    // grid
    writeln!(f, "0.9 setgray 0.5 setlinewidth")?;
    for &v in &x_ticks {
        writeln!(f, "{} {} moveto 0 {} rlineto stroke", to_x(v), MARGIN_BOTTOM, plot_h)?;
    }
    for &v in &y_ticks {
        writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, to_y(v), plot_w)?;
    }

    // axis box and ticks
    writeln!(f, "0 setgray 1 setlinewidth")?;
    writeln!(
        f,
        "{} {} moveto {} 0 rlineto 0 {} rlineto {} 0 rlineto closepath stroke",
        MARGIN_LEFT, MARGIN_BOTTOM, plot_w, plot_h, -plot_w
    )?;
    for &v in &x_ticks {
        writeln!(f, "{} {} moveto 0 {} rlineto stroke", to_x(v), MARGIN_BOTTOM, -TICK_LEN)?;
    }
    for &v in &y_ticks {
        writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, to_y(v), -TICK_LEN)?;
    }

    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    for &v in &x_ticks {
        let s = format_axis_label(v);
        let tx = to_x(v) - s.len() as f64 * CHAR_W / 2.0;
        writeln!(f, "{} {} moveto ({}) show", tx, MARGIN_BOTTOM - 14.0, ps_escape(&s))?;
    }
    for &v in &y_ticks {
        let s = format_axis_label(v);
        let tx = (MARGIN_LEFT - s.len() as f64 * CHAR_W - 6.0).max(2.0);
        writeln!(f, "{} {} moveto ({}) show", tx, to_y(v) - 3.0, ps_escape(&s))?;
    }

    writeln!(f, "/Helvetica findfont 10 scalefont setfont")?;
    if !b.x_label.is_empty() {
        let tx = MARGIN_LEFT + plot_w / 2.0 - b.x_label.len() as f64 * CHAR_W / 2.0;
        writeln!(f, "{} {} moveto ({}) show", tx, MARGIN_BOTTOM - 30.0, ps_escape(&b.x_label))?;
    }
    if !b.y_label.is_empty() {
        writeln!(f, "gsave 14 {} translate 90 rotate", MARGIN_BOTTOM + plot_h / 2.0)?;
        writeln!(
            f,
            "{} 0 moveto ({}) show grestore",
            -(b.y_label.len() as f64) * CHAR_W / 2.0,
            ps_escape(&b.y_label)
        )?;
    }

    // clip series to the plot area
    writeln!(f, "gsave")?;
    writeln!(
        f,
        "newpath {} {} {} {} rectclip",
        MARGIN_LEFT, MARGIN_BOTTOM, plot_w, plot_h
    )?;
    for (idx, s) in data.series.iter().enumerate() {
        let Some(&(x0, y0)) = s.points.first() else {
            continue;
        };
        let (r, g, bl) = PALETTE[idx % PALETTE.len()];
        writeln!(
            f,
            "{} {} {} setrgbcolor",
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(bl) / 255.0
        )?;

        if matches!(s.style, SeriesStyle::Line | SeriesStyle::Projection) {
            if s.style == SeriesStyle::Projection {
                writeln!(f, "[4 3] 0 setdash")?;
            }
            writeln!(f, "1.5 setlinewidth {} {} moveto", to_x(x0), to_y(y0))?;
            for &(px, py) in &s.points[1..] {
                writeln!(f, "{} {} lineto", to_x(px), to_y(py))?;
            }
            writeln!(f, "stroke [] 0 setdash")?;
        }
        if matches!(s.style, SeriesStyle::Points | SeriesStyle::Projection) {
            for &(px, py) in &s.points {
                writeln!(f, "newpath {} {} 2.5 0 360 arc fill", to_x(px), to_y(py))?;
            }
        }
    }
    writeln!(f, "grestore")?;

    // legend
    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    for (idx, s) in data.series.iter().enumerate() {
        let (r, g, bl) = PALETTE[idx % PALETTE.len()];
        let ly = MARGIN_BOTTOM + plot_h - 12.0 * (idx as f64 + 1.0);
        writeln!(
            f,
            "{} {} {} setrgbcolor {} {} 12 2 rectfill",
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(bl) / 255.0,
            MARGIN_LEFT + 8.0,
            ly + 2.0
        )?;
        writeln!(
            f,
            "0 setgray {} {} moveto ({}) show",
            MARGIN_LEFT + 24.0,
            ly,
            ps_escape(&s.name)
        )?;
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.flush()?;
    Ok(())
}

/// Write chart to PNG using plotters bitmap backend.
pub fn write_chart_png(path: &Path, data: &ChartData, size: (u32, u32)) -> Result<()> {
    use plotters::prelude::*;

    ensure_data(data)?;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let b = &data.bounds;
    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)?;

    chart
        .configure_mesh()
        .x_desc(b.x_label.as_str())
        .y_desc(b.y_label.as_str())
        .x_label_formatter(&|v| format_axis_label(*v))
        .y_label_formatter(&|v| format_axis_label(*v))
        .draw()?;

    for (idx, s) in data.series.iter().enumerate() {
        if s.points.is_empty() {
            continue;
        }
        let (r, g, bl) = PALETTE[idx % PALETTE.len()];
        let color = RGBColor(r, g, bl);
        let in_range = s
            .points
            .iter()
            .copied()
            .filter(|&(x, y)| x >= b.x_min && x <= b.x_max && y >= b.y_min && y <= b.y_max);

        match s.style {
            SeriesStyle::Points => {
                chart
                    .draw_series(PointSeries::of_element(
                        in_range,
                        3,
                        color,
                        &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
                    ))?
                    .label(s.name.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
            }
            SeriesStyle::Line => {
                chart
                    .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
                    .label(s.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            SeriesStyle::Projection => {
                chart
                    .draw_series(LineSeries::new(s.points.iter().copied(), color))?
                    .label(s.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                chart.draw_series(in_range.map(|p| Cross::new(p, 4, color)))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_data::{ChartBounds, ChartSeries};

    fn sample() -> ChartData {
        ChartData {
            series: vec![
                ChartSeries {
                    name: "Observed".to_string(),
                    style: SeriesStyle::Points,
                    points: vec![(0.0, 1.0), (1.0, 2.0), (2.0, 1.5)],
                },
                ChartSeries {
                    name: "Linear Regression".to_string(),
                    style: SeriesStyle::Line,
                    points: vec![(0.0, 1.2), (2.0, 1.8)],
                },
                ChartSeries {
                    name: "Forecast (Linear Regression)".to_string(),
                    style: SeriesStyle::Projection,
                    points: vec![(2.0, 1.5), (3.0, 2.1)],
                },
            ],
            bounds: ChartBounds {
                x_min: 0.0,
                x_max: 3.0,
                y_min: 0.0,
                y_max: 2.5,
                x_label: "x_col".to_string(),
                y_label: "y_col".to_string(),
            },
        }
    }

    #[test]
    fn ticks_fall_inside_range() {
        let ticks = nice_ticks(0.3, 9.7, 8);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| *t >= 0.3 && *t <= 9.7));
        assert_eq!(nice_ticks(1.0, 1.0, 8), vec![1.0]);
    }

    #[test]
    fn eps_contains_desired_elements() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.eps");
        write_chart_eps(&path, &sample(), (400, 300)).expect("write_chart_eps");

        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.starts_with("%!PS-Adobe-3.0 EPSF-3.0"));
        assert!(content.contains("%%BoundingBox: 0 0 400 300"));
        assert!(content.contains("%%Creator: trendlens"));
        assert!(content.contains("closepath stroke"));
        assert!(content.contains("(x_col)"));
        assert!(content.contains("(y_col)"));
        assert!(content.contains("setdash"));
        assert!(content.contains("arc fill"));
        assert!(content.contains("lineto"));
        assert!(content.contains("(Forecast \\(Linear Regression\\)) show"));
        assert!(content.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn empty_chart_is_rejected() {
        let mut data = sample();
        for s in &mut data.series {
            s.points.clear();
        }
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(write_chart_eps(&dir.path().join("c.eps"), &data, (400, 300)).is_err());
    }
}
