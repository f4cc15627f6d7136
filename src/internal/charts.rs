//! Chart rendering for the comparison binary

use std::{error::Error, path::Path};

use lookup_lab::{BenchmarkReport, ChainedHashTable, Layout, Spacing};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

/// Font used for every caption and label
const FONT_FAMILY: &str = "sans-serif";
/// Size of chart captions
const TITLE_SIZE: u32 = 30;
/// Size of axis descriptions and labels
const TEXT_SIZE: u32 = 16;
/// Stroke width of plotted lines
const LINE_WIDTH: u32 = 2;
/// Colour of the tree series
const BST_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Colour of the hash table series
const HASH_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Result type of the drawing functions
type DrawResult = Result<(), Box<dyn Error>>;

/// Largest value of a series plus a 10% margin, at least 1
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    (values.fold(0.0, f64::max) * 1.1).max(1.0)
}

/// Per-lookup timings of one benchmark run, in microseconds
#[allow(clippy::arithmetic_side_effects)]
pub fn draw_report(report: &BenchmarkReport, path: &Path) -> DrawResult {
    let to_micros = |seconds: Vec<f64>| -> Vec<f64> { seconds.into_iter().map(|s| s * 1e6).collect() };
    let bst = to_micros(report.bst_seconds());
    let hash = to_micros(report.hash_seconds());
    let max_y = upper_bound(bst.iter().chain(&hash).copied());

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!("{} lookups, sample size {}", report.pattern, report.sample_size);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0..report.sample_size, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Lookup")
        .y_desc("Time (µs)")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    for (label, color, series) in [("BST", BST_COLOR, &bst), ("Hash Table", HASH_COLOR, &hash)] {
        let line_style = ShapeStyle::from(&color).stroke_width(LINE_WIDTH);
        chart
            .draw_series(LineSeries::new(series.iter().copied().enumerate(), line_style))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Mean lookup time of every run of a sweep, one bar pair per sample size
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn draw_summary(reports: &[BenchmarkReport], path: &Path) -> DrawResult {
    let bst: Vec<f64> = reports.iter().map(|r| r.bst_mean.as_secs_f64() * 1e6).collect();
    let hash: Vec<f64> = reports.iter().map(|r| r.hash_mean.as_secs_f64() * 1e6).collect();
    let labels: Vec<String> = reports.iter().map(|r| r.sample_size.to_string()).collect();
    let max_y = upper_bound(bst.iter().chain(&hash).copied());
    let pattern = reports.first().map(|r| r.pattern.to_string()).unwrap_or_default();

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Mean lookup time, {pattern} pattern"), (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(reports.len() as f64 - 0.5), 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_labels(reports.len())
        .x_label_formatter(&|x: &f64| {
            let rounded = x.round();
            if (*x - rounded).abs() > f64::EPSILON || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        })
        .x_desc("Sample size")
        .y_desc("Mean time (µs)")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    for (label, color, offset, series) in
        [("BST", BST_COLOR, -0.2, &bst), ("Hash Table", HASH_COLOR, 0.0_f64, &hash)]
    {
        chart
            .draw_series(series.iter().enumerate().map(|(i, &mean)| {
                let left = i as f64 + offset;
                Rectangle::new([(left, 0.0), (left + 0.2, mean)], color.filled())
            }))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Chain length of every bucket
#[allow(clippy::cast_precision_loss)]
pub fn draw_buckets(table: &ChainedHashTable, path: &Path) -> DrawResult {
    let max_y = upper_bound(table.buckets().map(|(_, chain)| chain.len() as f64));

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Bucket chains, load factor {:.2}", table.load_factor()),
            (FONT_FAMILY, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..table.capacity() as f64, 0.0..max_y)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Bucket")
        .y_desc("Keys")
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    chart.draw_series(table.buckets().filter(|(_, chain)| !chain.is_empty()).map(
        |(index, chain)| {
            let left = index as f64;
            Rectangle::new([(left + 0.1, 0.0), (left + 0.9, chain.len() as f64)], HASH_COLOR.filled())
        },
    ))?;

    root.present()?;
    Ok(())
}

/// Draws the laid out tree as an SVG, edges first so nodes sit on top.
///
/// Nodes deeper than `max_depth` are left out together with their edges.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn draw_tree(
    layout: &Layout,
    spacing: &Spacing,
    max_depth: Option<usize>,
    path: &Path,
) -> DrawResult {
    let layout = &layout.truncated(max_depth);
    let pixels = layout.to_pixels(spacing);
    let point = |x: f64, y: f64| (x.round() as i32, y.round() as i32);

    let width = spacing.margin_x.mul_add(2.0, layout.max_column() * spacing.horizontal);
    let height = spacing.margin_y.mul_add(2.0, layout.max_depth() as f64 * spacing.vertical);
    let root = SVGBackend::new(path, (width.ceil() as u32, height.ceil() as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    for &(parent, child) in layout.edges() {
        let (Some(from), Some(to)) = (layout.get(parent), layout.get(child)) else {
            continue;
        };
        let (from, to) = (spacing.place(from), spacing.place(to));
        root.draw(&PathElement::new(
            vec![point(from.x, from.y), point(to.x, to.y)],
            BLACK.stroke_width(1),
        ))?;
    }

    let radius = spacing.radius.round() as u32;
    let label_style = TextStyle::from((FONT_FAMILY, radius.max(8)).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (position, pixel) in &pixels {
        let center = point(pixel.x, pixel.y);
        root.draw(&Circle::new(center, radius, BST_COLOR.mix(0.2).filled()))?;
        root.draw(&Circle::new(center, radius, BST_COLOR.stroke_width(LINE_WIDTH)))?;
        root.draw(&Text::new(position.key.to_string(), center, label_style.clone()))?;
    }

    root.present()?;
    Ok(())
}
