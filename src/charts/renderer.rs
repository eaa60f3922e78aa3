//! Static Chart Renderer
//! Writes each dashboard chart to a PNG file with plotters, plus a JSON dump
//! of the views they were drawn from.
//!
//! Output files:
//! 1. daily_orders.png
//! 2. monthly_transactions.png
//! 3. top_categories.png
//! 4. spending_trend.png
//! 5. geolocation.png
//! 6. review_distribution.png
//! 7. satisfaction_trend.png
//! 8. views.json

use crate::charts::plotter::{daily_points, day_tick, month_points, month_tick};
use crate::data::GeoPoint;
use crate::stats::{
    CategoryCount, DailyOrdersView, DashboardViews, MonthlyBucketView, ReviewScoreBin,
};
use log::info;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const MAROON: RGBColor = RGBColor(128, 0, 0);
const VIRIDIS: [RGBColor; 10] = [
    RGBColor(68, 1, 84),
    RGBColor(72, 40, 120),
    RGBColor(62, 74, 137),
    RGBColor(49, 104, 142),
    RGBColor(38, 130, 142),
    RGBColor(31, 158, 137),
    RGBColor(53, 183, 121),
    RGBColor(109, 205, 89),
    RGBColor(180, 222, 44),
    RGBColor(253, 231, 37),
];

const EMPTY_MESSAGE: &str = "No orders in the selected range";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize views: {0}")]
    Json(#[from] serde_json::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(e.to_string())
    }
}

/// Upper bound for a value axis: headroom above the largest value, never zero.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max).max(1.0) * 1.1
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart into `dir` (created if needed). Returns the written files.
    pub fn export_all(
        views: &DashboardViews,
        geo: &[GeoPoint],
        map_extent: [f64; 4],
        dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;

        let daily = dir.join("daily_orders.png");
        Self::render_daily_orders(&daily, &views.daily_orders)?;

        let monthly = dir.join("monthly_transactions.png");
        Self::render_monthly_transactions(&monthly, &views.monthly_transactions)?;

        let top = dir.join("top_categories.png");
        Self::render_top_categories(&top, &views.top_categories)?;

        let spending = dir.join("spending_trend.png");
        Self::render_monthly_line(
            &spending,
            "Customer Spending Over Time",
            "Mean Payment Value",
            &month_points(&views.monthly_means, |m| m.mean_payment_value),
            None,
        )?;

        let geolocation = dir.join("geolocation.png");
        Self::render_geolocation(&geolocation, geo, map_extent)?;

        let reviews = dir.join("review_distribution.png");
        Self::render_review_distribution(&reviews, &views.review_scores)?;

        let satisfaction = dir.join("satisfaction_trend.png");
        Self::render_monthly_line(
            &satisfaction,
            "Customer Satisfaction Over Time",
            "Review Score",
            &month_points(&views.monthly_means, |m| m.mean_review_score),
            Some(5.0),
        )?;

        let json = dir.join("views.json");
        serde_json::to_writer_pretty(BufWriter::new(File::create(&json)?), views)?;

        let written = vec![
            daily,
            monthly,
            top,
            spending,
            geolocation,
            reviews,
            satisfaction,
            json,
        ];
        info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    pub fn render_daily_orders(
        path: &Path,
        daily: &[DailyOrdersView],
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let Some(first_date) = daily.first().map(|d| d.date) else {
            return Self::draw_empty(&root, "Daily Orders Trend");
        };
        let points = daily_points(daily);
        let x_max = points.last().map(|p| p[0]).unwrap_or(0.0).max(1.0);
        let y_max = axis_max(points.iter().map(|p| p[1]));

        let mut chart = ChartBuilder::on(&root)
            .caption("Daily Orders Trend", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Number of Orders")
            .x_labels(8)
            .x_label_formatter(&|x| day_tick(first_date, x.round()))
            .draw()?;

        chart.draw_series(LineSeries::new(
            points.iter().map(|p| (p[0], p[1])),
            SKY_BLUE.stroke_width(2),
        ))?;
        chart.draw_series(
            points
                .iter()
                .map(|p| Circle::new((p[0], p[1]), 3, SKY_BLUE.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    pub fn render_monthly_transactions(
        path: &Path,
        months: &[MonthlyBucketView],
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        if months.is_empty() {
            return Self::draw_empty(&root, "Transactional Activity by Month");
        }
        let y_max = axis_max(months.iter().map(|m| m.transaction_count as f64));
        let labels: Vec<&str> = months.iter().map(|m| m.label).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Transactional Activity by Month", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..months.len() as u32).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc("Number of Transactions")
            .x_labels(months.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => {
                    labels.get(*i as usize).copied().unwrap_or("").to_string()
                }
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(10)
                .data(
                    months
                        .iter()
                        .enumerate()
                        .map(|(i, m)| (i as u32, m.transaction_count as f64)),
                ),
        )?;

        root.present()?;
        Ok(())
    }

    pub fn render_top_categories(
        path: &Path,
        categories: &[CategoryCount],
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        if categories.is_empty() {
            return Self::draw_empty(&root, "Top 10 Best-selling Products");
        }
        let n = categories.len() as u32;
        let x_max = axis_max(categories.iter().map(|c| c.count as f64));

        let mut chart = ChartBuilder::on(&root)
            .caption("Top 10 Best-selling Products", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(220)
            .build_cartesian_2d(0f64..x_max, (0u32..n).into_segmented())?;

        // best seller drawn at the top
        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("Number of Sales")
            .y_desc("Product Category")
            .y_labels(categories.len())
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) if *i < n => {
                    categories[(n - 1 - *i) as usize].category.clone()
                }
                _ => String::new(),
            })
            .draw()?;

        for (rank, category) in categories.iter().enumerate() {
            let color = VIRIDIS[rank % VIRIDIS.len()];
            chart.draw_series(
                Histogram::horizontal(&chart)
                    .style(color.filled())
                    .margin(6)
                    .data(std::iter::once((n - 1 - rank as u32, category.count as f64))),
            )?;
        }

        root.present()?;
        Ok(())
    }

    /// Line over the twelve calendar months. `y_top` pins the upper bound of the axis.
    pub fn render_monthly_line(
        path: &Path,
        title: &str,
        y_desc: &str,
        points: &[[f64; 2]],
        y_top: Option<f64>,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        if points.is_empty() {
            return Self::draw_empty(&root, title);
        }
        let y_max = y_top.unwrap_or_else(|| axis_max(points.iter().map(|p| p[1])));

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((1u32..13u32).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Month")
            .y_desc(y_desc)
            .x_labels(12)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(m) => month_tick(*m as f64),
                _ => String::new(),
            })
            .draw()?;

        let series: Vec<(SegmentValue<u32>, f64)> = points
            .iter()
            .map(|p| (SegmentValue::CenterOf(p[0] as u32), p[1]))
            .collect();
        chart.draw_series(LineSeries::new(
            series.iter().cloned(),
            SKY_BLUE.stroke_width(2),
        ))?;
        chart.draw_series(
            series
                .iter()
                .map(|(x, y)| Circle::new((x.clone(), *y), 4, SKY_BLUE.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    pub fn render_geolocation(
        path: &Path,
        points: &[GeoPoint],
        extent: [f64; 4],
    ) -> Result<(), RenderError> {
        let [west, east, south, north] = extent;
        let root = BitMapBackend::new(path, (HEIGHT + 200, HEIGHT + 200)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Brazil Geolocation Map", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(west..east, south..north)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .draw()?;

        chart.draw_series(
            points
                .iter()
                .filter(|p| (west..=east).contains(&p.lng) && (south..=north).contains(&p.lat))
                .map(|p| Circle::new((p.lng, p.lat), 1, MAROON.mix(0.3).filled())),
        )?;

        root.present()?;
        Ok(())
    }

    pub fn render_review_distribution(
        path: &Path,
        bins: &[ReviewScoreBin],
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        if bins.is_empty() {
            return Self::draw_empty(&root, "Distribution of Review Scores");
        }
        let y_max = axis_max(bins.iter().map(|b| b.count as f64));

        let mut chart = ChartBuilder::on(&root)
            .caption("Distribution of Review Scores", ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((1u32..6u32).into_segmented(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Review Score")
            .y_desc("Count")
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(12)
                .data(bins.iter().map(|b| (b.score as u32, b.count as f64))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_empty(root: &Area<'_>, title: &str) -> Result<(), RenderError> {
        let body = root.titled(title, ("sans-serif", 26))?;
        let (w, h) = body.dim_in_pixel();
        body.draw(&Text::new(
            EMPTY_MESSAGE,
            (w as i32 / 2 - 150, h as i32 / 2),
            ("sans-serif", 22),
        ))?;
        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BRAZIL_MAP_EXTENT;
    use crate::data::DataLoader;
    use crate::stats::{Aggregator, DEFAULT_TOP_N};

    const EXPORTED: [&str; 8] = [
        "daily_orders.png",
        "monthly_transactions.png",
        "top_categories.png",
        "spending_trend.png",
        "geolocation.png",
        "review_distribution.png",
        "satisfaction_trend.png",
        "views.json",
    ];

    fn assert_exported(views: &DashboardViews, geo: &[GeoPoint]) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let written = StaticChartRenderer::export_all(views, geo, BRAZIL_MAP_EXTENT, dir.path())
            .expect("Export failed");

        assert_eq!(written.len(), EXPORTED.len());
        for name in EXPORTED {
            let path = dir.path().join(name);
            assert!(written.contains(&path), "{} not reported", name);
            assert!(fs::metadata(&path).unwrap().len() > 0, "{} is empty", name);
        }

        let json: serde_json::Value =
            serde_json::from_reader(File::open(dir.path().join("views.json")).unwrap()).unwrap();
        assert_eq!(json, serde_json::to_value(views).unwrap());
    }

    #[test]
    fn test_export_all_with_empty_views() {
        assert_exported(&DashboardViews::default(), &[]);
    }

    #[test]
    fn test_export_all_with_loaded_views() {
        let orders = DataLoader::load_orders("tests/data/orders_example.csv").unwrap();
        let geo = DataLoader::load_geo("tests/data/geolocation.csv").unwrap();
        let views = Aggregator::compute_all(orders.records(), DEFAULT_TOP_N);
        assert!(!views.is_empty());
        assert_exported(&views, &geo);
    }

    #[test]
    fn test_axis_max_has_headroom_and_floor() {
        assert!((axis_max([2.0, 10.0, 4.0].into_iter()) - 11.0).abs() < 1e-9);
        assert!((axis_max(std::iter::empty()) - 1.1).abs() < 1e-9);
    }
}
