//! Chart Plotter Module
//! Draws the dashboard views as interactive egui_plot charts.

use crate::data::GeoPoint;
use crate::stats::{month_label, CategoryCount, DailyOrdersView, MonthlyBucketView, ReviewScoreBin};
use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText, TextureHandle};
use egui_plot::{Bar, BarChart, Line, Plot, PlotImage, PlotPoint, PlotPoints, Points};

pub const SKY_BLUE: Color32 = Color32::from_rgb(135, 206, 235);
pub const MAROON: Color32 = Color32::from_rgb(128, 0, 0);

/// Viridis samples, one per top-category bar.
pub const VIRIDIS: [Color32; 10] = [
    Color32::from_rgb(68, 1, 84),
    Color32::from_rgb(72, 40, 120),
    Color32::from_rgb(62, 74, 137),
    Color32::from_rgb(49, 104, 142),
    Color32::from_rgb(38, 130, 142),
    Color32::from_rgb(31, 158, 137),
    Color32::from_rgb(53, 183, 121),
    Color32::from_rgb(109, 205, 89),
    Color32::from_rgb(180, 222, 44),
    Color32::from_rgb(253, 231, 37),
];

const CHART_HEIGHT: f32 = 280.0;

/// Daily rows as `[day offset from first row, order count]`.
pub fn daily_points(daily: &[DailyOrdersView]) -> Vec<[f64; 2]> {
    let Some(first) = daily.first() else {
        return Vec::new();
    };
    daily
        .iter()
        .map(|d| [(d.date - first.date).num_days() as f64, d.order_count as f64])
        .collect()
}

/// Monthly rows as `[month number, metric]`, skipping months without the metric.
pub fn month_points(
    months: &[MonthlyBucketView],
    metric: impl Fn(&MonthlyBucketView) -> Option<f64>,
) -> Vec<[f64; 2]> {
    months
        .iter()
        .filter_map(|m| metric(m).map(|v| [m.month as f64, v]))
        .collect()
}

/// Three-letter month label for integer grid marks, blank otherwise.
pub(crate) fn month_tick(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || !(1.0..=12.0).contains(&rounded) {
        return String::new();
    }
    month_label(rounded as u32).chars().take(3).collect()
}

/// Date label for a day-offset grid mark. Blank for fractional marks and for
/// offsets outside chrono's date range, which zooming far out produces.
pub(crate) fn day_tick(first_date: NaiveDate, value: f64) -> String {
    if value < 0.0 || value.fract().abs() > 1e-6 || value > i64::MAX as f64 {
        return String::new();
    }
    Duration::try_days(value as i64)
        .and_then(|offset| first_date.checked_add_signed(offset))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw the daily orders table (date, order count, revenue)
    pub fn draw_daily_orders_table(ui: &mut egui::Ui, daily: &[DailyOrdersView]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("daily_orders_table")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        egui::Grid::new("daily_orders_grid")
                            .striped(true)
                            .min_col_width(90.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("Date").strong().size(12.0));
                                ui.label(RichText::new("Order Count").strong().size(12.0));
                                ui.label(RichText::new("Revenue").strong().size(12.0));
                                ui.end_row();

                                for row in daily {
                                    ui.label(row.date.format("%Y-%m-%d").to_string());
                                    ui.label(row.order_count.to_string());
                                    ui.label(format!("{:.2}", row.revenue));
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    /// Daily orders trend line
    pub fn draw_daily_orders_chart(ui: &mut egui::Ui, daily: &[DailyOrdersView]) {
        let Some(first_date) = daily.first().map(|d| d.date) else {
            return;
        };
        let points = daily_points(daily);

        Plot::new("daily_orders_trend")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Number of Orders")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| day_tick(first_date, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(SKY_BLUE)
                        .width(2.0)
                        .name("Orders"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(3.0)
                        .color(SKY_BLUE),
                );
            });
    }

    /// Transactional activity by month (bar)
    pub fn draw_monthly_transactions_chart(ui: &mut egui::Ui, months: &[MonthlyBucketView]) {
        let bars: Vec<Bar> = months
            .iter()
            .map(|m| {
                Bar::new(m.month as f64, m.transaction_count as f64)
                    .name(m.label)
                    .width(0.7)
            })
            .collect();

        Plot::new("monthly_transactions")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Month")
            .y_axis_label("Number of Transactions")
            .include_y(0.0)
            .x_axis_formatter(|mark, _range| month_tick(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(SKY_BLUE).name("Transactions"));
            });
    }

    /// Top categories (horizontal bar, best seller on top)
    pub fn draw_top_categories_chart(ui: &mut egui::Ui, categories: &[CategoryCount]) {
        let n = categories.len();
        let labels: Vec<String> = categories.iter().map(|c| c.category.clone()).collect();

        Plot::new("top_categories")
            .height(CHART_HEIGHT + 60.0)
            .allow_scroll(false)
            .x_axis_label("Number of Sales")
            .include_x(0.0)
            .y_axis_formatter(move |mark, _range| {
                let rank = n as f64 - 1.0 - mark.value;
                if rank < 0.0 || rank.fract().abs() > 1e-6 {
                    return String::new();
                }
                labels.get(rank as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (rank, category) in categories.iter().enumerate() {
                    let bar = Bar::new((n - 1 - rank) as f64, category.count as f64)
                        .name(&category.category)
                        .width(0.75);
                    plot_ui.bar_chart(
                        BarChart::new(vec![bar])
                            .horizontal()
                            .color(VIRIDIS[rank % VIRIDIS.len()]),
                    );
                }
            });
    }

    /// Customer spending over time (mean payment per shipping month)
    pub fn draw_spending_chart(ui: &mut egui::Ui, months: &[MonthlyBucketView]) {
        let points = month_points(months, |m| m.mean_payment_value);
        Self::draw_monthly_line(ui, "spending_trend", "Mean Payment Value", &points, None);
    }

    /// Customer satisfaction over time (mean review per shipping month, fixed 0-5 axis)
    pub fn draw_satisfaction_chart(ui: &mut egui::Ui, months: &[MonthlyBucketView]) {
        let points = month_points(months, |m| m.mean_review_score);
        Self::draw_monthly_line(
            ui,
            "satisfaction_trend",
            "Review Score",
            &points,
            Some((0.0, 5.0)),
        );
    }

    fn draw_monthly_line(
        ui: &mut egui::Ui,
        id: &str,
        y_label: &str,
        points: &[[f64; 2]],
        y_range: Option<(f64, f64)>,
    ) {
        let mut plot = Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Month")
            .y_axis_label(y_label)
            .include_x(1.0)
            .include_x(12.0)
            .x_axis_formatter(|mark, _range| month_tick(mark.value));
        if let Some((lo, hi)) = y_range {
            plot = plot.include_y(lo).include_y(hi);
        }

        plot.show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from_iter(points.iter().copied()))
                    .color(SKY_BLUE)
                    .width(2.0)
                    .name(y_label),
            );
            plot_ui.points(
                Points::new(PlotPoints::from_iter(points.iter().copied()))
                    .radius(3.5)
                    .color(SKY_BLUE),
            );
        });
    }

    /// Geolocation scatter, optionally over the Brazil map texture
    pub fn draw_geo_chart(
        ui: &mut egui::Ui,
        points: &[GeoPoint],
        map: Option<&TextureHandle>,
        extent: [f64; 4],
    ) {
        let [west, east, south, north] = extent;
        let scatter: Vec<[f64; 2]> = points.iter().map(|p| [p.lng, p.lat]).collect();

        Plot::new("brazil_geolocation")
            .height(CHART_HEIGHT * 2.0)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_scroll(false)
            .include_x(west)
            .include_x(east)
            .include_y(south)
            .include_y(north)
            .show(ui, |plot_ui| {
                if let Some(texture) = map {
                    plot_ui.image(PlotImage::new(
                        texture,
                        PlotPoint::new((west + east) / 2.0, (south + north) / 2.0),
                        egui::vec2((east - west) as f32, (north - south) as f32),
                    ));
                }
                plot_ui.points(
                    Points::new(PlotPoints::new(scatter))
                        .radius(0.8)
                        .color(Color32::from_rgba_unmultiplied(
                            MAROON.r(),
                            MAROON.g(),
                            MAROON.b(),
                            77,
                        ))
                        .name("Customers"),
                );
            });
    }

    /// Distribution of review scores (1-5)
    pub fn draw_review_distribution_chart(ui: &mut egui::Ui, bins: &[ReviewScoreBin]) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|b| Bar::new(b.score as f64, b.count as f64).width(0.9))
            .collect();

        Plot::new("review_distribution")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Review Score")
            .y_axis_label("Count")
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(SKY_BLUE).name("Reviews"));
            });
    }
}
