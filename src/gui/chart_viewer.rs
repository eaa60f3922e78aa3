//! Chart Viewer Widget
//! Central scrollable panel showing the dashboard charts in a fixed order.

use egui::{Color32, RichText, ScrollArea, TextureHandle};
use olist_dashboard::charts::ChartPlotter;
use olist_dashboard::data::GeoPoint;
use olist_dashboard::stats::DashboardViews;

const SECTION_SPACING: f32 = 18.0;

/// Scrollable chart display area.
#[derive(Default)]
pub struct ChartViewer {
    /// Daily orders table can get long; collapsed by default.
    pub show_daily_table: bool,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        views: &DashboardViews,
        geo: &[GeoPoint],
        map: Option<&TextureHandle>,
        map_extent: [f64; 4],
    ) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("E-Commerce Public Data Analysis").size(26.0));
                ui.label(
                    "Welcome to the E-Commerce Public Data Analysis Dashboard. \
                     Explore insights and trends from the provided dataset.",
                );
                ui.add_space(SECTION_SPACING);

                if views.is_empty() {
                    Self::empty_state(ui);
                } else {
                    self.order_sections(ui, views);
                }

                Self::section(
                    ui,
                    "Brazil Geolocation Map",
                    "Showing geolocation data on the map of Brazil.",
                );
                ChartPlotter::draw_geo_chart(ui, geo, map, map_extent);
                ui.add_space(SECTION_SPACING);

                if !views.is_empty() {
                    Self::section(
                        ui,
                        "Distribution of Review Scores",
                        "This chart shows the distribution of review scores.",
                    );
                    ChartPlotter::draw_review_distribution_chart(ui, &views.review_scores);
                    ui.add_space(SECTION_SPACING);

                    Self::section(
                        ui,
                        "Customer Satisfaction Over Time",
                        "This chart shows the trend of customer satisfaction over time.",
                    );
                    ChartPlotter::draw_satisfaction_chart(ui, &views.monthly_means);
                    ui.add_space(SECTION_SPACING);
                }

                ui.separator();
                ui.label(
                    RichText::new("E-Commerce Public Data Analysis Dashboard")
                        .size(10.0)
                        .color(Color32::GRAY),
                );
            });
    }

    fn order_sections(&mut self, ui: &mut egui::Ui, views: &DashboardViews) {
        Self::section(ui, "Daily Orders Delivered", "");
        ui.checkbox(&mut self.show_daily_table, "Show daily table");
        if self.show_daily_table {
            ChartPlotter::draw_daily_orders_table(ui, &views.daily_orders);
        }
        ui.add_space(8.0);
        ui.label(RichText::new("Daily Orders Trend").size(15.0).strong());
        ChartPlotter::draw_daily_orders_chart(ui, &views.daily_orders);
        ui.add_space(SECTION_SPACING);

        Self::section(ui, "Transactional Activity by Month", "");
        ChartPlotter::draw_monthly_transactions_chart(ui, &views.monthly_transactions);
        ui.add_space(SECTION_SPACING);

        Self::section(
            ui,
            "Top 10 Best-selling Products",
            "This visualization shows the top 10 best-selling products.",
        );
        ChartPlotter::draw_top_categories_chart(ui, &views.top_categories);
        ui.add_space(SECTION_SPACING);

        Self::section(
            ui,
            "Customer Spending Over Time",
            "This visualization shows the trend of customer spending over time.",
        );
        ChartPlotter::draw_spending_chart(ui, &views.monthly_means);
        ui.add_space(SECTION_SPACING);
    }

    fn section(ui: &mut egui::Ui, title: &str, caption: &str) {
        ui.label(RichText::new(title).size(20.0).strong());
        if !caption.is_empty() {
            ui.label(RichText::new(caption).size(12.0).color(Color32::GRAY));
        }
        ui.add_space(6.0);
    }

    fn empty_state(ui: &mut egui::Ui) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, Color32::from_rgb(243, 156, 18)))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new("No orders in the selected range")
                        .size(18.0)
                        .color(Color32::from_rgb(243, 156, 18)),
                );
                ui.label("Widen the date range in the side panel to see order charts.");
            });
        ui.add_space(SECTION_SPACING);
    }
}
