//! Control Panel Widget
//! Left side panel with the approval date range, headline metrics and export.

use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText};
use olist_dashboard::stats::OrderSummary;
use std::ops::RangeInclusive;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Facts about the loaded datasets shown at the top of the panel.
#[derive(Debug, Clone, Default)]
pub struct DatasetInfo {
    pub order_rows: usize,
    pub geo_points: usize,
}

/// Left side control panel with the date range selection.
pub struct ControlPanel {
    pub info: DatasetInfo,
    /// Observed approval date bounds; `None` when no row has an approval date.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    /// Selected range as day offsets from the lower bound.
    pub start_offset: i64,
    pub end_offset: i64,
    pub status: String,
}

impl ControlPanel {
    pub fn new(info: DatasetInfo, bounds: Option<(NaiveDate, NaiveDate)>) -> Self {
        let mut panel = Self {
            info,
            bounds,
            start_offset: 0,
            end_offset: 0,
            status: "Ready".to_string(),
        };
        panel.reset_range();
        panel
    }

    /// Select the full observed range.
    pub fn reset_range(&mut self) {
        self.start_offset = 0;
        self.end_offset = self.span();
    }

    fn span(&self) -> i64 {
        self.bounds
            .map(|(min, max)| (max - min).num_days())
            .unwrap_or(0)
    }

    /// Currently selected `(start, end)` dates.
    pub fn selected_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (min, _) = self.bounds?;
        Some((
            min + Duration::days(self.start_offset),
            min + Duration::days(self.end_offset),
        ))
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, summary: &OrderSummary) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🛒 E-Commerce")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Public Data Analysis")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Dataset Section =====
        ui.label(RichText::new("📁 Dataset").size(14.0).strong());
        ui.add_space(5.0);
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(format!("Order rows: {}", self.info.order_rows));
                ui.label(format!("Geolocation points: {}", self.info.geo_points));
                match self.bounds {
                    Some((min, max)) => ui.label(format!(
                        "Approved: {} to {}",
                        min.format(DATE_FORMAT),
                        max.format(DATE_FORMAT)
                    )),
                    None => ui.label(RichText::new("No approved orders").color(Color32::GRAY)),
                };
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Select Date Range").size(14.0).strong());
        ui.add_space(8.0);

        if let Some((min, _)) = self.bounds {
            let span = self.span();
            let format_offset = move |n: f64, _: RangeInclusive<usize>| {
                (min + Duration::days(n.round() as i64))
                    .format(DATE_FORMAT)
                    .to_string()
            };
            let parse_date = move |s: &str| {
                NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .ok()
                    .map(|d| (d - min).num_days() as f64)
            };

            let start_changed = ui
                .add(
                    egui::Slider::new(&mut self.start_offset, 0..=span)
                        .text("Start")
                        .custom_formatter(format_offset)
                        .custom_parser(parse_date),
                )
                .changed();
            let end_changed = ui
                .add(
                    egui::Slider::new(&mut self.end_offset, 0..=span)
                        .text("End")
                        .custom_formatter(format_offset)
                        .custom_parser(parse_date),
                )
                .changed();
            if start_changed || end_changed {
                action = ControlPanelAction::RangeChanged;
            }

            ui.add_space(5.0);
            if ui.small_button("Reset to full range").clicked() {
                self.reset_range();
                action = ControlPanelAction::RangeChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Summary Section =====
        ui.label(RichText::new("📊 Summary").size(14.0).strong());
        ui.add_space(5.0);
        egui::Grid::new("summary_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Orders");
                ui.label(summary.distinct_orders.to_string());
                ui.end_row();
                ui.label("Revenue");
                ui.label(format!("{:.2}", summary.total_revenue));
                ui.end_row();
                ui.label("Mean payment");
                ui.label(format_optional(summary.mean_payment_value));
                ui.end_row();
                ui.label("Median payment");
                ui.label(format_optional(summary.median_payment_value));
                ui.end_row();
                ui.label("Mean review");
                ui.label(format_optional(summary.mean_review_score));
                ui.end_row();
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("💾 Export Charts").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(10.0);
        let status_color = if self.status.contains("Error") || self.status.contains("Invalid") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    RangeChanged,
    ExportCharts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_panel_selects_full_range() {
        let panel = ControlPanel::new(
            DatasetInfo::default(),
            Some((date(2017, 1, 1), date(2017, 3, 1))),
        );
        assert_eq!(
            panel.selected_range(),
            Some((date(2017, 1, 1), date(2017, 3, 1)))
        );
    }

    #[test]
    fn test_offsets_map_to_dates() {
        let mut panel = ControlPanel::new(
            DatasetInfo::default(),
            Some((date(2017, 12, 30), date(2018, 2, 1))),
        );
        panel.start_offset = 3;
        panel.end_offset = 4;
        assert_eq!(
            panel.selected_range(),
            Some((date(2018, 1, 2), date(2018, 1, 3)))
        );
    }

    #[test]
    fn test_no_bounds_no_range() {
        let panel = ControlPanel::new(DatasetInfo::default(), None);
        assert_eq!(panel.selected_range(), None);
    }
}
