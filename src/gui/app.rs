//! Dashboard Main Application
//! Main window with the date-range control panel and the chart viewer.

use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, DatasetInfo};
use egui::{ColorImage, SidePanel, TextureHandle, TextureOptions};
use log::{info, warn};
use olist_dashboard::charts::StaticChartRenderer;
use olist_dashboard::config::DashboardConfig;
use olist_dashboard::data::{DataProcessor, GeoPoint, OrderDataset};
use olist_dashboard::stats::{Aggregator, DashboardViews};
use std::path::Path;

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    orders: OrderDataset,
    geo: Vec<GeoPoint>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    views: DashboardViews,
    map_texture: Option<TextureHandle>,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        orders: OrderDataset,
        geo: Vec<GeoPoint>,
    ) -> Self {
        let info = DatasetInfo {
            order_rows: orders.len(),
            geo_points: geo.len(),
        };
        let bounds = DataProcessor::approved_date_bounds(&orders);
        let map_texture = config
            .map_image_path
            .as_deref()
            .and_then(|path| load_map_texture(&cc.egui_ctx, path));

        let mut app = Self {
            config,
            orders,
            geo,
            control_panel: ControlPanel::new(info, bounds),
            chart_viewer: ChartViewer::new(),
            views: DashboardViews::default(),
            map_texture,
        };
        app.refresh();
        app
    }

    /// Re-run filter and aggregation for the selected range.
    fn refresh(&mut self) {
        let Some((start, end)) = self.control_panel.selected_range() else {
            self.views = DashboardViews::default();
            self.control_panel.set_status("No approved orders to show");
            return;
        };
        let (start, end) = match DataProcessor::approved_date_bounds(&self.orders) {
            Some(bounds) => DataProcessor::clamp_range(bounds, start, end),
            None => (start, end),
        };

        // An inverted range keeps the previous views on screen.
        match DataProcessor::filter_by_approved_date(&self.orders, start, end) {
            Ok(selected) => {
                self.views = Aggregator::compute_all(selected, self.config.top_categories);
                self.control_panel.set_status(format!(
                    "{} orders from {} to {}",
                    self.views.summary.distinct_orders, start, end
                ));
            }
            Err(e) => {
                warn!("{}", e);
                self.control_panel.set_status(e.to_string());
            }
        }
    }

    /// Export static charts to a folder chosen by the user.
    fn handle_export(&mut self) {
        ensure_export_dir(&self.config.export_dir);
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.export_dir)
            .pick_folder()
        else {
            return;
        };

        match StaticChartRenderer::export_all(&self.views, &self.geo, self.config.map_extent, &dir)
        {
            Ok(files) => {
                self.control_panel.set_status(format!(
                    "Exported {} files to {}",
                    files.len(),
                    dir.display()
                ));
                if let Err(e) = open::that(&dir) {
                    warn!("Could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.control_panel.set_status(format!("Export Error: {}", e));
            }
        }
    }
}

/// Create the default export folder so the picker can open in it.
fn ensure_export_dir(dir: &Path) -> bool {
    match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not create export folder {}: {}", dir.display(), e);
            false
        }
    }
}

fn load_map_texture(ctx: &egui::Context, path: &Path) -> Option<TextureHandle> {
    let rgba = match image::open(path) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            warn!("Map image {} not loaded: {}", path.display(), e);
            return None;
        }
    };
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
    info!("Loaded map image {} ({}x{})", path.display(), size[0], size[1]);
    Some(ctx.load_texture("brazil_map", color, TextureOptions::LINEAR))
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("control_scroll")
                    .show(ui, |ui| {
                        match self.control_panel.show(ui, &self.views.summary) {
                            ControlPanelAction::RangeChanged => self.refresh(),
                            ControlPanelAction::ExportCharts => self.handle_export(),
                            ControlPanelAction::None => {}
                        }
                    });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(
                ui,
                &self.views,
                &self.geo,
                self.map_texture.as_ref(),
                self.config.map_extent,
            );
        });
    }
}
