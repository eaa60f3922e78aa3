//! E-Commerce Public Data Analysis - desktop dashboard
//!
//! Usage: `olist_dashboard [config.json]`. Without a config file the datasets
//! are read from the working directory.

mod gui;

use anyhow::Context;
use eframe::egui;
use gui::DashboardApp;
use log::info;
use olist_dashboard::config::DashboardConfig;
use olist_dashboard::data::DataLoader;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => DashboardConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => DashboardConfig::default(),
    };

    let orders = DataLoader::load_orders(&config.orders_path).with_context(|| {
        format!("Failed to load orders from {}", config.orders_path.display())
    })?;
    let geo = DataLoader::load_geo(&config.geolocation_path).with_context(|| {
        format!(
            "Failed to load geolocation from {}",
            config.geolocation_path.display()
        )
    })?;
    info!("Loaded {} orders and {} geolocation points", orders.len(), geo.len());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([1000.0, 650.0])
            .with_title("E-Commerce Public Data Analysis"),
        ..Default::default()
    };

    eframe::run_native(
        "E-Commerce Public Data Analysis",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, orders, geo)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
