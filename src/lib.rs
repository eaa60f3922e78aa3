//! E-Commerce Public Data Analysis
//!
//! Loads the pre-joined orders dataset and the geolocation dataset, filters
//! orders by approval date and derives the views shown on the dashboard.
//!
//! Pipeline: [`data::DataLoader`] → [`data::DataProcessor`] → [`stats::Aggregator`].

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
