//! Data module - CSV loading, typed records and date-range filtering

mod loader;
mod processor;
pub mod records;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, FilterError};
pub use records::{GeoPoint, OrderDataset, OrderRecord};
