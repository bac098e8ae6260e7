//! Output module for reporting on the record store
//!
//! Statistics display and the optional flat-file CSV export.

mod export;
mod stats;

pub use export::export_csv;
pub use stats::{load_statistics, print_statistics, StoreStatistics};
