pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
pub use models::{ArchiveTables, LengthUnit, Rainfall, RainfallObservation, StationRecord};
pub use readers::{parse_archive, ArchiveParser};
