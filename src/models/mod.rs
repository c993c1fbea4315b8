pub mod archive;
pub mod rainfall;
pub mod station;

pub use archive::ArchiveTables;
pub use rainfall::{LengthUnit, Rainfall, RainfallObservation};
pub use station::StationRecord;
