use serde::{Deserialize, Serialize};
use validator::Validate;

/// One row of the station table, keyed by `station_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    pub station_id: u32,

    #[validate(length(min = 1))]
    pub source_id: String,

    #[validate(length(min = 1))]
    pub name: String,

    pub region: String,

    pub latitude: f64,

    pub longitude: f64,

    pub years_of_data: u32,
}

impl StationRecord {
    pub fn new(
        station_id: u32,
        source_id: String,
        name: String,
        region: String,
        latitude: f64,
        longitude: f64,
        years_of_data: u32,
    ) -> Self {
        Self {
            station_id,
            source_id,
            name,
            region,
            latitude,
            longitude,
            years_of_data,
        }
    }

    pub fn has_data(&self) -> bool {
        self.years_of_data > 0
    }
}
