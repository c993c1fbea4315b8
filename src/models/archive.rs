use serde::{Deserialize, Serialize};

use crate::models::{RainfallObservation, StationRecord};

/// The two output tables of a parsed archive, joined by `station_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveTables {
    pub stations: Vec<StationRecord>,
    pub rainfall: Vec<RainfallObservation>,
}

impl ArchiveTables {
    pub fn new(stations: Vec<StationRecord>, rainfall: Vec<RainfallObservation>) -> Self {
        Self { stations, rainfall }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn station(&self, station_id: u32) -> Option<&StationRecord> {
        // ids are 1..=N in table order
        let index = (station_id as usize).checked_sub(1)?;
        self.stations
            .get(index)
            .filter(|s| s.station_id == station_id)
            .or_else(|| self.stations.iter().find(|s| s.station_id == station_id))
    }

    pub fn observations_for(&self, station_id: u32) -> Vec<&RainfallObservation> {
        self.rainfall
            .iter()
            .filter(|r| r.station_id == station_id)
            .collect()
    }

    pub fn gap_filled_count(&self) -> usize {
        self.rainfall.iter().filter(|r| r.is_gap_filled()).count()
    }

    pub fn observed_count(&self) -> usize {
        self.rainfall.len() - self.gap_filled_count()
    }

    /// (min, max) year across all stations
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.rainfall.iter().map(|r| r.year).min()?;
        let max = self.rainfall.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    pub fn summary(&self) -> String {
        let span = match self.year_span() {
            Some((min, max)) => format!("{}-{}", min, max),
            None => "n/a".to_string(),
        };
        format!(
            "Archive Summary:\n\
            - Stations: {}\n\
            - Rainfall rows: {}\n\
            - Observed years: {}\n\
            - Gap-filled years: {}\n\
            - Year span: {}",
            self.stations.len(),
            self.rainfall.len(),
            self.observed_count(),
            self.gap_filled_count(),
            span
        )
    }
}
