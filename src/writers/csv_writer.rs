use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::models::{ArchiveTables, LengthUnit, RainfallObservation, StationRecord};
use crate::utils::constants::{RAINFALL_TABLE, STATIONS_TABLE};
use crate::utils::filename::table_path;

/// Flat rainfall row; absent rainfall becomes empty cells
#[derive(Debug, Serialize)]
struct RainfallRow {
    station_id: u32,
    date: NaiveDate,
    year: i32,
    rainfall: Option<f64>,
    unit: Option<&'static str>,
}

#[derive(Default)]
pub struct CsvWriter {
    output_unit: Option<LengthUnit>,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_unit(mut self, unit: LengthUnit) -> Self {
        self.output_unit = Some(unit);
        self
    }

    /// Write both tables as `stations.csv` and `rainfall.csv` under `dir`
    pub fn write_tables(&self, tables: &ArchiveTables, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let stations_path = table_path(dir, STATIONS_TABLE, OutputFormat::Csv);
        let rainfall_path = table_path(dir, RAINFALL_TABLE, OutputFormat::Csv);

        self.write_stations(&tables.stations, &stations_path)?;
        self.write_rainfall(&tables.rainfall, &rainfall_path)?;

        info!(
            "Wrote {} stations and {} rainfall rows to {}",
            tables.stations.len(),
            tables.rainfall.len(),
            dir.display()
        );

        Ok(vec![stations_path, rainfall_path])
    }

    pub fn write_stations(&self, stations: &[StationRecord], path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if stations.is_empty() {
            writer.write_record([
                "station_id",
                "source_id",
                "name",
                "region",
                "latitude",
                "longitude",
                "years_of_data",
            ])?;
        }
        for station in stations {
            writer.serialize(station)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_rainfall(&self, rows: &[RainfallObservation], path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if rows.is_empty() {
            writer.write_record(["station_id", "date", "year", "rainfall", "unit"])?;
        }
        for row in rows {
            let depth = row
                .rainfall
                .map(|d| self.output_unit.map_or(d, |unit| d.to_unit(unit)));
            writer.serialize(RainfallRow {
                station_id: row.station_id,
                date: row.date,
                year: row.year,
                rainfall: depth.map(|d| d.value),
                unit: depth.map(|d| d.unit.symbol()),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
