use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use validator::Validate;

use crate::error::Result;
use crate::models::{ArchiveTables, RainfallObservation};

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_stations: usize,
    pub total_rows: usize,
    pub observed_rows: usize,
    pub gap_filled_rows: usize,
    pub stations_without_data: usize,
    pub violations: Vec<IntegrityViolation>,
    pub station_statistics: BTreeMap<u32, StationStatistics>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityViolation {
    pub station_id: u32,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    NonSequentialStationId,
    InvalidStationRecord,
    UnknownStation,
    RowCountMismatch,
    NonContiguousYears,
    DuplicateYear,
    YearDateMismatch,
    MisplacedGapDate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationStatistics {
    pub rows: usize,
    pub gap_filled: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

/// Re-checks the structural guarantees of a parsed archive: sequential
/// station ids, referential integrity, and dense, duplicate-free series.
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check_integrity(&self, tables: &ArchiveTables) -> Result<IntegrityReport> {
        let mut report = IntegrityReport {
            total_stations: tables.stations.len(),
            total_rows: tables.rainfall.len(),
            observed_rows: tables.observed_count(),
            gap_filled_rows: tables.gap_filled_count(),
            stations_without_data: tables.stations.iter().filter(|s| !s.has_data()).count(),
            violations: Vec::new(),
            station_statistics: BTreeMap::new(),
        };

        self.check_stations(tables, &mut report);

        // Group rows by station, keeping table order
        let mut station_rows: HashMap<u32, Vec<&RainfallObservation>> = HashMap::new();
        for row in &tables.rainfall {
            station_rows.entry(row.station_id).or_default().push(row);
        }

        for station in &tables.stations {
            let rows = station_rows
                .remove(&station.station_id)
                .unwrap_or_default();

            if rows.len() != station.years_of_data as usize {
                report.violations.push(IntegrityViolation {
                    station_id: station.station_id,
                    violation_type: ViolationType::RowCountMismatch,
                    details: format!(
                        "{} rainfall rows but years_of_data is {}",
                        rows.len(),
                        station.years_of_data
                    ),
                });
            }

            self.check_series(station.station_id, &rows, &mut report);
            report
                .station_statistics
                .insert(station.station_id, Self::statistics(&rows));
        }

        // Anything left has no station record
        let mut orphans: Vec<_> = station_rows.into_iter().collect();
        orphans.sort_by_key(|(id, _)| *id);
        for (station_id, rows) in orphans {
            report.violations.push(IntegrityViolation {
                station_id,
                violation_type: ViolationType::UnknownStation,
                details: format!("{} rainfall rows reference a missing station", rows.len()),
            });
        }

        Ok(report)
    }

    fn check_stations(&self, tables: &ArchiveTables, report: &mut IntegrityReport) {
        for (i, station) in tables.stations.iter().enumerate() {
            let expected = i as u32 + 1;
            if station.station_id != expected {
                report.violations.push(IntegrityViolation {
                    station_id: station.station_id,
                    violation_type: ViolationType::NonSequentialStationId,
                    details: format!("expected station id {}", expected),
                });
            }

            if let Err(e) = station.validate() {
                report.violations.push(IntegrityViolation {
                    station_id: station.station_id,
                    violation_type: ViolationType::InvalidStationRecord,
                    details: e.to_string(),
                });
            }
        }
    }

    /// Years must run min..=max in steps of one, each consistent with its date
    fn check_series(
        &self,
        station_id: u32,
        rows: &[&RainfallObservation],
        report: &mut IntegrityReport,
    ) {
        for row in rows {
            if row.date.year() != row.year {
                report.violations.push(IntegrityViolation {
                    station_id,
                    violation_type: ViolationType::YearDateMismatch,
                    details: format!("year {} recorded with date {}", row.year, row.date),
                });
            }

            if row.is_gap_filled() && (row.date.month(), row.date.day()) != (1, 1) {
                report.violations.push(IntegrityViolation {
                    station_id,
                    violation_type: ViolationType::MisplacedGapDate,
                    details: format!("gap-filled year {} dated {}", row.year, row.date),
                });
            }
        }

        for window in rows.windows(2) {
            let (prev, curr) = (window[0].year, window[1].year);
            if curr == prev {
                report.violations.push(IntegrityViolation {
                    station_id,
                    violation_type: ViolationType::DuplicateYear,
                    details: format!("year {} appears more than once", curr),
                });
            } else if curr != prev + 1 {
                report.violations.push(IntegrityViolation {
                    station_id,
                    violation_type: ViolationType::NonContiguousYears,
                    details: format!("year {} followed by {}", prev, curr),
                });
            }
        }
    }

    fn statistics(rows: &[&RainfallObservation]) -> StationStatistics {
        StationStatistics {
            rows: rows.len(),
            gap_filled: rows.iter().filter(|r| r.is_gap_filled()).count(),
            first_year: rows.first().map(|r| r.year),
            last_year: rows.last().map(|r| r.year),
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Stations: {}\n", report.total_stations));
        summary.push_str(&format!(
            "Stations Without Data: {}\n",
            report.stations_without_data
        ));
        summary.push_str(&format!("Rainfall Rows: {}\n", report.total_rows));
        summary.push_str(&format!(
            "Observed Rows: {} ({:.1}%)\n",
            report.observed_rows,
            percentage(report.observed_rows, report.total_rows)
        ));
        summary.push_str(&format!(
            "Gap-Filled Rows: {} ({:.1}%)\n",
            report.gap_filled_rows,
            percentage(report.gap_filled_rows, report.total_rows)
        ));
        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Station {} ({:?}): {}\n",
                    i + 1,
                    violation.station_id,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}
