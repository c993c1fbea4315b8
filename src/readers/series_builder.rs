use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{LengthUnit, Rainfall, RainfallObservation};
use crate::readers::SourceLine;
use crate::utils::constants::OBSERVATION_DATE_FORMAT;
use crate::utils::numeric::parse_decimal;

/// What to do when a station reports more than one observation for a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateYearPolicy {
    /// Keep the earliest line, log the rest
    #[default]
    KeepFirst,
    Reject,
}

#[derive(Debug, Clone)]
struct Observation {
    date: NaiveDate,
    value: f64,
}

/// Builds a station's dense annual series from its observation lines.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    unit: LengthUnit,
    duplicate_policy: DuplicateYearPolicy,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self {
            unit: LengthUnit::Inches,
            duplicate_policy: DuplicateYearPolicy::KeepFirst,
        }
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateYearPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Parse observation lines and gap-fill every year between the first and
    /// last observed year. Rows come back in ascending year order; years with
    /// no observation get a January 1st date and no rainfall.
    pub fn build_series(
        &self,
        lines: &[SourceLine<'_>],
        station_id: u32,
    ) -> Result<Vec<RainfallObservation>> {
        let mut observed: BTreeMap<i32, Observation> = BTreeMap::new();

        for line in lines {
            let Some(observation) = self.parse_observation_line(line, station_id)? else {
                continue;
            };
            let year = observation.date.year();

            if observed.contains_key(&year) {
                match self.duplicate_policy {
                    DuplicateYearPolicy::KeepFirst => {
                        warn!(
                            station_id,
                            line_number = line.number,
                            year,
                            "Discarding duplicate observation: '{}'",
                            line.text.trim()
                        );
                        continue;
                    }
                    DuplicateYearPolicy::Reject => {
                        return Err(ProcessingError::DuplicateYear {
                            block: station_id,
                            line_number: line.number,
                            year,
                            line: line.text.to_string(),
                        });
                    }
                }
            }

            observed.insert(year, observation);
        }

        let (Some(&min_year), Some(&max_year)) =
            (observed.keys().next(), observed.keys().next_back())
        else {
            debug!(station_id, "Station has no observations");
            return Ok(Vec::new());
        };

        let mut rows = Vec::with_capacity((max_year - min_year + 1) as usize);
        for year in min_year..=max_year {
            match observed.remove(&year) {
                Some(observation) => rows.push(RainfallObservation::observed(
                    station_id,
                    observation.date,
                    Rainfall::new(observation.value, self.unit),
                )),
                // Years between two parsed dates are always representable
                None => rows.extend(RainfallObservation::missing(station_id, year)),
            }
        }

        debug!(
            station_id,
            min_year,
            max_year,
            gap_filled = rows.iter().filter(|r| r.is_gap_filled()).count(),
            "Built annual series"
        );

        Ok(rows)
    }

    /// Parse a single observation line: `mm/dd/yyyy value [ignored...]`.
    /// Lines with fewer than two tokens are noise and yield `None`.
    fn parse_observation_line(
        &self,
        line: &SourceLine<'_>,
        station_id: u32,
    ) -> Result<Option<Observation>> {
        let mut tokens = line.text.split_whitespace();
        let (Some(date_token), Some(value_token)) = (tokens.next(), tokens.next()) else {
            if !line.text.trim().is_empty() {
                debug!(
                    station_id,
                    line_number = line.number,
                    "Skipping short observation line"
                );
            }
            return Ok(None);
        };

        let date = NaiveDate::parse_from_str(date_token, OBSERVATION_DATE_FORMAT).map_err(|_| {
            self.numeric_error(line, station_id, "date", date_token)
        })?;

        let value = parse_decimal(value_token)
            .ok_or_else(|| self.numeric_error(line, station_id, "rainfall", value_token))?;

        Ok(Some(Observation { date, value }))
    }

    fn numeric_error(
        &self,
        line: &SourceLine<'_>,
        station_id: u32,
        field: &'static str,
        token: &str,
    ) -> ProcessingError {
        ProcessingError::NumericField {
            block: station_id,
            line_number: line.number,
            field,
            value: token.to_string(),
            line: line.text.to_string(),
        }
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
