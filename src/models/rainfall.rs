use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::utils::constants::MILLIMETERS_PER_INCH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    #[serde(alias = "in")]
    Inches,
    #[serde(alias = "mm")]
    Millimeters,
}

impl LengthUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Inches => "in",
            LengthUnit::Millimeters => "mm",
        }
    }

    fn millimeters_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Inches => MILLIMETERS_PER_INCH,
            LengthUnit::Millimeters => 1.0,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(LengthUnit::Inches),
            "mm" | "millimeter" | "millimeters" => Ok(LengthUnit::Millimeters),
            other => Err(ProcessingError::Config(format!(
                "Unsupported length unit: {}",
                other
            ))),
        }
    }
}

/// A rainfall depth tagged with its length unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rainfall {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Rainfall {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn inches(value: f64) -> Self {
        Self::new(value, LengthUnit::Inches)
    }

    pub fn to_unit(&self, unit: LengthUnit) -> Self {
        if unit == self.unit {
            return *self;
        }
        let millimeters = self.value * self.unit.millimeters_per_unit();
        Self::new(millimeters / unit.millimeters_per_unit(), unit)
    }
}

impl fmt::Display for Rainfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// One row of the rainfall table. Gap-filled years carry a January 1st
/// date and no rainfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub station_id: u32,
    pub date: NaiveDate,
    pub year: i32,
    pub rainfall: Option<Rainfall>,
}

impl RainfallObservation {
    pub fn observed(station_id: u32, date: NaiveDate, rainfall: Rainfall) -> Self {
        Self {
            station_id,
            date,
            year: date.year(),
            rainfall: Some(rainfall),
        }
    }

    /// Placeholder row for a year with no observation.
    pub fn missing(station_id: u32, year: i32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        Some(Self {
            station_id,
            date,
            year,
            rainfall: None,
        })
    }

    pub fn is_gap_filled(&self) -> bool {
        self.rainfall.is_none()
    }

    pub fn value(&self) -> Option<f64> {
        self.rainfall.map(|r| r.value)
    }
}
