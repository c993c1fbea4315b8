use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::readers::SourceLine;
use crate::utils::constants::{HEADER_FIELDS_STANDARD, HEADER_FIELDS_WITH_LOCALITY};
use crate::utils::numeric::parse_decimal;

/// Positional layout of a station header line, resolved from its field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `source_id, name, region, latitude, longitude, elevation`
    Standard,
    /// `source_id, name, locality, region, latitude, longitude, elevation`
    WithLocality,
}

impl HeaderLayout {
    pub fn from_field_count(count: usize) -> Option<Self> {
        match count {
            HEADER_FIELDS_STANDARD => Some(HeaderLayout::Standard),
            HEADER_FIELDS_WITH_LOCALITY => Some(HeaderLayout::WithLocality),
            _ => None,
        }
    }

    fn region_index(&self) -> usize {
        match self {
            HeaderLayout::Standard => 2,
            HeaderLayout::WithLocality => 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderParser;

impl HeaderParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a station header line into a station record.
    ///
    /// `station_id` doubles as the block index in error messages. The
    /// trailing elevation field is accepted but not kept.
    pub fn parse_header(
        &self,
        line: SourceLine<'_>,
        station_id: u32,
        years_of_data: u32,
    ) -> Result<StationRecord> {
        // Expected format: SOURCE_ID, NAME [, LOCALITY], REGION, LAT, LON, ELEV
        let parts: Vec<&str> = line.text.split(',').map(|s| s.trim()).collect();

        let layout = HeaderLayout::from_field_count(parts.len()).ok_or_else(|| {
            ProcessingError::HeaderArity {
                block: station_id,
                line_number: line.number,
                fields: parts.len(),
                line: line.text.to_string(),
            }
        })?;

        let name = match layout {
            HeaderLayout::Standard => parts[1].to_string(),
            HeaderLayout::WithLocality => format!("{}, {}", parts[1], parts[2]),
        };

        let region_index = layout.region_index();
        let latitude =
            self.parse_coordinate(&line, station_id, "latitude", parts[region_index + 1])?;
        let longitude =
            self.parse_coordinate(&line, station_id, "longitude", parts[region_index + 2])?;

        Ok(StationRecord::new(
            station_id,
            parts[0].to_string(),
            name,
            parts[region_index].to_string(),
            latitude,
            longitude,
            years_of_data,
        ))
    }

    fn parse_coordinate(
        &self,
        line: &SourceLine<'_>,
        station_id: u32,
        field: &'static str,
        token: &str,
    ) -> Result<f64> {
        parse_decimal(token).ok_or_else(|| ProcessingError::NumericField {
            block: station_id,
            line_number: line.number,
            field,
            value: token.to_string(),
            line: line.text.to_string(),
        })
    }
}
