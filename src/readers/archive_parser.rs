use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::{ArchiveTables, LengthUnit, RainfallObservation, StationRecord};
use crate::readers::{DuplicateYearPolicy, HeaderParser, SeriesBuilder, SourceLine};

/// One station's slice of the archive: a header line and its observation lines.
#[derive(Debug, Clone, PartialEq)]
pub struct StationBlock<'a> {
    /// 1-based position among non-empty blocks; becomes the station id
    pub index: u32,
    pub header: SourceLine<'a>,
    pub observations: Vec<SourceLine<'a>>,
}

/// Splits an annual-maximum archive into station blocks and assembles the
/// station and rainfall tables.
#[derive(Debug, Clone, Default)]
pub struct ArchiveParser {
    header_parser: HeaderParser,
    series_builder: SeriesBuilder,
    parallel: bool,
}

impl ArchiveParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: LengthUnit) -> Self {
        self.series_builder = self.series_builder.with_unit(unit);
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateYearPolicy) -> Self {
        self.series_builder = self.series_builder.with_duplicate_policy(policy);
        self
    }

    /// Parse blocks on the rayon pool. Output is identical to sequential mode.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Read an archive file and parse it
    pub fn read_archive(&self, path: &Path) -> Result<ArchiveTables> {
        let text = fs::read_to_string(path)?;
        debug!("Read {} bytes from {}", text.len(), path.display());
        self.parse(&text)
    }

    /// Parse the full archive text. Any malformed block aborts the whole parse.
    pub fn parse(&self, text: &str) -> Result<ArchiveTables> {
        let blocks = split_blocks(text);
        if blocks.is_empty() {
            return Err(ProcessingError::EmptyArchive);
        }

        let parsed: Vec<Result<(StationRecord, Vec<RainfallObservation>)>> = if self.parallel {
            blocks.par_iter().map(|b| self.parse_block(b)).collect()
        } else {
            blocks.iter().map(|b| self.parse_block(b)).collect()
        };

        let mut stations = Vec::with_capacity(blocks.len());
        let mut rainfall = Vec::new();
        // Block order, so the first failing block is the one reported
        for result in parsed {
            let (station, rows) = result?;
            stations.push(station);
            rainfall.extend(rows);
        }

        info!(
            stations = stations.len(),
            rows = rainfall.len(),
            "Parsed annual maximum archive"
        );

        Ok(ArchiveTables::new(stations, rainfall))
    }

    fn parse_block(
        &self,
        block: &StationBlock<'_>,
    ) -> Result<(StationRecord, Vec<RainfallObservation>)> {
        let rows = self
            .series_builder
            .build_series(&block.observations, block.index)?;
        let years_of_data = rows.len() as u32;
        let station = self
            .header_parser
            .parse_header(block.header, block.index, years_of_data)?;

        debug!(
            station_id = station.station_id,
            source_id = %station.source_id,
            years_of_data,
            "Parsed station block"
        );

        Ok((station, rows))
    }
}

/// Split archive text into station blocks.
///
/// The first line is the archive header and is dropped. Runs of blank
/// (whitespace-only) lines separate blocks; the first line of each block is
/// its station header.
pub fn split_blocks(text: &str) -> Vec<StationBlock<'_>> {
    let mut blocks = Vec::new();
    let mut current: Vec<SourceLine<'_>> = Vec::new();

    for (i, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            push_block(&mut blocks, &mut current);
        } else {
            current.push(SourceLine::new(i + 1, line));
        }
    }
    push_block(&mut blocks, &mut current);

    blocks
}

fn push_block<'a>(blocks: &mut Vec<StationBlock<'a>>, current: &mut Vec<SourceLine<'a>>) {
    let mut lines = std::mem::take(current).into_iter();
    if let Some(header) = lines.next() {
        blocks.push(StationBlock {
            index: blocks.len() as u32 + 1,
            header,
            observations: lines.collect(),
        });
    }
}

/// Parse archive text with default options (inches, keep-first duplicates)
pub fn parse_archive(text: &str) -> Result<ArchiveTables> {
    ArchiveParser::new().parse(text)
}
