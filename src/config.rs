//! Layered processing settings.
//!
//! Built-in defaults, then an optional settings file (TOML, YAML or JSON,
//! chosen by extension), then `AMAX_*` environment variables such as
//! `AMAX_OUTPUT_UNIT=mm` or `AMAX_COMPRESSION=zstd`. Command-line flags are
//! applied on top by the CLI.

use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::models::LengthUnit;
use crate::readers::DuplicateYearPolicy;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE, ENV_PREFIX,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Unit the archive's values are recorded in
    pub source_unit: LengthUnit,
    /// Unit written to output tables; defaults to the source unit
    pub output_unit: Option<LengthUnit>,
    pub duplicate_years: DuplicateYearPolicy,
    pub parallel: bool,
    pub output_format: OutputFormat,
    pub compression: String,
    pub row_group_size: usize,
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_unit: LengthUnit::Inches,
            output_unit: None,
            duplicate_years: DuplicateYearPolicy::KeepFirst,
            parallel: false,
            output_format: OutputFormat::Parquet,
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn output_unit(&self) -> LengthUnit {
        self.output_unit.unwrap_or(self.source_unit)
    }
}
