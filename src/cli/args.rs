use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "amax-processor")]
#[command(about = "Annual-maximum precipitation archive processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Settings file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

/// Parsing and output options shared by the processing commands.
/// Unset flags fall back to the loaded settings.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputOptions {
    #[arg(
        short,
        long,
        help = "Output directory [default: output/amax-{YYMMDD}]"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, help = "Output table format")]
    pub format: Option<OutputFormat>,

    #[arg(short, long, help = "Parquet compression: snappy, gzip, lz4, zstd, none")]
    pub compression: Option<String>,

    #[arg(long, help = "Unit the archive values are recorded in (in, mm)")]
    pub source_unit: Option<String>,

    #[arg(short, long, help = "Unit for written rainfall values (in, mm)")]
    pub unit: Option<String>,

    #[arg(long, help = "Reject stations with two observations in one year")]
    pub strict_years: bool,

    #[arg(long, help = "Parse station blocks in parallel")]
    pub parallel: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one archive and write the station and rainfall tables
    Process {
        #[arg(short, long, help = "Input archive text file")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Parse every archive in a directory, one output folder per archive
    ProcessDirectory {
        #[arg(short, long, help = "Directory containing archive .txt files")]
        input_dir: PathBuf,

        #[command(flatten)]
        output: OutputOptions,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(
            long,
            help = "Filter to archive names containing this text (e.g. '1-d')",
            default_value = ""
        )]
        file_pattern: String,
    },

    /// Parse an archive and check the integrity of the resulting tables
    Validate {
        #[arg(short, long, help = "Input archive text file")]
        input: PathBuf,

        #[arg(long, help = "Reject stations with two observations in one year")]
        strict_years: bool,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Display information about a written Parquet table
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}
