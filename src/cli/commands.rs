use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cli::args::{Cli, Commands, OutputOptions};
use crate::config::{OutputFormat, Settings};
use crate::error::{ProcessingError, Result};
use crate::models::{ArchiveTables, LengthUnit};
use crate::processors::IntegrityChecker;
use crate::readers::{ArchiveCollection, ArchiveParser, DuplicateYearPolicy};
use crate::utils::filename::{archive_output_dir, generate_default_output_dir};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose)?;

    let settings = Settings::load(cli.config.as_deref())?;
    debug!("Loaded settings: {:?}", settings);

    match cli.command {
        Commands::Process { input, output } => {
            let settings = apply_options(settings, &output)?;
            let output_dir = output.output_dir.unwrap_or_else(generate_default_output_dir);

            println!("Processing annual maximum archive...");
            println!("Input file: {}", input.display());
            println!("Output directory: {}", output_dir.display());

            let progress = ProgressReporter::new_spinner("Parsing archive...", false);
            let tables = build_parser(&settings).read_archive(&input)?;
            progress.finish_with_message(&format!(
                "Parsed {} stations, {} rainfall rows",
                tables.stations.len(),
                tables.rainfall.len()
            ));

            report_integrity(&tables)?;
            println!("\n{}", tables.summary());

            let paths = write_tables(&settings, &tables, &output_dir)?;
            print_written(&settings, &paths)?;

            println!("Processing complete!");
        }

        Commands::ProcessDirectory {
            input_dir,
            output,
            max_workers,
            file_pattern,
        } => {
            let settings = apply_options(settings, &output)?;
            let output_dir = output.output_dir.unwrap_or_else(generate_default_output_dir);

            println!("Processing archive directory...");
            println!("Input directory: {}", input_dir.display());
            println!("Output directory: {}", output_dir.display());
            println!("Workers: {}", max_workers);

            let collection =
                ArchiveCollection::new(max_workers).with_parser(build_parser(&settings));
            let archives = collection.read_directory(&input_dir, &file_pattern).await?;

            if archives.is_empty() {
                println!("No archives found");
                return Ok(());
            }

            let progress = ProgressReporter::new(archives.len() as u64, "Writing tables...", false);
            for archive in &archives {
                report_integrity(&archive.tables)?;
                let dir = archive_output_dir(&output_dir, &archive.path);
                write_tables(&settings, &archive.tables, &dir)?;
                progress.println(&format!(
                    "{}: {} stations -> {}",
                    archive.path.display(),
                    archive.tables.stations.len(),
                    dir.display()
                ));
                progress.increment(1);
            }
            progress.finish_with_message(&format!("Processed {} archives", archives.len()));

            println!("Processing complete!");
        }

        Commands::Validate {
            input,
            strict_years,
            json,
        } => {
            let mut settings = settings;
            if strict_years {
                settings.duplicate_years = DuplicateYearPolicy::Reject;
            }

            let tables = build_parser(&settings).read_archive(&input)?;
            let checker = IntegrityChecker::new();
            let report = checker.check_integrity(&tables)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Validating annual maximum archive...");
            println!("Input file: {}", input.display());
            println!("\n{}", checker.generate_summary(&report));

            if report.is_clean() {
                println!("✅ All tables passed integrity checks");
            } else {
                println!("⚠️  Found {} integrity issues", report.violations.len());
            }
        }

        Commands::Info { file } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());
        }
    }

    Ok(())
}

/// Set up structured logging on stderr
pub fn setup_logging(verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("amax_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| ProcessingError::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Layer command-line flags over the loaded settings
pub fn apply_options(mut settings: Settings, options: &OutputOptions) -> Result<Settings> {
    if let Some(format) = options.format {
        settings.output_format = format;
    }
    if let Some(ref compression) = options.compression {
        settings.compression = compression.clone();
    }
    if let Some(ref unit) = options.source_unit {
        settings.source_unit = unit.parse::<LengthUnit>()?;
    }
    if let Some(ref unit) = options.unit {
        settings.output_unit = Some(unit.parse::<LengthUnit>()?);
    }
    if options.strict_years {
        settings.duplicate_years = DuplicateYearPolicy::Reject;
    }
    if options.parallel {
        settings.parallel = true;
    }
    Ok(settings)
}

pub fn build_parser(settings: &Settings) -> ArchiveParser {
    ArchiveParser::new()
        .with_unit(settings.source_unit)
        .with_duplicate_policy(settings.duplicate_years)
        .with_parallel(settings.parallel)
}

pub fn write_tables(
    settings: &Settings,
    tables: &ArchiveTables,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    match settings.output_format {
        OutputFormat::Parquet => ParquetWriter::new()
            .with_compression(&settings.compression)?
            .with_row_group_size(settings.row_group_size)
            .with_batch_size(settings.batch_size)
            .with_output_unit(settings.output_unit())
            .write_tables(tables, dir),
        OutputFormat::Csv => CsvWriter::new()
            .with_output_unit(settings.output_unit())
            .write_tables(tables, dir),
    }
}

fn report_integrity(tables: &ArchiveTables) -> Result<()> {
    let checker = IntegrityChecker::new();
    let report = checker.check_integrity(tables)?;
    if !report.is_clean() {
        warn!(
            "{} integrity issues in parsed tables",
            report.violations.len()
        );
        println!("\n{}", checker.generate_summary(&report));
    }
    Ok(())
}

fn print_written(settings: &Settings, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        println!("\nWrote {}", path.display());
        if settings.output_format == OutputFormat::Parquet {
            let file_info = ParquetWriter::new().get_file_info(path)?;
            println!("{}", file_info.summary());
        }
    }
    Ok(())
}
