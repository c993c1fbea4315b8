use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

use crate::config::OutputFormat;

/// Generate default output directory with format: output/amax-{YYMMDD}
pub fn generate_default_output_dir() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    PathBuf::from("output").join(format!("amax-{:02}{:02}{:02}", year, month, day))
}

/// Path of one output table inside an output directory
pub fn table_path(dir: &Path, table: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", table, format.extension()))
}

/// Output sub-directory for one archive of a directory run, named after the file stem
pub fn archive_output_dir(base: &Path, archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    base.join(stem)
}
