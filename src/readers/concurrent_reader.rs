use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{ProcessingError, Result};
use crate::models::ArchiveTables;
use crate::readers::ArchiveParser;
use crate::utils::constants::ARCHIVE_EXTENSION;

/// Parsed tables for one archive file
#[derive(Debug, Clone)]
pub struct ParsedArchive {
    pub path: PathBuf,
    pub tables: ArchiveTables,
}

/// Reads and parses a directory of archives (e.g. one file per storm
/// duration) on tokio's blocking pool, at most `max_workers` at a time.
pub struct ArchiveCollection {
    max_workers: usize,
    parser: ArchiveParser,
}

impl ArchiveCollection {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            parser: ArchiveParser::new(),
        }
    }

    pub fn with_parser(mut self, parser: ArchiveParser) -> Self {
        self.parser = parser;
        self
    }

    /// Find archive files in a directory, sorted by path.
    ///
    /// An empty `file_pattern` matches every `.txt` file.
    pub fn find_archives(&self, dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let is_archive = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
                .unwrap_or(false);
            let matches_pattern = path
                .file_name()
                .map(|name| name.to_string_lossy().contains(file_pattern))
                .unwrap_or(false);

            if is_archive && matches_pattern {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Parse every archive in `dir`. Fails on the first archive (in path
    /// order) that fails to read or parse.
    pub async fn read_directory(&self, dir: &Path, file_pattern: &str) -> Result<Vec<ParsedArchive>> {
        let files = self.find_archives(dir, file_pattern)?;
        info!(
            "Found {} archives in {} ({} workers)",
            files.len(),
            dir.display(),
            self.max_workers
        );
        self.read_archives(files).await
    }

    pub async fn read_archives(&self, files: Vec<PathBuf>) -> Result<Vec<ParsedArchive>> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut handles: Vec<JoinHandle<Result<ParsedArchive>>> = Vec::with_capacity(files.len());

        for path in files {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ProcessingError::Config(format!("Worker pool closed: {}", e)))?;
            let parser = self.parser.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                debug!("Parsing archive {}", path.display());
                let tables = parser.read_archive(&path)?;
                Ok(ParsedArchive { path, tables })
            }));
        }

        let mut archives = Vec::with_capacity(handles.len());
        for handle in handles {
            archives.push(handle.await??);
        }

        Ok(archives)
    }
}

impl Default for ArchiveCollection {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn archive(source_id: &str, value: f64) -> String {
        format!(
            "1-d, Annual Maximum\n{source_id}, TEST GAUGE, TX, 29.5, -95.1, 10\n06/11/1987 {value}\n07/01/1989 {value}\n"
        )
    }

    #[tokio::test]
    async fn test_read_directory_in_path_order() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("2-d.txt"), archive("60-0002", 2.0))?;
        fs::write(dir.path().join("1-d.txt"), archive("60-0001", 1.0))?;
        fs::write(dir.path().join("notes.md"), "not an archive")?;

        let collection = ArchiveCollection::new(2);
        let archives = collection.read_directory(dir.path(), "").await?;

        assert_eq!(archives.len(), 2);
        assert!(archives[0].path.ends_with("1-d.txt"));
        assert_eq!(archives[0].tables.stations[0].source_id, "60-0001");
        assert_eq!(archives[1].tables.stations[0].years_of_data, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_file_pattern_filters_archives() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("1-d.txt"), archive("60-0001", 1.0))?;
        fs::write(dir.path().join("3-d.txt"), archive("60-0003", 3.0))?;

        let collection = ArchiveCollection::new(1);
        let archives = collection.read_directory(dir.path(), "3-d").await?;

        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].tables.stations[0].source_id, "60-0003");

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_archive_fails_collection() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("1-d.txt"), archive("60-0001", 1.0))?;
        fs::write(dir.path().join("2-d.txt"), "header\nbad, header\n")?;

        let collection = ArchiveCollection::new(4);
        let result = collection.read_directory(dir.path(), "").await;

        assert!(matches!(result, Err(ProcessingError::HeaderArity { .. })));
        Ok(())
    }
}
