pub mod archive_parser;
pub mod concurrent_reader;
pub mod header_parser;
pub mod series_builder;

pub use archive_parser::{parse_archive, split_blocks, ArchiveParser, StationBlock};
pub use concurrent_reader::{ArchiveCollection, ParsedArchive};
pub use header_parser::{HeaderLayout, HeaderParser};
pub use series_builder::{DuplicateYearPolicy, SeriesBuilder};

/// A line of archive text with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }
}
