/// Observation date token format (mm/dd/yyyy)
pub const OBSERVATION_DATE_FORMAT: &str = "%m/%d/%Y";

/// Header layouts, by comma-separated field count
pub const HEADER_FIELDS_STANDARD: usize = 6;
pub const HEADER_FIELDS_WITH_LOCALITY: usize = 7;

/// Unit conversion
pub const MILLIMETERS_PER_INCH: f64 = 25.4;

/// Days from 0001-01-01 to 1970-01-01, for Arrow Date32 values
pub const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Output table names
pub const STATIONS_TABLE: &str = "stations";
pub const RAINFALL_TABLE: &str = "rainfall";

/// Archive discovery
pub const ARCHIVE_EXTENSION: &str = "txt";

/// Environment variable prefix for settings
pub const ENV_PREFIX: &str = "AMAX";

/// Processing defaults
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
