use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::OutputFormat;
use crate::error::{ProcessingError, Result};
use crate::models::{ArchiveTables, LengthUnit, RainfallObservation, StationRecord};
use crate::utils::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE, RAINFALL_TABLE, STATIONS_TABLE,
    UNIX_EPOCH_DAYS_FROM_CE,
};
use crate::utils::filename::table_path;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
    output_unit: Option<LengthUnit>,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            output_unit: None,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Convert rainfall values to this unit on write
    pub fn with_output_unit(mut self, unit: LengthUnit) -> Self {
        self.output_unit = Some(unit);
        self
    }

    /// Write both tables as `stations.parquet` and `rainfall.parquet` under `dir`
    pub fn write_tables(&self, tables: &ArchiveTables, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let stations_path = table_path(dir, STATIONS_TABLE, OutputFormat::Parquet);
        let rainfall_path = table_path(dir, RAINFALL_TABLE, OutputFormat::Parquet);

        self.write_stations(&tables.stations, &stations_path)?;
        self.write_rainfall(&tables.rainfall, &rainfall_path)?;

        info!(
            "Wrote {} stations and {} rainfall rows to {}",
            tables.stations.len(),
            tables.rainfall.len(),
            dir.display()
        );

        Ok(vec![stations_path, rainfall_path])
    }

    /// Write the station table. An empty table still produces a file with the schema.
    pub fn write_stations(&self, stations: &[StationRecord], path: &Path) -> Result<()> {
        let schema = Self::station_schema();
        let mut writer = self.create_writer(path, schema.clone())?;

        for chunk in stations.chunks(self.batch_size) {
            let batch = Self::stations_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Write the rainfall table in batches
    pub fn write_rainfall(&self, rows: &[RainfallObservation], path: &Path) -> Result<()> {
        let schema = Self::rainfall_schema();
        let mut writer = self.create_writer(path, schema.clone())?;

        for chunk in rows.chunks(self.batch_size) {
            let batch = self.rainfall_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    fn create_writer(&self, path: &Path, schema: Arc<Schema>) -> Result<ArrowWriter<File>> {
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        Ok(ArrowWriter::try_new(file, schema, Some(props))?)
    }

    fn station_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("station_id", DataType::UInt32, false),
            Field::new("source_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("region", DataType::Utf8, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("years_of_data", DataType::UInt32, false),
        ]))
    }

    fn rainfall_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("station_id", DataType::UInt32, false),
            Field::new("date", DataType::Date32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("rainfall", DataType::Float64, true),
            Field::new("unit", DataType::Utf8, true),
        ]))
    }

    fn stations_to_batch(stations: &[StationRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let station_ids: Vec<u32> = stations.iter().map(|s| s.station_id).collect();
        let source_ids: Vec<&str> = stations.iter().map(|s| s.source_id.as_str()).collect();
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        let regions: Vec<&str> = stations.iter().map(|s| s.region.as_str()).collect();
        let latitudes: Vec<f64> = stations.iter().map(|s| s.latitude).collect();
        let longitudes: Vec<f64> = stations.iter().map(|s| s.longitude).collect();
        let years: Vec<u32> = stations.iter().map(|s| s.years_of_data).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt32Array::from(station_ids)),
                Arc::new(StringArray::from(source_ids)),
                Arc::new(StringArray::from(names)),
                Arc::new(StringArray::from(regions)),
                Arc::new(Float64Array::from(latitudes)),
                Arc::new(Float64Array::from(longitudes)),
                Arc::new(UInt32Array::from(years)),
            ],
        )?;

        Ok(batch)
    }

    fn rainfall_to_batch(
        &self,
        rows: &[RainfallObservation],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let rainfall: Vec<_> = rows
            .iter()
            .map(|r| {
                r.rainfall
                    .map(|depth| self.output_unit.map_or(depth, |unit| depth.to_unit(unit)))
            })
            .collect();

        let station_ids: Vec<u32> = rows.iter().map(|r| r.station_id).collect();
        let dates: Vec<i32> = rows
            .iter()
            .map(|r| r.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        let values: Vec<Option<f64>> = rainfall.iter().map(|r| r.map(|d| d.value)).collect();
        let units: Vec<Option<&str>> = rainfall.iter().map(|r| r.map(|d| d.unit.symbol())).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt32Array::from(station_ids)),
                Arc::new(Date32Array::from(dates)),
                Arc::new(Int32Array::from(years)),
                Arc::new(Float64Array::from(values)),
                Arc::new(StringArray::from(units)),
            ],
        )?;

        Ok(batch)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();
        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            columns,
            file_size,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub columns: Vec<String>,
    pub file_size: u64,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - Columns: {}\n\
            - File size: {:.2} KB\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.columns.join(", "),
            self.file_size as f64 / 1024.0,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::parse_archive;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::{NamedTempFile, TempDir};

    const ARCHIVE: &str = "\
1-d, Annual Maximum
60-0011, CLEAR CK AT BAY AREA BLVD, TX, 29.4977, -95.1599, 2
06/11/1987 6.31
09/02/1989 5.46
";

    #[test]
    fn test_write_tables() -> Result<()> {
        let tables = parse_archive(ARCHIVE)?;
        let dir = TempDir::new()?;
        let writer = ParquetWriter::new();

        let paths = writer.write_tables(&tables, dir.path())?;

        assert_eq!(paths.len(), 2);
        assert_eq!(writer.get_file_info(&paths[0])?.total_rows, 1);

        let info = writer.get_file_info(&paths[1])?;
        assert_eq!(info.total_rows, 3);
        assert_eq!(info.columns, vec!["station_id", "date", "year", "rainfall", "unit"]);

        Ok(())
    }

    #[test]
    fn test_gap_filled_rows_are_null() -> Result<()> {
        let tables = parse_archive(ARCHIVE)?;
        let temp_file = NamedTempFile::new()?;
        ParquetWriter::new().write_rainfall(&tables.rainfall, temp_file.path())?;

        let reader =
            ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?.build()?;
        let batch = reader.into_iter().next().unwrap()?;

        let dates = batch.column(1).as_any().downcast_ref::<Date32Array>().unwrap();
        let values = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();

        // 1987-06-11 is 6370 days after the Unix epoch
        assert_eq!(dates.value(0), 6370);
        assert!(values.is_valid(0));
        assert!(values.is_null(1));
        assert_eq!(values.value(2), 5.46);

        Ok(())
    }

    #[test]
    fn test_output_unit_conversion() -> Result<()> {
        let tables = parse_archive(ARCHIVE)?;
        let temp_file = NamedTempFile::new()?;
        ParquetWriter::new()
            .with_output_unit(LengthUnit::Millimeters)
            .write_rainfall(&tables.rainfall, temp_file.path())?;

        let reader =
            ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?.build()?;
        let batch = reader.into_iter().next().unwrap()?;
        let values = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        let units = batch.column(4).as_any().downcast_ref::<StringArray>().unwrap();

        assert!((values.value(0) - 160.274).abs() < 1e-9);
        assert_eq!(units.value(0), "mm");
        assert!(units.is_null(1));

        Ok(())
    }

    #[test]
    fn test_write_empty_rainfall() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();

        writer.write_rainfall(&[], temp_file.path())?;
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let tables = parse_archive(ARCHIVE)?;

        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_stations(&tables.stations, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-9000").is_err());
        Ok(())
    }
}
