use amax_processor::models::{ArchiveTables, Rainfall};
use amax_processor::processors::IntegrityChecker;
use amax_processor::readers::{ArchiveCollection, ArchiveParser, DuplicateYearPolicy};
use amax_processor::writers::{CsvWriter, ParquetWriter};
use amax_processor::{parse_archive, ProcessingError};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use tempfile::TempDir;

const TEXAS_SAMPLE: &str = "\
1-d, Annual Maximum, WaterYear=1 (January - December), Units in Inches
60-0011, CLEAR CK AT BAY AREA BLVD               , TX,  29.4977,  -95.1599, 2
06/11/1987    6.31
09/02/1988    5.46

60-0019, TURKEY CK AT FM 1959                    , TX,  29.5845,  -95.1869, 28
06/11/1987    3.99
09/02/1988    3.71
";

/// Archive with skipped years, unordered lines, a locality header, a
/// station without data and noise lines.
const RAGGED_ARCHIVE: &str = "\
3-d, Annual Maximum, WaterYear=1 (January - December), Units in Inches
60-0101, BRAYS BAYOU, AT MAIN ST, TX, 29.7066, -95.3978, 41
07/26/1979    9.12
08/17/1983    6.02
06/09/2001   14.20

60-0102, SIMS BAYOU AT HIRAM CLARKE              , TX,  29.6180,  -95.4450, 55
----
05/20/1990    4.80
10/17/1994   11.85
05/19/1989    3.30


60-0103, NEW GAUGE                               , TX,  29.9000,  -95.5000, 60

60-0104, CYPRESS CK AT KATY-HOCKLEY              , TX,  29.9500,  -95.8000, 70
09/19/1998    8.44
";

fn station_years(tables: &ArchiveTables, station_id: u32) -> Vec<i32> {
    tables
        .observations_for(station_id)
        .iter()
        .map(|r| r.year)
        .collect()
}

#[test]
fn test_texas_sample_end_to_end() {
    let tables = parse_archive(TEXAS_SAMPLE).unwrap();

    let ids: Vec<u32> = tables.stations.iter().map(|s| s.station_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let sources: Vec<&str> = tables.stations.iter().map(|s| s.source_id.as_str()).collect();
    assert_eq!(sources, vec!["60-0011", "60-0019"]);
    assert_eq!(tables.stations[1].name, "TURKEY CK AT FM 1959");
    assert!(tables.stations.iter().all(|s| s.years_of_data == 2));

    assert_eq!(station_years(&tables, 1), vec![1987, 1988]);
    assert_eq!(station_years(&tables, 2), vec![1987, 1988]);

    let values: Vec<Option<Rainfall>> = tables.rainfall.iter().map(|r| r.rainfall).collect();
    assert_eq!(
        values,
        vec![
            Some(Rainfall::inches(6.31)),
            Some(Rainfall::inches(5.46)),
            Some(Rainfall::inches(3.99)),
            Some(Rainfall::inches(3.71)),
        ]
    );
}

#[test]
fn test_row_count_and_contiguity_laws() {
    let tables = parse_archive(RAGGED_ARCHIVE).unwrap();

    for station in &tables.stations {
        let years = station_years(&tables, station.station_id);
        assert_eq!(years.len(), station.years_of_data as usize);

        if let (Some(&min), Some(&max)) = (years.iter().min(), years.iter().max()) {
            assert_eq!(years.len() as i32, max - min + 1);
            assert_eq!(years, (min..=max).collect::<Vec<_>>());
        }
    }

    assert_eq!(tables.stations[0].years_of_data, 2001 - 1979 + 1);
    assert_eq!(tables.stations[1].years_of_data, 1994 - 1989 + 1);
    assert_eq!(tables.stations[2].years_of_data, 0);
    assert_eq!(tables.stations[3].years_of_data, 1);
}

#[test]
fn test_referential_integrity() {
    let tables = parse_archive(RAGGED_ARCHIVE).unwrap();

    let ids: Vec<u32> = tables.stations.iter().map(|s| s.station_id).collect();
    assert_eq!(ids, (1..=4).collect::<Vec<u32>>());

    let known: HashSet<u32> = ids.into_iter().collect();
    assert!(tables.rainfall.iter().all(|r| known.contains(&r.station_id)));

    let report = IntegrityChecker::new().check_integrity(&tables).unwrap();
    assert!(report.is_clean(), "{:?}", report.violations);
}

#[test]
fn test_header_arity_dispatch() {
    let six = "header\n60-0101, BRAYS BAYOU, TX, 29.7066, -95.3978, 41\n07/26/1979 9.12\n";
    let seven = "header\n60-0101, BRAYS BAYOU, AT MAIN ST, TX, 29.7066, -95.3978, 41\n07/26/1979 9.12\n";

    let six = parse_archive(six).unwrap();
    let seven = parse_archive(seven).unwrap();

    assert_eq!(six.stations[0].name, "BRAYS BAYOU");
    assert_eq!(seven.stations[0].name, "BRAYS BAYOU, AT MAIN ST");

    let mut renamed = seven.stations[0].clone();
    renamed.name = six.stations[0].name.clone();
    assert_eq!(renamed, six.stations[0]);
    assert_eq!(six.rainfall, seven.rainfall);
}

#[test]
fn test_missing_value_placement() {
    let text = "header\nA-1, GAUGE, TX, 29.0, -95.0, 1\n06/11/1987 6.31\n09/02/1989 5.46\n";
    let tables = parse_archive(text).unwrap();

    assert_eq!(station_years(&tables, 1), vec![1987, 1988, 1989]);

    let gap = &tables.rainfall[1];
    assert_eq!(gap.year, 1988);
    assert_eq!(gap.date, NaiveDate::from_ymd_opt(1988, 1, 1).unwrap());
    assert_eq!(gap.rainfall, None);
}

#[test]
fn test_format_errors_carry_location() {
    let text = TEXAS_SAMPLE.replace("29.5845", "29.58.45");
    let err = parse_archive(&text).unwrap_err();

    assert_eq!(err.block(), Some(2));
    let message = err.to_string();
    assert!(message.contains("latitude"), "{message}");
    assert!(message.contains("line 6"), "{message}");

    let err = parse_archive("header\n60-0011, ONLY, FOUR, FIELDS\n").unwrap_err();
    assert!(matches!(err, ProcessingError::HeaderArity { fields: 4, .. }));

    assert!(matches!(
        parse_archive("header only\n"),
        Err(ProcessingError::EmptyArchive)
    ));
}

#[test]
fn test_duplicate_year_policies() {
    let text = "header\nA-1, GAUGE, TX, 29.0, -95.0, 1\n06/11/1987 6.31\n08/01/1987 7.00\n";

    let kept = ArchiveParser::new().parse(text).unwrap();
    assert_eq!(kept.rainfall.len(), 1);
    assert_eq!(kept.rainfall[0].value(), Some(6.31));

    let rejected = ArchiveParser::new()
        .with_duplicate_policy(DuplicateYearPolicy::Reject)
        .parse(text);
    assert!(matches!(
        rejected,
        Err(ProcessingError::DuplicateYear { year: 1987, .. })
    ));
}

#[test]
fn test_write_both_formats() {
    let tables = parse_archive(RAGGED_ARCHIVE).unwrap();
    let dir = TempDir::new().expect("Failed to create temp directory");

    let writer = ParquetWriter::new();
    let paths = writer
        .write_tables(&tables, &dir.path().join("parquet"))
        .unwrap();
    assert_eq!(writer.get_file_info(&paths[0]).unwrap().total_rows, 4);
    assert_eq!(
        writer.get_file_info(&paths[1]).unwrap().total_rows,
        tables.rainfall.len() as i64
    );

    let paths = CsvWriter::new()
        .write_tables(&tables, &dir.path().join("csv"))
        .unwrap();
    let rainfall = std::fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(rainfall.lines().count(), tables.rainfall.len() + 1);
}

#[tokio::test]
async fn test_directory_of_archives() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(dir.path().join("1-d.txt"), TEXAS_SAMPLE).unwrap();
    std::fs::write(dir.path().join("3-d.txt"), RAGGED_ARCHIVE).unwrap();

    let archives = ArchiveCollection::new(2)
        .with_parser(ArchiveParser::new().with_parallel(true))
        .read_directory(dir.path(), "")
        .await
        .unwrap();

    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0].tables, parse_archive(TEXAS_SAMPLE).unwrap());
    assert_eq!(archives[1].tables.stations.len(), 4);
}
