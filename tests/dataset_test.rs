use polars::prelude::*;
use salesdash::cli::FileFormat;
use salesdash::dataset::columns;
use salesdash::{DataError, DataSource, DatasetHandle};
use std::sync::Arc;
use tempfile::TempDir;

mod common;

fn reason(err: DataError) -> String {
    match err {
        DataError::DataUnavailable { reason, .. } => reason,
    }
}

#[test]
fn test_load_csv() {
    let dir = TempDir::new().unwrap();
    let path = common::write_csv(dir.path(), "sales.csv", &mut common::sales_frame(24));

    let handle = DatasetHandle::new(DataSource::new(&path));
    let dataset = handle.load().expect("CSV should load");

    assert_eq!(dataset.height(), 24);
    assert_eq!(dataset.source(), path.as_path());
    assert_eq!(dataset.companies(), common::COMPANIES.map(String::from).as_slice());
    assert_eq!(dataset.regions(), common::REGIONS.map(String::from).as_slice());
    assert_eq!(dataset.price_bounds(), (15_000, 38_000));

    let frame = dataset.frame();
    assert_eq!(frame.column(columns::DATE).unwrap().dtype(), &DataType::Date);
    assert_eq!(frame.column(columns::PRICE).unwrap().dtype(), &DataType::Int64);
    let years = frame.column(columns::YEAR).unwrap().i32().unwrap();
    assert_eq!(years.get(0), Some(2022));
    assert_eq!(years.get(23), Some(2023));
    let months = frame.column(columns::MONTH).unwrap().i32().unwrap();
    assert_eq!(months.get(11), Some(12));
}

#[test]
fn test_load_is_memoized() {
    let dir = TempDir::new().unwrap();
    let path = common::write_csv(dir.path(), "sales.csv", &mut common::sales_frame(6));

    let handle = DatasetHandle::new(DataSource::new(&path));
    assert!(!handle.is_loaded());
    let first = handle.load().unwrap();
    assert!(handle.is_loaded());

    // Later reads never touch the file again
    std::fs::remove_file(&path).unwrap();
    let second = handle.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_failed_load_is_not_cached() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("late.csv");

    let handle = DatasetHandle::new(DataSource::new(&path));
    let err = handle.load().unwrap_err();
    assert!(reason(err).contains("file not found"));
    assert!(!handle.is_loaded());

    common::write_csv(dir.path(), "late.csv", &mut common::sales_frame(3));
    assert_eq!(handle.load().unwrap().height(), 3);
}

#[test]
fn test_directory_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = DatasetHandle::new(DataSource::new(dir.path()))
        .load()
        .unwrap_err();
    assert!(reason(err).contains("directory"));
}

#[test]
fn test_missing_columns_are_listed() {
    let dir = TempDir::new().unwrap();
    let mut df = common::sales_frame(4).drop_many(["Engine", "Gender"]);
    let path = common::write_csv(dir.path(), "partial.csv", &mut df);

    let err = DatasetHandle::new(DataSource::new(&path))
        .load()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("missing required column(s)"), "{}", message);
    assert!(message.contains("Gender"));
    assert!(message.contains("Engine"));
    assert!(message.contains("partial.csv"));
}

#[test]
fn test_header_only_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut df = common::sales_frame(0);
    let path = common::write_csv(dir.path(), "empty.csv", &mut df);

    let err = DatasetHandle::new(DataSource::new(&path))
        .load()
        .unwrap_err();
    assert!(reason(err).contains("no sales records"));
}

#[test]
fn test_empty_price_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut df = common::sales_frame(3);
    df.with_column(Series::new(
        "Price ($)".into(),
        &[Some(20_000_i64), None, Some(30_000)],
    ))
    .unwrap();
    let path = common::write_csv(dir.path(), "gaps.csv", &mut df);

    let err = DatasetHandle::new(DataSource::new(&path))
        .load()
        .unwrap_err();
    assert_eq!(reason(err), "Price in row 3 is empty");
}

#[test]
fn test_format_override_bypasses_extension() {
    let dir = TempDir::new().unwrap();
    let path = common::write_csv(dir.path(), "export.dat", &mut common::sales_frame(5));

    let detected = DatasetHandle::new(DataSource::new(&path)).load();
    assert!(reason(detected.unwrap_err()).contains("unsupported file type"));

    let forced = DatasetHandle::new(DataSource::new(&path).with_format(Some(FileFormat::Csv)))
        .load()
        .expect("forced CSV should load");
    assert_eq!(forced.height(), 5);
}

#[test]
fn test_default_source_points_at_workbook() {
    let source = DataSource::default();
    assert_eq!(
        source.path,
        std::path::PathBuf::from(salesdash::dataset::DEFAULT_DATA_PATH)
    );
    assert_eq!(source.resolved_format(), Some(FileFormat::Excel));
}

#[test]
fn test_empty_company_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut df = common::sales_frame(3);
    df.with_column(Series::new(
        "Company".into(),
        &[Some("Ford"), None, Some("Audi")],
    ))
    .unwrap();
    let path = common::write_csv(dir.path(), "gaps.csv", &mut df);

    let err = DatasetHandle::new(DataSource::new(&path))
        .load()
        .unwrap_err();
    assert_eq!(reason(err), "Company in row 3 is empty");
}
