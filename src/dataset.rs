//! Sales dataset loading.
//!
//! The source table is read once through [`DatasetHandle::load`], checked
//! against the required schema, and shared read-only as an `Arc<Dataset>`
//! for the rest of the process. Excel workbooks are read with calamine and
//! CSV files with the polars CSV reader; both end up in the same
//! normalization pass (header trimming, Date parsing, integer coercion of
//! Price and Annual Income, derived Year and Month columns).

use crate::cli::FileFormat;
use crate::error_display::user_message_from_polars;
use calamine::{open_workbook_auto, Data, DataType as CellValue, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Column names of the sales table.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const COMPANY: &str = "Company";
    pub const DEALER_NAME: &str = "Dealer_Name";
    pub const DEALER_REGION: &str = "Dealer_Region";
    pub const PRICE: &str = "Price";
    pub const ANNUAL_INCOME: &str = "Annual Income";
    pub const GENDER: &str = "Gender";
    pub const COLOR: &str = "Color";
    pub const TRANSMISSION: &str = "Transmission";
    pub const BODY_STYLE: &str = "Body Style";
    pub const ENGINE: &str = "Engine";
    /// Derived from Date at load time.
    pub const YEAR: &str = "Year";
    /// Derived from Date at load time (1-12).
    pub const MONTH: &str = "Month";

    pub const REQUIRED: [&str; 11] = [
        DATE,
        COMPANY,
        DEALER_NAME,
        DEALER_REGION,
        PRICE,
        ANNUAL_INCOME,
        GENDER,
        COLOR,
        TRANSMISSION,
        BODY_STYLE,
        ENGINE,
    ];

    pub const CATEGORICAL: [&str; 8] = [
        COMPANY,
        DEALER_NAME,
        DEALER_REGION,
        GENDER,
        COLOR,
        TRANSMISSION,
        BODY_STYLE,
        ENGINE,
    ];

    /// Categorical columns the sidebar filters on; nulls are rejected at load.
    pub const FILTER_KEYS: [&str; 2] = [COMPANY, DEALER_REGION];
}

use columns::*;

/// File read when neither the command line nor the config names one.
pub const DEFAULT_DATA_PATH: &str = "synthetic_car_sales.xlsx";

/// Header used for the price column in the published sales workbook.
const PRICE_ALIAS: &str = "Price ($)";

const CSV_INFER_SCHEMA_LENGTH: usize = 10_000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    /// The sales file is missing, unreadable, or does not match the expected schema.
    #[error("Sales data unavailable ({}): {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },
}

fn unavailable(path: &Path, reason: impl Into<String>) -> DataError {
    DataError::DataUnavailable {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Where the sales table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
    /// Overrides extension-based detection.
    pub format: Option<FileFormat>,
    /// Excel sheet: 0-based index or sheet name. Ignored for CSV.
    pub sheet: Option<String>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            sheet: None,
        }
    }

    pub fn with_format(mut self, format: Option<FileFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn resolved_format(&self) -> Option<FileFormat> {
        self.format.or_else(|| FileFormat::from_path(&self.path))
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

/// The loaded sales table plus values precomputed once for the filter controls.
#[derive(Debug)]
pub struct Dataset {
    source: PathBuf,
    frame: DataFrame,
    companies: Vec<String>,
    regions: Vec<String>,
    price_bounds: (i64, i64),
}

impl Dataset {
    /// Validate and normalize an already-read table.
    pub fn from_frame(source: impl Into<PathBuf>, frame: DataFrame) -> Result<Self, DataError> {
        let source = source.into();
        let frame = prepare_frame(frame, &source)?;
        let polars_err = |e: PolarsError| unavailable(&source, user_message_from_polars(&e));

        let companies = distinct_in_order(&frame, COMPANY).map_err(polars_err)?;
        let regions = distinct_in_order(&frame, DEALER_REGION).map_err(polars_err)?;
        let prices = frame.column(PRICE).and_then(|c| c.i64()).map_err(polars_err)?;
        let price_bounds = match (prices.min(), prices.max()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return Err(unavailable(&source, "Price column has no values")),
        };

        Ok(Self {
            source,
            frame,
            companies,
            regions,
            price_bounds,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Distinct Company values in first-encounter order.
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Distinct Dealer_Region values in first-encounter order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// (min, max) of Price over the full table.
    pub fn price_bounds(&self) -> (i64, i64) {
        self.price_bounds
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Once-initialized handle to the sales table. The first successful
/// [`load`](Self::load) reads the file; later calls return the same `Arc`.
#[derive(Debug)]
pub struct DatasetHandle {
    source: DataSource,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetHandle {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<Dataset>, DataError> {
        self.cell
            .get_or_try_init(|| {
                let dataset = read_dataset(&self.source)?;
                info!(
                    path = %dataset.source().display(),
                    rows = dataset.height(),
                    companies = dataset.companies().len(),
                    regions = dataset.regions().len(),
                    price_min = dataset.price_bounds().0,
                    price_max = dataset.price_bounds().1,
                    "sales data loaded"
                );
                Ok(Arc::new(dataset))
            })
            .cloned()
    }
}

fn read_dataset(source: &DataSource) -> Result<Dataset, DataError> {
    let path = source.path.as_path();
    if !path.exists() {
        return Err(unavailable(path, "file not found"));
    }
    if path.is_dir() {
        return Err(unavailable(path, "path is a directory, not a file"));
    }
    let frame = match source.resolved_format() {
        Some(FileFormat::Excel) => read_excel(path, source.sheet.as_deref())?,
        Some(FileFormat::Csv) => {
            read_csv(path).map_err(|e| unavailable(path, user_message_from_polars(&e)))?
        }
        None => {
            return Err(unavailable(
                path,
                "unsupported file type; use .xlsx or .csv, or pass --format",
            ))
        }
    };
    debug!(
        rows = frame.height(),
        cols = frame.width(),
        "raw sales table read"
    );
    Dataset::from_frame(path, frame)
}

fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    let mut read_options = CsvReadOptions::default();
    read_options.has_header = true;
    read_options.infer_schema_length = Some(CSV_INFER_SCHEMA_LENGTH);
    read_options = read_options.map_parse_options(|opts| opts.with_try_parse_dates(true));
    read_options
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn read_excel(path: &Path, sheet: Option<&str>) -> Result<DataFrame, DataError> {
    let excel_err = |e: calamine::Error| unavailable(path, format!("Excel: {}", e));
    let mut workbook = open_workbook_auto(path).map_err(excel_err)?;
    let range = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| unavailable(path, format!("no sheet at index {}", idx)))?
                .map_err(excel_err)?,
            Err(_) => workbook.worksheet_range(sel).map_err(excel_err)?,
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| unavailable(path, "workbook has no worksheets"))?
            .map_err(excel_err)?,
    };

    let rows: Vec<&[Data]> = range.rows().collect();
    let Some((header_row, body)) = rows.split_first() else {
        return Err(unavailable(path, "sheet is empty"));
    };

    let mut cols: Vec<Column> = Vec::with_capacity(header_row.len());
    for (idx, header_cell) in header_row.iter().enumerate() {
        let header = header_cell
            .as_string()
            .unwrap_or_else(|| header_cell.to_string());
        let name = match header.trim() {
            "" => format!("column_{}", idx + 1),
            trimmed => trimmed.to_string(),
        };
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(idx)).collect();
        let series = if name == DATE {
            excel_date_series(&name, &cells)
        } else {
            excel_column_to_series(&name, &cells)
        };
        cols.push(series.into());
    }
    DataFrame::new(cols).map_err(|e| unavailable(path, user_message_from_polars(&e)))
}

/// Numeric columns become Int64 when every value is whole (Excel stores all numbers as floats).
fn excel_column_to_series(name: &str, cells: &[Option<&Data>]) -> Series {
    let mut values = cells.iter().flatten().filter(|c| !c.is_empty()).peekable();
    let has_values = values.peek().is_some();
    let numeric = has_values && values.all(|c| c.is_int() || c.is_float());

    if numeric {
        let whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if whole {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            return Series::new(name.into(), v);
        }
        let v: Vec<Option<f64>> = cells
            .iter()
            .map(|c| c.and_then(|cell| cell.as_f64()))
            .collect();
        return Series::new(name.into(), v);
    }

    let v: Vec<Option<String>> = cells
        .iter()
        .map(|c| c.filter(|cell| !cell.is_empty()).and_then(|cell| cell.as_string()))
        .collect();
    Series::new(name.into(), v)
}

/// Unparseable cells become nulls here and are reported by [`parse_date_column`].
fn excel_date_series(name: &str, cells: &[Option<&Data>]) -> Series {
    let epoch = chrono::DateTime::UNIX_EPOCH.date_naive();
    let v: Vec<Option<i32>> = cells
        .iter()
        .map(|c| {
            c.and_then(excel_cell_to_naive_datetime)
                .map(|dt| (dt.date() - epoch).num_days() as i32)
        })
        .collect();
    let series = Series::new(name.into(), v);
    series.cast(&DataType::Date).unwrap_or(series)
}

/// Converts a calamine cell to NaiveDateTime (Excel serial, DateTimeIso, or parseable string).
fn excel_cell_to_naive_datetime(cell: &Data) -> Option<NaiveDateTime> {
    if let Some(dt) = cell.as_datetime() {
        return Some(dt);
    }
    let s = cell.get_datetime_iso().or_else(|| cell.get_string())?;
    parse_date_str(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a date or datetime string; the time part, if any, is dropped.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

fn prepare_frame(mut df: DataFrame, path: &Path) -> Result<DataFrame, DataError> {
    let polars_err = |e: PolarsError| unavailable(path, user_message_from_polars(&e));

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    for name in &names {
        let trimmed = name.trim();
        let target = if trimmed == PRICE_ALIAS { PRICE } else { trimmed };
        if target != name {
            df.rename(name, target.into()).map_err(polars_err)?;
        }
    }

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|c| df.get_column_index(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(unavailable(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }
    if df.height() == 0 {
        return Err(unavailable(path, "no sales records"));
    }

    let date = parse_date_column(
        df.column(DATE).map_err(polars_err)?.as_materialized_series(),
        path,
    )?;
    df.with_column(date).map_err(polars_err)?;

    for name in [PRICE, ANNUAL_INCOME] {
        let ints = integer_column(
            df.column(name).map_err(polars_err)?.as_materialized_series(),
            path,
        )?;
        df.with_column(ints).map_err(polars_err)?;
    }

    for name in CATEGORICAL {
        let strings = df
            .column(name)
            .and_then(|c| c.cast(&DataType::String))
            .map_err(polars_err)?;
        // Filter keys must be present or the default filters would drop the row
        if FILTER_KEYS.contains(&name) {
            if let Some(idx) = first_null_row(strings.as_materialized_series()) {
                return Err(unavailable(
                    path,
                    format!("{} in row {} is empty", name, sheet_row(idx)),
                ));
            }
        }
        df.with_column(strings).map_err(polars_err)?;
    }

    df.lazy()
        .with_columns([
            col(DATE).dt().year().cast(DataType::Int32).alias(YEAR),
            col(DATE).dt().month().cast(DataType::Int32).alias(MONTH),
        ])
        .collect()
        .map_err(polars_err)
}

fn first_null_row(series: &Series) -> Option<usize> {
    series
        .is_null()
        .iter()
        .position(|is_null| is_null == Some(true))
}

/// Sheet row number for a 0-based data row (1-based, after the header).
fn sheet_row(idx: usize) -> usize {
    idx + 2
}

fn parse_date_column(series: &Series, path: &Path) -> Result<Series, DataError> {
    let polars_err = |e: PolarsError| unavailable(path, user_message_from_polars(&e));
    let parsed = match series.dtype() {
        DataType::Date => series.clone(),
        DataType::Datetime(_, _) => series.cast(&DataType::Date).map_err(polars_err)?,
        DataType::String => {
            let epoch = chrono::DateTime::UNIX_EPOCH.date_naive();
            let ca = series.str().map_err(polars_err)?;
            let mut days = Vec::with_capacity(ca.len());
            for (idx, value) in ca.iter().enumerate() {
                let date = value.and_then(parse_date_str).ok_or_else(|| {
                    let what = match value {
                        Some(v) => format!("not a date: {:?}", v),
                        None => "empty".to_string(),
                    };
                    unavailable(path, format!("Date in row {} is {}", sheet_row(idx), what))
                })?;
                days.push((date - epoch).num_days() as i32);
            }
            Series::new(DATE.into(), days)
                .cast(&DataType::Date)
                .map_err(polars_err)?
        }
        other => {
            return Err(unavailable(
                path,
                format!("Date column has unsupported type {}", other),
            ))
        }
    };
    if let Some(idx) = first_null_row(&parsed) {
        return Err(unavailable(
            path,
            format!("Date in row {} is empty or not a date", sheet_row(idx)),
        ));
    }
    Ok(parsed)
}

fn integer_column(series: &Series, path: &Path) -> Result<Series, DataError> {
    let polars_err = |e: PolarsError| unavailable(path, user_message_from_polars(&e));
    let name = series.name().to_string();
    let ints = match series.dtype() {
        dt if dt.is_integer() => series.cast(&DataType::Int64).map_err(polars_err)?,
        DataType::Float32 | DataType::Float64 => {
            let floats = series.cast(&DataType::Float64).map_err(polars_err)?;
            let ca = floats.f64().map_err(polars_err)?;
            if let Some(idx) = ca
                .iter()
                .position(|v| v.is_some_and(|f| !f.is_finite() || f.fract() != 0.0))
            {
                return Err(unavailable(
                    path,
                    format!("{} in row {} is not a whole number", name, sheet_row(idx)),
                ));
            }
            floats.cast(&DataType::Int64).map_err(polars_err)?
        }
        other => {
            return Err(unavailable(
                path,
                format!("{} must be numeric, found {}", name, other),
            ))
        }
    };
    if let Some(idx) = first_null_row(&ints) {
        return Err(unavailable(
            path,
            format!("{} in row {} is empty", name, sheet_row(idx)),
        ));
    }
    Ok(ints)
}

fn distinct_in_order(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let ca = df.column(name)?.str()?;
    let mut seen = HashSet::new();
    Ok(ca
        .iter()
        .flatten()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect())
}
