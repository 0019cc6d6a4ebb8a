#![allow(dead_code)]

use polars::prelude::*;
use salesdash::Dataset;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const COMPANIES: [&str; 4] = ["Ford", "Audi", "BMW", "Toyota"];
pub const REGIONS: [&str; 3] = ["Austin", "Janesville", "Scottsdale"];
pub const BODY_STYLES: [&str; 4] = ["SUV", "Sedan", "Hatchback", "Passenger"];

/// Sales table with `n` rows. Row `i` is sold in 2022 (i < 12) or 2023, month
/// `i % 12 + 1`, by dealer `i % 12`, at price `15000 + 1000 * i`.
pub fn sales_frame(n: usize) -> DataFrame {
    let rows: Vec<usize> = (0..n).collect();
    df!(
        "Date" => rows
            .iter()
            .map(|i| format!("{}-{:02}-15", 2022 + (i / 12) % 2, i % 12 + 1))
            .collect::<Vec<String>>(),
        "Company" => rows.iter().map(|i| COMPANIES[i % 4]).collect::<Vec<&str>>(),
        "Dealer_Name" => rows
            .iter()
            .map(|i| format!("Dealer {:02}", i % 12))
            .collect::<Vec<String>>(),
        "Dealer_Region" => rows.iter().map(|i| REGIONS[i % 3]).collect::<Vec<&str>>(),
        "Price ($)" => rows.iter().map(|i| 15_000 + 1_000 * *i as i64).collect::<Vec<i64>>(),
        "Annual Income" => rows.iter().map(|i| 50_000 + 5_000 * *i as i64).collect::<Vec<i64>>(),
        "Gender" => rows
            .iter()
            .map(|i| if i % 2 == 0 { "Male" } else { "Female" })
            .collect::<Vec<&str>>(),
        "Color" => rows
            .iter()
            .map(|i| ["Pale White", "Black", "Red"][i % 3])
            .collect::<Vec<&str>>(),
        "Transmission" => rows
            .iter()
            .map(|i| if i % 4 == 3 { "Manual" } else { "Auto" })
            .collect::<Vec<&str>>(),
        "Body Style" => rows.iter().map(|i| BODY_STYLES[i % 4]).collect::<Vec<&str>>(),
        "Engine" => rows
            .iter()
            .map(|i| if i % 2 == 0 { "Overhead Camshaft" } else { "Double Overhead Camshaft" })
            .collect::<Vec<&str>>()
    )
    .unwrap()
}

/// The 24-row table used by most tests: two years, twelve dealers, two sales each.
pub fn sample_dataset() -> Dataset {
    Dataset::from_frame("sample.csv", sales_frame(24)).unwrap()
}

/// Write `df` as CSV into `dir` and return the path.
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Two Ford sales in 2022 and one Audi sale in 2023.
pub fn ford_audi_dataset() -> Dataset {
    let df = df!(
        "Date" => &["2022-04-01", "2022-09-15", "2023-02-20"],
        "Company" => &["Ford", "Ford", "Audi"],
        "Dealer_Name" => &["Dealer 01", "Dealer 02", "Dealer 01"],
        "Dealer_Region" => &["East", "West", "East"],
        "Price ($)" => &[20_000_i64, 30_000, 50_000],
        "Annual Income" => &[60_000_i64, 75_000, 140_000],
        "Gender" => &["Male", "Female", "Male"],
        "Color" => &["Red", "Black", "Pale White"],
        "Transmission" => &["Auto", "Manual", "Auto"],
        "Body Style" => &["SUV", "Sedan", "SUV"],
        "Engine" => &["Overhead Camshaft", "Double Overhead Camshaft", "Overhead Camshaft"]
    )
    .unwrap();
    Dataset::from_frame("ford_audi.csv", df).unwrap()
}
