use polars::prelude::*;
use salesdash::statistics::{box_stats, correlation_matrix, histogram, pearson, quantile};

#[test]
fn test_correlation_matrix_computation() -> PolarsResult<()> {
    let n = 100;
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y: Vec<f64> = x.iter().map(|&xi| xi * 2.0 + 5.0).collect();
    let z: Vec<f64> = x.iter().map(|&xi| 100.0 - xi).collect();

    let df = df!("x" => x, "y" => y, "z" => z)?;
    let matrix = correlation_matrix(&df, &["x", "y", "z"])?;

    assert_eq!(matrix.columns, vec!["x", "y", "z"]);
    assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
    assert!((matrix.get(0, 2).unwrap() + 1.0).abs() < 1e-9);
    // Symmetric with a unit diagonal
    for i in 0..3 {
        assert_eq!(matrix.get(i, i), Some(1.0));
        for j in 0..3 {
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
        }
    }
    Ok(())
}

#[test]
fn test_correlation_uses_pairwise_complete_rows() -> PolarsResult<()> {
    let df = df!(
        "a" => &[Some(1_i64), Some(2), None, Some(4)],
        "b" => &[Some(10_i64), Some(20), Some(999), Some(40)]
    )?;
    let matrix = correlation_matrix(&df, &["a", "b"])?;
    assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_correlation_of_mixed_integer_widths() -> PolarsResult<()> {
    let df = df!(
        "year" => &[2022_i32, 2022, 2023, 2023],
        "price" => &[10_000_i64, 12_000, 20_000, 22_000]
    )?;
    let matrix = correlation_matrix(&df, &["year", "price"])?;
    assert!(matrix.get(0, 1).unwrap() > 0.9);
    Ok(())
}

#[test]
fn test_missing_column_is_an_error() {
    let df = df!("a" => &[1.0_f64, 2.0]).unwrap();
    assert!(correlation_matrix(&df, &["a", "missing"]).is_err());
}

#[test]
fn test_pearson_undefined_cases() {
    assert_eq!(pearson(&[1.0], &[2.0]), None);
    assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
}

#[test]
fn test_quantiles_and_box_stats() {
    let values: Vec<f64> = (1..=9).map(|v| v as f64).collect();
    assert_eq!(quantile(&values, 0.5), Some(5.0));
    assert_eq!(quantile(&values, 0.25), Some(3.0));

    let mut with_outlier = values.clone();
    with_outlier.push(100.0);
    let stats = box_stats(&with_outlier).unwrap();
    assert_eq!(stats.n, 10);
    assert_eq!(stats.outliers, 1);
    assert_eq!(stats.upper_whisker, 9.0);
    assert_eq!(stats.max, 100.0);
    assert!(box_stats(&[]).is_none());
}

#[test]
fn test_histogram_edges() {
    let h = histogram(&[0.0, 5.0, 10.0], 2).unwrap();
    assert_eq!(h.counts, vec![1, 2]);
    assert_eq!(h.bin_width, 5.0);

    let flat = histogram(&[7.0, 7.0], 4).unwrap();
    assert_eq!(flat.counts[0], 2);
    assert_eq!(flat.total(), 2);

    assert!(histogram(&[], 10).is_none());
    assert!(histogram(&[1.0], 0).is_none());
}
