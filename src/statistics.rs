use polars::prelude::*;

/// Multiplier applied to the interquartile range for the Tukey outlier fences.
pub const TUKEY_FENCE: f64 = 1.5;

/// Numeric column values as f64, nulls dropped. Non-numeric columns yield an empty vec.
pub fn numeric_values(series: &Series) -> Vec<f64> {
    if let Ok(f64_series) = series.f64() {
        return f64_series.iter().flatten().collect();
    }
    if let Ok(i64_series) = series.i64() {
        return i64_series.iter().flatten().map(|x| x as f64).collect();
    }
    if let Ok(i32_series) = series.i32() {
        return i32_series.iter().flatten().map(|x| x as f64).collect();
    }
    if !series.dtype().is_numeric() {
        return Vec::new();
    }
    match series.cast(&DataType::Float64) {
        Ok(cast_series) => match cast_series.f64() {
            Ok(ca) => ca.iter().flatten().collect(),
            Err(_) => Vec::new(),
        },
        Err(_) => Vec::new(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pearson correlation coefficient. `None` when there are fewer than two
/// pairs or either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let numerator: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let var_x: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let var_y: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((numerator / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` square. `None` marks an undefined coefficient.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// Pairwise Pearson correlation over the named columns, using the rows where both values are present.
pub fn correlation_matrix(df: &DataFrame, names: &[&str]) -> PolarsResult<CorrelationMatrix> {
    let n = names.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let col1 = df.column(names[i])?;
            let col2 = df.column(names[j])?;

            let mask = col1.is_not_null() & col2.is_not_null();
            let col1_clean = col1.filter(&mask)?;
            let col2_clean = col2.filter(&mask)?;
            let xs = numeric_values(col1_clean.as_materialized_series());
            let ys = numeric_values(col2_clean.as_materialized_series());

            // A column correlates perfectly with itself only if it varies.
            let r = if i == j {
                pearson(&xs, &ys).map(|_| 1.0)
            } else {
                pearson(&xs, &ys)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: names.iter().map(|s| s.to_string()).collect(),
        values,
    })
}

/// Linear-interpolated quantile of sorted values (`q` in [0, 1]).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Smallest value at or above the lower fence.
    pub lower_whisker: f64,
    /// Largest value at or below the upper fence.
    pub upper_whisker: f64,
    pub outliers: usize,
}

impl BoxStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn fences(&self) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - TUKEY_FENCE * iqr, self.q3 + TUKEY_FENCE * iqr)
    }
}

/// Five-number summary with Tukey whiskers. `None` for empty input.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower_fence = q1 - TUKEY_FENCE * iqr;
    let upper_fence = q3 + TUKEY_FENCE * iqr;

    let inside = || sorted.iter().copied().filter(|v| *v >= lower_fence && *v <= upper_fence);
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .filter(|v| **v < lower_fence || **v > upper_fence)
        .count();

    Some(BoxStats {
        n: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        mean: mean(&sorted)?,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Left edge of bin `idx`.
    pub fn bin_start(&self, idx: usize) -> f64 {
        self.min + self.bin_width * idx as f64
    }

    pub fn bin_center(&self, idx: usize) -> f64 {
        self.bin_start(idx) + self.bin_width / 2.0
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Equal-width bins over [min, max]; the last bin is closed on the right.
/// When every value is equal the first bin holds them all.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let min = finite.iter().copied().reduce(f64::min)?;
    let max = finite.iter().copied().reduce(f64::max)?;

    let span = max - min;
    let bin_width = if span > 0.0 { span / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = if span > 0.0 {
            (((v - min) / bin_width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Some(Histogram {
        min,
        max,
        bin_width,
        counts,
    })
}
