//! Number formatting and point preparation shared by the panel renderers.

use crate::panels::Breakdown;

/// Insert thousands separators into the integer part of a number.
pub fn format_number_with_commas(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.insert(0, '-');
    }
    result
}

/// Dollar amount rounded to whole dollars, e.g. `$1,234,567`.
pub fn format_currency(v: f64) -> String {
    let rounded = v.round() as i64;
    if rounded < 0 {
        format!("-${}", format_number_with_commas(-rounded))
    } else {
        format!("${}", format_number_with_commas(rounded))
    }
}

/// Value text for a breakdown entry, based on what the breakdown measures.
pub fn format_measure(measure: &str, v: f64) -> String {
    if measure.contains('$') {
        format_currency(v)
    } else {
        format_number_with_commas(v.round() as i64)
    }
}

/// Compact tick label: `12.3k`, `4.5M`.
pub fn format_compact(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

pub fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter month name for 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_ABBREVIATIONS.get(month.checked_sub(1)? as usize).copied()
}

/// Points for a line chart. Numeric keys (years, months) are used as x
/// directly; otherwise entries are placed at 0, 1, 2, ...
pub fn line_points(breakdown: &Breakdown) -> Vec<(f64, f64)> {
    let numeric: Option<Vec<f64>> = breakdown
        .entries
        .iter()
        .map(|(k, _)| k.parse::<f64>().ok())
        .collect();
    match numeric {
        Some(xs) => xs
            .into_iter()
            .zip(breakdown.entries.iter())
            .map(|(x, (_, y))| (x, *y))
            .collect(),
        None => breakdown
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, y))| (i as f64, *y))
            .collect(),
    }
}

/// Min and max of x and y over all points. Degenerate ranges are widened so
/// the result is always usable as axis bounds.
pub fn bounds<'a, I>(points: I) -> Option<([f64; 2], [f64; 2])>
where
    I: IntoIterator<Item = &'a (f64, f64)>,
{
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    let mut any = false;
    for &(px, py) in points {
        if !px.is_finite() || !py.is_finite() {
            continue;
        }
        any = true;
        x = [x[0].min(px), x[1].max(px)];
        y = [y[0].min(py), y[1].max(py)];
    }
    if !any {
        return None;
    }
    if x[1] <= x[0] {
        x = [x[0] - 0.5, x[0] + 0.5];
    }
    if y[1] <= y[0] {
        y = [y[0] - 0.5, y[0] + 0.5];
    }
    Some((x, y))
}

/// Evenly thin `points` to at most `limit`, keeping first and order.
pub fn sample_points(points: &[(f64, f64)], limit: usize) -> Vec<(f64, f64)> {
    if limit == 0 {
        return Vec::new();
    }
    if points.len() <= limit {
        return points.to_vec();
    }
    let step = points.len() as f64 / limit as f64;
    (0..limit)
        .map(|i| points[((i as f64 * step) as usize).min(points.len() - 1)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_group_thousands() {
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(999), "999");
        assert_eq!(format_number_with_commas(1000), "1,000");
        assert_eq!(format_number_with_commas(-1234567), "-1,234,567");
    }

    #[test]
    fn currency_rounds_to_dollars() {
        assert_eq!(format_currency(24999.6), "$25,000");
        assert_eq!(format_currency(-12.0), "-$12");
        assert_eq!(format_measure("Revenue ($)", 1500.0), "$1,500");
        assert_eq!(format_measure("Sales Count", 1500.0), "1,500");
    }

    #[test]
    fn months_are_one_based() {
        assert_eq!(month_name(1), Some("Jan"));
        assert_eq!(month_name(12), Some("Dec"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn line_points_use_numeric_keys() {
        let breakdown = Breakdown {
            key: "Year",
            measure: "Sales Count",
            entries: vec![("2022".into(), 3.0), ("2023".into(), 5.0)],
        };
        assert_eq!(line_points(&breakdown), vec![(2022.0, 3.0), (2023.0, 5.0)]);

        let categorical = Breakdown {
            key: "Engine",
            measure: "Sales Count",
            entries: vec![("V6".into(), 3.0), ("I4".into(), 5.0)],
        };
        assert_eq!(line_points(&categorical), vec![(0.0, 3.0), (1.0, 5.0)]);
    }

    #[test]
    fn bounds_widen_single_point() {
        let (x, y) = bounds(&[(2022.0, 10.0)]).unwrap();
        assert_eq!(x, [2021.5, 2022.5]);
        assert_eq!(y, [9.5, 10.5]);
        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn sampling_caps_point_count() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, i as f64)).collect();
        let sampled = sample_points(&points, 5);
        assert_eq!(sampled.len(), 5);
        assert_eq!(sampled[0], (0.0, 0.0));
        assert_eq!(sample_points(&points, 20).len(), 10);
    }
}
