//! Sidebar filter selections and the filtered view every panel reads.

use crate::dataset::{columns, Dataset};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Current selections of the three filter controls.
///
/// Companies and regions are membership sets (an empty set selects nothing);
/// the price range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub companies: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub price_range: (i64, i64),
}

impl FilterState {
    /// All companies, all regions, the full price range of the dataset.
    pub fn all(dataset: &Dataset) -> Self {
        Self {
            companies: dataset.companies().iter().cloned().collect(),
            regions: dataset.regions().iter().cloned().collect(),
            price_range: dataset.price_bounds(),
        }
    }

    pub fn reset(&mut self, dataset: &Dataset) {
        *self = Self::all(dataset);
    }

    pub fn is_default(&self, dataset: &Dataset) -> bool {
        *self == Self::all(dataset)
    }

    pub fn toggle_company(&mut self, company: &str) {
        toggle(&mut self.companies, company);
    }

    pub fn toggle_region(&mut self, region: &str) {
        toggle(&mut self.regions, region);
    }

    pub fn select_all_companies(&mut self, dataset: &Dataset) {
        self.companies = dataset.companies().iter().cloned().collect();
    }

    pub fn clear_companies(&mut self) {
        self.companies.clear();
    }

    pub fn select_all_regions(&mut self, dataset: &Dataset) {
        self.regions = dataset.regions().iter().cloned().collect();
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
    }

    /// Move the lower handle, clamped to `[dataset min, current max]`.
    pub fn set_price_min(&mut self, value: i64, dataset: &Dataset) {
        let (lo, _) = dataset.price_bounds();
        self.price_range.0 = value.clamp(lo, self.price_range.1);
    }

    /// Move the upper handle, clamped to `[current min, dataset max]`.
    pub fn set_price_max(&mut self, value: i64, dataset: &Dataset) {
        let (_, hi) = dataset.price_bounds();
        self.price_range.1 = value.clamp(self.price_range.0, hi);
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// Rows of the loaded table passing every filter, in original order.
#[derive(Debug, Clone)]
pub struct FilteredView {
    frame: DataFrame,
}

impl FilteredView {
    /// Wrap a frame that already has the loaded table's schema.
    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Select the rows satisfying all three predicates.
pub fn apply(dataset: &Dataset, filters: &FilterState) -> PolarsResult<FilteredView> {
    let df = dataset.frame();
    let (lo, hi) = filters.price_range;
    let predicate = any_of(columns::COMPANY, &filters.companies)
        .and(any_of(columns::DEALER_REGION, &filters.regions))
        .and(col(columns::PRICE).gt_eq(lit(lo)))
        .and(col(columns::PRICE).lt_eq(lit(hi)));
    let frame = df.clone().lazy().filter(predicate).collect()?;

    debug!(
        rows = frame.height(),
        total = df.height(),
        companies = filters.companies.len(),
        regions = filters.regions.len(),
        price_min = filters.price_range.0,
        price_max = filters.price_range.1,
        "filters applied"
    );
    Ok(FilteredView { frame })
}

/// `name` equals one of `values`; an empty set matches nothing.
fn any_of(name: &str, values: &BTreeSet<String>) -> Expr {
    values
        .iter()
        .map(|v| col(name).eq(lit(v.clone())))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or_else(|| lit(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let df = df!(
            "Date" => &["2022-01-15", "2022-03-02", "2023-11-30", "2023-12-01"],
            "Company" => &["Ford", "Audi", "Ford", "BMW"],
            "Dealer_Name" => &["A", "B", "A", "C"],
            "Dealer_Region" => &["East", "West", "West", "East"],
            "Price" => &[20000_i64, 30000, 50000, 40000],
            "Annual Income" => &[60000_i64, 80000, 120000, 90000],
            "Gender" => &["Male", "Female", "Male", "Female"],
            "Color" => &["Red", "Black", "Red", "Pale White"],
            "Transmission" => &["Auto", "Manual", "Auto", "Auto"],
            "Body Style" => &["SUV", "Sedan", "SUV", "Hatchback"],
            "Engine" => &["V6", "I4", "V6", "I4"]
        )
        .unwrap();
        Dataset::from_frame("mem", df).unwrap()
    }

    #[test]
    fn toggle_adds_and_removes() {
        let ds = dataset();
        let mut f = FilterState::all(&ds);
        f.toggle_company("Ford");
        assert!(!f.companies.contains("Ford"));
        f.toggle_company("Ford");
        assert!(f.companies.contains("Ford"));
        assert!(f.is_default(&ds));
    }

    #[test]
    fn price_handles_never_cross() {
        let ds = dataset();
        let mut f = FilterState::all(&ds);
        f.set_price_max(25000, &ds);
        f.set_price_min(45000, &ds);
        assert_eq!(f.price_range, (25000, 25000));
        f.set_price_max(1_000_000, &ds);
        assert_eq!(f.price_range, (25000, 50000));
        f.set_price_min(0, &ds);
        assert_eq!(f.price_range, (20000, 50000));
    }

    #[test]
    fn apply_combines_predicates() {
        let ds = dataset();
        let mut f = FilterState::all(&ds);
        f.regions = ["West".to_string()].into_iter().collect();
        f.set_price_max(45000, &ds);
        let view = apply(&ds, &f).unwrap();
        assert_eq!(view.height(), 1);
        let company = view.frame().column("Company").unwrap().str().unwrap().get(0);
        assert_eq!(company, Some("Audi"));
    }

    #[test]
    fn default_filters_keep_every_row() {
        let ds = dataset();
        let view = apply(&ds, &FilterState::all(&ds)).unwrap();
        assert!(view.frame().equals(ds.frame()));
    }

    #[test]
    fn cleared_companies_give_empty_view() {
        let ds = dataset();
        let mut f = FilterState::all(&ds);
        f.clear_companies();
        let view = apply(&ds, &f).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.frame().width(), ds.frame().width());
    }
}
