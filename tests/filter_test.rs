use polars::prelude::*;
use salesdash::dataset::columns;
use salesdash::filter::{self, FilterState};

mod common;

fn column_strings(view: &salesdash::FilteredView, name: &str) -> Vec<String> {
    view.frame()
        .column(name)
        .unwrap()
        .str()
        .unwrap()
        .iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_default_filters_select_everything() {
    let dataset = common::sample_dataset();
    let filters = FilterState::all(&dataset);

    assert!(filters.is_default(&dataset));
    assert_eq!(filters.price_range, (15_000, 38_000));

    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), dataset.height());
    assert!(view.frame().equals(dataset.frame()));
}

#[test]
fn test_company_filter_keeps_row_order() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.clear_companies();
    filters.toggle_company("Audi");

    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 6);
    assert!(column_strings(&view, columns::COMPANY)
        .iter()
        .all(|c| c == "Audi"));

    let prices = view.frame().column(columns::PRICE).unwrap().i64().unwrap();
    let prices: Vec<i64> = prices.iter().flatten().collect();
    let mut sorted = prices.clone();
    sorted.sort();
    assert_eq!(prices, sorted);
    assert_eq!(prices.first(), Some(&16_000));
}

#[test]
fn test_filters_combine_with_and() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.toggle_region("Austin");
    filters.toggle_company("Ford");

    let view = filter::apply(&dataset, &filters).unwrap();
    // Rows where i % 3 != 0 and i % 4 != 0
    assert_eq!(view.height(), 12);
    assert!(!column_strings(&view, columns::DEALER_REGION).contains(&"Austin".to_string()));
    assert!(!column_strings(&view, columns::COMPANY).contains(&"Ford".to_string()));
}

#[test]
fn test_price_range_is_inclusive() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.set_price_min(20_000, &dataset);
    filters.set_price_max(30_000, &dataset);

    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 11);

    let prices = view.frame().column(columns::PRICE).unwrap().i64().unwrap();
    assert_eq!(prices.min(), Some(20_000));
    assert_eq!(prices.max(), Some(30_000));
}

#[test]
fn test_single_price_point() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.set_price_max(25_000, &dataset);
    filters.set_price_min(25_000, &dataset);

    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 1);
}

#[test]
fn test_price_handles_are_clamped() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);

    filters.set_price_min(0, &dataset);
    assert_eq!(filters.price_range.0, 15_000);
    filters.set_price_max(1_000_000, &dataset);
    assert_eq!(filters.price_range.1, 38_000);

    filters.set_price_max(20_000, &dataset);
    filters.set_price_min(25_000, &dataset);
    assert_eq!(filters.price_range, (20_000, 20_000));
}

#[test]
fn test_empty_selection_yields_empty_view() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.clear_regions();

    let view = filter::apply(&dataset, &filters).unwrap();
    assert!(view.is_empty());
    // Schema survives so panels can still look up their columns
    assert_eq!(view.frame().width(), dataset.frame().width());
}

#[test]
fn test_reset_restores_defaults() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.clear_companies();
    filters.set_price_min(30_000, &dataset);
    assert!(!filters.is_default(&dataset));

    filters.reset(&dataset);
    assert!(filters.is_default(&dataset));
}

#[test]
fn test_apply_does_not_modify_dataset() {
    let dataset = common::sample_dataset();
    let before = dataset.frame().clone();
    let mut filters = FilterState::all(&dataset);
    filters.clear_companies();
    filters.toggle_company("BMW");

    let first = filter::apply(&dataset, &filters).unwrap();
    let second = filter::apply(&dataset, &filters).unwrap();
    assert!(first.frame().equals(second.frame()));
    assert!(dataset.frame().equals(&before));
}

#[test]
fn test_ford_filter_keeps_both_regions() {
    let dataset = common::ford_audi_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.companies = ["Ford".to_string()].into_iter().collect();

    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 2);
    assert_eq!(
        column_strings(&view, columns::DEALER_REGION),
        vec!["East", "West"]
    );
}

#[test]
fn test_toggling_a_company_back_restores_the_view() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.toggle_company("Toyota");
    assert_eq!(filter::apply(&dataset, &filters).unwrap().height(), 18);

    filters.toggle_company("Toyota");
    assert!(filters.is_default(&dataset));
    let view = filter::apply(&dataset, &filters).unwrap();
    assert!(view.frame().equals(dataset.frame()));
}
