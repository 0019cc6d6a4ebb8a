use salesdash::filter::{self, FilterState};
use salesdash::panels::{
    compute_panel, PanelData, PanelError, PanelId, PanelSet, Tab, PREVIEW_ROWS, TOP_N,
};
use salesdash::{Dataset, FilteredView};

mod common;

fn full_view(dataset: &Dataset) -> FilteredView {
    filter::apply(dataset, &FilterState::all(dataset)).unwrap()
}

fn labels(data: &PanelData) -> Vec<String> {
    let breakdown = match data {
        PanelData::Bar(b) | PanelData::Line(b) | PanelData::Pie(b) | PanelData::Ranking(b) => b,
        other => panic!("not a breakdown panel: {:?}", other),
    };
    breakdown.labels().map(str::to_string).collect()
}

#[test]
fn test_every_panel_computes_on_sample() {
    let dataset = common::sample_dataset();
    let panels = PanelSet::compute_all(&full_view(&dataset));

    assert_eq!(panels.iter().count(), 21);
    for (id, result) in panels.iter() {
        assert!(result.is_ok(), "panel {} failed: {:?}", id.title(), result);
    }
}

#[test]
fn test_empty_view_gives_every_panel_its_notice() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.clear_companies();
    let view = filter::apply(&dataset, &filters).unwrap();

    let panels = PanelSet::compute_all(&view);
    for (id, result) in panels.iter() {
        assert_eq!(result, &Err(PanelError::EmptyFilterResult(id.empty_notice())));
    }
}

#[test]
fn test_sales_by_year_counts_rows() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::SalesByYear, &full_view(&dataset)).unwrap();

    let PanelData::Bar(b) = data else {
        panic!("expected a bar chart");
    };
    assert_eq!(
        b.entries,
        vec![("2022".to_string(), 12.0), ("2023".to_string(), 12.0)]
    );
    assert_eq!(b.total(), dataset.height() as f64);
}

#[test]
fn test_average_price_by_year() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::AvgPriceByYear, &full_view(&dataset)).unwrap();

    let PanelData::Line(b) = data else {
        panic!("expected a line chart");
    };
    // 2022 rows are i = 0..12, 2023 rows are i = 12..24
    assert_eq!(b.value_of("2022"), Some(20_500.0));
    assert_eq!(b.value_of("2023"), Some(32_500.0));
}

#[test]
fn test_monthly_trend_is_in_month_order() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::MonthlySalesTrend, &full_view(&dataset)).unwrap();

    let expected: Vec<String> = (1..=12).map(|m| m.to_string()).collect();
    assert_eq!(labels(&data), expected);
}

#[test]
fn test_top_dealers_by_revenue_truncates_to_ten() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::TopDealersByRevenue, &full_view(&dataset)).unwrap();

    let PanelData::Bar(b) = data else {
        panic!("expected a bar chart");
    };
    assert_eq!(b.len(), TOP_N as usize);
    // Dealer k sold rows k and k + 12
    assert_eq!(b.entries[0], ("Dealer 11".to_string(), 64_000.0));
    assert_eq!(b.entries[9], ("Dealer 02".to_string(), 46_000.0));
    assert!(b.value_of("Dealer 00").is_none());
}

#[test]
fn test_ranking_ties_keep_encounter_order() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::TopDealersBySales, &full_view(&dataset)).unwrap();

    assert!(matches!(data, PanelData::Ranking(_)));
    let expected: Vec<String> = (0..10).map(|k| format!("Dealer {:02}", k)).collect();
    assert_eq!(labels(&data), expected);
}

#[test]
fn test_short_top_n_is_not_padded() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::TopCompaniesByVolume, &full_view(&dataset)).unwrap();
    assert_eq!(labels(&data), common::COMPANIES.map(String::from).to_vec());
}

#[test]
fn test_region_panel_is_a_plain_count() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.set_price_min(30_000, &dataset);
    let view = filter::apply(&dataset, &filters).unwrap();

    let data = compute_panel(PanelId::RegionSalesCount, &view).unwrap();
    let PanelData::Bar(b) = data else {
        panic!("expected a bar chart");
    };
    assert_eq!(b.measure, "Sales Count");
    // Rows i = 15..24: Austin gets 15, 18, 21
    assert_eq!(b.value_of("Austin"), Some(3.0));
    assert_eq!(b.total(), 9.0);
}

#[test]
fn test_revenue_by_region_sums_price() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::RevenueByRegion, &full_view(&dataset)).unwrap();
    let PanelData::Bar(b) = data else {
        panic!("expected a bar chart");
    };
    let total_revenue: f64 = (0..24).map(|i| 15_000.0 + 1_000.0 * i as f64).sum();
    assert_eq!(b.total(), total_revenue);
    assert_eq!(b.labels().next(), Some("Scottsdale"));
}

#[test]
fn test_body_style_by_gender_hierarchy() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::BodyStyleByGender, &full_view(&dataset)).unwrap();

    let PanelData::Hierarchy(nodes) = data else {
        panic!("expected a hierarchy");
    };
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].label, "Male");
    assert_eq!(nodes[0].count, 12);
    // Even rows only ever get SUV or Hatchback
    let male_styles: Vec<&str> = nodes[0].children.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(male_styles, vec!["SUV", "Hatchback"]);
    let children_total: usize = nodes[1].children.iter().map(|(_, c)| c).sum();
    assert_eq!(children_total, nodes[1].count);
}

#[test]
fn test_scatter_groups_by_gender() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::PriceVsIncome, &full_view(&dataset)).unwrap();

    let PanelData::Scatter(groups) = data else {
        panic!("expected a scatter");
    };
    let names: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(names, vec!["Male", "Female"]);
    assert_eq!(groups[0].points[0], (50_000.0, 15_000.0));
    assert_eq!(groups.iter().map(|g| g.points.len()).sum::<usize>(), 24);
}

#[test]
fn test_price_histogram_counts_every_row() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::PriceDistribution, &full_view(&dataset)).unwrap();

    let PanelData::Histogram(h) = data else {
        panic!("expected a histogram");
    };
    assert_eq!(h.total(), 24);
    assert_eq!(h.min, 15_000.0);
    assert_eq!(h.max, 38_000.0);
}

#[test]
fn test_correlation_heatmap_columns() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::CorrelationHeatmap, &full_view(&dataset)).unwrap();

    let PanelData::Heatmap(m) = data else {
        panic!("expected a heatmap");
    };
    assert_eq!(m.columns, vec!["Annual Income", "Price", "Month", "Year"]);
    // Income and price are both linear in the row number
    let r = m.get(0, 1).unwrap();
    assert!((r - 1.0).abs() < 1e-9);
    assert_eq!(m.get(3, 3), Some(1.0));
}

#[test]
fn test_heatmap_undefined_for_constant_column() {
    let dataset = common::sample_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.set_price_max(26_000, &dataset);
    // Rows 0..=11, all sold in 2022
    let view = filter::apply(&dataset, &filters).unwrap();

    let data = compute_panel(PanelId::CorrelationHeatmap, &view).unwrap();
    let PanelData::Heatmap(m) = data else {
        panic!("expected a heatmap");
    };
    assert_eq!(m.get(3, 3), None);
    assert_eq!(m.get(0, 3), None);
    assert!(m.get(0, 1).is_some());
}

#[test]
fn test_income_box_plot() {
    let dataset = common::sample_dataset();
    let data = compute_panel(PanelId::IncomeDistribution, &full_view(&dataset)).unwrap();

    let PanelData::BoxPlot(stats) = data else {
        panic!("expected a box plot");
    };
    assert_eq!(stats.n, 24);
    assert_eq!(stats.min, 50_000.0);
    assert_eq!(stats.max, 165_000.0);
    assert_eq!(stats.outliers, 0);
}

#[test]
fn test_preview_is_capped() {
    let dataset = Dataset::from_frame("big.csv", common::sales_frame(250)).unwrap();
    let data = compute_panel(PanelId::DatasetPreview, &full_view(&dataset)).unwrap();

    let PanelData::Preview(table) = data else {
        panic!("expected a preview");
    };
    assert_eq!(table.rows.len(), PREVIEW_ROWS);
    assert_eq!(table.total_rows, 250);
    assert_eq!(table.headers.len(), dataset.frame().width());
    assert!(table.headers.iter().any(|h| h == "Year"));
    assert_eq!(table.rows[0][1], "Ford");
}

#[test]
fn test_tabs_cover_every_panel_once() {
    let mut seen: Vec<PanelId> = Tab::ALL
        .iter()
        .flat_map(|t| t.panels().iter().copied())
        .collect();
    seen.sort();
    assert_eq!(seen, PanelId::ALL.to_vec());
}

#[test]
fn test_ford_only_average_price() {
    let dataset = common::ford_audi_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.toggle_company("Audi");
    filters.set_price_min(0, &dataset);
    filters.set_price_max(100_000, &dataset);
    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 2);

    let data = compute_panel(PanelId::AvgPriceByYear, &view).unwrap();
    let PanelData::Line(b) = data else {
        panic!("expected a line chart");
    };
    assert_eq!(b.entries, vec![("2022".to_string(), 25_000.0)]);
}

#[test]
fn test_high_price_range_leaves_the_audi_sale() {
    let dataset = common::ford_audi_dataset();
    let mut filters = FilterState::all(&dataset);
    filters.set_price_min(40_000, &dataset);
    filters.set_price_max(60_000, &dataset);
    let view = filter::apply(&dataset, &filters).unwrap();
    assert_eq!(view.height(), 1);

    let PanelData::Bar(years) = compute_panel(PanelId::SalesByYear, &view).unwrap() else {
        panic!("expected a bar chart");
    };
    assert_eq!(years.entries, vec![("2023".to_string(), 1.0)]);

    let data = compute_panel(PanelId::TopCompaniesByVolume, &view).unwrap();
    let PanelData::Bar(companies) = data else {
        panic!("expected a bar chart");
    };
    assert_eq!(companies.entries, vec![("Audi".to_string(), 1.0)]);
}
