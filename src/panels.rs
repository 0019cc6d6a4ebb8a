//! Dashboard panels: identity, grouping into tabs, and the pure aggregate
//! behind each one.
//!
//! Every panel reads only the [`FilteredView`]. [`compute_panel`] is the one
//! entry point: it short-circuits on an empty view with the panel's own
//! notice so no aggregate is ever evaluated on zero rows.

use crate::cli::StartTab;
use crate::config::StartView;
use crate::dataset::columns::*;
use crate::error_display::user_message_from_polars;
use crate::filter::FilteredView;
use crate::statistics::{
    box_stats, correlation_matrix, histogram, numeric_values, BoxStats, CorrelationMatrix,
    Histogram,
};
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Entries shown by ranking panels.
pub const TOP_N: u32 = 10;
/// Rows exposed by the dataset preview.
pub const PREVIEW_ROWS: usize = 100;
/// Bin count of the price histogram.
pub const PRICE_BINS: usize = 30;

/// Columns of the correlation heatmap, in display order.
pub const CORRELATION_COLUMNS: [&str; 4] = [ANNUAL_INCOME, PRICE, MONTH, YEAR];

const VALUE: &str = "__value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Sales,
    Marketing,
    Stakeholder,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Sales, Tab::Marketing, Tab::Stakeholder];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Sales => "Sales Manager View",
            Tab::Marketing => "Marketing View",
            Tab::Stakeholder => "Stakeholder Overview",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Tab::Sales => "Sales Overview and Trends",
            Tab::Marketing => "Marketing Insights",
            Tab::Stakeholder => "Strategic Overview for Stakeholders",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Sales => 0,
            Tab::Marketing => 1,
            Tab::Stakeholder => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    pub fn panels(self) -> &'static [PanelId] {
        let all = &PanelId::ALL;
        match self {
            Tab::Sales => &all[0..5],
            Tab::Marketing => &all[5..13],
            Tab::Stakeholder => &all[13..21],
        }
    }
}

impl From<StartView> for Tab {
    fn from(view: StartView) -> Self {
        match view {
            StartView::Sales => Tab::Sales,
            StartView::Marketing => Tab::Marketing,
            StartView::Stakeholder => Tab::Stakeholder,
        }
    }
}

impl From<StartTab> for Tab {
    fn from(tab: StartTab) -> Self {
        match tab {
            StartTab::Sales => Tab::Sales,
            StartTab::Marketing => Tab::Marketing,
            StartTab::Stakeholder => Tab::Stakeholder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    SalesByYear,
    AvgPriceByYear,
    SalesByBodyStyle,
    TopDealersByRevenue,
    MonthlySalesTrend,
    PriceDistribution,
    PriceVsIncome,
    PopularColors,
    TransmissionPreferences,
    GenderSalesVolume,
    TopCompaniesByVolume,
    BodyStyleByGender,
    RegionSalesCount,
    RevenueByRegion,
    IncomeDistribution,
    TopDealersBySales,
    CorrelationHeatmap,
    YearlyRevenueTrend,
    EnginePopularity,
    AvgPriceByBodyStyle,
    DatasetPreview,
}

impl PanelId {
    pub const ALL: [PanelId; 21] = [
        PanelId::SalesByYear,
        PanelId::AvgPriceByYear,
        PanelId::SalesByBodyStyle,
        PanelId::TopDealersByRevenue,
        PanelId::MonthlySalesTrend,
        PanelId::PriceDistribution,
        PanelId::PriceVsIncome,
        PanelId::PopularColors,
        PanelId::TransmissionPreferences,
        PanelId::GenderSalesVolume,
        PanelId::TopCompaniesByVolume,
        PanelId::BodyStyleByGender,
        PanelId::RegionSalesCount,
        PanelId::RevenueByRegion,
        PanelId::IncomeDistribution,
        PanelId::TopDealersBySales,
        PanelId::CorrelationHeatmap,
        PanelId::YearlyRevenueTrend,
        PanelId::EnginePopularity,
        PanelId::AvgPriceByBodyStyle,
        PanelId::DatasetPreview,
    ];

    /// Position in [`PanelId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based number shown next to the title.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelId::SalesByYear => "Sales by Year",
            PanelId::AvgPriceByYear => "Average Selling Price by Year",
            PanelId::SalesByBodyStyle => "Sales by Car Body Style",
            PanelId::TopDealersByRevenue => "Top 10 Dealers by Revenue",
            PanelId::MonthlySalesTrend => "Monthly Sales Trend",
            PanelId::PriceDistribution => "Price Distribution",
            PanelId::PriceVsIncome => "Price vs. Annual Income",
            PanelId::PopularColors => "Popular Colors",
            PanelId::TransmissionPreferences => "Transmission Type Preferences",
            PanelId::GenderSalesVolume => "Gender-wise Sales Volume",
            PanelId::TopCompaniesByVolume => "Top 10 Companies by Volume",
            PanelId::BodyStyleByGender => "Body Style Preference by Gender",
            PanelId::RegionSalesCount => "Dealer Region vs Sales Count",
            PanelId::RevenueByRegion => "Revenue by Region",
            PanelId::IncomeDistribution => "Annual Income Distribution",
            PanelId::TopDealersBySales => "Top Performing Dealers (Sales Count)",
            PanelId::CorrelationHeatmap => "Correlation Heatmap",
            PanelId::YearlyRevenueTrend => "Yearly Revenue Trend",
            PanelId::EnginePopularity => "Engine Type Popularity",
            PanelId::AvgPriceByBodyStyle => "Avg Price by Body Style",
            PanelId::DatasetPreview => "Dataset Preview",
        }
    }

    pub fn tab(self) -> Tab {
        match self.index() {
            0..=4 => Tab::Sales,
            5..=12 => Tab::Marketing,
            _ => Tab::Stakeholder,
        }
    }

    /// Message drawn in place of the panel when the view has no rows.
    pub fn empty_notice(self) -> &'static str {
        match self {
            PanelId::SalesByYear => "No data available for selected filters.",
            PanelId::AvgPriceByYear => "No data to display average price trend.",
            PanelId::SalesByBodyStyle => "No data available to plot body styles.",
            PanelId::TopDealersByRevenue => "No data available to display dealer revenue.",
            PanelId::MonthlySalesTrend => "No monthly sales data.",
            PanelId::PriceDistribution => "No data for price distribution.",
            PanelId::PriceVsIncome => "Not enough data to compare price vs income.",
            PanelId::PopularColors => "No color data to display.",
            PanelId::TransmissionPreferences => "No data on transmission types.",
            PanelId::GenderSalesVolume => "No gender-wise data available.",
            PanelId::TopCompaniesByVolume => "No company sales data.",
            PanelId::BodyStyleByGender => "No data to visualize body style vs gender.",
            PanelId::RegionSalesCount => "No region-wise sales data.",
            PanelId::RevenueByRegion => "No revenue data by region.",
            PanelId::IncomeDistribution => "No income data to show.",
            PanelId::TopDealersBySales => "No dealer performance data.",
            PanelId::CorrelationHeatmap => "Not enough numeric data for heatmap.",
            PanelId::YearlyRevenueTrend => "No yearly revenue data.",
            PanelId::EnginePopularity => "No engine data to show.",
            PanelId::AvgPriceByBodyStyle => "No price data by body style.",
            PanelId::DatasetPreview => "No rows match the current filters.",
        }
    }

    fn compute(self, view: &FilteredView) -> Result<PanelData, PanelError> {
        use Order::*;
        let data = match self {
            PanelId::SalesByYear => PanelData::Bar(count_by(view, YEAR, KeyAscending, None)?),
            PanelId::AvgPriceByYear => {
                PanelData::Line(mean_by(view, YEAR, PRICE, "Avg Price ($)", KeyAscending)?)
            }
            PanelId::SalesByBodyStyle => {
                PanelData::Pie(count_by(view, BODY_STYLE, ValueDescending, None)?)
            }
            PanelId::TopDealersByRevenue => {
                PanelData::Bar(sum_by(view, DEALER_NAME, PRICE, "Revenue ($)", Some(TOP_N))?)
            }
            PanelId::MonthlySalesTrend => {
                PanelData::Line(count_by(view, MONTH, KeyAscending, None)?)
            }
            PanelId::PriceDistribution => PanelData::Histogram(price_histogram(view)?),
            PanelId::PriceVsIncome => PanelData::Scatter(price_vs_income(view)?),
            PanelId::PopularColors => PanelData::Bar(count_by(view, COLOR, ValueDescending, None)?),
            PanelId::TransmissionPreferences => {
                PanelData::Pie(count_by(view, TRANSMISSION, ValueDescending, None)?)
            }
            PanelId::GenderSalesVolume => {
                PanelData::Bar(count_by(view, GENDER, ValueDescending, None)?)
            }
            PanelId::TopCompaniesByVolume => {
                PanelData::Bar(count_by(view, COMPANY, ValueDescending, Some(TOP_N))?)
            }
            PanelId::BodyStyleByGender => PanelData::Hierarchy(body_style_by_gender(view)?),
            PanelId::RegionSalesCount => {
                PanelData::Bar(count_by(view, DEALER_REGION, ValueDescending, None)?)
            }
            PanelId::RevenueByRegion => {
                PanelData::Bar(sum_by(view, DEALER_REGION, PRICE, "Revenue ($)", None)?)
            }
            PanelId::IncomeDistribution => PanelData::BoxPlot(income_box(view)?),
            PanelId::TopDealersBySales => {
                PanelData::Ranking(count_by(view, DEALER_NAME, ValueDescending, Some(TOP_N))?)
            }
            PanelId::CorrelationHeatmap => {
                PanelData::Heatmap(correlation_matrix(view.frame(), &CORRELATION_COLUMNS)?)
            }
            PanelId::YearlyRevenueTrend => {
                PanelData::Line(sum_by_key_ascending(view, YEAR, PRICE, "Revenue ($)")?)
            }
            PanelId::EnginePopularity => {
                PanelData::Bar(count_by(view, ENGINE, ValueDescending, Some(TOP_N))?)
            }
            PanelId::AvgPriceByBodyStyle => {
                PanelData::Bar(mean_by(view, BODY_STYLE, PRICE, "Avg Price ($)", KeyAscending)?)
            }
            PanelId::DatasetPreview => PanelData::Preview(preview(view)?),
        };
        Ok(data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// The filters left no rows. Carries the panel's notice text.
    #[error("{0}")]
    EmptyFilterResult(&'static str),
    #[error("{0} is undefined for the current selection")]
    UndefinedAggregate(&'static str),
    #[error("{0}")]
    Compute(String),
}

impl From<PolarsError> for PanelError {
    fn from(err: PolarsError) -> Self {
        PanelError::Compute(user_message_from_polars(&err))
    }
}

/// Category/value pairs in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    /// Column the categories come from.
    pub key: &'static str,
    /// What the values measure, used as the value axis title.
    pub measure: &'static str,
    pub entries: Vec<(String, f64)>,
}

impl Breakdown {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn max_value(&self) -> f64 {
        self.entries.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub label: String,
    /// (Annual Income, Price) points.
    pub points: Vec<(f64, f64)>,
}

/// One outer category with its inner category counts.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub label: String,
    pub count: usize,
    pub children: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Height of the view the rows were taken from.
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelData {
    Bar(Breakdown),
    Line(Breakdown),
    /// Composition shown as proportions of the total.
    Pie(Breakdown),
    /// Ranked rows shown as a table.
    Ranking(Breakdown),
    Histogram(Histogram),
    Scatter(Vec<ScatterGroup>),
    BoxPlot(BoxStats),
    Heatmap(CorrelationMatrix),
    Hierarchy(Vec<HierarchyNode>),
    Preview(TableData),
}

pub type PanelResult = Result<PanelData, PanelError>;

/// Compute one panel, substituting its empty notice when the view has no rows.
pub fn compute_panel(id: PanelId, view: &FilteredView) -> PanelResult {
    if view.is_empty() {
        return Err(PanelError::EmptyFilterResult(id.empty_notice()));
    }
    let result = id.compute(view);
    if let Err(err) = &result {
        warn!(panel = id.number(), title = id.title(), error = %err, "panel failed");
    }
    result
}

/// Results of every panel for one filtered view.
#[derive(Debug, Clone)]
pub struct PanelSet {
    results: Vec<PanelResult>,
}

impl PanelSet {
    pub fn compute_all(view: &FilteredView) -> Self {
        let results: Vec<PanelResult> = PanelId::ALL
            .iter()
            .map(|id| compute_panel(*id, view))
            .collect();
        let failed = results
            .iter()
            .filter(|r| matches!(r, Err(PanelError::Compute(_) | PanelError::UndefinedAggregate(_))))
            .count();
        debug!(rows = view.height(), failed, "panels computed");
        Self { results }
    }

    pub fn get(&self, id: PanelId) -> &PanelResult {
        &self.results[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelId, &PanelResult)> {
        PanelId::ALL.iter().copied().zip(self.results.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    KeyAscending,
    /// Largest first; ties keep first-encounter order.
    ValueDescending,
}

fn count_by(
    view: &FilteredView,
    key: &'static str,
    order: Order,
    limit: Option<u32>,
) -> PolarsResult<Breakdown> {
    let entries = aggregate(view, key, len(), order, limit)?;
    Ok(Breakdown {
        key,
        measure: "Sales Count",
        entries,
    })
}

fn sum_by(
    view: &FilteredView,
    key: &'static str,
    value: &'static str,
    measure: &'static str,
    limit: Option<u32>,
) -> PolarsResult<Breakdown> {
    let entries = aggregate(view, key, col(value).sum(), Order::ValueDescending, limit)?;
    Ok(Breakdown {
        key,
        measure,
        entries,
    })
}

fn sum_by_key_ascending(
    view: &FilteredView,
    key: &'static str,
    value: &'static str,
    measure: &'static str,
) -> PolarsResult<Breakdown> {
    let entries = aggregate(view, key, col(value).sum(), Order::KeyAscending, None)?;
    Ok(Breakdown {
        key,
        measure,
        entries,
    })
}

fn mean_by(
    view: &FilteredView,
    key: &'static str,
    value: &'static str,
    measure: &'static str,
    order: Order,
) -> PolarsResult<Breakdown> {
    let entries = aggregate(view, key, col(value).mean(), order, None)?;
    Ok(Breakdown {
        key,
        measure,
        entries,
    })
}

/// Group the view by `key` in first-encounter order and reduce each group with `agg`.
fn aggregate(
    view: &FilteredView,
    key: &str,
    agg: Expr,
    order: Order,
    limit: Option<u32>,
) -> PolarsResult<Vec<(String, f64)>> {
    let mut lf = view
        .frame()
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([agg.cast(DataType::Float64).alias(VALUE)]);

    lf = match order {
        Order::KeyAscending => lf.sort_by_exprs(
            [col(key)],
            SortMultipleOptions::default().with_maintain_order(true),
        ),
        Order::ValueDescending => lf.sort_by_exprs(
            [col(VALUE)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        ),
    };
    if let Some(n) = limit {
        lf = lf.limit(n as IdxSize);
    }

    let df = lf.collect()?;
    let keys = df.column(key)?;
    let values = df.column(VALUE)?.f64()?;
    let mut entries = Vec::with_capacity(df.height());
    for (idx, value) in values.iter().enumerate() {
        entries.push((cell_text(keys.get(idx)?), value.unwrap_or(0.0)));
    }
    Ok(entries)
}

/// Display text of a cell; strings without quotes, nulls as empty.
pub fn cell_text(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn price_histogram(view: &FilteredView) -> Result<Histogram, PanelError> {
    let prices = numeric_values(view.frame().column(PRICE)?.as_materialized_series());
    histogram(&prices, PRICE_BINS).ok_or(PanelError::UndefinedAggregate("price histogram"))
}

fn price_vs_income(view: &FilteredView) -> PolarsResult<Vec<ScatterGroup>> {
    let df = view.frame();
    let genders = df.column(GENDER)?.str()?;
    let incomes = df.column(ANNUAL_INCOME)?.i64()?;
    let prices = df.column(PRICE)?.i64()?;

    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for ((gender, income), price) in genders.iter().zip(incomes.iter()).zip(prices.iter()) {
        let (Some(income), Some(price)) = (income, price) else {
            continue;
        };
        let label = gender.unwrap_or_default();
        let slot = match index.get(label) {
            Some(slot) => *slot,
            None => {
                index.insert(label.to_string(), groups.len());
                groups.push(ScatterGroup {
                    label: label.to_string(),
                    points: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[slot].points.push((income as f64, price as f64));
    }
    Ok(groups)
}

fn income_box(view: &FilteredView) -> Result<BoxStats, PanelError> {
    let incomes = numeric_values(view.frame().column(ANNUAL_INCOME)?.as_materialized_series());
    box_stats(&incomes).ok_or(PanelError::UndefinedAggregate("income box plot"))
}

fn body_style_by_gender(view: &FilteredView) -> PolarsResult<Vec<HierarchyNode>> {
    let outer = aggregate(view, GENDER, len(), Order::ValueDescending, None)?;
    let mut nodes: Vec<HierarchyNode> = outer
        .into_iter()
        .map(|(label, count)| HierarchyNode {
            label,
            count: count as usize,
            children: Vec::new(),
        })
        .collect();

    let inner = view
        .frame()
        .clone()
        .lazy()
        .filter(col(GENDER).is_not_null().and(col(BODY_STYLE).is_not_null()))
        .group_by_stable([col(GENDER), col(BODY_STYLE)])
        .agg([len().cast(DataType::Float64).alias(VALUE)])
        .sort_by_exprs(
            [col(VALUE)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let parents = inner.column(GENDER)?.str()?;
    let children = inner.column(BODY_STYLE)?.str()?;
    let counts = inner.column(VALUE)?.f64()?;
    for ((parent, child), count) in parents.iter().zip(children.iter()).zip(counts.iter()) {
        let (Some(parent), Some(child)) = (parent, child) else {
            continue;
        };
        if let Some(node) = nodes.iter_mut().find(|n| n.label == parent) {
            node.children
                .push((child.to_string(), count.unwrap_or(0.0) as usize));
        }
    }
    Ok(nodes)
}

fn preview(view: &FilteredView) -> PolarsResult<TableData> {
    let head = view.frame().head(Some(PREVIEW_ROWS));
    let headers: Vec<String> = head
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let mut rows = Vec::with_capacity(head.height());
    for row in 0..head.height() {
        let mut cells = Vec::with_capacity(head.width());
        for column in head.get_columns() {
            cells.push(cell_text(column.get(row)?));
        }
        rows.push(cells);
    }
    Ok(TableData {
        headers,
        rows,
        total_rows: view.height(),
    })
}
