//! Renderers for each kind of panel content.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Cell, Chart, Dataset, GraphType, LegendPosition, Paragraph,
        Row, Table, Widget,
    },
};

use crate::chart_data::{
    bounds, format_compact, format_currency, format_measure,
    format_number_with_commas, line_points, month_name, percent, sample_points,
};
use crate::dataset::columns;
use crate::panels::{Breakdown, HierarchyNode, PanelData, ScatterGroup, TableData};
use crate::render::context::RenderContext;
use crate::statistics::{BoxStats, CorrelationMatrix, Histogram};

/// Widest a preview column may grow, in cells.
const PREVIEW_MAX_COL_WIDTH: usize = 24;

/// Draw `data` into `area`. `scroll` is the first visible row for tabular content.
pub fn render_panel_data(
    data: &PanelData,
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    scroll: usize,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match data {
        PanelData::Bar(b) => render_bar_chart(b, area, buf, ctx),
        PanelData::Line(b) => render_line_chart(b, area, buf, ctx),
        PanelData::Pie(b) => render_share_chart(b, area, buf, ctx),
        PanelData::Ranking(b) => render_ranking(b, area, buf, ctx),
        PanelData::Histogram(h) => render_histogram(h, area, buf, ctx),
        PanelData::Scatter(groups) => render_scatter(groups, area, buf, ctx),
        PanelData::BoxPlot(stats) => render_box_plot(stats, area, buf, ctx),
        PanelData::Heatmap(matrix) => render_heatmap(matrix, area, buf, ctx),
        PanelData::Hierarchy(nodes) => render_hierarchy(nodes, area, buf, ctx),
        PanelData::Preview(table) => render_preview(table, area, buf, ctx, scroll),
    }
}

/// Centered single-line message in the secondary text color.
pub fn render_notice(message: &str, area: Rect, buf: &mut Buffer, color: Color) {
    let y = area.y + area.height.saturating_sub(1) / 2;
    let line_area = Rect::new(area.x, y, area.width, 1.min(area.height));
    Paragraph::new(message)
        .style(Style::default().fg(color))
        .centered()
        .render(line_area, buf);
}

fn axis_labels<'a>(lo: f64, hi: f64, style: Style, fmt: impl Fn(f64) -> String) -> Vec<Span<'a>> {
    vec![
        Span::styled(fmt(lo), style),
        Span::styled(fmt((lo + hi) / 2.0), style),
        Span::styled(fmt(hi), style),
    ]
}

fn render_bar_chart(b: &Breakdown, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    if b.is_empty() {
        render_notice("No data", area, buf, ctx.text_secondary);
        return;
    }

    let bars: Vec<Bar> = b
        .entries
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .label(Line::from(label.as_str()))
                .value(value.max(0.0).round() as u64)
                .text_value(format_measure(b.measure, *value))
                .style(Style::default().fg(ctx.primary_chart_series_color))
                .value_style(
                    Style::default()
                        .fg(ctx.text_inverse)
                        .bg(ctx.primary_chart_series_color),
                )
        })
        .collect();

    // One row per bar; a blank row between bars when there is room.
    let gap = if area.height as usize >= b.len() * 2 { 1 } else { 0 };
    BarChart::default()
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(gap)
        .label_style(Style::default().fg(ctx.text_primary))
        .render(area, buf);
}

fn render_line_chart(b: &Breakdown, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let points = line_points(b);
    let Some((x_bounds, y_bounds)) = bounds(&points) else {
        render_notice("No data", area, buf, ctx.text_secondary);
        return;
    };
    let y_bounds = [0.0_f64.min(y_bounds[0]), y_bounds[1]];

    let label_style = Style::default().fg(ctx.text_primary);
    let is_month = b.key == columns::MONTH;
    let format_x = |v: f64| {
        if is_month {
            month_name(v.round() as u32)
                .map(str::to_string)
                .unwrap_or_default()
        } else {
            format!("{:.0}", v)
        }
    };

    let dataset = Dataset::default()
        .name(b.measure)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(ctx.primary_chart_series_color))
        .data(&points);
    let markers = Dataset::default()
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(ctx.secondary_chart_series_color))
        .data(&points);

    let x_axis = Axis::default()
        .title(b.key)
        .bounds(x_bounds)
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(x_bounds[0], x_bounds[1], label_style, format_x));
    let y_axis = Axis::default()
        .title(b.measure)
        .bounds(y_bounds)
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(y_bounds[0], y_bounds[1], label_style, format_compact));

    Chart::new(vec![dataset, markers])
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(None)
        .render(area, buf);
}

/// Composition as proportional bars with percentage and count.
fn render_share_chart(b: &Breakdown, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let total = b.total();
    if b.is_empty() || total <= 0.0 {
        render_notice("No data", area, buf, ctx.text_secondary);
        return;
    }

    let label_width = b.labels().map(|l| l.chars().count()).max().unwrap_or(0);
    let value_texts: Vec<String> = b
        .entries
        .iter()
        .map(|(_, v)| format!(" {:>5.1}% ({})", percent(*v, total), format_measure(b.measure, *v)))
        .collect();
    let value_width = value_texts.iter().map(|t| t.chars().count()).max().unwrap_or(0);
    let bar_space = (area.width as usize).saturating_sub(label_width + value_width + 1);

    let lines: Vec<Line> = b
        .entries
        .iter()
        .zip(value_texts)
        .enumerate()
        .map(|(i, ((label, value), value_text))| {
            let filled = ((value / total) * bar_space as f64).round() as usize;
            Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", label, width = label_width),
                    Style::default().fg(ctx.text_primary),
                ),
                Span::styled(
                    "█".repeat(filled.min(bar_space)),
                    Style::default().fg(ctx.series_color(i)),
                ),
                Span::styled(
                    " ".repeat(bar_space.saturating_sub(filled)),
                    Style::default(),
                ),
                Span::styled(value_text, Style::default().fg(ctx.text_secondary)),
            ])
        })
        .collect();

    Paragraph::new(lines).render(area, buf);
}

fn header_style(ctx: &RenderContext) -> Style {
    Style::default()
        .bg(ctx.table_header_bg)
        .fg(ctx.table_header)
        .add_modifier(Modifier::BOLD)
}

fn render_ranking(b: &Breakdown, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    if b.is_empty() {
        render_notice("No data", area, buf, ctx.text_secondary);
        return;
    }
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from(b.key),
        Cell::from(b.measure),
    ])
    .style(header_style(ctx));

    let rows: Vec<Row> = b
        .entries
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(ctx.text_secondary)),
                Cell::from(label.as_str()).style(Style::default().fg(ctx.text_primary)),
                Cell::from(Line::from(format_measure(b.measure, *value)).right_aligned())
                    .style(Style::default().fg(ctx.primary_chart_series_color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(b.measure.len().max(12) as u16),
    ];
    Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .render(area, buf);
}

fn render_histogram(h: &Histogram, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    if h.counts.is_empty() {
        render_notice("No data for histogram", area, buf, ctx.text_secondary);
        return;
    }

    let points: Vec<(f64, f64)> = h
        .counts
        .iter()
        .enumerate()
        .map(|(i, c)| (h.bin_center(i), *c as f64))
        .collect();

    let x_min = h.min;
    let x_max = if h.max > h.min { h.max } else { h.min + h.bin_width };
    let max_count = h.counts.iter().copied().max().unwrap_or(0) as f64;
    let y_max = if max_count > 0.0 { max_count } else { 1.0 };

    let label_style = Style::default().fg(ctx.text_primary);
    let x_axis = Axis::default()
        .title(columns::PRICE)
        .bounds([x_min, x_max])
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(x_min, x_max, label_style, format_compact));
    let y_axis = Axis::default()
        .title("Count")
        .bounds([0.0, y_max])
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(0.0, y_max, label_style, |v| format!("{:.0}", v)));

    let dataset = Dataset::default()
        .name("")
        .marker(symbols::Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(ctx.primary_chart_series_color))
        .data(&points);

    Chart::new(vec![dataset])
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(None)
        .render(area, buf);
}

fn render_scatter(groups: &[ScatterGroup], area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let total: usize = groups.iter().map(|g| g.points.len()).sum();
    if total == 0 {
        render_notice("No valid data points", area, buf, ctx.text_secondary);
        return;
    }

    // Share the point budget across groups by size.
    let limit = ctx.scatter_row_limit;
    let sampled: Vec<Vec<(f64, f64)>> = groups
        .iter()
        .map(|g| {
            let share = if total > limit {
                (g.points.len() * limit).div_ceil(total)
            } else {
                g.points.len()
            };
            sample_points(&g.points, share)
        })
        .collect();

    let Some((x_bounds, y_bounds)) = bounds(sampled.iter().flatten()) else {
        render_notice("No valid data points", area, buf, ctx.text_secondary);
        return;
    };

    let datasets: Vec<Dataset> = groups
        .iter()
        .zip(sampled.iter())
        .enumerate()
        .map(|(i, (group, points))| {
            let name = if group.label.is_empty() {
                "(blank)".to_string()
            } else {
                group.label.clone()
            };
            Dataset::default()
                .name(name)
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(ctx.series_color(i)))
                .data(points)
        })
        .collect();

    let label_style = Style::default().fg(ctx.text_primary);
    let x_axis = Axis::default()
        .title(columns::ANNUAL_INCOME)
        .bounds(x_bounds)
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(x_bounds[0], x_bounds[1], label_style, format_compact));
    let y_axis = Axis::default()
        .title(columns::PRICE)
        .bounds(y_bounds)
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(y_bounds[0], y_bounds[1], label_style, format_compact));

    Chart::new(datasets)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopRight))
        .render(area, buf);
}

fn render_box_plot(stats: &BoxStats, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let box_half = 0.3;
    let cap_half = 0.2;
    let x = 0.0;
    let segments: Vec<Vec<(f64, f64)>> = vec![
        vec![
            (x - box_half, stats.q1),
            (x + box_half, stats.q1),
            (x + box_half, stats.q3),
            (x - box_half, stats.q3),
            (x - box_half, stats.q1),
        ],
        vec![(x - box_half, stats.median), (x + box_half, stats.median)],
        vec![(x, stats.lower_whisker), (x, stats.q1)],
        vec![(x, stats.q3), (x, stats.upper_whisker)],
        vec![
            (x - cap_half, stats.lower_whisker),
            (x + cap_half, stats.lower_whisker),
        ],
        vec![
            (x - cap_half, stats.upper_whisker),
            (x + cap_half, stats.upper_whisker),
        ],
    ];
    let extremes: Vec<(f64, f64)> = [stats.min, stats.max]
        .into_iter()
        .filter(|v| *v < stats.lower_whisker || *v > stats.upper_whisker)
        .map(|v| (x, v))
        .collect();

    let box_style = Style::default().fg(ctx.primary_chart_series_color);
    let mut datasets: Vec<Dataset> = segments
        .iter()
        .map(|points| {
            Dataset::default()
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Braille)
                .style(box_style)
                .data(points)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .graph_type(GraphType::Scatter)
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(ctx.outlier_marker))
            .data(&extremes),
    );

    let (y_min, y_max) = if stats.max > stats.min {
        (stats.min, stats.max)
    } else {
        (stats.min - 0.5, stats.min + 0.5)
    };
    let label_style = Style::default().fg(ctx.text_primary);
    let x_axis = Axis::default()
        .bounds([-1.0, 1.0])
        .style(Style::default().fg(ctx.dimmed));
    let y_axis = Axis::default()
        .title(columns::ANNUAL_INCOME)
        .bounds([y_min, y_max])
        .style(Style::default().fg(ctx.dimmed))
        .labels(axis_labels(y_min, y_max, label_style, format_compact));

    Chart::new(datasets)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(None)
        .render(chunks[0], buf);

    let summary = Line::from(vec![
        Span::styled(
            format!(
                "n={} median={} IQR={} mean={} ",
                format_number_with_commas(stats.n as i64),
                format_currency(stats.median),
                format_currency(stats.iqr()),
                format_currency(stats.mean),
            ),
            Style::default().fg(ctx.text_secondary),
        ),
        Span::styled(
            format!("outliers={}", stats.outliers),
            Style::default().fg(if stats.outliers > 0 {
                ctx.outlier_marker
            } else {
                ctx.text_secondary
            }),
        ),
    ]);
    Paragraph::new(summary).centered().render(chunks[1], buf);
}

/// Cell color for a coefficient: faint near zero, signed colors once meaningful.
fn correlation_color(r: f64, ctx: &RenderContext) -> Color {
    let abs = r.abs();
    if abs < 0.05 {
        ctx.dimmed
    } else if abs < 0.3 {
        ctx.text_primary
    } else if r > 0.0 {
        ctx.correlation_positive
    } else {
        ctx.correlation_negative
    }
}

fn render_heatmap(matrix: &CorrelationMatrix, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let n = matrix.columns.len();
    if n == 0 {
        render_notice("No numeric columns", area, buf, ctx.text_secondary);
        return;
    }
    let name_width = matrix
        .columns
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);
    let cell_width = name_width.max(6) as u16;

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(
        matrix
            .columns
            .iter()
            .map(|c| Cell::from(Line::from(c.as_str()).right_aligned())),
    );
    let header = Row::new(header_cells).style(header_style(ctx));

    let rows: Vec<Row> = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut cells = vec![Cell::from(name.as_str()).style(header_style(ctx))];
            for j in 0..n {
                let cell = match matrix.get(i, j) {
                    Some(r) => {
                        let mut style = Style::default().fg(correlation_color(r, ctx));
                        if r.abs() >= 0.7 {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        Cell::from(Line::from(format!("{:+.2}", r)).right_aligned()).style(style)
                    }
                    None => Cell::from(Line::from("n/a").right_aligned())
                        .style(Style::default().fg(ctx.dimmed)),
                };
                cells.push(cell);
            }
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(name_width as u16)];
    widths.extend(std::iter::repeat(Constraint::Length(cell_width)).take(n));
    Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .render(area, buf);
}

fn render_hierarchy(nodes: &[HierarchyNode], area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    let total: usize = nodes.iter().map(|n| n.count).sum();
    if total == 0 {
        render_notice("No data", area, buf, ctx.text_secondary);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let color = ctx.series_color(i);
        lines.push(Line::from(vec![
            Span::styled(
                node.label.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {} ({:.1}%)",
                    format_number_with_commas(node.count as i64),
                    percent(node.count as f64, total as f64)
                ),
                Style::default().fg(ctx.text_secondary),
            ),
        ]));
        let last = node.children.len().saturating_sub(1);
        for (j, (child, count)) in node.children.iter().enumerate() {
            let branch = if j == last { "└─ " } else { "├─ " };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", branch), Style::default().fg(ctx.dimmed)),
                Span::styled(child.clone(), Style::default().fg(ctx.text_primary)),
                Span::styled(
                    format!(
                        "  {} ({:.1}%)",
                        format_number_with_commas(*count as i64),
                        percent(*count as f64, node.count as f64)
                    ),
                    Style::default().fg(color),
                ),
            ]));
        }
    }
    Paragraph::new(lines).render(area, buf);
}

fn render_preview(
    table: &TableData,
    area: Rect,
    buf: &mut Buffer,
    ctx: &RenderContext,
    scroll: usize,
) {
    if table.headers.is_empty() {
        render_notice("No columns", area, buf, ctx.text_secondary);
        return;
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    // Header row takes one line of the table area.
    let visible = (chunks[0].height as usize).saturating_sub(1);
    let start = preview_scroll_start(scroll, table.rows.len(), visible);
    let shown = &table.rows[start..(start + visible).min(table.rows.len())];

    let widths: Vec<Constraint> = table
        .headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            let cells = shown
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| s.chars().count());
            let w = cells
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .min(PREVIEW_MAX_COL_WIDTH);
            Constraint::Length(w as u16)
        })
        .collect();

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.as_str())))
        .style(header_style(ctx));
    let rows: Vec<Row> = shown
        .iter()
        .map(|r| {
            Row::new(r.iter().map(|v| Cell::from(v.as_str())))
                .style(Style::default().fg(ctx.text_primary))
        })
        .collect();

    Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .render(chunks[0], buf);

    let footer = if shown.is_empty() {
        format!("0 of {} rows", format_number_with_commas(table.total_rows as i64))
    } else {
        format!(
            "Rows {}-{} of first {} (view has {})",
            start + 1,
            start + shown.len(),
            table.rows.len(),
            format_number_with_commas(table.total_rows as i64)
        )
    };
    Paragraph::new(footer)
        .style(Style::default().fg(ctx.text_secondary))
        .right_aligned()
        .render(chunks[1], buf);
}

/// First row shown by the preview, clamped so the last page stays full.
pub fn preview_scroll_start(scroll: usize, total: usize, visible: usize) -> usize {
    scroll.min(total.saturating_sub(visible))
}
