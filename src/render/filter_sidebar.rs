//! Filter sidebar rendering.

use crate::chart_data::format_currency;
use crate::dataset::Dataset;
use crate::filter::FilterState;
use crate::filter_sidebar::{FilterSidebar, PriceHandle, SidebarSection};
use crate::render::context::RenderContext;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{StatefulWidget, Widget};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};
use std::collections::BTreeSet;

/// Rows the price section needs inside its border.
const PRICE_SECTION_HEIGHT: u16 = 3;

/// Render the filter sidebar. `focused` is false while the panels have keyboard focus.
pub fn render(
    area: Rect,
    buf: &mut Buffer,
    sidebar: &FilterSidebar,
    filters: &FilterState,
    dataset: &Dataset,
    focused: bool,
    ctx: &RenderContext,
) {
    Clear.render(area, buf);
    let border_c = if focused {
        ctx.modal_border_active
    } else {
        ctx.sidebar_border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_c))
        .title("Filters");
    let inner_area = block.inner(area);
    block.render(area, buf);

    let region_rows = dataset.regions().len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Max(region_rows),
            Constraint::Length(PRICE_SECTION_HEIGHT + 2),
        ])
        .split(inner_area);

    let active = |section: SidebarSection| focused && sidebar.section == section;

    render_choice_list(
        chunks[0],
        buf,
        "Company",
        dataset.companies(),
        &filters.companies,
        sidebar.company_cursor,
        active(SidebarSection::Company),
        ctx,
    );
    render_choice_list(
        chunks[1],
        buf,
        "Region",
        dataset.regions(),
        &filters.regions,
        sidebar.region_cursor,
        active(SidebarSection::Region),
        ctx,
    );
    render_price_range(
        chunks[2],
        buf,
        sidebar.handle,
        filters.price_range,
        dataset.price_bounds(),
        active(SidebarSection::Price),
        ctx,
    );
}

fn section_block(title: String, active: bool, ctx: &RenderContext) -> Block<'static> {
    let border_c = if active {
        ctx.modal_border_active
    } else {
        ctx.sidebar_border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_c))
        .title(title)
}

#[allow(clippy::too_many_arguments)]
fn render_choice_list(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    options: &[String],
    selected: &BTreeSet<String>,
    cursor: usize,
    active: bool,
    ctx: &RenderContext,
) {
    let block = section_block(
        format!("{} ({}/{})", title, selected.len(), options.len()),
        active,
        ctx,
    );

    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let checked = selected.contains(option);
            let (mark, color) = if checked {
                ("[x] ", ctx.success)
            } else {
                ("[ ] ", ctx.text_secondary)
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(option.as_str(), Style::default().fg(ctx.text_primary)),
            ]))
        })
        .collect();

    let highlight = if active {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let list = List::new(items).block(block).highlight_style(highlight);
    let mut state = ListState::default().with_selected(Some(cursor));
    StatefulWidget::render(list, area, buf, &mut state);
}

fn render_price_range(
    area: Rect,
    buf: &mut Buffer,
    handle: PriceHandle,
    range: (i64, i64),
    bounds: (i64, i64),
    active: bool,
    ctx: &RenderContext,
) {
    let block = section_block("Price Range".to_string(), active, ctx);
    let inner = block.inner(area);
    block.render(area, buf);

    let handle_style = |h: PriceHandle| {
        if active && handle == h {
            Style::default()
                .fg(ctx.modal_border_active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ctx.text_primary)
        }
    };

    let track = range_track(range, bounds, inner.width as usize);
    let lines = vec![
        Line::from(vec![
            Span::styled("Min ", Style::default().fg(ctx.text_secondary)),
            Span::styled(format_currency(range.0 as f64), handle_style(PriceHandle::Min)),
        ]),
        Line::from(vec![
            Span::styled("Max ", Style::default().fg(ctx.text_secondary)),
            Span::styled(format_currency(range.1 as f64), handle_style(PriceHandle::Max)),
        ]),
        Line::from(track_spans(&track, ctx.primary_chart_series_color, ctx.dimmed)),
    ];
    Paragraph::new(lines).render(inner, buf);
}

/// Track of `width` cells: `true` where the selected range covers the cell.
pub fn range_track(range: (i64, i64), bounds: (i64, i64), width: usize) -> Vec<bool> {
    if width == 0 {
        return Vec::new();
    }
    let span = (bounds.1 - bounds.0) as f64;
    if span <= 0.0 {
        return vec![true; width];
    }
    let last = (width - 1) as f64;
    let to_cell = |v: i64| (((v - bounds.0) as f64 / span) * last).round() as usize;
    let (lo, hi) = (to_cell(range.0), to_cell(range.1));
    (0..width).map(|i| i >= lo && i <= hi).collect()
}

fn track_spans(track: &[bool], on: Color, off: Color) -> Vec<Span<'static>> {
    track
        .iter()
        .map(|inside| {
            if *inside {
                Span::styled("━", Style::default().fg(on))
            } else {
                Span::styled("─", Style::default().fg(off))
            }
        })
        .collect()
}
