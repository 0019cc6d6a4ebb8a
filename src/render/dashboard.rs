//! Main view: tab bar, view heading, filter sidebar and the panel grid.

use crate::panels::{PanelId, Tab};
use crate::render::context::RenderContext;
use crate::render::layout::{dashboard_layout, panel_grid};
use crate::widgets::panel::PanelWidget;
use crate::{App, Focus};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::Widget;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Tabs};

pub fn render_dashboard(area: Rect, buf: &mut Buffer, app: &App, ctx: &RenderContext) {
    let layout = dashboard_layout(area, true);

    let titles: Vec<String> = Tab::ALL
        .iter()
        .map(|t| format!("{} {}", t.index() + 1, t.title()))
        .collect();
    Tabs::new(titles)
        .select(app.tab().index())
        .style(Style::default().fg(ctx.text_secondary))
        .highlight_style(
            Style::default()
                .fg(ctx.text_inverse)
                .bg(ctx.primary_chart_series_color)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|")
        .render(layout.tabs, buf);

    Paragraph::new(Line::styled(
        app.tab().heading(),
        Style::default()
            .fg(ctx.text_primary)
            .add_modifier(Modifier::BOLD),
    ))
    .centered()
    .render(layout.heading, buf);

    if let Some(sidebar_area) = layout.sidebar {
        crate::render::filter_sidebar::render(
            sidebar_area,
            buf,
            app.sidebar(),
            app.filters(),
            app.dataset(),
            app.focus() == Focus::Sidebar,
            ctx,
        );
    }

    let panels_focused = app.focus() == Focus::Panels;
    if app.is_zoomed() {
        let id = app.selected_panel();
        panel_widget(app, id, ctx, panels_focused).render(layout.panels, buf);
        return;
    }

    let ids = app.tab().panels();
    for (i, (id, cell)) in ids
        .iter()
        .zip(panel_grid(layout.panels, ids.len()))
        .enumerate()
    {
        let selected = panels_focused && i == app.selected_index();
        panel_widget(app, *id, ctx, selected).render(cell, buf);
    }
}

fn panel_widget<'a>(
    app: &'a App,
    id: PanelId,
    ctx: &'a RenderContext,
    selected: bool,
) -> PanelWidget<'a> {
    let widget = PanelWidget::new(id, app.panels().get(id), ctx).selected(selected);
    if id == PanelId::DatasetPreview {
        widget.scroll(app.preview_scroll())
    } else {
        widget
    }
}
