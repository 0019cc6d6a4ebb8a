use crate::panels::{PanelError, PanelId, PanelResult};
use crate::render::context::RenderContext;
use crate::widgets::chart::{render_notice, render_panel_data};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Widget},
};

/// One dashboard panel: a titled border around its chart, or its notice when
/// the chart could not be produced.
pub struct PanelWidget<'a> {
    pub id: PanelId,
    pub result: &'a PanelResult,
    pub ctx: &'a RenderContext,
    pub selected: bool,
    /// First visible row for tabular panels.
    pub scroll: usize,
}

impl<'a> PanelWidget<'a> {
    pub fn new(id: PanelId, result: &'a PanelResult, ctx: &'a RenderContext) -> Self {
        Self {
            id,
            result,
            ctx,
            selected: false,
            scroll: 0,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn title(&self) -> String {
        if self.ctx.show_panel_numbers {
            format!(" {}. {} ", self.id.number(), self.id.title())
        } else {
            format!(" {} ", self.id.title())
        }
    }
}

impl Widget for PanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let ctx = self.ctx;
        let (border_c, title_style) = if self.selected {
            (
                ctx.panel_border_selected,
                Style::default()
                    .fg(ctx.panel_border_selected)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (ctx.panel_border, Style::default().fg(ctx.text_primary))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_c))
            .title(self.title())
            .title_style(title_style);
        let inner = block.inner(area);
        block.render(area, buf);

        match self.result {
            Ok(data) => render_panel_data(data, inner, buf, ctx, self.scroll),
            Err(PanelError::EmptyFilterResult(notice)) => {
                render_notice(notice, inner, buf, ctx.warning)
            }
            Err(err) => render_notice(&err.to_string(), inner, buf, ctx.error),
        }
    }
}
