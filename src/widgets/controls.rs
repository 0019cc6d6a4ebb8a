use crate::chart_data::format_number_with_commas;
use crate::render::context::RenderContext;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph, Widget},
};

/// Key hints shown while the panel grid has focus.
pub const PANEL_CONTROLS: [(&str, &str); 7] = [
    ("Tab", "View"),
    ("←↑↓→", "Panel"),
    ("Enter", "Zoom"),
    ("f", "Filters"),
    ("r", "Reset"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Key hints shown while the filter sidebar has focus.
pub const SIDEBAR_CONTROLS: [(&str, &str); 6] = [
    ("Tab", "Section"),
    ("Space", "Toggle"),
    ("a/n", "All/None"),
    ("←→", "Price"),
    ("r", "Reset"),
    ("Esc", "Panels"),
];

/// Bottom control bar: key hints on the left, filtered/total rows on the right.
pub struct Controls {
    /// (rows in the filtered view, rows in the dataset)
    pub row_count: Option<(usize, usize)>,
    pub controls: Vec<(&'static str, &'static str)>,
    pub bg_color: Color,
    pub key_color: Color,   // Color for keybind hints (keys in toolbar)
    pub label_color: Color, // Color for action labels
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            controls: PANEL_CONTROLS.to_vec(),
            bg_color: Color::Indexed(235),
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create Controls from RenderContext.
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            row_count: None,
            controls: PANEL_CONTROLS.to_vec(),
            bg_color: ctx.controls_bg,
            key_color: ctx.keybind_hints,
            label_color: ctx.keybind_labels,
        }
    }

    pub fn with_row_count(mut self, filtered: usize, total: usize) -> Self {
        self.row_count = Some((filtered, total));
        self
    }

    pub fn with_controls(mut self, controls: &[(&'static str, &'static str)]) -> Self {
        self.controls = controls.to_vec();
        self
    }

    pub fn row_count_text(&self) -> Option<String> {
        self.row_count.map(|(filtered, total)| {
            format!(
                "Rows: {} / {}",
                format_number_with_commas(filtered as i64),
                format_number_with_commas(total as i64)
            )
        })
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let no_bg = self.bg_color == Color::Reset;
        if !no_bg {
            Block::default()
                .style(Style::default().bg(self.bg_color))
                .render(area, buf);
        }

        // Width of one key-label pair: each part plus one trailing space.
        let pair_width = |(key, action): &(&str, &str)| -> u16 {
            (key.chars().count() as u16 + 1) + (action.chars().count() as u16 + 1)
        };

        let row_text = self.row_count_text();
        let row_width = row_text
            .as_ref()
            .map(|t| t.chars().count() as u16 + 1)
            .unwrap_or(0);
        let mut available = area.width.saturating_sub(row_width + 1);

        let mut n_show = 0;
        for pair in self.controls.iter() {
            let need = pair_width(pair);
            if available >= need {
                available -= need;
                n_show += 1;
            } else {
                break;
            }
        }

        let mut constraints: Vec<Constraint> = self
            .controls
            .iter()
            .take(n_show)
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        if row_text.is_some() {
            constraints.push(Constraint::Length(row_width));
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_style, label_style, fill_style) = if no_bg {
            (
                Style::default().fg(self.key_color),
                Style::default().fg(self.label_color),
                Style::default(),
            )
        } else {
            let base = Style::default().bg(self.bg_color);
            (base.fg(self.key_color), base.fg(self.label_color), base)
        };

        for (i, (key, action)) in self.controls.iter().take(n_show).enumerate() {
            let j = i * 2;
            Paragraph::new(*key).style(key_style).render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        let fill_idx = n_show * 2;
        Paragraph::new("")
            .style(fill_style)
            .render(layout[fill_idx], buf);

        if let Some(text) = row_text {
            Paragraph::new(text)
                .style(label_style)
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}
