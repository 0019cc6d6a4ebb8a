use crate::config::Theme;
use ratatui::style::Color;

/// Number of distinct chart series colors in the theme.
pub const SERIES_COLORS: usize = 7;

/// Snapshot of theme colors and display configuration for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub keybind_hints: Color,
    pub keybind_labels: Color,
    pub controls_bg: Color,
    pub background: Color,
    pub surface: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_inverse: Color,
    pub dimmed: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub sidebar_border: Color,
    pub panel_border: Color,
    pub panel_border_selected: Color,
    pub modal_border_active: Color,
    pub modal_border_error: Color,
    pub outlier_marker: Color,
    pub primary_chart_series_color: Color,
    pub secondary_chart_series_color: Color,
    pub correlation_positive: Color,
    pub correlation_negative: Color,
    pub series: [Color; SERIES_COLORS],

    pub table_header: Color,
    pub table_header_bg: Color,

    pub show_panel_numbers: bool,
    pub scatter_row_limit: usize,
}

impl RenderContext {
    /// Build render context from app theme and config.
    /// This is a snapshot; changes to theme won't affect this instance.
    pub fn from_theme_and_config(
        theme: &Theme,
        show_panel_numbers: bool,
        scatter_row_limit: usize,
    ) -> Self {
        Self {
            keybind_hints: theme.get("keybind_hints"),
            keybind_labels: theme.get("keybind_labels"),
            controls_bg: theme.get("controls_bg"),
            background: theme.get("background"),
            surface: theme.get("surface"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            text_inverse: theme.get("text_inverse"),
            dimmed: theme.get("dimmed"),
            success: theme.get("success"),
            warning: theme.get("warning"),
            error: theme.get("error"),
            sidebar_border: theme.get("sidebar_border"),
            panel_border: theme.get("panel_border"),
            panel_border_selected: theme.get("panel_border_selected"),
            modal_border_active: theme.get("modal_border_active"),
            modal_border_error: theme.get("modal_border_error"),
            outlier_marker: theme.get("outlier_marker"),
            primary_chart_series_color: theme.get("primary_chart_series_color"),
            secondary_chart_series_color: theme.get("secondary_chart_series_color"),
            correlation_positive: theme.get("correlation_positive"),
            correlation_negative: theme.get("correlation_negative"),
            series: [
                theme.get("chart_series_color_1"),
                theme.get("chart_series_color_2"),
                theme.get("chart_series_color_3"),
                theme.get("chart_series_color_4"),
                theme.get("chart_series_color_5"),
                theme.get("chart_series_color_6"),
                theme.get("chart_series_color_7"),
            ],

            table_header: theme.get("table_header"),
            table_header_bg: theme.get("table_header_bg"),

            show_panel_numbers,
            scatter_row_limit,
        }
    }

    /// Series color for the i-th category, cycling through the palette.
    pub fn series_color(&self, i: usize) -> Color {
        self.series[i % SERIES_COLORS]
    }
}
