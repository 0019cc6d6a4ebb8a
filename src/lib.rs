use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use ratatui::style::Style;
use ratatui::widgets::{Block, Clear};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod chart_data;
pub mod config;
pub mod dataset;
pub mod error_display;
pub mod filter;
pub mod filter_sidebar;
pub(crate) mod help_strings;
pub mod logging;
pub mod panels;
mod render;
pub mod statistics;
pub mod widgets;

pub use salesdash_cli as cli;

pub use cli::{Args, FileFormat, StartTab};
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use dataset::{DataError, DataSource, Dataset, DatasetHandle};
pub use filter::{FilterState, FilteredView};
pub use panels::{PanelData, PanelError, PanelId, PanelSet, Tab};

use error_display::user_message_from_polars;
use filter_sidebar::{FilterSidebar, SidebarAction};
use render::context::RenderContext;
use widgets::debug::DebugState;

/// Application name used for config, cache and log paths
pub const APP_NAME: &str = "salesdash";

/// Rows moved per PageUp/PageDown in the dataset preview.
const PREVIEW_PAGE: usize = 10;

/// Startup options resolved from the command line and the config file.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub source: DataSource,
    pub start_tab: Tab,
    pub price_step: u64,
    pub debug: bool,
}

impl DashboardOptions {
    /// Command-line values take precedence over config values.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let path = args
            .path
            .clone()
            .unwrap_or_else(|| config.data.path.clone());
        let sheet = args.sheet.clone().or_else(|| config.data.sheet.clone());
        let source = DataSource::new(path)
            .with_format(args.format)
            .with_sheet(sheet);

        Self {
            source,
            start_tab: args
                .tab
                .map(Tab::from)
                .unwrap_or_else(|| config.display.start_tab.into()),
            price_step: args.price_step.unwrap_or(config.filters.price_step).max(1),
            debug: args.debug || config.debug.enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Re-apply the filters and recompute every panel.
    Recompute,
    Exit,
    Crash(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Panels,
    Sidebar,
}

pub struct App {
    dataset: Arc<Dataset>,
    filters: FilterState,
    view: FilteredView,
    panels: PanelSet,
    tab: Tab,
    /// Selected panel, as an index into the current tab's panels.
    selected: usize,
    zoomed: bool,
    preview_scroll: usize,
    focus: Focus,
    sidebar: FilterSidebar,
    show_help: bool,
    help_scroll: usize,
    error_modal: Option<String>,
    theme: Theme,
    config: AppConfig,
    debug: DebugState,
}

impl App {
    pub fn new(
        dataset: Arc<Dataset>,
        theme: Theme,
        config: AppConfig,
        options: &DashboardOptions,
    ) -> Self {
        let filters = FilterState::all(&dataset);
        let (view, error_modal) = match filter::apply(&dataset, &filters) {
            Ok(view) => (view, None),
            Err(e) => (
                FilteredView::from_frame(dataset.frame().clear()),
                Some(user_message_from_polars(&e)),
            ),
        };
        let panels = PanelSet::compute_all(&view);
        let mut debug = DebugState::default();
        if options.debug {
            debug.enabled = true;
        }
        Self {
            dataset,
            filters,
            view,
            panels,
            tab: options.start_tab,
            selected: 0,
            zoomed: false,
            preview_scroll: 0,
            focus: Focus::Panels,
            sidebar: FilterSidebar::new(options.price_step),
            show_help: false,
            help_scroll: 0,
            error_modal,
            theme,
            config,
            debug,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn panels(&self) -> &PanelSet {
        &self.panels
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn help_visible(&self) -> bool {
        self.show_help
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal.as_deref()
    }

    pub fn selected_panel(&self) -> PanelId {
        let panels = self.tab.panels();
        panels[self.selected.min(panels.len() - 1)]
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Re-apply the filters to the dataset and recompute every panel.
    pub fn recompute(&mut self) {
        let started = Instant::now();
        match filter::apply(&self.dataset, &self.filters) {
            Ok(view) => {
                self.panels = PanelSet::compute_all(&view);
                self.view = view;
                self.clamp_preview_scroll();
            }
            Err(e) => {
                self.error_modal = Some(user_message_from_polars(&e));
            }
        }
        self.debug.num_recomputes += 1;
        self.debug.last_compute_ms = started.elapsed().as_millis();
        debug!(
            rows = self.view.height(),
            elapsed_ms = self.debug.last_compute_ms as u64,
            "dashboard recomputed"
        );
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => {
                self.debug.on_key(key);
                self.key(key)
            }
            AppEvent::Recompute => {
                self.recompute();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }

        if self.error_modal.is_some() {
            if matches!(event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                self.error_modal = None;
            }
            return None;
        }

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                    self.help_scroll = 0;
                }
                KeyCode::Down | KeyCode::Char('j') => self.help_scroll += 1,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1)
                }
                KeyCode::PageDown => self.help_scroll += PREVIEW_PAGE,
                KeyCode::PageUp => self.help_scroll = self.help_scroll.saturating_sub(PREVIEW_PAGE),
                _ => {}
            }
            return None;
        }

        if event.code == KeyCode::Char('?') {
            self.show_help = true;
            self.help_scroll = 0;
            self.debug.last_action = "help".to_string();
            return None;
        }

        match self.focus {
            Focus::Sidebar => self.sidebar_key(event),
            Focus::Panels => self.panel_key(event),
        }
    }

    fn sidebar_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match self
            .sidebar
            .handle_key(event, &mut self.filters, &self.dataset)
        {
            SidebarAction::Changed => {
                self.debug.last_action = "filter_changed".to_string();
                Some(AppEvent::Recompute)
            }
            SidebarAction::Close => {
                self.focus = Focus::Panels;
                None
            }
            SidebarAction::None => None,
        }
    }

    fn panel_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let count = self.tab.panels().len();
        let columns = render::layout::GRID_COLUMNS;
        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Esc if self.zoomed => self.zoomed = false,
            KeyCode::Tab => self.set_tab(self.tab.next()),
            KeyCode::BackTab => self.set_tab(self.tab.prev()),
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(tab) = c.to_digit(10).and_then(|d| Tab::from_index(d as usize - 1)) {
                    self.set_tab(tab);
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.selected % columns > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected % columns + 1 < columns && self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') if self.preview_zoomed() => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if self.preview_zoomed() => {
                self.preview_scroll += 1;
                self.clamp_preview_scroll();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(columns);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + columns).min(count - 1);
            }
            KeyCode::Enter | KeyCode::Char('z') => self.zoomed = !self.zoomed,
            KeyCode::PageDown => {
                self.preview_scroll += PREVIEW_PAGE;
                self.clamp_preview_scroll();
            }
            KeyCode::PageUp => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PREVIEW_PAGE);
            }
            KeyCode::Char('f') => self.focus = Focus::Sidebar,
            KeyCode::Char('r') => {
                if !self.filters.is_default(&self.dataset) {
                    self.filters.reset(&self.dataset);
                    self.debug.last_action = "reset_filters".to_string();
                    return Some(AppEvent::Recompute);
                }
            }
            _ => {}
        }
        None
    }

    fn preview_zoomed(&self) -> bool {
        self.zoomed && self.selected_panel() == PanelId::DatasetPreview
    }

    fn set_tab(&mut self, tab: Tab) {
        if tab != self.tab {
            self.tab = tab;
            self.selected = 0;
            self.zoomed = false;
            self.debug.last_action = format!("tab_{}", tab.index() + 1);
        }
    }

    fn clamp_preview_scroll(&mut self) {
        let rows = match self.panels.get(PanelId::DatasetPreview) {
            Ok(PanelData::Preview(table)) => table.rows.len(),
            _ => 0,
        };
        self.preview_scroll = self.preview_scroll.min(rows.saturating_sub(1));
    }

    pub(crate) fn preview_scroll(&self) -> usize {
        self.preview_scroll
    }

    pub(crate) fn selected_index(&self) -> usize {
        self.selected
    }

    pub(crate) fn sidebar(&self) -> &FilterSidebar {
        &self.sidebar
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let ctx = RenderContext::from_theme_and_config(
            &self.theme,
            self.config.display.show_panel_numbers,
            self.config.chart.scatter_row_limit,
        );

        Clear.render(area, buf);
        Block::default()
            .style(Style::default().bg(ctx.background))
            .render(area, buf);

        let layout = render::layout::app_layout(area, self.debug.enabled);
        render::dashboard::render_dashboard(layout.main_view, buf, self, &ctx);

        let controls = widgets::controls::Controls::from_context(&ctx)
            .with_row_count(self.view.height(), self.dataset.height())
            .with_controls(match self.focus {
                Focus::Panels => &widgets::controls::PANEL_CONTROLS,
                Focus::Sidebar => &widgets::controls::SIDEBAR_CONTROLS,
            });
        (&controls).render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            (&self.debug).render(debug_area, buf);
        }

        if self.show_help {
            let (title, text) = match self.focus {
                Focus::Panels => ("Help", help_strings::dashboard()),
                Focus::Sidebar => ("Filter Help", help_strings::filters()),
            };
            render::overlays::render_help_overlay(
                area,
                buf,
                title,
                text,
                &mut self.help_scroll,
                &ctx,
            );
        }

        if let Some(message) = &self.error_modal {
            render::overlays::render_error_modal(area, buf, message, &ctx);
        }
    }
}

/// Run the dashboard on an already-loaded dataset until the user quits.
pub fn run(dataset: Arc<Dataset>, options: DashboardOptions, config: AppConfig) -> Result<()> {
    use std::sync::mpsc;

    let theme = Theme::from_config(&config.theme)
        .or_else(|e| Theme::from_config(&AppConfig::default().theme).map_err(|_| e))?;

    let mut terminal = ratatui::try_init().map_err(|e| {
        color_eyre::eyre::eyre!(
            "salesdash requires an interactive terminal (TTY). No terminal detected: {}. \
             Run from a terminal or ensure stdout is connected to a TTY.",
            e
        )
    })?;
    let (tx, rx) = mpsc::channel::<AppEvent>();
    let poll_interval =
        std::time::Duration::from_millis(config.performance.event_poll_interval_ms);
    let mut app = App::new(dataset, theme, config, &options);
    info!(
        rows = app.dataset().height(),
        tab = app.tab().title(),
        "dashboard started"
    );

    terminal.draw(|frame| frame.render_widget(&mut app, frame.area()))?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if key.is_press() {
                        tx.send(AppEvent::Key(key))?
                    }
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        ratatui::restore();
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(next) = app.event(&event) {
                            tx.send(next)?;
                        }
                    }
                }
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => false,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            terminal.draw(|frame| frame.render_widget(&mut app, frame.area()))?;
        }
    }

    ratatui::restore();
    info!("dashboard closed");
    Ok(())
}
