//! Filter sidebar state and key handling.

use crate::dataset::Dataset;
use crate::filter::FilterState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Steps moved per key press when Shift is held.
pub const COARSE_STEP_MULTIPLIER: u64 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SidebarSection {
    #[default]
    Company,
    Region,
    Price,
}

impl SidebarSection {
    pub fn next(self) -> Self {
        match self {
            SidebarSection::Company => SidebarSection::Region,
            SidebarSection::Region => SidebarSection::Price,
            SidebarSection::Price => SidebarSection::Company,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SidebarSection::Company => SidebarSection::Price,
            SidebarSection::Region => SidebarSection::Company,
            SidebarSection::Price => SidebarSection::Region,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PriceHandle {
    #[default]
    Min,
    Max,
}

/// Outcome of a key press in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    /// The filter state changed; the view must be recomputed.
    Changed,
    Close,
}

#[derive(Debug, Clone)]
pub struct FilterSidebar {
    pub section: SidebarSection,
    pub company_cursor: usize,
    pub region_cursor: usize,
    pub handle: PriceHandle,
    pub price_step: u64,
}

impl FilterSidebar {
    pub fn new(price_step: u64) -> Self {
        Self {
            section: SidebarSection::default(),
            company_cursor: 0,
            region_cursor: 0,
            handle: PriceHandle::default(),
            price_step: price_step.max(1),
        }
    }

    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        filters: &mut FilterState,
        dataset: &Dataset,
    ) -> SidebarAction {
        match event.code {
            KeyCode::Esc | KeyCode::Char('f') => return SidebarAction::Close,
            KeyCode::Tab => {
                self.section = self.section.next();
                return SidebarAction::None;
            }
            KeyCode::BackTab => {
                self.section = self.section.prev();
                return SidebarAction::None;
            }
            KeyCode::Char('r') => {
                if filters.is_default(dataset) {
                    return SidebarAction::None;
                }
                filters.reset(dataset);
                return SidebarAction::Changed;
            }
            _ => {}
        }

        let before = filters.clone();
        match self.section {
            SidebarSection::Company => {
                let items = dataset.companies();
                match event.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.company_cursor = self.company_cursor.saturating_sub(1)
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.company_cursor = step_down(self.company_cursor, items.len())
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let Some(company) = items.get(self.company_cursor) {
                            filters.toggle_company(company);
                        }
                    }
                    KeyCode::Char('a') => filters.select_all_companies(dataset),
                    KeyCode::Char('n') => filters.clear_companies(),
                    _ => {}
                }
            }
            SidebarSection::Region => {
                let items = dataset.regions();
                match event.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.region_cursor = self.region_cursor.saturating_sub(1)
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.region_cursor = step_down(self.region_cursor, items.len())
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let Some(region) = items.get(self.region_cursor) {
                            filters.toggle_region(region);
                        }
                    }
                    KeyCode::Char('a') => filters.select_all_regions(dataset),
                    KeyCode::Char('n') => filters.clear_regions(),
                    _ => {}
                }
            }
            SidebarSection::Price => {
                let step = if event.modifiers.contains(KeyModifiers::SHIFT) {
                    self.price_step.saturating_mul(COARSE_STEP_MULTIPLIER)
                } else {
                    self.price_step
                };
                let step = i64::try_from(step).unwrap_or(i64::MAX);
                match event.code {
                    KeyCode::Up | KeyCode::Char('k') => self.handle = PriceHandle::Min,
                    KeyCode::Down | KeyCode::Char('j') => self.handle = PriceHandle::Max,
                    KeyCode::Left | KeyCode::Char('h') => self.move_handle(-step, filters, dataset),
                    KeyCode::Right | KeyCode::Char('l') => self.move_handle(step, filters, dataset),
                    KeyCode::Home => self.move_handle(i64::MIN, filters, dataset),
                    KeyCode::End => self.move_handle(i64::MAX, filters, dataset),
                    _ => {}
                }
            }
        }

        if *filters != before {
            SidebarAction::Changed
        } else {
            SidebarAction::None
        }
    }

    fn move_handle(&self, delta: i64, filters: &mut FilterState, dataset: &Dataset) {
        match self.handle {
            PriceHandle::Min => {
                let value = filters.price_range.0.saturating_add(delta);
                filters.set_price_min(value, dataset);
            }
            PriceHandle::Max => {
                let value = filters.price_range.1.saturating_add(delta);
                filters.set_price_max(value, dataset);
            }
        }
    }
}

fn step_down(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (cursor + 1).min(len - 1)
    }
}
