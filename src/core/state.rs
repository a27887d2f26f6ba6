//! # Application State
//!
//! Core browsing state for sbox. This module contains domain logic only -
//! no terminal I/O. Presentation lives in the `tui` module.
//!
//! ```text
//! App
//! ├── project: Project            // address derivation for new pages
//! ├── accent: Color               // link / selection color
//! ├── layout: LayoutContext       // terminal size, one per session
//! ├── list: PageListState         // root list view
//! ├── views: Vec<PageView>        // navigation stack, empty = list view
//! ├── status_message: String      // status bar text
//! └── error: Option<String>       // fatal error, replaces the whole screen
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::ops::Range;

use ratatui::style::Color;
use ratatui::widgets::{Paragraph, Wrap};

use crate::scrapbox::{Content, Link, Page, Pager, Project};

/// Identifies one pushed page view. Background results carry it back so a
/// result for a view that was popped in the meantime can be recognized.
pub type ViewId = u64;

/// Rows of a page screen not available to body or link list: header (3),
/// footer, `[Link]` heading and the pagination/spinner row.
pub const PAGE_CHROME_ROWS: u16 = 6;

/// Rows of the list screen not available to items: title bar and the
/// list block's borders.
pub const LIST_CHROME_ROWS: u16 = 3;

// ============================================================================
// Layout
// ============================================================================

/// Terminal dimensions, handed to every view on construction and resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContext {
    pub width: u16,
    pub height: u16,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl LayoutContext {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// The link list gets a quarter of the usable height.
    pub fn links_per_page(&self) -> usize {
        usize::from(self.height.saturating_sub(PAGE_CHROME_ROWS) / 4).max(1)
    }

    /// Rows left for the page body once chrome and links are placed.
    pub fn body_rows(&self) -> u16 {
        let links = u16::try_from(self.links_per_page()).unwrap_or(u16::MAX);
        self.height
            .saturating_sub(PAGE_CHROME_ROWS)
            .saturating_sub(links)
            .max(1)
    }

    /// Items per page in the list view. Each item takes two rows.
    pub fn list_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(LIST_CHROME_ROWS) / 2).max(1)
    }
}

// ============================================================================
// Link cursor
// ============================================================================

/// Selection in a page's link list plus its pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCursor {
    pub index: usize,
    pub per_page: usize,
}

impl LinkCursor {
    pub fn new(per_page: usize) -> Self {
        Self {
            index: 0,
            per_page: per_page.max(1),
        }
    }

    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    /// Moves by `pages` whole pages, clamped to the list.
    pub fn jump(&mut self, pages: isize, len: usize) {
        let step = pages.unsigned_abs().saturating_mul(self.per_page);
        self.index = if pages < 0 {
            self.index.saturating_sub(step)
        } else {
            self.index.saturating_add(step).min(len.saturating_sub(1))
        };
    }

    /// Pagination page the cursor is on.
    pub fn page(&self) -> usize {
        self.index / self.per_page
    }

    /// Row of the cursor within the visible page.
    pub fn row(&self) -> usize {
        self.index % self.per_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page).max(1)
    }

    /// Index range of the visible page.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = (self.page() * self.per_page).min(len);
        start..(start + self.per_page).min(len)
    }
}

// ============================================================================
// Page views
// ============================================================================

#[derive(Debug)]
pub enum ViewState {
    /// Waiting for the page text.
    Fetching,
    Ready(Content),
    /// The fetch failed; backing out and re-entering retries it.
    Failed(String),
}

/// One screen of the navigation stack, bound to one page.
#[derive(Debug)]
pub struct PageView {
    pub id: ViewId,
    pub page: Page,
    pub state: ViewState,
    /// False until the related-links request has finished (either way).
    pub links_loaded: bool,
    pub cursor: LinkCursor,
    /// Body scroll offset in lines.
    pub scroll: u16,
}

impl PageView {
    pub fn new(id: ViewId, page: Page, layout: LayoutContext) -> Self {
        Self {
            id,
            page,
            state: ViewState::Fetching,
            links_loaded: false,
            cursor: LinkCursor::new(layout.links_per_page()),
            scroll: 0,
        }
    }

    pub fn content(&self) -> Option<&Content> {
        match &self.state {
            ViewState::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn links(&self) -> &[Link] {
        self.content().map_or(&[], |c| c.links.as_slice())
    }

    pub fn selected_link(&self) -> Option<&Link> {
        self.links().get(self.cursor.index)
    }

    /// Furthest the body can scroll on a terminal of this size, measured
    /// with the same word wrap the page screen draws.
    pub fn max_scroll(&self, layout: LayoutContext) -> u16 {
        let rows = self.content().map_or(0, |c| {
            Paragraph::new(c.body.clone())
                .wrap(Wrap { trim: false })
                .line_count(layout.width.max(1))
        });
        let max = rows.saturating_sub(usize::from(layout.body_rows()));
        u16::try_from(max).unwrap_or(u16::MAX)
    }

    /// True while either request for this view is still outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Fetching) || !self.links_loaded
    }
}

// ============================================================================
// Page list
// ============================================================================

/// Root list of the project's pages.
#[derive(Debug, Default)]
pub struct PageListState {
    pub pages: Vec<Page>,
    /// Index into `visible()`.
    pub selected: usize,
    pub pager: Pager,
    pub loading: bool,
    /// Set once a batch came back short; no more pages to ask for.
    pub exhausted: bool,
    pub filter: String,
    /// True while the filter query is being typed.
    pub filtering: bool,
}

impl PageListState {
    /// Pages whose title contains the filter query (case-insensitive).
    pub fn visible(&self) -> Vec<&Page> {
        if self.filter.is_empty() {
            return self.pages.iter().collect();
        }
        let query = self.filter.to_lowercase();
        self.pages
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&query))
            .collect()
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.visible().get(self.selected).copied()
    }

    /// Keeps the selection inside the visible list.
    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub project: Project,
    pub accent: Color,
    pub layout: LayoutContext,
    pub list: PageListState,
    pub views: Vec<PageView>,
    pub status_message: String,
    pub error: Option<String>,
    next_view_id: ViewId,
}

impl App {
    pub fn new(project: Project, accent: Color) -> Self {
        Self {
            project,
            accent,
            layout: LayoutContext::default(),
            list: PageListState::default(),
            views: Vec::new(),
            status_message: String::new(),
            error: None,
            next_view_id: 1,
        }
    }

    /// Top of the navigation stack; `None` means the list view is showing.
    pub fn current_view(&self) -> Option<&PageView> {
        self.views.last()
    }

    pub fn current_view_mut(&mut self) -> Option<&mut PageView> {
        self.views.last_mut()
    }

    pub fn find_view_mut(&mut self, id: ViewId) -> Option<&mut PageView> {
        self.views.iter_mut().find(|v| v.id == id)
    }

    /// Pushes a fresh view for `page` and returns its id.
    pub fn push_view(&mut self, page: Page) -> ViewId {
        let id = self.next_view_id;
        self.next_view_id += 1;
        self.views.push(PageView::new(id, page, self.layout));
        id
    }

    pub fn resize(&mut self, layout: LayoutContext) {
        self.layout = layout;
        let per_page = layout.links_per_page();
        for view in &mut self.views {
            view.cursor.per_page = per_page;
        }
    }

    /// Whether something is in flight that the screen should animate for.
    pub fn is_busy(&self) -> bool {
        match self.current_view() {
            Some(view) => view.is_loading(),
            None => self.list.loading,
        }
    }
}
