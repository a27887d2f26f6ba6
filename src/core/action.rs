//! # Actions
//!
//! Everything that can happen in sbox becomes an `Action`.
//! User presses Enter on a link? That's `Action::Activate`.
//! Page text arrives? That's `Action::PageLoaded { view, result }`.
//!
//! The `update()` function applies an action to the state and returns the
//! `Effect` the event loop should carry out. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Results of background fetches name the view they were started for.
//! Once that view has been popped the result is dropped.

use log::{debug, info, warn};

use crate::core::state::{App, LayoutContext, ViewId, ViewState};
use crate::scrapbox::markup::find_url;
use crate::scrapbox::{ApiError, Content, Link, Page, Pager};

#[derive(Debug)]
pub enum Action {
    Resize(LayoutContext),

    // List view
    LoadMorePages,
    PagesLoaded {
        pager: Pager,
        result: Result<Vec<Page>, ApiError>,
    },
    FilterStart,
    FilterInput(char),
    FilterBackspace,
    FilterConfirm,
    FilterClear,

    // Shared by both views
    CursorPrev,
    CursorNext,
    PagePrev,
    PageNext,
    Activate,
    Back,
    Quit,

    // Page view
    Scroll(i32),
    PageLoaded {
        view: ViewId,
        result: Result<Content, ApiError>,
    },
    RelatedLinksLoaded {
        view: ViewId,
        result: Result<Vec<Link>, ApiError>,
    },
}

/// Side effects requested by `update()`. Executed by the TUI event loop.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    LoadPages(Pager),
    FetchPage { view: ViewId, page: Page },
    FetchRelated { view: ViewId, page: Page },
    OpenUrl(String),
    /// Abort whatever is still in flight for a popped view.
    CancelView(ViewId),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Resize(layout) => {
            app.resize(layout);
            Effect::None
        }
        Action::LoadMorePages => load_more_pages(app),
        Action::PagesLoaded { pager, result } => pages_loaded(app, pager, result),
        Action::FilterStart => {
            if app.current_view().is_none() {
                app.list.filtering = true;
            }
            Effect::None
        }
        Action::FilterInput(c) => {
            app.list.filter.push(c);
            app.list.selected = 0;
            Effect::None
        }
        Action::FilterBackspace => {
            app.list.filter.pop();
            app.list.clamp_selection();
            Effect::None
        }
        Action::FilterConfirm => {
            app.list.filtering = false;
            Effect::None
        }
        Action::FilterClear => {
            app.list.filter.clear();
            app.list.filtering = false;
            app.list.selected = 0;
            Effect::None
        }
        Action::CursorPrev => {
            match app.views.last_mut() {
                Some(view) => view.cursor.prev(),
                None => app.list.selected = app.list.selected.saturating_sub(1),
            }
            Effect::None
        }
        Action::CursorNext => {
            match app.views.last_mut() {
                Some(view) => {
                    let len = view.links().len();
                    view.cursor.next(len);
                }
                None => {
                    if app.list.selected + 1 < app.list.visible().len() {
                        app.list.selected += 1;
                    }
                }
            }
            Effect::None
        }
        Action::PagePrev => {
            jump(app, -1);
            Effect::None
        }
        Action::PageNext => {
            jump(app, 1);
            Effect::None
        }
        Action::Activate => activate(app),
        Action::Back => match app.views.pop() {
            Some(view) => {
                debug!("Leaving '{}' (view {})", view.page.title, view.id);
                app.status_message.clear();
                Effect::CancelView(view.id)
            }
            None => Effect::Quit,
        },
        Action::Quit => Effect::Quit,
        Action::Scroll(delta) => {
            let layout = app.layout;
            if let Some(view) = app.current_view_mut() {
                let max = view.max_scroll(layout);
                let next = i64::from(view.scroll) + i64::from(delta);
                view.scroll = u16::try_from(next.max(0)).unwrap_or(u16::MAX).min(max);
            }
            Effect::None
        }
        Action::PageLoaded { view, result } => page_loaded(app, view, result),
        Action::RelatedLinksLoaded { view, result } => related_loaded(app, view, result),
    }
}

fn load_more_pages(app: &mut App) -> Effect {
    if app.list.loading || app.list.exhausted {
        return Effect::None;
    }
    app.list.loading = true;
    app.status_message = "Loading pages...".to_string();
    Effect::LoadPages(app.list.pager)
}

fn pages_loaded(app: &mut App, pager: Pager, result: Result<Vec<Page>, ApiError>) -> Effect {
    app.list.loading = false;
    match result {
        Ok(pages) => {
            let received = pages.len();
            app.list.exhausted = received < pager.limit;
            app.list.pager = pager;
            app.list.pages.extend(pages);
            app.status_message = if app.list.exhausted {
                format!("{} pages", app.list.pages.len())
            } else {
                format!("{} pages (m: load more)", app.list.pages.len())
            };
            info!("Page list now holds {} pages (+{})", app.list.pages.len(), received);
        }
        Err(e) => {
            warn!("Failed to list pages of '{}': {}", app.project.name, e);
            if app.list.pages.is_empty() {
                app.error = Some(format!("Could not load pages of '{}': {}", app.project.name, e));
            } else {
                app.status_message = format!("Could not load more pages: {e}");
            }
        }
    }
    Effect::None
}

fn jump(app: &mut App, pages: isize) {
    if let Some(view) = app.views.last_mut() {
        let len = view.links().len();
        view.cursor.jump(pages, len);
        return;
    }
    let rows = app.layout.list_rows();
    let len = app.list.visible().len();
    let step = pages.unsigned_abs().saturating_mul(rows);
    app.list.selected = if pages < 0 {
        app.list.selected.saturating_sub(step)
    } else {
        app.list.selected.saturating_add(step).min(len.saturating_sub(1))
    };
}

fn activate(app: &mut App) -> Effect {
    let page = match app.current_view() {
        None => match app.list.selected_page() {
            Some(page) => page.clone(),
            None => return Effect::None,
        },
        Some(view) => {
            let Some(link) = view.selected_link() else {
                return Effect::None;
            };
            if let Some(url) = find_url(&link.title).map(str::to_string) {
                info!("Opening external link {}", url);
                app.status_message = format!("Opening {url}");
                return Effect::OpenUrl(url);
            }
            app.project.page(link.title.as_str())
        }
    };

    app.status_message.clear();
    let view = app.push_view(page.clone());
    info!("Opening '{}' (view {}, depth {})", page.title, view, app.views.len());
    Effect::FetchPage { view, page }
}

fn page_loaded(app: &mut App, id: ViewId, result: Result<Content, ApiError>) -> Effect {
    let Some(view) = app.find_view_mut(id) else {
        debug!("Dropping page text for closed view {}", id);
        return Effect::None;
    };
    match result {
        Ok(content) => {
            view.state = ViewState::Ready(content);
            view.cursor.index = 0;
            view.scroll = 0;
            Effect::FetchRelated {
                view: id,
                page: view.page.clone(),
            }
        }
        Err(e) => {
            warn!("Failed to fetch '{}': {}", view.page.title, e);
            view.state = ViewState::Failed(e.to_string());
            view.links_loaded = true;
            Effect::None
        }
    }
}

fn related_loaded(app: &mut App, id: ViewId, result: Result<Vec<Link>, ApiError>) -> Effect {
    let Some(view) = app.find_view_mut(id) else {
        debug!("Dropping related links for closed view {}", id);
        return Effect::None;
    };
    view.links_loaded = true;
    let title = view.page.title.clone();
    match result {
        Ok(links) => {
            if let ViewState::Ready(content) = &mut view.state {
                let added = content.merge_related(links);
                debug!("Merged {} related links into '{}'", added, title);
            }
        }
        Err(e) => {
            warn!("Failed to resolve related pages of '{}': {}", title, e);
            if app.current_view().is_some_and(|v| v.id == id) {
                app.status_message = format!("Related pages unavailable: {e}");
            }
        }
    }
    Effect::None
}
