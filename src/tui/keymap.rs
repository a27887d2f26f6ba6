//! Maps input events to core actions, depending on which screen is showing.
//!
//! ```text
//! error screen   Esc/q/Enter quit
//! list screen    ↑/k ↓/j select, ←/h →/l page, Enter/Space open,
//!                / filter, m load more, Esc/q quit
//! page screen    ←/k →/j move link cursor, Enter/Space follow,
//!                ↑ ↓ PgUp PgDn wheel scroll, Esc/c/q back
//! ```

use crate::core::action::Action;
use crate::core::state::{App, LayoutContext};
use crate::tui::event::TuiEvent;

pub fn to_action(app: &App, event: TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize(width, height) => {
            return Some(Action::Resize(LayoutContext::new(width, height)));
        }
        _ => {}
    }

    if app.error.is_some() {
        return match event {
            TuiEvent::Escape | TuiEvent::Enter | TuiEvent::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    if app.current_view().is_some() {
        page_action(app, event)
    } else if app.list.filtering {
        filter_action(event)
    } else {
        list_action(app, event)
    }
}

fn page_action(app: &App, event: TuiEvent) -> Option<Action> {
    let body_rows = i32::from(app.layout.body_rows());
    match event {
        TuiEvent::Escape | TuiEvent::Char('c') | TuiEvent::Char('q') => Some(Action::Back),
        TuiEvent::Left | TuiEvent::Char('k') => Some(Action::CursorPrev),
        TuiEvent::Right | TuiEvent::Char('j') => Some(Action::CursorNext),
        TuiEvent::Enter | TuiEvent::Char(' ') => Some(Action::Activate),
        TuiEvent::Up | TuiEvent::ScrollUp => Some(Action::Scroll(-1)),
        TuiEvent::Down | TuiEvent::ScrollDown => Some(Action::Scroll(1)),
        TuiEvent::PageUp => Some(Action::Scroll(-body_rows)),
        TuiEvent::PageDown => Some(Action::Scroll(body_rows)),
        _ => None,
    }
}

fn filter_action(event: TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::Char(c) => Some(Action::FilterInput(c)),
        TuiEvent::Backspace => Some(Action::FilterBackspace),
        TuiEvent::Enter => Some(Action::FilterConfirm),
        TuiEvent::Escape => Some(Action::FilterClear),
        TuiEvent::Up | TuiEvent::ScrollUp => Some(Action::CursorPrev),
        TuiEvent::Down | TuiEvent::ScrollDown => Some(Action::CursorNext),
        _ => None,
    }
}

fn list_action(app: &App, event: TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::Up | TuiEvent::ScrollUp | TuiEvent::Char('k') => Some(Action::CursorPrev),
        TuiEvent::Down | TuiEvent::ScrollDown | TuiEvent::Char('j') => Some(Action::CursorNext),
        TuiEvent::Left | TuiEvent::PageUp | TuiEvent::Char('h') => Some(Action::PagePrev),
        TuiEvent::Right | TuiEvent::PageDown | TuiEvent::Char('l') => Some(Action::PageNext),
        TuiEvent::Enter | TuiEvent::Char(' ') => Some(Action::Activate),
        TuiEvent::Char('/') => Some(Action::FilterStart),
        TuiEvent::Char('m') => Some(Action::LoadMorePages),
        // Esc first drops an applied filter, then quits
        TuiEvent::Escape if !app.list.filter.is_empty() => Some(Action::FilterClear),
        TuiEvent::Escape | TuiEvent::Char('q') => Some(Action::Back),
        _ => None,
    }
}
