//! # TUI Components
//!
//! Presentational components for the two screens. Each is a transient
//! wrapper created every frame with borrowed state from `core::state`:
//!
//! ```text
//! components/
//! ├── mod.rs         (this file, shared spinner)
//! ├── title_bar.rs   (top line of the list screen)
//! ├── page_list.rs   (paginated, filterable list of pages)
//! └── page_view.rs   (page header, body, footer and link list)
//! ```
//!
//! Components never mutate core state. Anything that changes state goes
//! through `core::action::update`.

mod page_list;
mod page_view;
mod title_bar;

pub use page_list::PageList;
pub use page_view::PageScreen;
pub use title_bar::TitleBar;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Line-style spinner glyph for the given animation frame.
pub fn spinner_glyph(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}
