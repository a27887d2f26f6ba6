//! # TitleBar Component
//!
//! Top line of the list screen showing the project and status.
//!
//! ## Conditional Formatting
//!
//! 1. **Loading**: `"sbox (project: help-jp) | Loading pages... | /"`
//! 2. **Status message**: `"sbox (project: help-jp) | 500 pages"`
//! 3. **Default**: `"sbox (project: help-jp)"`
//!
//! TitleBar is purely presentational. All data arrives as props.

use crate::tui::component::Component;
use crate::tui::components::spinner_glyph;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

pub struct TitleBar {
    pub project: String,
    pub status_message: String,
    /// Spinner frame while a request is in flight.
    pub loading_frame: Option<usize>,
}

impl TitleBar {
    pub fn new(project: String, status_message: String, loading_frame: Option<usize>) -> Self {
        Self {
            project,
            status_message,
            loading_frame,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut title_text = format!("sbox (project: {})", self.project);
        if !self.status_message.is_empty() {
            title_text.push_str(" | ");
            title_text.push_str(&self.status_message);
        }
        if let Some(spinner_frame) = self.loading_frame {
            title_text.push_str(" | ");
            title_text.push_str(spinner_glyph(spinner_frame));
        }

        frame.render_widget(Span::raw(title_text), area);
    }
}
