//! # Page List Component
//!
//! Paginated list of the project's pages. Each item shows the title and,
//! underneath, the page's text address.
//!
//! Transient wrapper: created every frame with borrowed `PageListState`.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};

use crate::core::state::PageListState;
use crate::tui::component::Component;
use crate::tui::components::spinner_glyph;

pub struct PageList<'a> {
    state: &'a PageListState,
    accent: Color,
    /// Items per page.
    rows: usize,
    spinner_frame: usize,
}

impl<'a> PageList<'a> {
    pub fn new(state: &'a PageListState, accent: Color, rows: usize, spinner_frame: usize) -> Self {
        Self {
            state,
            accent,
            rows: rows.max(1),
            spinner_frame,
        }
    }

    fn title(&self) -> Line<'static> {
        if self.state.filtering {
            Line::from(vec![
                Span::raw(" Filter: "),
                Span::styled(format!("{}_ ", self.state.filter), Style::default().fg(self.accent)),
            ])
        } else if !self.state.filter.is_empty() {
            Line::from(format!(" Pages matching \"{}\" ", self.state.filter))
        } else {
            Line::from(" Pages ")
        }
    }

    fn help(&self) -> &'static str {
        if self.state.filtering {
            " Enter keep filter  Esc clear "
        } else {
            " ↑↓ select  ←→ page  / filter  m more  Enter open  q quit "
        }
    }
}

impl Component for PageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let visible = self.state.visible();
        let page = self.state.selected / self.rows;
        let total_pages = visible.len().div_ceil(self.rows).max(1);

        let block = Block::bordered()
            .border_style(Style::default().fg(Color::DarkGray))
            .title(self.title())
            .title_bottom(Line::from(self.help()).centered())
            .title_bottom(Line::from(format!(" {}/{} ", page + 1, total_pages)).right_aligned())
            .padding(Padding::horizontal(1));

        if visible.is_empty() {
            let message = if self.state.loading {
                format!("Loading pages {}", spinner_glyph(self.spinner_frame))
            } else if !self.state.filter.is_empty() {
                format!("No pages match \"{}\".", self.state.filter)
            } else {
                "No pages.".to_string()
            };
            let empty = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let start = page * self.rows;
        let end = (start + self.rows).min(visible.len());
        let items: Vec<ListItem> = visible[start..end]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let selected = start + i == self.state.selected;
                let (marker, title_style, desc_style) = if selected {
                    (
                        Span::styled("│ ", Style::default().fg(self.accent)),
                        Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
                        Style::default().fg(self.accent),
                    )
                } else {
                    (
                        Span::raw("  "),
                        Style::default(),
                        Style::default().fg(Color::DarkGray),
                    )
                };
                ListItem::new(vec![
                    Line::from(vec![marker.clone(), Span::styled(entry.title.clone(), title_style)]),
                    Line::from(vec![marker, Span::styled(entry.description(), desc_style)]),
                ])
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_ACCENT, test_app_with_pages};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(state: &PageListState, rows: usize) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                PageList::new(state, TEST_ACCENT, rows, 0).render(f, area);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect::<String>()
    }

    #[test]
    fn test_renders_title_and_address() {
        let app = test_app_with_pages(&["Hello World"]);
        let text = render_text(&app.list, 10);

        assert!(text.contains("Hello World"));
        assert!(text.contains("/pages/test-project/Hello World/text"));
        assert!(text.contains("1/1"));
    }

    #[test]
    fn test_shows_only_the_selected_page_of_items() {
        let mut app = test_app_with_pages(&["alpha", "beta", "gamma"]);
        app.list.selected = 2;
        let text = render_text(&app.list, 2);

        assert!(text.contains("gamma"));
        assert!(!text.contains("alpha"));
        assert!(text.contains("2/2"));
    }

    #[test]
    fn test_loading_placeholder() {
        let mut app = test_app_with_pages(&[]);
        app.list.loading = true;
        let text = render_text(&app.list, 10);
        assert!(text.contains("Loading pages"));
    }

    #[test]
    fn test_filter_prompt_and_no_match() {
        let mut app = test_app_with_pages(&["alpha"]);
        app.list.filtering = true;
        app.list.filter = "zzz".to_string();
        let text = render_text(&app.list, 10);

        assert!(text.contains("Filter: zzz_"));
        assert!(text.contains("No pages match \"zzz\"."));
    }
}
