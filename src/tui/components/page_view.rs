//! # Page Screen Component
//!
//! Renders the top of the navigation stack:
//!
//! ```text
//! ╭───────╮
//! │ Title │──────────────────────────────
//! ╰───────╯
//! body (wrapped, scrollable)
//! ──────────────────────────────── 42%
//! [Link]
//! > [tag] ==> Related Page
//!   Body Link
//! 1/3                     (or spinner)
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::core::state::{PageView, ViewState};
use crate::scrapbox::{Content, Link};
use crate::tui::component::Component;
use crate::tui::components::spinner_glyph;

pub struct PageScreen<'a> {
    view: &'a PageView,
    accent: Color,
    spinner_frame: usize,
}

impl<'a> PageScreen<'a> {
    pub fn new(view: &'a PageView, accent: Color, spinner_frame: usize) -> Self {
        Self {
            view,
            accent,
            spinner_frame,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(self.view.page.title.as_str());
        let box_width = u16::try_from(title.width() + 4)
            .unwrap_or(u16::MAX)
            .min(area.width);
        let [title_area, rule_area] =
            Layout::horizontal([Constraint::Length(box_width), Constraint::Min(0)]).areas(area);

        let title_box = Paragraph::new(title)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.accent))
                    .padding(Padding::horizontal(1)),
            );
        frame.render_widget(title_box, title_area);

        if rule_area.height >= 2 {
            let rule = Rect {
                y: rule_area.y + 1,
                height: 1,
                ..rule_area
            };
            let line = "─".repeat(usize::from(rule.width));
            frame.render_widget(
                Paragraph::new(line).style(Style::default().fg(self.accent)),
                rule,
            );
        }
    }

    fn render_body(&self, frame: &mut Frame, content: &Content, body: Rect, footer: Rect) {
        let paragraph = Paragraph::new(content.body.clone()).wrap(Wrap { trim: false });
        let total = paragraph.line_count(body.width);
        let max_scroll = total.saturating_sub(usize::from(body.height));
        let offset = usize::from(self.view.scroll).min(max_scroll);
        let offset_u16 = u16::try_from(offset).unwrap_or(u16::MAX);
        frame.render_widget(paragraph.scroll((offset_u16, 0)), body);

        let percent = if max_scroll == 0 {
            100
        } else {
            offset * 100 / max_scroll
        };
        let label = format!(" {percent:>3}% ");
        let rule_width = usize::from(footer.width).saturating_sub(label.len());
        let footer_line = Line::from(vec![
            Span::styled("─".repeat(rule_width), Style::default().fg(Color::DarkGray)),
            Span::raw(label),
        ]);
        frame.render_widget(Paragraph::new(footer_line), footer);
    }

    fn link_row(&self, link: &Link, selected: bool) -> Line<'static> {
        let marker = if selected { ">" } else { " " };
        let text = if link.tag.is_empty() {
            format!("{marker} {}", link.title)
        } else {
            format!("{marker} [{}] ==> {}", link.tag, link.title)
        };
        if selected {
            Line::styled(text, Style::default().fg(self.accent).add_modifier(Modifier::BOLD))
        } else {
            Line::raw(text)
        }
    }

    fn render_links(&self, frame: &mut Frame, heading: Rect, list: Rect, pager: Rect) {
        let links = self.view.links();
        let cursor = self.view.cursor;

        frame.render_widget(
            Paragraph::new(Line::styled(
                "[Link]",
                Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            )),
            heading,
        );

        let rows: Vec<Line> = if links.is_empty() && self.view.links_loaded {
            vec![Line::styled("  (no links)", Style::default().fg(Color::DarkGray))]
        } else {
            cursor
                .window(links.len())
                .map(|i| self.link_row(&links[i], i == cursor.index))
                .collect()
        };
        frame.render_widget(Paragraph::new(rows), list);

        let status = if self.view.links_loaded {
            Line::styled(
                format!("{}/{}", cursor.page() + 1, cursor.total_pages(links.len())),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Line::from(vec![
                Span::styled(spinner_glyph(self.spinner_frame), Style::default().fg(self.accent)),
                Span::styled(" resolving related pages", Style::default().fg(Color::DarkGray)),
            ])
        };
        frame.render_widget(Paragraph::new(status), pager);
    }
}

impl Component for PageScreen<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use Constraint::{Length, Min};

        let link_rows = u16::try_from(self.view.cursor.per_page).unwrap_or(u16::MAX);
        let [header, body, footer, heading, list, pager] = Layout::vertical([
            Length(3),
            Min(1),
            Length(1),
            Length(1),
            Length(link_rows),
            Length(1),
        ])
        .areas(area);

        self.render_header(frame, header);

        match &self.view.state {
            ViewState::Fetching => {
                frame.render_widget(Paragraph::new("Fetching...\n"), body);
            }
            ViewState::Failed(msg) => {
                let lines = vec![
                    Line::styled(
                        format!("Could not load this page: {msg}"),
                        Style::default().fg(Color::Red),
                    ),
                    Line::raw(""),
                    Line::styled("Press Esc to go back.", Style::default().fg(Color::DarkGray)),
                ];
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), body);
            }
            ViewState::Ready(content) => {
                self.render_body(frame, content, body, footer);
                self.render_links(frame, heading, list, pager);
            }
        }
    }
}
