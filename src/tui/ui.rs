use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{PageList, PageScreen, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

pub fn draw_ui(frame: &mut Frame, app: &App, spinner_frame: usize) {
    let area = frame.area();
    if let Some(error_msg) = &app.error {
        draw_error_view(frame, area, error_msg);
        return;
    }

    match app.current_view() {
        Some(view) => PageScreen::new(view, app.accent, spinner_frame).render(frame, area),
        None => draw_list_screen(frame, app, spinner_frame),
    }
}

fn draw_list_screen(frame: &mut Frame, app: &App, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0)]);
    let [title_area, list_area] = layout.areas(frame.area());

    TitleBar::new(
        app.project.name.clone(),
        app.status_message.clone(),
        app.list.loading.then_some(spinner_frame),
    )
    .render(frame, title_area);

    PageList::new(&app.list, app.accent, app.layout.list_rows(), spinner_frame)
        .render(frame, list_area);
}

fn draw_error_view(frame: &mut Frame, area: Rect, error_msg: &str) {
    let error_paragraph = Paragraph::new(vec![
        Line::raw(error_msg),
        Line::raw(""),
        Line::styled("Press q to quit.", Style::default().fg(Color::DarkGray)),
    ])
    .block(Block::bordered().title("ERROR"))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(error_paragraph, area);
}
