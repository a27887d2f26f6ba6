//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values and carries out
//! the Effects that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Background Work
//!
//! Every network request runs in a tokio task that reports back with an
//! `Action` over an `std::sync::mpsc` channel. The loop drains that channel
//! between input events, so state is only ever touched from one thread.
//! Tasks started for a page view are aborted when that view is popped.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (a request in flight): draws every ~80ms for the spinner.
//! - **Idle**: sleeps up to 500ms, only redraws on events or background results.

mod component;
mod components;
mod event;
mod keymap;
mod ui;

use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::style::Color;
use tokio::task::AbortHandle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, LayoutContext, ViewId};
use crate::scrapbox::{Page, PageSource, Pager, ScrapboxClient};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, Hide)?;
        info!("Terminal modes enabled (mouse capture, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, Show);
    }
}

/// Abort handles of background requests. Page requests are grouped by the
/// view that started them so popping a view can cancel them.
#[derive(Default)]
struct InFlight {
    list: Option<AbortHandle>,
    by_view: HashMap<ViewId, Vec<AbortHandle>>,
}

impl InFlight {
    fn track(&mut self, view: ViewId, handle: AbortHandle) {
        self.by_view.entry(view).or_default().push(handle);
    }

    fn cancel(&mut self, view: ViewId) {
        if let Some(handles) = self.by_view.remove(&view) {
            let pending = handles.iter().filter(|h| !h.is_finished()).count();
            for handle in handles {
                handle.abort();
            }
            debug!("Cancelled view {} ({} requests still pending)", view, pending);
        }
    }

    fn abort_all(&mut self) {
        if let Some(handle) = self.list.take() {
            handle.abort();
        }
        for (_, handles) in self.by_view.drain() {
            for handle in handles {
                handle.abort();
            }
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let project = config.project();
    info!("Browsing '{}' at {}", project.name, project.base_url);
    let source: Arc<dyn PageSource> = Arc::new(ScrapboxClient::new(project.clone()));
    let mut app = App::new(project, config.accent);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Failed to enable terminal modes: {}", e);
            None
        }
    };

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut in_flight = InFlight::default();

    let size = terminal.size()?;
    update(&mut app, Action::Resize(LayoutContext::new(size.width, size.height)));
    let effect = update(&mut app, Action::LoadMorePages);
    run_effect(effect, &mut app, &source, &tx, &mut in_flight);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.is_busy();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 10.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = keymap::to_action(&app, event) else {
                continue;
            };
            debug!("Dispatching {:?}", action);
            let effect = update(&mut app, action);
            if run_effect(effect, &mut app, &source, &tx, &mut in_flight) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }

        // Handle background task results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            let effect = update(&mut app, action);
            if run_effect(effect, &mut app, &source, &tx, &mut in_flight) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }
    }

    in_flight.abort_all();
    ratatui::restore();
    info!("sbox shutting down");
    Ok(())
}

/// Carries out an effect. Returns true when the app should quit.
fn run_effect(
    effect: Effect,
    app: &mut App,
    source: &Arc<dyn PageSource>,
    tx: &mpsc::Sender<Action>,
    in_flight: &mut InFlight,
) -> bool {
    match effect {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::LoadPages(pager) => {
            in_flight.list = Some(spawn_page_list(source.clone(), pager, tx.clone()));
        }
        Effect::FetchPage { view, page } => {
            let handle = spawn_page_fetch(source.clone(), view, page, app.accent, tx.clone());
            in_flight.track(view, handle);
        }
        Effect::FetchRelated { view, page } => {
            let handle = spawn_related_fetch(source.clone(), view, page, tx.clone());
            in_flight.track(view, handle);
        }
        Effect::OpenUrl(url) => {
            if let Err(e) = webbrowser::open(&url) {
                warn!("Failed to open {} in a browser: {}", url, e);
                app.status_message = format!("Could not open {url}: {e}");
            }
        }
        Effect::CancelView(view) => in_flight.cancel(view),
    }
    false
}

fn spawn_page_list(
    source: Arc<dyn PageSource>,
    mut pager: Pager,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!(
        "Spawning page list request (skip={}, limit={})",
        pager.skip, pager.limit
    );
    tokio::spawn(async move {
        let result = pager.read(source.as_ref()).await;
        if tx.send(Action::PagesLoaded { pager, result }).is_err() {
            warn!("Failed to send page list: receiver dropped");
        }
    })
    .abort_handle()
}

fn spawn_page_fetch(
    source: Arc<dyn PageSource>,
    view: ViewId,
    page: Page,
    accent: Color,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!("Spawning page fetch for '{}' (view {})", page.title, view);
    tokio::spawn(async move {
        let result = page.read(source.as_ref(), accent).await;
        if tx.send(Action::PageLoaded { view, result }).is_err() {
            warn!("Failed to send page for view {}: receiver dropped", view);
        }
    })
    .abort_handle()
}

fn spawn_related_fetch(
    source: Arc<dyn PageSource>,
    view: ViewId,
    page: Page,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    debug!("Spawning related-pages fetch for '{}' (view {})", page.title, view);
    tokio::spawn(async move {
        let result = page.nhop_links(source.as_ref()).await;
        if tx.send(Action::RelatedLinksLoaded { view, result }).is_err() {
            warn!("Failed to send related pages for view {}: receiver dropped", view);
        }
    })
    .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ViewState;
    use crate::scrapbox::Link;
    use crate::test_support::{StubSource, test_app, test_app_with_pages};

    const WAIT: Duration = Duration::from_secs(5);

    fn stub(source: StubSource) -> Arc<dyn PageSource> {
        Arc::new(source)
    }

    #[test]
    fn test_quit_and_none_effects() {
        let mut app = test_app();
        let source = stub(StubSource::new());
        let (tx, _rx) = mpsc::channel();
        let mut in_flight = InFlight::default();

        assert!(run_effect(Effect::Quit, &mut app, &source, &tx, &mut in_flight));
        assert!(!run_effect(Effect::None, &mut app, &source, &tx, &mut in_flight));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_pages_reports_advanced_pager() {
        let mut app = test_app();
        let source = stub(StubSource::new().with_listing(3));
        let (tx, rx) = mpsc::channel();
        let mut in_flight = InFlight::default();

        run_effect(Effect::LoadPages(Pager::new(2)), &mut app, &source, &tx, &mut in_flight);
        assert!(in_flight.list.is_some());

        let Ok(Action::PagesLoaded { pager, result }) = rx.recv_timeout(WAIT) else {
            panic!("expected PagesLoaded");
        };
        assert_eq!(pager.skip, 2);
        assert_eq!(result.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_open_page_then_related_links() {
        let mut app = test_app_with_pages(&["Home"]);
        let source = stub(
            StubSource::new()
                .with_text("Home", "Home\nsee [Guide] and [Guide]")
                .with_related("Home", vec![Link::tagged("Guide", "docs"), Link::tagged("FAQ", "docs")]),
        );
        let (tx, rx) = mpsc::channel();
        let mut in_flight = InFlight::default();

        let effect = update(&mut app, Action::Activate);
        run_effect(effect, &mut app, &source, &tx, &mut in_flight);
        let action = rx.recv_timeout(WAIT).unwrap();
        assert!(matches!(action, Action::PageLoaded { result: Ok(_), .. }));

        let effect = update(&mut app, action);
        assert!(matches!(effect, Effect::FetchRelated { .. }));
        run_effect(effect, &mut app, &source, &tx, &mut in_flight);
        let action = rx.recv_timeout(WAIT).unwrap();
        update(&mut app, action);

        let view = app.current_view().unwrap();
        assert!(view.links_loaded);
        let titles: Vec<&str> = view.links().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Guide", "FAQ"]);
        assert_eq!(in_flight.by_view[&view.id].len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_missing_page_fails_the_view() {
        let mut app = test_app_with_pages(&["Ghost"]);
        let source = stub(StubSource::new());
        let (tx, rx) = mpsc::channel();
        let mut in_flight = InFlight::default();

        let effect = update(&mut app, Action::Activate);
        run_effect(effect, &mut app, &source, &tx, &mut in_flight);
        let action = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(update(&mut app, action), Effect::None);

        let view = app.current_view().unwrap();
        assert!(matches!(&view.state, ViewState::Failed(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_cancel_view_aborts_its_requests() {
        let mut in_flight = InFlight::default();
        let pending = tokio::spawn(std::future::pending::<()>());
        let other = tokio::spawn(std::future::pending::<()>());
        in_flight.track(1, pending.abort_handle());
        in_flight.track(2, other.abort_handle());

        in_flight.cancel(1);
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(in_flight.by_view.contains_key(&2));

        in_flight.abort_all();
        assert!(other.await.unwrap_err().is_cancelled());
        assert!(in_flight.by_view.is_empty());
    }
}
