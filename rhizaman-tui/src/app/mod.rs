mod spawn;

use crate::{components, keymap, theme::Theme};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
};
use rhizaman_core::{
    config::SyncConfig, event::AppEvent, exec::CommandRunner, ops::BatchKind, state::AppState,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

pub use spawn::Dispatcher;

/// Handle for dispatching background work
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<AppEvent>,
    cancel: Arc<AtomicBool>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<AppEvent>, cancel: Arc<AtomicBool>) -> Self {
        Self { tx, cancel }
    }

    /// Send an event from a background thread to the main loop
    pub fn send(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAME_MS: u128 = 80;

pub fn run(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    runner: &Arc<dyn CommandRunner>,
    theme: &Theme,
    sync: &SyncConfig,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<AppEvent>();
    let cancel = Arc::new(AtomicBool::new(false));
    let dispatcher = Dispatcher::new(
        Arc::clone(runner),
        EventSender::new(tx, Arc::clone(&cancel)),
        sync.clone(),
    );
    let spinner_start = Instant::now();

    // Every repository starts as loading until the first refresh lands
    let effects = state.start_batch(BatchKind::Refresh);
    dispatcher.execute(effects, &state.repos);

    loop {
        state.expire_message(Instant::now());
        terminal.draw(|f| draw(f, state, theme, &spinner_start))?;

        // Check background channel (non-blocking)
        if let Ok(app_event) = rx.try_recv() {
            let effects = state.apply_event(app_event);
            if dispatcher.execute(effects, &state.repos) {
                break;
            }
            continue;
        }

        // Poll terminal events with a timeout so we can update spinner + check channel
        if event::poll(Duration::from_millis(80))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = keymap::resolve_action(key, state) {
                let effects = state.handle_action(action);
                if dispatcher.execute(effects, &state.repos) {
                    break;
                }
            }
        }
    }

    // Signal cancellation to background threads
    cancel.store(true, Ordering::Relaxed);
    Ok(())
}

fn draw(f: &mut Frame, state: &AppState, theme: &Theme, spinner_start: &Instant) {
    let chunks = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(f.area());

    components::repo_list::draw(f, chunks[0], state, theme);
    components::message_bar::draw(f, chunks[1], state, theme, spinner_frame(spinner_start));
    components::help_bar::draw(f, chunks[2], state, theme);

    if let Some(prompt) = &state.commit_prompt {
        components::commit_prompt::draw(f, chunks[0], prompt, state.queued_prompts.len(), theme);
    }
}

fn spinner_frame(start: &Instant) -> &'static str {
    let idx = (start.elapsed().as_millis() / SPINNER_FRAME_MS) as usize % SPINNER_FRAMES.len();
    SPINNER_FRAMES[idx]
}
