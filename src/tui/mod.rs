//! Interactive terminal front end.
//!
//! - `input`: key to action mapping
//! - `app`: UI-only state (selection, add form, panels, tint)
//! - `ui`: drawing
//!
//! [`run`] owns the terminal and a single-threaded loop that waits on
//! keyboard input, driver ticks, timer events and a redraw interval.

pub mod app;
pub mod input;
pub mod ui;

use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::sound::SoundPlayer;
use crate::storage::KeyValueStore;
use crate::timer::{Tick, TimerEvent};
use crate::types::Settings;

pub use app::App;
pub use input::{map_key, Action};

/// Redraw period, fast enough for a smooth tint fade.
pub const REDRAW_PERIOD: Duration = Duration::from_millis(100);

/// Terminal in raw mode on the alternate screen. Restored on drop.
struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Runs the interactive timer until the user quits.
pub async fn run(
    settings: Settings,
    store: Arc<dyn KeyValueStore>,
    player: Option<Arc<dyn SoundPlayer>>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(settings, store, event_tx, tick_tx)
        .context("Invalid timer settings")?
        .with_player(player);

    info!("Starting timer UI");
    let mut tui = Tui::enter()?;
    let result = event_loop(&mut tui.terminal, &mut session, &mut tick_rx, &mut event_rx).await;
    drop(tui);
    info!("Timer UI closed");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut Session,
    tick_rx: &mut mpsc::UnboundedReceiver<Tick>,
    event_rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
) -> Result<()> {
    let mut app = App::new();
    let mut reader = EventStream::new();
    let mut redraw = interval(REDRAW_PERIOD);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = Instant::now();
        if app.observe(session, now) {
            execute!(io::stdout(), SetTitle(session.window_title()))?;
        }
        terminal.draw(|f| ui::render(f, &app, session, now))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            maybe_event = reader.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Some(action) = map_key(key, app.focus.is_form()) {
                        app.handle(action, session);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => return Ok(()),
            },
            Some(tick) = tick_rx.recv() => {
                session.on_tick(tick);
            }
            Some(event) = event_rx.recv() => {
                debug!("Timer event: {:?}", event);
            }
            _ = redraw.tick() => {}
        }
    }
}
