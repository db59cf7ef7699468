// Native binary for the Bloque dashboard - Terminal UI mode

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use bloquedash::{
    config::{load, Config},
    connectivity::{NetworkMonitor, StaticSource},
    dashboard::{load_dataset, DashEvent, ViewState},
    fallback::{FallbackStore, MemoryStore, SqliteStore},
    fetcher::HttpSource,
    platform,
    types::AppEvent,
    ui,
    window::NavIntent,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    if cfg.json {
        platform::init_logging(None)?;
        cfg.print_summary();
    } else {
        platform::init_logging(Some(&cfg.log_file))?;
    }

    let store = open_store(&cfg);
    let source = HttpSource::new(cfg.api_base_url.clone())
        .with_timeout(cfg.fetch_timeout_ms.map(Duration::from_millis));

    // Terminals expose no connectivity signal: the monitor stays Online.
    let monitor = NetworkMonitor::start(&StaticSource);
    let state = ViewState::new(cfg.window_policy(), monitor.current_status());

    if cfg.json {
        let data = load_dataset(&source, store.as_ref()).await;
        let state = state.apply(DashEvent::Reconciled(data));
        println!("{}", serde_json::to_string_pretty(&state.view())?);
        return Ok(());
    }

    let (tx, rx) = unbounded_channel::<AppEvent>();

    let net_tx = tx.clone();
    monitor.on_change(move |status| {
        let _ = net_tx.send(AppEvent::Network(status));
    });

    // Not aborted on exit: an in-flight fetch is left to finish on its own.
    tokio::spawn(async move {
        let data = load_dataset(&source, store.as_ref()).await;
        let _ = tx.send(AppEvent::Loaded(data));
    });

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_loop(state, &mut terminal, rx).await;

    // cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    drop(monitor);
    result
}

fn open_store(cfg: &Config) -> Arc<dyn FallbackStore> {
    match SqliteStore::open(&cfg.cache_db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::warn!(
                "fallback cache {} unusable ({e:#}); caching in memory for this session",
                cfg.cache_db_path
            );
            Arc::new(MemoryStore::new())
        }
    }
}

async fn run_loop(
    mut state: ViewState,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let tick = Duration::from_millis(100);
    let mut dirty = true;

    loop {
        while let Ok(ev) = rx.try_recv() {
            state = match ev {
                AppEvent::Loaded(data) => state.apply(DashEvent::Reconciled(data)),
                AppEvent::Network(status) => state.apply(DashEvent::Network(status)),
            };
            dirty = true;
        }

        if dirty {
            terminal.draw(|f| ui::draw(f, &state.view()))?;
            dirty = false;
        }

        if event::poll(tick)? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
                    continue;
                }
                match handle_key(k) {
                    KeyAction::Quit => break,
                    KeyAction::Navigate(intent) => {
                        state = state.apply(DashEvent::Navigate(intent));
                        dirty = true;
                    }
                    KeyAction::None => {}
                }
            } else {
                // resize and friends
                dirty = true;
            }
        }
    }
    Ok(())
}

enum KeyAction {
    Quit,
    Navigate(NavIntent),
    None,
}

fn handle_key(k: KeyEvent) -> KeyAction {
    match (k.code, k.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => KeyAction::Quit,
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) | (KeyCode::Char('p'), _) => {
            KeyAction::Navigate(NavIntent::Prev)
        }
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) | (KeyCode::Char('n'), _) => {
            KeyAction::Navigate(NavIntent::Next)
        }
        (KeyCode::Char('m'), _) | (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => {
            KeyAction::Navigate(NavIntent::LoadMore)
        }
        _ => KeyAction::None,
    }
}
