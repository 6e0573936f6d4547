//! Neotris terminal front end
//!
//! Owns the terminal, turns key events into per-tick input snapshots and
//! drives the game session at a fixed frame rate.

mod menu;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use menu::{GameSummary, Menu, MenuAction, MenuScreen, MAX_PREVIEW};
use neotris::input::{is_interrupt, key_name, parse_key, Action, InputHandler, InputSource};
use neotris::settings::Settings;
use neotris::{Game, GameConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, warn};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Input delay after game over to prevent accidental menu return
const GAME_OVER_INPUT_DELAY: Duration = Duration::from_secs(1);

/// Application state
enum AppState {
    Menu(Menu),
    Playing {
        game: Game,
        paused: bool,
        /// When the session ended, if it has
        over_since: Option<Instant>,
    },
}

/// Get the neotris temp directory, creating it if needed
fn neotris_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("neotris");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: could not create {}: {}", dir.display(), e);
    }
    dir
}

fn main() -> Result<()> {
    let session_id: u32 = rand::random();

    // Log to a file, the terminal belongs to the UI
    let log_dir = neotris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neotris=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    info!(
        "neotris starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();
    let mut input = InputHandler::from_settings(&settings).unwrap_or_else(|e| {
        warn!("Invalid key bindings, using defaults: {}", e);
        InputHandler::default()
    });

    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings, &mut input);

    // Restore terminal before reporting anything
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    match &result {
        Ok(Some(summary)) => {
            println!("\nThanks for playing neotris!");
            println!("Final Score: {}", summary.score);
            println!("Level: {} | Lines: {}", summary.level, summary.lines);
        }
        Ok(None) => println!("\nThanks for playing neotris!"),
        Err(e) => tracing::error!("neotris exited with error: {:#}", e),
    }

    result.map(|_| ())
}

/// Start a session with the current gameplay settings
fn new_game(settings: &Settings) -> Game {
    let config = GameConfig {
        preview_count: settings.gameplay.preview_count.min(MAX_PREVIEW as usize),
    };
    match settings.gameplay.seed {
        Some(seed) => {
            info!("starting game with seed {}", seed);
            Game::with_seed(seed, config)
        }
        None => {
            info!("starting game");
            Game::new(config)
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    input: &mut InputHandler,
) -> Result<Option<GameSummary>> {
    let mut state = AppState::Menu(Menu::new());
    let mut last_summary: Option<GameSummary> = None;
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu),
            AppState::Playing { game, paused, .. } => {
                ui::render_game(frame, game, settings, *paused)
            }
        })?;

        // Drain every pending event, waiting out the rest of the frame for the first
        let mut timeout = FRAME_DURATION.saturating_sub(last_frame.elapsed());
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            let Event::Key(key) = event::read()? else {
                continue;
            };

            // Raw mode swallows SIGINT, so Ctrl+C quits from any screen
            if key.kind == KeyEventKind::Press && is_interrupt(&key) {
                info!("interrupted");
                return Ok(last_summary);
            }

            match &mut state {
                AppState::Menu(menu) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match handle_menu_key(menu, key, settings, input) {
                        Some(MenuAction::StartGame) => {
                            input.clear();
                            state = AppState::Playing {
                                game: new_game(settings),
                                paused: false,
                                over_since: None,
                            };
                        }
                        Some(MenuAction::GoToScreen(screen)) => menu.go_to(screen, settings, input),
                        Some(MenuAction::Back) => menu.go_back(),
                        Some(MenuAction::Quit) => return Ok(last_summary),
                        Some(MenuAction::SaveSettings) => match settings.save() {
                            Ok(()) => info!("settings saved"),
                            Err(e) => warn!("Could not save settings: {}", e),
                        },
                        None => {}
                    }
                }
                AppState::Playing {
                    game,
                    paused,
                    over_since,
                } => {
                    if key.kind == KeyEventKind::Release {
                        input.key_up(key);
                        continue;
                    }

                    if let Some(since) = over_since {
                        if key.code == KeyCode::Enter && since.elapsed() >= GAME_OVER_INPUT_DELAY {
                            let summary = GameSummary::from_game(game);
                            state = AppState::Menu(Menu::game_over(summary));
                        }
                        continue;
                    }

                    if *paused && key.code == KeyCode::Char('q') {
                        info!("game abandoned at score {}", game.score());
                        input.clear();
                        state = AppState::Menu(Menu::new());
                        continue;
                    }

                    input.key_down(key, Instant::now());
                }
            }
        }

        let now = Instant::now();
        let delta = now.duration_since(last_frame);
        last_frame = now;

        if let AppState::Playing {
            game,
            paused,
            over_since,
        } = &mut state
        {
            if over_since.is_some() {
                continue;
            }

            let snapshot = input.sample(now);
            if snapshot.just_pressed(Action::Pause) {
                *paused = !*paused;
                // Keys pressed across the pause must not leak into play
                input.clear();
                info!("{}", if *paused { "paused" } else { "resumed" });
            } else if !*paused {
                game.tick(delta, &snapshot);
                if game.is_game_over() {
                    *over_since = Some(now);
                    last_summary = Some(GameSummary::from_game(game));
                }
            }
        }
    }
}

/// Handle a key press on a menu screen, returning the chosen action
fn handle_menu_key(
    menu: &mut Menu,
    key: KeyEvent,
    settings: &mut Settings,
    input: &mut InputHandler,
) -> Option<MenuAction> {
    if menu.rebinding.is_some() {
        match key.code {
            KeyCode::Esc => menu.cancel_rebind(),
            KeyCode::Enter => menu.finish_rebind(),
            // Only keys that survive a trip through the settings file
            code if parse_key(&key_name(code)).is_ok() => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    menu.add_key(code, input, settings);
                } else {
                    menu.set_key(code, input, settings);
                }
            }
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Up => menu.move_up(),
        KeyCode::Down => menu.move_down(),
        KeyCode::Left => menu.adjust_left(settings),
        KeyCode::Right => menu.adjust_right(settings),
        KeyCode::Enter => {
            if menu.on_key_bind() {
                menu.start_rebind();
                return None;
            }
            return menu.select().cloned();
        }
        KeyCode::Delete | KeyCode::Backspace => menu.clear_keys(input, settings),
        KeyCode::Char('q') | KeyCode::Esc => {
            return Some(if menu.screen == MenuScreen::Main {
                MenuAction::Quit
            } else {
                MenuAction::Back
            });
        }
        _ => {}
    }
    None
}
