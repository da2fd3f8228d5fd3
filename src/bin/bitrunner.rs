//! Terminal frontend: raw-mode input, frame drawing, level progression.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use bitrunner::core::Direction;
use bitrunner::level::Level;
use bitrunner::runner;
use bitrunner::state::GameState;
use bitrunner::view::symbols::CompatibilityMode;
use bitrunner::world::loot::{Loot, LootKind};

#[derive(Parser)]
#[command(name = "bitrunner", version, about = "Loot the bit stream. Don't get traced.")]
struct Args {
    /// Restrict glyphs to plain ASCII.
    #[arg(long)]
    ascii: bool,
    /// Restrict glyphs to latin-compatible characters.
    #[arg(long, conflicts_with = "ascii")]
    latin: bool,
    /// Starting level index (0 = tutorial).
    #[arg(long, default_value_t = 0)]
    level: usize,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mode = if args.ascii {
        CompatibilityMode::Ascii
    } else if args.latin {
        CompatibilityMode::Latin
    } else {
        CompatibilityMode::Any
    };
    let Some(level) = Level::from_index(args.level) else {
        eprintln!(
            "unknown level index {} (valid: 0..={})",
            args.level,
            Level::ALL.len() - 1
        );
        std::process::exit(2);
    };

    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
    let result = play(&mut out, level, mode).await;
    execute!(out, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

enum Outcome {
    Quit,
    Detected,
    Complete,
}

/// Play levels in sequence, carrying the loot tally across runs.
async fn play(out: &mut io::Stdout, start: Level, mode: CompatibilityMode) -> io::Result<()> {
    let started = Instant::now();
    let mut level = start;
    let mut tally: Vec<Loot> = Vec::new();
    let mut state = Arc::new(GameState::new(level, mode));
    loop {
        let outcome = run_level(out, &state, mode).await?;
        tally.extend(state.inventory());
        match outcome {
            Outcome::Quit => return Ok(()),
            Outcome::Detected => {
                return summary(out, "TRACED", &tally, started).await;
            }
            Outcome::Complete => match level.next() {
                Some(next) => {
                    level = next;
                    // The player keeps their position when the stream shifts
                    // to the next level.
                    state = Arc::new(GameState::with_player_at(
                        level,
                        mode,
                        state.player_location(),
                    ));
                }
                None => return summary(out, "STREAM CLEARED", &tally, started).await,
            },
        }
    }
}

/// One level: spawn the tick scheduler, pump input, draw frames.
async fn run_level(
    out: &mut io::Stdout,
    state: &Arc<GameState>,
    mode: CompatibilityMode,
) -> io::Result<Outcome> {
    let mut ticker = Ticker::spawn(state.clone());
    let frame = Duration::from_millis(50);
    loop {
        if state.is_detected() {
            ticker.stop().await;
            return Ok(Outcome::Detected);
        }
        if state.is_complete() {
            ticker.stop().await;
            return Ok(Outcome::Complete);
        }

        draw(out, state, mode, !ticker.running())?;

        // Drain everything already buffered without blocking the frame.
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    ticker.stop().await;
                    return Ok(Outcome::Quit);
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ticker.stop().await;
                    return Ok(Outcome::Quit);
                }
                KeyCode::Char(' ') => ticker.toggle(state.clone()).await,
                code if ticker.running() => {
                    if let Some(dir) = direction_for(code) {
                        state.move_player(dir);
                    }
                }
                _ => {}
            }
        }
        tokio::time::sleep(frame).await;
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}

fn draw(
    out: &mut io::Stdout,
    state: &GameState,
    mode: CompatibilityMode,
    paused: bool,
) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    queue!(out, Print(state.level_name()), Print("\r\n"))?;
    for line in state.render() {
        queue!(out, Print(line), Print("\r\n"))?;
    }

    queue!(out, Print("trace "), Print(state.threat_meter()))?;
    if state.exit_unlocked() {
        queue!(out, Print("   EXIT UNLOCKED"))?;
    }
    if paused {
        queue!(out, Print("   PAUSED"))?;
    }
    queue!(out, Print("\r\n"))?;

    if let Some(bar) = state.progress_bar() {
        queue!(out, Print(bar), Print("\r\n"))?;
    }

    let mut objectives = String::new();
    for (kind, have, want) in state.objectives() {
        objectives.push_str(&format!(
            "{} {:.0}/{:.0}  ",
            kind.symbol().for_mode(mode),
            have,
            want
        ));
    }
    queue!(out, Print(objectives), Print("\r\n"))?;
    out.flush()
}

/// End-of-run screen; waits for any key.
async fn summary(
    out: &mut io::Stdout,
    banner: &str,
    tally: &[Loot],
    started: Instant,
) -> io::Result<()> {
    let data_total: f32 = tally.iter().map(|l| l.data).sum();
    let power_ups = tally
        .iter()
        .filter(|l| matches!(l.kind, LootKind::PowerUp(_)))
        .count();

    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    queue!(out, Print(banner), Print("\r\n\r\n"))?;
    queue!(
        out,
        Print(format!("time      {}\r\n", format_elapsed(started)))
    )?;
    queue!(out, Print(format!("loot      {}\r\n", tally.len())))?;
    queue!(out, Print(format!("data      {data_total:.0}\r\n")))?;
    queue!(out, Print(format!("power-ups {power_ups}\r\n\r\n")))?;
    queue!(out, Print("press any key"), Print("\r\n"))?;
    out.flush()?;

    wait_for_key().await
}

fn format_elapsed(since: Instant) -> String {
    let secs = since.elapsed().as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

async fn wait_for_key() -> io::Result<()> {
    loop {
        if event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// Handle to the running tick scheduler. Pausing stops the task outright; a
/// resume spawns a fresh one against the same state.
struct Ticker {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    fn spawn(state: Arc<GameState>) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(runner::run(state, rx));
        Self {
            shutdown,
            task: Some(task),
        }
    }

    fn running(&self) -> bool {
        self.task.is_some()
    }

    async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown.send(true);
            let _ = task.await;
        }
    }

    async fn toggle(&mut self, state: Arc<GameState>) {
        if self.task.is_some() {
            self.stop().await;
        } else {
            *self = Ticker::spawn(state);
        }
    }
}
