use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use keydoor_game::{BlockReason, Dir, Event, Game, GameConfig, Phase, Pos};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const DEFAULT_RENDER_FPS: u64 = 60;
const MESSAGE_LIFETIME: Duration = Duration::from_millis(1000);
const HELP: &str = "arrows/wasd/hjkl move, n retry level, r restart, q quit";

/// Find the key, then reach the door, on a grid of invisible walls.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for level generation; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level to start on (1-3)
    #[arg(short, long, default_value = "1")]
    level: u32,

    /// Write logs to this file (RUST_LOG controls the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Crashed,
    Key,
    Door,
    Visited,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    size: usize,
    last: Vec<Cell>,
    last_hud: String,
    last_message: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(size: usize) -> Self {
        Self {
            size,
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                size * size
            ],
            last_hud: String::new(),
            last_message: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// The latest feedback line and when it stops showing.
struct Message {
    text: String,
    until: Option<Instant>,
}

impl Message {
    fn none() -> Self {
        Self {
            text: String::new(),
            until: None,
        }
    }

    fn current(&mut self, now: Instant) -> &str {
        if self.until.is_some_and(|t| now >= t) {
            self.text.clear();
            self.until = None;
        }
        &self.text
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    info!("starting with {args:?}");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &args);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Logging goes to a file only; stderr would tear up the alternate screen.
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, args: &Args) -> Result<()> {
    let rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let (mut game, mut events) = Game::new(rng, GameConfig::default());
    if args.level != 1 {
        events = game.start_level(args.level)?;
    }

    let mut renderer = Renderer::new(game.session().maze.grid_size());
    let mut message = Message::none();
    let frame_time = Duration::from_micros(1_000_000 / read_render_fps().max(1));
    let mut last_frame = Instant::now();
    show_events(&events, &mut message, &mut renderer);

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let events = match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => game.restart(),
                    KeyCode::Char('n') => game.retry_level(),
                    code => match dir_for_key(code) {
                        Some(dir) => game.step(dir),
                        None => Vec::new(),
                    },
                };
                show_events(&events, &mut message, &mut renderer);
            }
        }

        let now = Instant::now();
        let events = game.tick(now.duration_since(last_frame));
        last_frame = now;
        show_events(&events, &mut message, &mut renderer);

        render(stdout, &game, &mut renderer, message.current(now))?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn read_render_fps() -> u64 {
    std::env::var("KEYDOOR_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS)
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
            Some(Dir::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
            Some(Dir::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
            Some(Dir::Right)
        }
        _ => None,
    }
}

fn show_events(events: &[Event], message: &mut Message, renderer: &mut Renderer) {
    for event in events {
        let (text, sticky) = match event {
            Event::LevelStarted {
                level, grid_size, ..
            } => {
                if *grid_size != renderer.size {
                    *renderer = Renderer::new(*grid_size);
                }
                renderer.needs_full = true;
                (
                    format!("Level {level} ({grid_size}x{grid_size}): find the key, then the door"),
                    false,
                )
            }
            Event::Blocked { reason, .. } => match reason {
                BlockReason::Bounds => ("Edge of the grid".to_string(), false),
                BlockReason::Wall => ("💥 Wall! Back to the start...".to_string(), false),
                BlockReason::DoorLocked => ("Need the key first! 🔑".to_string(), false),
            },
            Event::KeyCollected => ("Key collected! 🔑".to_string(), false),
            Event::KeyReturned => ("Key returned! 🔑".to_string(), false),
            Event::LevelComplete { level } => (format!("Level {level} complete! 🎉"), false),
            Event::TimeUp { level } => (format!("Time up on level {level}! ⏰"), false),
            Event::GameWon => ("You win! 🏆 Press r to play again".to_string(), true),
            Event::GameOver => ("Game over ⏰ Press r to play again".to_string(), true),
            Event::Moved { .. } => continue,
        };
        message.text = text;
        message.until = if sticky {
            None
        } else {
            Some(Instant::now() + MESSAGE_LIFETIME)
        };
    }
}

fn render<R>(stdout: &mut Stdout, game: &Game<R>, renderer: &mut Renderer, message: &str) -> io::Result<()> {
    let size = renderer.size;
    let grid_w = (size * CELL_W) as u16;
    let needed_h = (size + 3) as u16;
    let needed_w = grid_w.max(text_width(HELP));

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(Print(format!(
            "Terminal too small. Need at least {needed_w}x{needed_h} (cols x rows). Current: {term_w}x{term_h}."
        )))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin = ((term_w - grid_w) / 2, (term_h - needed_h) / 2 + 1);
    if origin != (renderer.origin_x, renderer.origin_y) {
        (renderer.origin_x, renderer.origin_y) = origin;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = hud_text(game);
    if renderer.needs_full || hud != renderer.last_hud {
        status_line(stdout, term_w, renderer.origin_y - 1, &hud, Color::White)?;
        renderer.last_hud = hud;
    }

    for y in 0..size {
        for x in 0..size {
            let cell = cell_for(game, Pos::new(x, y));
            let idx = y * size + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }

    let below = renderer.origin_y + size as u16;
    if renderer.needs_full || message != renderer.last_message {
        status_line(stdout, term_w, below, message, Color::Yellow)?;
        renderer.last_message = message.to_string();
    }
    if renderer.needs_full {
        status_line(stdout, term_w, below + 1, HELP, Color::DarkGrey)?;
    }
    renderer.needs_full = false;

    stdout.flush()
}

fn hud_text<R>(game: &Game<R>) -> String {
    let session = game.session();
    let key = if session.player.key_collected {
        "collected"
    } else {
        "not collected"
    };
    format!(
        "Level: {}/{}  Time: {}  Key: {}",
        session.level,
        session.max_level,
        format_time(game.clock().remaining()),
        key
    )
}

fn text_width(text: &str) -> u16 {
    UnicodeWidthStr::width(text) as u16
}

fn centred_x(term_w: u16, text: &str) -> u16 {
    term_w.saturating_sub(text_width(text)) / 2
}

/// Clears row `y` and prints `text` centred on its own display width.
fn status_line(stdout: &mut Stdout, term_w: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
    let x = centred_x(term_w, text);
    stdout.queue(MoveTo(0, y))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

fn format_time(remaining: Option<Duration>) -> String {
    let secs = remaining.map_or(0, |d| d.as_secs_f64().ceil() as u64);
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn cell_for<R>(game: &Game<R>, pos: Pos) -> Cell {
    let session = game.session();
    let maze = &session.maze;
    if pos == session.player.position {
        if session.phase == Phase::Blocked {
            return Cell {
                glyph: Glyph::Crashed,
                color: Color::Red,
            };
        }
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if pos == maze.key() && !session.player.key_collected {
        return Cell {
            glyph: Glyph::Key,
            color: Color::Yellow,
        };
    }
    if pos == maze.door() {
        return Cell {
            glyph: Glyph::Door,
            color: Color::Magenta,
        };
    }
    if session.player.visited.contains(&pos) {
        return Cell {
            glyph: Glyph::Visited,
            color: Color::DarkCyan,
        };
    }
    Cell {
        glyph: Glyph::Empty,
        color: Color::DarkGrey,
    }
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "🧍",
            Glyph::Crashed => "💥",
            Glyph::Key => "🔑",
            Glyph::Door => "🚪",
            Glyph::Visited => "░░",
            Glyph::Empty => "·",
        }
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = cell.glyph.text();
    // Pad narrow glyphs so every cell covers exactly CELL_W columns.
    let pad = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
    stdout.queue(MoveTo(
        renderer.origin_x + (x * CELL_W) as u16,
        renderer.origin_y + y as u16,
    ))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(format!("{text}{}", " ".repeat(pad))))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_fit_the_minimum_width() {
        let size = 10;
        let needed_w = ((size * CELL_W) as u16).max(text_width(HELP));
        for text in [HELP, "Level: 3/3  Time: 5:00  Key: not collected"] {
            let x = centred_x(needed_w, text);
            assert!(x + text_width(text) <= needed_w, "{text:?} overflows at x={x}");
        }
        assert_eq!(centred_x(80, HELP), (80 - HELP.len() as u16) / 2);
    }

    #[test]
    fn wide_glyphs_are_measured_by_display_width() {
        assert_eq!(text_width("Key collected! 🔑"), 17);
        assert_eq!(text_width(Glyph::Empty.text()), 1);
        assert_eq!(text_width(Glyph::Door.text()), CELL_W as u16);
    }
}
