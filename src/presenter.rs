//! Board presentation sinks.

use crate::registry::GameId;
use serde::Deserialize;
use std::io::{self, Write};
use tracing::{debug, warn};
use ttt_board::{Board, Cell, Player};

const RESET: &str = "\x1b[0m";
const BLUE: &str = "\x1b[38;5;12m";
const RED: &str = "\x1b[38;5;9m";
const GOLD: &str = "\x1b[38;5;220m";

/// How boards are shown after each change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderMode {
    /// Boards are not shown.
    Off,
    /// Boards are emitted as debug events.
    #[default]
    Log,
    /// Boards are drawn in colour on stdout.
    Terminal,
}

/// Receives every board the server changes.
pub trait Presenter: Send {
    /// Shows `board` for game `game_id`.
    fn render(&mut self, game_id: GameId, board: &Board);
}

/// Builds the presenter for a render mode.
pub fn presenter_for(mode: RenderMode) -> Box<dyn Presenter> {
    match mode {
        RenderMode::Off => Box::new(NullPresenter),
        RenderMode::Log => Box::new(LogPresenter),
        RenderMode::Terminal => Box::new(TerminalPresenter::new(io::stdout())),
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render(&mut self, _game_id: GameId, _board: &Board) {}
}

/// Emits the board grid as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn render(&mut self, game_id: GameId, board: &Board) {
        debug!(game_id, board = %board, "Board\n{}", board.grid());
    }
}

/// Draws a coloured grid: `X` blue, `O` red, the winning line gold.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Creates a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, game_id: GameId, board: &Board) -> io::Result<()> {
        writeln!(
            self.out,
            "\n  Game {}   Player 1 ({BLUE}X{RESET})  -  Player 2 ({RED}O{RESET})\n",
            game_id
        )?;
        for row in 0..3 {
            writeln!(self.out, "\t     |     |     ")?;
            let cells: Vec<String> = (0..3).map(|col| styled(board, row * 3 + col)).collect();
            writeln!(self.out, "\t{}", cells.join("|"))?;
            if row < 2 {
                writeln!(self.out, "\t_____|_____|_____")?;
            }
        }
        writeln!(self.out, "\t     |     |     \n")?;
        self.out.flush()
    }
}

fn styled(board: &Board, index: usize) -> String {
    let (colour, symbol) = match board.get(index) {
        Some(Cell::Marked(Player::X)) => (BLUE, 'X'),
        Some(Cell::Marked(Player::O)) => (RED, 'O'),
        Some(Cell::Winning(player)) => (GOLD, player.mark() as char),
        _ => ("", (b'1' + index as u8) as char),
    };
    if colour.is_empty() {
        format!("  {symbol}  ")
    } else {
        format!("  {colour}{symbol}{RESET}  ")
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn render(&mut self, game_id: GameId, board: &Board) {
        if let Err(e) = self.draw(game_id, board) {
            warn!(game_id, error = %e, "Failed to draw board");
        }
    }
}
