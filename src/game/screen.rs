//! Text rendering of a level.
//!
//! [`render`] draws a fixed 100x20 character grid: the input column on the
//! left, the output column (newest box on top), the playground row with
//! 1-based indices, the actor carrying its box, and on the right the program
//! listing above either the allowed operations or the run status.

use crate::machine::data_box::DataBox;
use crate::machine::isa::{Operation, OperationSet};
use crate::machine::program::Program;
use crate::machine::vm::{Machine, RunResult, Snapshot};

pub const SCREEN_WIDTH: usize = 100;
pub const SCREEN_HEIGHT: usize = 20;

const BOX_HEIGHT: usize = 3;
const BOX_WIDTH: usize = 5;
/// Horizontal distance between neighbouring boxes.
const BOX_PITCH: usize = BOX_WIDTH + 1;
const SPLIT_COLUMN: usize = 63;
const COLUMN_BOXES: usize = 6;
const CODE_LINES: usize = 8;

const INPUT_COLUMN: usize = BOX_PITCH;
const OUTPUT_COLUMN: usize = 8 * BOX_PITCH;
const PLAYGROUND_ROW: usize = 10;
const PLAYGROUND_COLUMN: usize = 3 * BOX_PITCH;
const ACTOR_ROW: usize = BOX_HEIGHT;
const PANEL_ROW: usize = 10;
const HEADER_COLUMN: usize = SPLIT_COLUMN + 2;
const TEXT_COLUMN: usize = SPLIT_COLUMN + 4;

/// Which box the actor stands in front of, in box pitches from the left edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Actor {
    column: usize,
}

impl Actor {
    const HOME: usize = 3;
    const OUTBOX: usize = 6;
    /// Rightmost column that keeps the actor left of the code listing.
    const MAX: usize = 9;

    pub fn new() -> Self {
        Self { column: Self::HOME }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Walks to where `operation` picks up or drops its box. Jumps stay put.
    pub fn follow(&mut self, operation: &Operation) {
        self.column = match *operation {
            Operation::Inbox {} => Self::HOME,
            Operation::Outbox {} => Self::OUTBOX,
            Operation::Add { slot }
            | Operation::Sub { slot }
            | Operation::CopyTo { slot }
            | Operation::CopyFrom { slot } => {
                let offset = usize::try_from(slot.saturating_sub(1)).unwrap_or(0);
                Self::HOME.saturating_add(offset).min(Self::MAX)
            }
            Operation::Jump { .. } | Operation::JumpIfZero { .. } => self.column,
        };
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-right panel contents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Panel {
    /// The operations the level allows.
    Valid,
    /// Result of the latest run.
    Status,
}

/// Everything one screen shows.
pub struct Frame<'a> {
    pub title: &'a str,
    pub program: &'a Program,
    pub snapshot: &'a Snapshot,
    /// The level's input as it was before any run.
    pub input: &'a [i64],
    pub expected: &'a [i64],
    pub allowed: &'a OperationSet,
    pub panel: Panel,
    pub actor: Actor,
}

impl<'a> Frame<'a> {
    /// Frame for `machine` showing `snapshot`.
    pub fn new(machine: &'a Machine, snapshot: &'a Snapshot, panel: Panel, actor: Actor) -> Self {
        let level = machine.level();
        Self {
            title: &level.title,
            program: machine.program(),
            snapshot,
            input: &level.input,
            expected: &level.expected_output,
            allowed: &level.allowed,
            panel,
            actor,
        }
    }
}

struct Grid {
    cells: Vec<Vec<char>>,
}

impl Grid {
    fn new() -> Self {
        Self {
            cells: vec![vec![' '; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    /// Writes one cell; anything off the grid is dropped.
    fn put(&mut self, row: usize, col: usize, ch: char) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = ch;
        }
    }

    fn text(&mut self, row: usize, col: usize, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(row, col + i, ch);
        }
    }

    fn draw_box(&mut self, row: usize, col: usize, data: DataBox) {
        let last_row = row + BOX_HEIGHT - 1;
        let last_col = col + BOX_WIDTH - 1;
        for c in col..=last_col {
            self.put(row, c, '-');
            self.put(last_row, c, '-');
        }
        for r in row..=last_row {
            self.put(r, col, '|');
            self.put(r, last_col, '|');
        }
        for (r, c) in [(row, col), (row, last_col), (last_row, col), (last_row, last_col)] {
            self.put(r, c, '+');
        }

        let label: String = data.to_string().chars().take(BOX_WIDTH - 2).collect();
        let mid = col + (BOX_WIDTH - 1) / 2;
        let start = mid - (label.chars().count().max(1) - 1) / 2;
        self.text(row + 1, start, &label);
    }

    /// Stacks up to [`COLUMN_BOXES`] boxes from the top, padding with empty ones.
    fn draw_column<I>(&mut self, col: usize, boxes: I)
    where
        I: IntoIterator<Item = DataBox>,
    {
        let mut boxes = boxes.into_iter();
        for i in 0..COLUMN_BOXES {
            let data = boxes.next().unwrap_or(DataBox::EMPTY);
            self.draw_box(i * BOX_HEIGHT, col, data);
        }
    }

    fn draw_playground(&mut self, playground: &[DataBox]) {
        for (i, data) in playground.iter().enumerate() {
            let col = PLAYGROUND_COLUMN + i * BOX_PITCH;
            self.draw_box(PLAYGROUND_ROW, col, *data);
            self.text(
                PLAYGROUND_ROW + BOX_HEIGHT,
                col + (BOX_WIDTH - 1) / 2,
                &(i + 1).to_string(),
            );
        }
    }

    fn draw_actor(&mut self, actor: Actor, held: DataBox) {
        let r = ACTOR_ROW;
        let c = actor.column() * BOX_PITCH;
        let right = c + BOX_WIDTH - 1;
        self.put(r, c, '@');
        self.put(r, right, '@');
        for i in 0..BOX_WIDTH {
            self.put(r + 1, c + i, '-');
        }
        self.put(r + 2, c, '|');
        self.put(r + 2, right, '|');
        self.put(r + 2, c + 1, '@');
        self.put(r + 2, right - 1, '@');
        self.put(r + 3, c + (BOX_WIDTH - 1) / 2, '+');
        self.put(r + 4, c, '/');
        self.put(r + 4, right, '\\');
        self.put(r + 5, c + 1, '|');
        self.put(r + 5, right - 1, '|');
        if !held.is_empty() {
            self.draw_box(r - BOX_HEIGHT, c, held);
        }
    }

    fn draw_code(&mut self, program: &Program, counter: Option<usize>) {
        self.text(0, HEADER_COLUMN, "===== CODE ====");

        let len = program.len();
        let first = match counter {
            Some(line) if line.saturating_sub(1) + CODE_LINES <= len => line.saturating_sub(1),
            _ => len.saturating_sub(CODE_LINES),
        };
        for (row, (idx, code)) in program
            .lines()
            .iter()
            .enumerate()
            .skip(first)
            .take(CODE_LINES)
            .enumerate()
        {
            let r = row + 1;
            let number = idx + 1;
            self.text(r, TEXT_COLUMN - 1, &format!("{number:>2}"));
            self.text(r, TEXT_COLUMN + 2, code);
            if counter == Some(number) {
                self.put(r, TEXT_COLUMN - 2, '>');
            }
        }
    }

    fn draw_valid(&mut self, allowed: &OperationSet) {
        self.text(PANEL_ROW, HEADER_COLUMN, "===== VALID ====");
        for (i, kind) in allowed.iter().enumerate() {
            let suffix = if kind.takes_argument() { " x" } else { "" };
            self.text(
                PANEL_ROW + 1 + i,
                TEXT_COLUMN,
                &format!("{} {}{}", i + 1, kind, suffix),
            );
        }
    }

    fn draw_status(&mut self, snapshot: &Snapshot) {
        self.text(PANEL_ROW, HEADER_COLUMN, "===== STATUS ====");
        let mut row = PANEL_ROW + 1;
        let headline = match snapshot.last_result {
            RunResult::Idle => "> idle",
            RunResult::Success => "> Mission Accomplished!",
            RunResult::Failed => "> Mission Failed!",
            RunResult::RuntimeError => "> Error while Running!",
        };
        self.text(row, TEXT_COLUMN, headline);

        if snapshot.steps > 0 {
            row += 1;
            self.text(row, TEXT_COLUMN, &format!("> Steps Used: {}", snapshot.steps));
        }
        if let Some(fault) = &snapshot.fault {
            row += 1;
            match fault.line {
                Some(line) => self.text(row, TEXT_COLUMN, &format!("> Line {line}:")),
                None => self.text(row, TEXT_COLUMN, ">"),
            }
            row += 1;
            self.text(row, TEXT_COLUMN, &format!("  {}", fault.error));
        }
    }

    fn draw_split(&mut self) {
        for r in 0..SCREEN_HEIGHT {
            self.put(r, SPLIT_COLUMN, '|');
        }
    }

    fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.iter().map(|row| row.iter().collect())
    }
}

fn join_values(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draws `frame` as text, ending with a newline.
pub fn render(frame: &Frame<'_>) -> String {
    let snapshot = frame.snapshot;
    let mut grid = Grid::new();
    grid.draw_column(INPUT_COLUMN, snapshot.input.iter().copied());
    grid.draw_column(OUTPUT_COLUMN, snapshot.output.iter().rev().copied());
    grid.draw_playground(&snapshot.playground);
    grid.draw_actor(frame.actor, snapshot.held);
    grid.draw_split();
    grid.draw_code(frame.program, snapshot.program_counter);
    match frame.panel {
        Panel::Valid => grid.draw_valid(frame.allowed),
        Panel::Status => grid.draw_status(snapshot),
    }

    let mut out = format!("Level Information: {}\n\n", frame.title);
    for row in grid.rows() {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str(&format!("Ori In: {}\n", join_values(frame.input)));
    out.push_str(&format!("Expected Out: {}\n", join_values(frame.expected)));
    out
}
