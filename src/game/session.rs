//! Interactive menu and level loop.
//!
//! The session is generic over its input, output and progress store so the
//! whole flow can be driven from a script in tests.

use crate::config::Config;
use crate::game::catalogue::{Catalogue, LevelStatus};
use crate::game::progress::{ProgressError, ProgressStore};
use crate::game::screen::{Actor, Frame, Panel, render};
use crate::machine::vm::{Machine, Snapshot, StepEvent};
use crate::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::thread;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const BANNER: &str = "HUMAN RESOURCE MACHINE";
const RULE: &str =
    "---------------------------------------------------------------------------------";
/// Width of the title column in the level list.
const TITLE_WIDTH: usize = 50;

const LEVEL_PROMPT: &str =
    "Enter the command: ( 'r' for run / 'a' for add / 'i' for import / 'q' for quit ) \n> ";
const ADD_PROMPT: &str = "Add Code Mode: (input 'q' if done, 'd' for delete, 'c' for clear)\n> ";
const IMPORT_PROMPT: &str = "Enter the file path: (q to quit)\n> ";
const MENU_PROMPT: &str = "\nSelect your level (q for quit game): ";

pub struct Session<R, W, S> {
    catalogue: Catalogue,
    store: S,
    config: Config,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write, S: ProgressStore> Session<R, W, S> {
    pub fn new(catalogue: Catalogue, store: S, config: Config, input: R, output: W) -> Self {
        Self {
            catalogue,
            store,
            config,
            input,
            output,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Reads stored pass flags into the catalogue.
    pub fn load_progress(&mut self) -> Result<(), ProgressError> {
        let flags = self.store.load()?;
        self.catalogue.restore_progress(&flags);
        Ok(())
    }

    /// Shows the level menu until the player quits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.draw_menu()?;
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            if line == "q" {
                return Ok(());
            }
            let Ok(number) = line.parse::<usize>() else {
                continue;
            };
            if number == 0 || number > self.catalogue.len() {
                continue;
            }
            let index = number - 1;
            if self.catalogue.is_locked(index) {
                continue;
            }
            self.play_level(index)?;
        }
    }

    /// Runs the command loop for one level. Returns whether any run passed.
    pub fn play_level(&mut self, index: usize) -> io::Result<bool> {
        let Some(level) = self.catalogue.level(index).cloned() else {
            return Ok(false);
        };
        info!("Entering '{}'", level.title);
        let mut machine = Machine::new(level).with_step_limit(self.config.step_limit);
        let mut panel = Panel::Valid;
        let mut actor = Actor::new();
        let mut passed = false;

        loop {
            self.draw_level(&machine, &machine.snapshot(), panel, actor)?;
            self.prompt(LEVEL_PROMPT)?;
            let Some(command) = self.read_line()? else {
                return Ok(passed);
            };
            match command.as_str() {
                "r" => {
                    panel = Panel::Status;
                    actor = Actor::new();
                    if self.run_machine(&mut machine, &mut actor)? {
                        passed = true;
                        self.record_pass(index);
                    }
                }
                "a" => {
                    panel = Panel::Valid;
                    if !self.edit_code(&mut machine, actor)? {
                        return Ok(passed);
                    }
                    panel = Panel::Status;
                }
                "i" => {
                    self.draw_level(&machine, &machine.snapshot(), panel, actor)?;
                    self.prompt(IMPORT_PROMPT)?;
                    let Some(path) = self.read_line()? else {
                        return Ok(passed);
                    };
                    if path == "q" {
                        continue;
                    }
                    if let Err(e) = machine.import_code(&path) {
                        warn!("Import from {path} failed: {e}");
                        writeln!(self.output, "Cannot import code from file {path}")?;
                        self.output.flush()?;
                        self.pause();
                    }
                }
                "q" => return Ok(passed),
                _ => {}
            }
        }
    }

    /// Add-code mode. Returns `false` when input ended.
    fn edit_code(&mut self, machine: &mut Machine, actor: Actor) -> io::Result<bool> {
        loop {
            self.draw_level(machine, &machine.snapshot(), Panel::Valid, actor)?;
            self.prompt(ADD_PROMPT)?;
            let Some(line) = self.read_line()? else {
                return Ok(false);
            };
            match line.as_str() {
                "q" => return Ok(true),
                "d" => {
                    machine.remove_code();
                }
                "c" => machine.clear_code(),
                code => machine.add_code(code),
            }
        }
    }

    /// Runs the program, animated or not. Returns whether the run succeeded.
    fn run_machine(&mut self, machine: &mut Machine, actor: &mut Actor) -> io::Result<bool> {
        if !self.config.animate {
            return Ok(machine.run_code().succeeded());
        }

        let mut steps = machine.steps();
        while let Some(event) = steps.next() {
            self.pause();
            match event {
                StepEvent::Executed {
                    operation,
                    snapshot,
                    ..
                } => {
                    actor.follow(&operation);
                    self.draw_level(steps.machine(), &snapshot, Panel::Status, *actor)?;
                }
                StepEvent::Halted { report, .. } => return Ok(report.succeeded()),
            }
        }
        Ok(false)
    }

    fn record_pass(&mut self, index: usize) {
        self.catalogue.mark_passed(index);
        if let Err(e) = self.store.save(self.catalogue.progress()) {
            error!("Failed to save progress: {e}");
        }
    }

    fn pause(&self) {
        if self.config.animate && !self.config.step_delay.is_zero() {
            thread::sleep(self.config.step_delay);
        }
    }

    fn draw_menu(&mut self) -> io::Result<()> {
        write!(self.output, "{CLEAR_SCREEN}{BANNER}\n\n{RULE}\n\nLevel: \n\n")?;
        for (i, level) in self.catalogue.levels().iter().enumerate() {
            let status = match self.catalogue.status(i) {
                LevelStatus::Locked => "locked",
                LevelStatus::Passed => "passed",
                LevelStatus::Open => "**",
            };
            write!(
                self.output,
                "{}. {:<width$}{}\n\n",
                i + 1,
                level.title,
                status,
                width = TITLE_WIDTH
            )?;
        }
        self.prompt(MENU_PROMPT)
    }

    fn draw_level(
        &mut self,
        machine: &Machine,
        snapshot: &Snapshot,
        panel: Panel,
        actor: Actor,
    ) -> io::Result<()> {
        let screen = render(&Frame::new(machine, snapshot, panel, actor));
        write!(self.output, "{CLEAR_SCREEN}{screen}")?;
        self.output.flush()
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()
    }

    /// Next input line without surrounding whitespace, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
