//! The box machine.
//!
//! A [`Machine`] is built once per level attempt. It owns the program text
//! and all runtime state, and executes the program one line at a time:
//! fetch the line at the program counter, decode it against the level's
//! whitelist, dispatch it. [`Machine::step`] is the whole transition
//! function; [`Machine::run_code`] and [`Machine::steps`] drive it.
//!
//! A run never fails with `Err`. Every problem ends the run with
//! [`RunResult::RuntimeError`] and a [`Fault`] naming the line.

use crate::debug;
use crate::machine::data_box::DataBox;
use crate::machine::decoder::decode;
use crate::machine::errors::{ImportError, MachineError};
use crate::machine::isa::{Operation, OperationKind, OperationSet};
use crate::machine::level::Level;
use crate::machine::program::Program;
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

/// Lines a single run may execute before it is stopped.
pub const DEFAULT_STEP_LIMIT: usize = 100_000;

/// Classification of the latest run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RunResult {
    /// No run has finished since the machine was built or the program changed.
    #[default]
    Idle,
    /// The output matched the level's expected sequence.
    Success,
    /// The program finished cleanly but produced the wrong output.
    Failed,
    /// The program hit an illegal line or operand.
    RuntimeError,
}

/// The error that stopped a run and where it happened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fault {
    /// 1-based line that failed; `None` when there was no line to run.
    pub line: Option<usize>,
    pub error: MachineError,
}

/// Outcome of one complete run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    pub result: RunResult,
    /// Lines attempted, including a failing one.
    pub steps: usize,
    /// Emitted values in emission order.
    pub output: Vec<i64>,
    pub fault: Option<Fault>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.result == RunResult::Success
    }
}

/// Owned, read-only copy of the machine state for presentation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// Boxes still waiting, front first.
    pub input: Vec<DataBox>,
    /// Emitted boxes in emission order.
    pub output: Vec<DataBox>,
    pub playground: Vec<DataBox>,
    pub held: DataBox,
    pub program_counter: Option<usize>,
    pub steps: usize,
    pub last_result: RunResult,
    pub fault: Option<Fault>,
}

/// Result of a single [`Machine::step`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// `operation` on `line` ran and the machine is still running.
    Continue { line: usize, operation: Operation },
    /// The run is over.
    Halted(RunReport),
}

/// Item produced by [`Steps`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepEvent {
    Executed {
        line: usize,
        operation: Operation,
        snapshot: Snapshot,
    },
    Halted {
        report: RunReport,
        snapshot: Snapshot,
    },
}

/// What the dispatcher does after an operation succeeded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    /// Advance to the following line.
    Next,
    /// Continue at this 1-based line without advancing.
    Jump(usize),
    /// The input queue ran dry: the program is done.
    Done,
}

macro_rules! exec_operation {
    (
        machine = $machine:ident,
        operation = $operation:expr,
        { $( $variant:ident => $handler:ident ( $( $field:ident ),* ) ),* $(,)? }
    ) => {{
        match $operation {
            $(
                Operation::$variant { $( $field ),* } => {
                    $machine.$handler(OperationKind::$variant.mnemonic(), $( $field ),*)
                }
            ),*
        }
    }};
}

/// Interpreter for one level attempt.
#[derive(Clone, Debug)]
pub struct Machine {
    level: Level,
    program: Program,
    input: VecDeque<DataBox>,
    output: Vec<DataBox>,
    playground: Vec<DataBox>,
    held: DataBox,
    /// 1-based line to run next; `None` when not running.
    pc: Option<usize>,
    steps: usize,
    last_result: RunResult,
    fault: Option<Fault>,
    step_limit: usize,
}

impl Machine {
    /// Creates an idle machine for `level` with an empty program.
    pub fn new(level: Level) -> Self {
        let mut machine = Self {
            playground: Vec::new(),
            input: VecDeque::new(),
            output: Vec::new(),
            held: DataBox::EMPTY,
            pc: None,
            steps: 0,
            last_result: RunResult::Idle,
            fault: None,
            step_limit: DEFAULT_STEP_LIMIT,
            program: Program::new(),
            level,
        };
        machine.reset_state();
        machine
    }

    /// Replaces the step budget.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.set_program(program);
        self
    }

    // ==================== Program editing ====================

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn set_program(&mut self, program: Program) {
        self.program = program;
        self.program_changed();
    }

    /// Appends one line to the program.
    pub fn add_code(&mut self, line: &str) {
        self.program.push_line(line);
        self.program_changed();
    }

    /// Removes the last line. Does nothing on an empty program.
    pub fn remove_code(&mut self) -> Option<String> {
        let removed = self.program.pop_line();
        if removed.is_some() {
            self.program_changed();
        }
        removed
    }

    pub fn clear_code(&mut self) {
        self.program.clear();
        self.program_changed();
    }

    /// Replaces the program with the one stored at `path`.
    ///
    /// On error the current program is left untouched.
    pub fn import_code<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ImportError> {
        let program = Program::import_file(path)?;
        self.set_program(program);
        Ok(())
    }

    /// Same as [`import_code`](Self::import_code) for an in-memory source.
    pub fn import_source<R: BufRead>(&mut self, reader: R) -> Result<(), ImportError> {
        let program = Program::parse_source(reader)?;
        self.set_program(program);
        Ok(())
    }

    /// Abandons any run in progress; its counter may no longer be valid.
    fn program_changed(&mut self) {
        if self.pc.take().is_some() {
            self.last_result = RunResult::Idle;
        }
    }

    // ==================== Queries ====================

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn title(&self) -> &str {
        &self.level.title
    }

    pub fn allowed(&self) -> &OperationSet {
        &self.level.allowed
    }

    pub fn input(&self) -> &VecDeque<DataBox> {
        &self.input
    }

    pub fn output(&self) -> &[DataBox] {
        &self.output
    }

    pub fn playground(&self) -> &[DataBox] {
        &self.playground
    }

    pub fn held(&self) -> DataBox {
        self.held
    }

    pub fn program_counter(&self) -> Option<usize> {
        self.pc
    }

    pub fn is_running(&self) -> bool {
        self.pc.is_some()
    }

    pub fn steps_used(&self) -> usize {
        self.steps
    }

    pub fn last_result(&self) -> RunResult {
        self.last_result
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            input: self.input.iter().copied().collect(),
            output: self.output.clone(),
            playground: self.playground.clone(),
            held: self.held,
            program_counter: self.pc,
            steps: self.steps,
            last_result: self.last_result,
            fault: self.fault.clone(),
        }
    }

    /// Report for the latest run, or an idle report if none finished.
    pub fn report(&self) -> RunReport {
        RunReport {
            result: self.last_result,
            steps: self.steps,
            output: self.output_values(),
            fault: self.fault.clone(),
        }
    }

    fn output_values(&self) -> Vec<i64> {
        self.output.iter().filter_map(DataBox::value).collect()
    }

    // ==================== Execution ====================

    /// Resets runtime state and starts a run at line 1.
    ///
    /// An empty program halts immediately with a runtime error and no steps.
    pub fn start(&mut self) {
        self.reset_state();
        if self.program.is_empty() {
            self.halt(Some(Fault {
                line: None,
                error: MachineError::EmptyProgram,
            }));
        } else {
            self.pc = Some(1);
        }
    }

    /// Runs the program from the top until it halts.
    pub fn run_code(&mut self) -> RunReport {
        self.start();
        loop {
            if let StepOutcome::Halted(report) = self.step() {
                return report;
            }
        }
    }

    /// Starts a run and returns its step events.
    ///
    /// The iterator yields one [`StepEvent::Executed`] for each step that
    /// leaves the machine running and ends with exactly one
    /// [`StepEvent::Halted`]. Calling this again restarts from scratch.
    pub fn steps(&mut self) -> Steps<'_> {
        self.start();
        Steps {
            machine: self,
            finished: false,
        }
    }

    /// Executes the line at the program counter.
    ///
    /// On a machine that is not running this only reports the latest run.
    pub fn step(&mut self) -> StepOutcome {
        let Some(line) = self.pc else {
            return StepOutcome::Halted(self.report());
        };

        if self.steps >= self.step_limit {
            let error = MachineError::StepLimitExceeded {
                limit: self.step_limit,
            };
            return StepOutcome::Halted(self.fail(line, error));
        }
        self.steps += 1;

        // the counter never leaves 1..=len while running
        let source = self.program.line(line).unwrap_or_default();
        let operation = match decode(source, &self.level.allowed) {
            Ok(operation) => operation,
            Err(err) => return StepOutcome::Halted(self.fail(line, err.into())),
        };

        match self.exec(operation) {
            Ok(Flow::Next) if line < self.program.len() => {
                self.pc = Some(line + 1);
                StepOutcome::Continue { line, operation }
            }
            Ok(Flow::Jump(target)) => {
                self.pc = Some(target);
                StepOutcome::Continue { line, operation }
            }
            Ok(Flow::Next | Flow::Done) => StepOutcome::Halted(self.halt(None)),
            Err(err) => StepOutcome::Halted(self.fail(line, err)),
        }
    }

    fn reset_state(&mut self) {
        self.input = self.level.input.iter().copied().map(DataBox::new).collect();
        self.output.clear();
        self.playground = vec![DataBox::EMPTY; self.level.playground_size];
        self.held = DataBox::EMPTY;
        self.pc = None;
        self.steps = 0;
        self.last_result = RunResult::Idle;
        self.fault = None;
    }

    fn fail(&mut self, line: usize, error: MachineError) -> RunReport {
        self.halt(Some(Fault {
            line: Some(line),
            error,
        }))
    }

    /// Ends the run and classifies it.
    fn halt(&mut self, fault: Option<Fault>) -> RunReport {
        self.pc = None;
        self.last_result = match &fault {
            Some(_) => RunResult::RuntimeError,
            None if self.level.accepts(&self.output_values()) => RunResult::Success,
            None => RunResult::Failed,
        };
        match &fault {
            Some(Fault {
                line: Some(line),
                error,
            }) => debug!("'{}': error on line {}: {}", self.level.title, line, error),
            Some(Fault { line: None, error }) => debug!("'{}': {}", self.level.title, error),
            None => {}
        }
        self.fault = fault;
        debug!(
            "'{}': run finished as {:?} after {} steps",
            self.level.title, self.last_result, self.steps
        );
        self.report()
    }

    fn exec(&mut self, operation: Operation) -> Result<Flow, MachineError> {
        exec_operation! {
            machine = self,
            operation = operation,
            {
                Inbox => op_inbox(),
                Outbox => op_outbox(),
                Add => op_add(slot),
                Sub => op_sub(slot),
                CopyTo => op_copy_to(slot),
                CopyFrom => op_copy_from(slot),
                Jump => op_jump(target),
                JumpIfZero => op_jump_if_zero(target),
            }
        }
    }

    // ==================== Operand checks ====================

    fn require_held(&self, operation: &'static str) -> Result<DataBox, MachineError> {
        if self.held.is_empty() {
            return Err(MachineError::NothingHeld { operation });
        }
        Ok(self.held)
    }

    /// Maps a 1-based slot to its playground index.
    fn slot_index(&self, operation: &'static str, slot: i64) -> Result<usize, MachineError> {
        let size = self.playground.len();
        usize::try_from(slot)
            .ok()
            .filter(|s| (1..=size).contains(s))
            .map(|s| s - 1)
            .ok_or(MachineError::SlotOutOfRange {
                operation,
                slot,
                size,
            })
    }

    /// Returns the box in a slot that must be occupied.
    fn occupied_slot(&self, operation: &'static str, slot: i64) -> Result<DataBox, MachineError> {
        let data = self.playground[self.slot_index(operation, slot)?];
        if data.is_empty() {
            return Err(MachineError::EmptySlot { operation, slot });
        }
        Ok(data)
    }

    fn line_target(&self, operation: &'static str, target: i64) -> Result<usize, MachineError> {
        let len = self.program.len();
        usize::try_from(target)
            .ok()
            .filter(|t| (1..=len).contains(t))
            .ok_or(MachineError::LineOutOfRange {
                operation,
                target,
                len,
            })
    }

    // ==================== Handlers ====================

    fn op_inbox(&mut self, _op: &'static str) -> Result<Flow, MachineError> {
        match self.input.pop_front() {
            Some(data) => {
                self.held = data;
                Ok(Flow::Next)
            }
            None => Ok(Flow::Done),
        }
    }

    fn op_outbox(&mut self, op: &'static str) -> Result<Flow, MachineError> {
        let held = self.require_held(op)?;
        self.output.push(held);
        self.held = DataBox::EMPTY;
        Ok(Flow::Next)
    }

    fn op_add(&mut self, op: &'static str, slot: i64) -> Result<Flow, MachineError> {
        let src = self.occupied_slot(op, slot)?;
        let held = self.require_held(op)?;
        self.held = held.added(src);
        Ok(Flow::Next)
    }

    fn op_sub(&mut self, op: &'static str, slot: i64) -> Result<Flow, MachineError> {
        let src = self.occupied_slot(op, slot)?;
        let held = self.require_held(op)?;
        self.held = held.subtracted(src);
        Ok(Flow::Next)
    }

    /// Stores the held box in a slot. Putting it onto an occupied slot
    /// also empties the actor's hands; an empty slot leaves them full.
    fn op_copy_to(&mut self, op: &'static str, slot: i64) -> Result<Flow, MachineError> {
        let idx = self.slot_index(op, slot)?;
        let held = self.require_held(op)?;
        let target = self.playground[idx];
        self.playground[idx] = target.copied_from(held);
        if !target.is_empty() {
            self.held = DataBox::EMPTY;
        }
        Ok(Flow::Next)
    }

    fn op_copy_from(&mut self, op: &'static str, slot: i64) -> Result<Flow, MachineError> {
        let src = self.occupied_slot(op, slot)?;
        self.held = self.held.copied_from(src);
        Ok(Flow::Next)
    }

    fn op_jump(&mut self, op: &'static str, target: i64) -> Result<Flow, MachineError> {
        Ok(Flow::Jump(self.line_target(op, target)?))
    }

    fn op_jump_if_zero(&mut self, op: &'static str, target: i64) -> Result<Flow, MachineError> {
        let target = self.line_target(op, target)?;
        if self.require_held(op)?.is_zero() {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }
}

/// Lazy sequence of [`StepEvent`]s for one run. See [`Machine::steps`].
pub struct Steps<'a> {
    machine: &'a mut Machine,
    finished: bool,
}

impl Steps<'_> {
    /// The machine being driven, for read access between events.
    pub fn machine(&self) -> &Machine {
        self.machine
    }
}

impl Iterator for Steps<'_> {
    type Item = StepEvent;

    fn next(&mut self) -> Option<StepEvent> {
        if self.finished {
            return None;
        }
        let event = match self.machine.step() {
            StepOutcome::Continue { line, operation } => StepEvent::Executed {
                line,
                operation,
                snapshot: self.machine.snapshot(),
            },
            StepOutcome::Halted(report) => {
                self.finished = true;
                StepEvent::Halted {
                    report,
                    snapshot: self.machine.snapshot(),
                }
            }
        };
        Some(event)
    }
}

impl std::iter::FusedIterator for Steps<'_> {}

#[cfg(test)]
mod tests;
