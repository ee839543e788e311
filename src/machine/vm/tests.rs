use super::*;
use crate::game::catalogue::Catalogue;
use crate::machine::errors::DecodeError;
use std::io::Cursor;

fn level(input: &[i64], expected: &[i64], playground: usize) -> Level {
    Level::new(
        "test",
        input.to_vec(),
        expected.to_vec(),
        playground,
        OperationSet::all(),
    )
}

fn machine(level: Level, lines: &[&str]) -> Machine {
    Machine::new(level).with_program(Program::from_lines(lines))
}

fn run(level: Level, lines: &[&str]) -> RunReport {
    machine(level, lines).run_code()
}

fn run_expect_fault(level: Level, lines: &[&str]) -> Fault {
    let report = run(level, lines);
    assert_eq!(report.result, RunResult::RuntimeError, "report: {report:?}");
    report.fault.expect("runtime error without a fault")
}

fn executed_lines(machine: &mut Machine) -> (Vec<usize>, RunReport) {
    let mut lines = Vec::new();
    let mut last = None;
    for event in machine.steps() {
        match event {
            StepEvent::Executed { line, .. } => lines.push(line),
            StepEvent::Halted { report, .. } => last = Some(report),
        }
    }
    (lines, last.expect("no halted event"))
}

// ==================== Scenarios ====================

#[test]
fn inbox_outbox_pairs() {
    let level = Level::new(
        "basic",
        vec![1, 2],
        vec![1, 2],
        0,
        OperationSet::from([OperationKind::Inbox, OperationKind::Outbox]),
    );
    let report = run(level, &["inbox", "outbox", "inbox", "outbox"]);
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![1, 2]);
    assert_eq!(report.steps, 4);
    assert_eq!(report.fault, None);
}

#[test]
fn add_from_playground() {
    let report = run(
        level(&[3, 9], &[12], 1),
        &["inbox", "copyto 1", "inbox", "add 1", "outbox"],
    );
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![12]);
    assert_eq!(report.steps, 5);
}

#[test]
fn outbox_with_nothing_held() {
    let fault = run_expect_fault(level(&[1], &[1], 0), &["outbox"]);
    assert_eq!(fault.line, Some(1));
    assert_eq!(
        fault.error,
        MachineError::NothingHeld {
            operation: "outbox"
        }
    );
}

#[test]
fn jump_past_end_of_program() {
    let fault = run_expect_fault(level(&[], &[], 0), &["jump 5"]);
    assert_eq!(fault.line, Some(1));
    assert_eq!(
        fault.error,
        MachineError::LineOutOfRange {
            operation: "jump",
            target: 5,
            len: 1
        }
    );
}

#[test]
fn empty_program_is_an_error() {
    let report = run(level(&[], &[], 0), &[]);
    assert_eq!(report.result, RunResult::RuntimeError);
    assert_eq!(report.steps, 0);
    assert_eq!(
        report.fault,
        Some(Fault {
            line: None,
            error: MachineError::EmptyProgram
        })
    );
}

#[test]
fn echo_program_succeeds_iff_output_matches_input() {
    for input in [vec![], vec![7], vec![1, -2, 3, 0]] {
        let lines: Vec<&str> = input.iter().flat_map(|_| ["inbox", "outbox"]).collect();
        if lines.is_empty() {
            continue;
        }
        let report = run(level(&input, &input, 0), &lines);
        assert_eq!(report.result, RunResult::Success);
        assert_eq!(report.output, input);

        let mut reversed = input.clone();
        reversed.reverse();
        if reversed != input {
            let report = run(level(&input, &reversed, 0), &lines);
            assert_eq!(report.result, RunResult::Failed);
        }
    }
}

// ==================== Completion ====================

#[test]
fn wrong_output_is_failed_not_error() {
    let report = run(level(&[1, 2], &[1, 2], 0), &["inbox", "outbox"]);
    assert_eq!(report.result, RunResult::Failed);
    assert_eq!(report.output, vec![1]);
    assert_eq!(report.fault, None);
}

#[test]
fn inbox_on_empty_queue_finishes_the_run() {
    let report = run(level(&[1, 2], &[1, 2], 0), &["inbox", "outbox", "jump 1"]);
    assert_eq!(report.result, RunResult::Success);
    // two full passes plus the final inbox
    assert_eq!(report.steps, 7);
}

#[test]
fn counter_is_cleared_after_halt() {
    let mut m = machine(level(&[1], &[1], 0), &["inbox", "outbox"]);
    m.start();
    assert_eq!(m.program_counter(), Some(1));
    assert!(m.is_running());
    m.run_code();
    assert_eq!(m.program_counter(), None);
    assert!(!m.is_running());
    assert_eq!(m.last_result(), RunResult::Success);
}

// ==================== Control flow ====================

#[test]
fn jump_lands_exactly_on_target() {
    let mut m = machine(level(&[5], &[5], 0), &["jump 3", "outbox", "inbox", "outbox"]);
    let (lines, report) = executed_lines(&mut m);
    assert_eq!(lines, vec![1, 3]);
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.steps, 3);
}

#[test]
fn jump_if_zero_taken_on_zero() {
    let mut m = machine(
        level(&[0], &[], 0),
        &["inbox", "jumpifzero 4", "outbox", "inbox"],
    );
    let (lines, report) = executed_lines(&mut m);
    assert_eq!(lines, vec![1, 2]);
    assert_eq!(report.result, RunResult::Success);
    assert!(report.output.is_empty());
}

#[test]
fn jump_if_zero_falls_through_otherwise() {
    let mut m = machine(
        level(&[3], &[3], 0),
        &["inbox", "jumpifzero 4", "outbox", "inbox"],
    );
    let (lines, report) = executed_lines(&mut m);
    assert_eq!(lines, vec![1, 2, 3]);
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![3]);
}

#[test]
fn jump_if_zero_needs_a_held_box() {
    let fault = run_expect_fault(level(&[], &[], 0), &["jumpifzero 1"]);
    assert_eq!(
        fault.error,
        MachineError::NothingHeld {
            operation: "jumpifzero"
        }
    );
}

#[test]
fn jump_targets_are_bounds_checked() {
    for target in ["0", "-1", "3"] {
        let line = format!("jump {target}");
        let fault = run_expect_fault(level(&[1], &[], 0), &["inbox", &line]);
        assert_eq!(fault.line, Some(2));
        assert!(matches!(fault.error, MachineError::LineOutOfRange { len: 2, .. }));
    }
}

// ==================== Playground ====================

#[test]
fn copy_to_empty_slot_keeps_held_box() {
    let mut m = machine(level(&[4], &[], 1), &["inbox", "copyto 1", "copyto 1"]);
    m.start();
    m.step();
    assert!(matches!(m.step(), StepOutcome::Continue { line: 2, .. }));
    assert_eq!(m.held(), DataBox::new(4));
    assert_eq!(m.playground(), [DataBox::new(4)]);
}

#[test]
fn copy_to_occupied_slot_empties_held_box() {
    let mut m = machine(level(&[4], &[], 1), &["inbox", "copyto 1", "copyto 1"]);
    let report = m.run_code();
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(m.held(), DataBox::EMPTY);
    assert_eq!(m.playground(), [DataBox::new(4)]);
}

#[test]
fn copy_to_checks_slot_and_held() {
    let fault = run_expect_fault(level(&[1], &[], 1), &["inbox", "copyto 2"]);
    assert_eq!(
        fault.error,
        MachineError::SlotOutOfRange {
            operation: "copyto",
            slot: 2,
            size: 1
        }
    );
    let fault = run_expect_fault(level(&[1], &[], 1), &["inbox", "copyto 0"]);
    assert!(matches!(fault.error, MachineError::SlotOutOfRange { slot: 0, .. }));
    let fault = run_expect_fault(level(&[], &[], 1), &["copyto 1"]);
    assert_eq!(
        fault.error,
        MachineError::NothingHeld {
            operation: "copyto"
        }
    );
}

#[test]
fn copy_from_replaces_held_box() {
    let report = run(
        level(&[1, 2], &[1], 1),
        &["inbox", "copyto 1", "inbox", "copyfrom 1", "outbox"],
    );
    assert_eq!(report.result, RunResult::Success);
}

#[test]
fn copy_from_empty_slot() {
    let fault = run_expect_fault(level(&[], &[], 2), &["copyfrom 2"]);
    assert_eq!(
        fault.error,
        MachineError::EmptySlot {
            operation: "copyfrom",
            slot: 2
        }
    );
}

#[test]
fn sub_from_playground() {
    let report = run(
        level(&[3, 9], &[6], 1),
        &["inbox", "copyto 1", "inbox", "sub 1", "outbox"],
    );
    assert_eq!(report.result, RunResult::Success);
}

#[test]
fn add_needs_both_operands() {
    let fault = run_expect_fault(
        level(&[3], &[], 1),
        &["inbox", "copyto 1", "outbox", "add 1"],
    );
    assert_eq!(fault.line, Some(4));
    assert_eq!(fault.error, MachineError::NothingHeld { operation: "add" });

    let fault = run_expect_fault(level(&[3], &[], 1), &["inbox", "sub 1"]);
    assert_eq!(
        fault.error,
        MachineError::EmptySlot {
            operation: "sub",
            slot: 1
        }
    );
}

#[test]
fn zero_sized_playground_rejects_every_slot() {
    let fault = run_expect_fault(level(&[1], &[], 0), &["inbox", "add 1"]);
    assert!(matches!(fault.error, MachineError::SlotOutOfRange { size: 0, .. }));
}

// ==================== Decoding at run time ====================

#[test]
fn decode_error_reports_its_line() {
    let fault = run_expect_fault(level(&[1], &[1], 0), &["inbox", "bogus", "outbox"]);
    assert_eq!(fault.line, Some(2));
    assert_eq!(
        fault.error,
        MachineError::Decode(DecodeError::UnknownOperation {
            name: "bogus".to_string()
        })
    );
}

#[test]
fn disallowed_operation_fails_when_reached() {
    let level = Level::new(
        "basic",
        vec![1],
        vec![1],
        1,
        OperationSet::from([OperationKind::Inbox, OperationKind::Outbox]),
    );
    let fault = run_expect_fault(level, &["inbox", "copyto 1"]);
    assert_eq!(
        fault.error,
        MachineError::Decode(DecodeError::NotAllowed {
            operation: "copyto"
        })
    );
}

#[test]
fn unreached_invalid_line_is_harmless() {
    let report = run(level(&[1], &[1], 0), &["inbox", "outbox", "jump 1", "nonsense here ok"]);
    assert_eq!(report.result, RunResult::Success);
}

#[test]
fn failing_step_is_counted() {
    let report = run(level(&[1, 2], &[], 0), &["inbox", "outbox", "outbox"]);
    assert_eq!(report.result, RunResult::RuntimeError);
    assert_eq!(report.steps, 3);
    assert_eq!(report.output, vec![1]);
}

// ==================== Runs and events ====================

#[test]
fn rerun_is_deterministic() {
    let mut m = machine(
        level(&[3, 9, 5], &[], 1),
        &["inbox", "copyto 1", "inbox", "add 1", "outbox", "jump 1"],
    );
    let first = m.run_code();
    let second = m.run_code();
    assert_eq!(first, second);
    assert_eq!(first.result, RunResult::Failed);
}

#[test]
fn step_events_match_run_code() {
    let mut m = machine(
        level(&[3, 9], &[12], 1),
        &["inbox", "copyto 1", "inbox", "add 1", "outbox"],
    );
    let expected = m.run_code();
    let events: Vec<StepEvent> = m.steps().collect();
    assert_eq!(events.len(), 5);
    match events.last() {
        Some(StepEvent::Halted { report, snapshot }) => {
            assert_eq!(report, &expected);
            assert_eq!(snapshot.program_counter, None);
            assert_eq!(snapshot.output, vec![DataBox::new(12)]);
        }
        other => panic!("expected halted event, got {other:?}"),
    }
    match &events[1] {
        StepEvent::Executed {
            line,
            operation,
            snapshot,
        } => {
            assert_eq!(*line, 2);
            assert_eq!(*operation, Operation::CopyTo { slot: 1 });
            assert_eq!(snapshot.playground, vec![DataBox::new(3)]);
            assert_eq!(snapshot.held, DataBox::new(3));
            assert_eq!(snapshot.input, vec![DataBox::new(9)]);
            assert_eq!(snapshot.program_counter, Some(3));
            assert_eq!(snapshot.steps, 2);
        }
        other => panic!("expected executed event, got {other:?}"),
    }
}

#[test]
fn steps_restart_from_scratch() {
    let mut m = machine(level(&[1], &[1], 0), &["inbox", "outbox"]);
    let first: Vec<StepEvent> = m.steps().collect();
    let second: Vec<StepEvent> = m.steps().collect();
    assert_eq!(first, second);
}

#[test]
fn empty_program_yields_single_halted_event() {
    let mut m = machine(level(&[], &[], 0), &[]);
    let mut steps = m.steps();
    assert!(matches!(steps.next(), Some(StepEvent::Halted { .. })));
    assert!(steps.next().is_none());
    assert!(steps.next().is_none());
}

#[test]
fn step_on_idle_machine_reports_idle() {
    let mut m = machine(level(&[1], &[1], 0), &["inbox"]);
    match m.step() {
        StepOutcome::Halted(report) => {
            assert_eq!(report.result, RunResult::Idle);
            assert_eq!(report.steps, 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn step_limit_stops_endless_loop() {
    let mut m = machine(level(&[], &[], 0), &["jump 1"]).with_step_limit(10);
    let report = m.run_code();
    assert_eq!(report.result, RunResult::RuntimeError);
    assert_eq!(report.steps, 10);
    assert_eq!(
        report.fault,
        Some(Fault {
            line: Some(1),
            error: MachineError::StepLimitExceeded { limit: 10 }
        })
    );
}

#[test]
fn default_step_limit() {
    let m = Machine::new(level(&[], &[], 0));
    assert_eq!(m.step_limit(), DEFAULT_STEP_LIMIT);
    let report = machine(level(&[], &[], 0), &["jump 1"]).run_code();
    assert_eq!(report.steps, DEFAULT_STEP_LIMIT);
}

#[test]
fn new_machine_is_reset() {
    let m = Machine::new(level(&[4, 5], &[], 3));
    assert_eq!(m.input(), &VecDeque::from([DataBox::new(4), DataBox::new(5)]));
    assert_eq!(m.playground(), [DataBox::EMPTY; 3]);
    assert_eq!(m.held(), DataBox::EMPTY);
    assert_eq!(m.last_result(), RunResult::Idle);
    assert!(m.output().is_empty());
}

// ==================== Program editing ====================

#[test]
fn editing_changes_program() {
    let mut m = Machine::new(level(&[], &[], 0));
    m.add_code("  inbox ");
    m.add_code("outbox");
    assert_eq!(m.program().lines(), ["inbox", "outbox"]);
    assert_eq!(m.remove_code().as_deref(), Some("outbox"));
    m.clear_code();
    assert!(m.program().is_empty());
    assert_eq!(m.remove_code(), None);
}

#[test]
fn editing_abandons_run_in_progress() {
    let mut m = machine(level(&[1], &[1], 0), &["inbox", "outbox"]);
    m.start();
    m.step();
    m.add_code("jump 1");
    assert!(!m.is_running());
    assert_eq!(m.last_result(), RunResult::Idle);
    assert!(matches!(m.step(), StepOutcome::Halted(_)));
}

#[test]
fn failed_import_keeps_program() {
    let mut m = machine(level(&[1], &[1], 0), &["inbox", "outbox"]);
    assert!(m.import_source(Cursor::new("three\ninbox\n")).is_err());
    assert!(m.import_source(Cursor::new("2\ninbox\n")).is_err());
    assert!(m.import_code("/definitely/not/here.txt").is_err());
    assert_eq!(m.program().lines(), ["inbox", "outbox"]);
}

#[test]
fn successful_import_replaces_program() {
    let mut m = machine(level(&[1], &[1], 0), &["outbox"]);
    m.import_source(Cursor::new("2\ninbox\noutbox\n")).unwrap();
    assert_eq!(m.program().lines(), ["inbox", "outbox"]);
    assert!(m.run_code().succeeded());
}

// ==================== Built-in levels ====================

fn solve(index: usize, lines: &[&str]) -> RunReport {
    let level = Catalogue::builtin().levels()[index].clone();
    run(level, lines)
}

#[test]
fn solves_level_two() {
    let report = solve(
        1,
        &[
            "inbox",
            "copyto 1",
            "inbox",
            "copyto 2",
            "copyfrom 1",
            "sub 2",
            "outbox",
            "copyfrom 2",
            "sub 1",
            "outbox",
            "jump 1",
        ],
    );
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![-6, 6, 4, -4, 0, 0, 18, -18]);
    assert_eq!(report.steps, 45);
}

#[test]
fn solves_level_three() {
    let report = solve(
        2,
        &[
            "inbox",
            "copyto 1",
            "inbox",
            "sub 1",
            "jumpifzero 7",
            "jump 1",
            "copyfrom 1",
            "outbox",
            "jump 1",
        ],
    );
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![7, -3]);
}

#[test]
fn solves_level_four() {
    let report = solve(
        3,
        &[
            "inbox",
            "copyto 1",
            "outbox",
            "copyfrom 1",
            "outbox",
            "copyfrom 1",
            "add 1",
            "copyto 2",
            "outbox",
            "copyfrom 2",
            "add 1",
            "outbox",
        ],
    );
    assert_eq!(report.result, RunResult::Success);
    assert_eq!(report.output, vec![1, 1, 2, 3]);
    assert_eq!(report.steps, 12);
}

#[test]
fn level_one_rejects_playground_operations() {
    let report = solve(0, &["inbox", "copyto 1", "outbox"]);
    assert_eq!(report.result, RunResult::RuntimeError);
}
