//! Batch grading of submitted programs.
//!
//! Input starts with a case count. Each case is a 1-based level number line
//! followed by a program in the counted import format. One verdict line is
//! written per case: `Success`, `Fail` or `Error on instruction <line>`.

use crate::game::catalogue::Catalogue;
use crate::machine::errors::ImportError;
use crate::machine::program::Program;
use crate::machine::vm::{Machine, RunReport, RunResult};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("missing case count")]
    MissingCount,
    #[error("invalid case count '{token}'")]
    InvalidCount { token: String },
    #[error("case {case}: missing level number")]
    MissingLevel { case: usize },
    #[error("case {case}: no level '{token}'")]
    UnknownLevel { case: usize, token: String },
    #[error("case {case}: {source}")]
    Program {
        case: usize,
        #[source]
        source: ImportError,
    },
}

/// Verdict line for a finished run.
pub fn verdict(report: &RunReport) -> String {
    match report.result {
        RunResult::Success => "Success".to_string(),
        RunResult::RuntimeError => {
            // an empty program faults where the counter would start
            let line = report.fault.as_ref().and_then(|f| f.line).unwrap_or(1);
            format!("Error on instruction {line}")
        }
        RunResult::Failed | RunResult::Idle => "Fail".to_string(),
    }
}

fn next_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Grades every case in `reader`, writing verdicts to `writer`.
///
/// Stops at the first malformed case. Verdicts for the cases before it have
/// already been written. Returns the number of cases graded.
pub fn grade<R: BufRead, W: Write>(
    catalogue: &Catalogue,
    mut reader: R,
    mut writer: W,
) -> Result<usize, JudgeError> {
    let header = next_line(&mut reader)?
        .filter(|l| !l.is_empty())
        .ok_or(JudgeError::MissingCount)?;
    let cases = header
        .parse::<usize>()
        .map_err(|_| JudgeError::InvalidCount { token: header })?;

    for case in 1..=cases {
        let token = next_line(&mut reader)?.ok_or(JudgeError::MissingLevel { case })?;
        let level = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| catalogue.level(index))
            .cloned()
            .ok_or_else(|| JudgeError::UnknownLevel {
                case,
                token: token.clone(),
            })?;
        let program = Program::parse_source(&mut reader)
            .map_err(|source| JudgeError::Program { case, source })?;

        let report = Machine::new(level).with_program(program).run_code();
        writeln!(writer, "{}", verdict(&report))?;
    }
    writer.flush()?;
    Ok(cases)
}
