//! Program text and its import format.
//!
//! A [`Program`] is a list of raw source lines. Lines are kept verbatim apart
//! from surrounding whitespace and are only decoded when the machine reaches
//! them, so a program may hold lines that would never decode.
//!
//! # Import format
//!
//! ```text
//! 3
//! inbox
//! outbox
//! jump 1
//! ```
//!
//! The first line is the instruction count `n`; exactly `n` lines follow.
//! Anything after them is ignored.

use crate::machine::errors::ImportError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Source name used for import errors that do not come from a file.
const INLINE_SOURCE: &str = "<input>";

/// Editable program text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a program from lines, trimming each one.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut program = Self::new();
        for line in lines {
            program.push_line(line.as_ref());
        }
        program
    }

    /// Appends a line with surrounding whitespace removed.
    pub fn push_line(&mut self, line: &str) {
        self.lines.push(line.trim().to_string());
    }

    /// Removes and returns the last line, if any.
    pub fn pop_line(&mut self) -> Option<String> {
        self.lines.pop()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the line at 1-based position `line`.
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Parses a program in the counted import format.
    pub fn parse_source<R: BufRead>(reader: R) -> Result<Self, ImportError> {
        Self::parse_named(reader, INLINE_SOURCE)
    }

    /// Reads and parses a program file.
    pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path_ref = path.as_ref();
        let name = path_ref.display().to_string();
        let file = File::open(path_ref).map_err(|source| ImportError::Io {
            path: name.clone(),
            source,
        })?;
        Self::parse_named(BufReader::new(file), &name)
    }

    fn parse_named<R: BufRead>(reader: R, name: &str) -> Result<Self, ImportError> {
        let mut lines = reader.lines();
        let io_error = |source: io::Error| ImportError::Io {
            path: name.to_string(),
            source,
        };

        let header = lines.next().ok_or(ImportError::MissingCount)?.map_err(io_error)?;
        let header = header.trim();
        if header.is_empty() {
            return Err(ImportError::MissingCount);
        }
        let expected = header
            .parse::<usize>()
            .map_err(|_| ImportError::InvalidCount {
                token: header.to_string(),
            })?;

        let mut program = Self::new();
        for line in lines.take(expected) {
            program.push_line(&line.map_err(io_error)?);
        }
        if program.len() < expected {
            return Err(ImportError::Truncated {
                expected,
                found: program.len(),
            });
        }
        Ok(program)
    }
}
