use std::io;
use thiserror::Error;

/// Reasons a program line fails to decode into an [`Operation`](super::isa::Operation).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The line holds no tokens at all.
    #[error("empty instruction")]
    EmptyLine,
    /// More tokens than any operation accepts.
    #[error("expected at most 2 tokens, got {count}")]
    TooManyTokens { count: usize },
    /// First token is not a known mnemonic.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },
    /// A no-argument operation was given an argument.
    #[error("{operation} takes no argument")]
    UnexpectedArgument { operation: &'static str },
    /// An argument-taking operation was given none.
    #[error("{operation} requires an argument")]
    MissingArgument { operation: &'static str },
    /// Argument is not a base-10 signed integer.
    #[error("{operation} expects an integer argument, got '{token}'")]
    InvalidArgument {
        operation: &'static str,
        token: String,
    },
    /// Operation exists but the level does not allow it.
    #[error("{operation} is not available in this level")]
    NotAllowed { operation: &'static str },
}

/// Errors that stop a run with a runtime error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("program is empty")]
    EmptyProgram,
    #[error("invalid instruction: {0}")]
    Decode(#[from] DecodeError),
    /// The operation needs a held box but the actor carries nothing.
    #[error("{operation}: not holding a box")]
    NothingHeld { operation: &'static str },
    /// The addressed playground slot holds no box.
    #[error("{operation}: playground slot {slot} is empty")]
    EmptySlot { operation: &'static str, slot: i64 },
    #[error("{operation}: playground slot {slot} out of range 1..={size}")]
    SlotOutOfRange {
        operation: &'static str,
        slot: i64,
        size: usize,
    },
    #[error("{operation}: line {target} out of range 1..={len}")]
    LineOutOfRange {
        operation: &'static str,
        target: i64,
        len: usize,
    },
    /// The run used up its step budget.
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },
}

/// Errors raised while importing program text.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("missing instruction count")]
    MissingCount,
    #[error("invalid instruction count '{token}'")]
    InvalidCount { token: String },
    #[error("expected {expected} instructions, found {found}")]
    Truncated { expected: usize, found: usize },
}
