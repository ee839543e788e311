//! Game layer on top of the interpreter.
//!
//! - [`catalogue`]: Built-in levels, pass flags and locking
//! - [`progress`]: Progress persistence behind the [`progress::ProgressStore`] trait
//! - [`screen`]: Text rendering of a level and its machine state
//! - [`session`]: Interactive menu and level loop
//! - [`judge`]: Batch grading of submitted programs

pub mod catalogue;
pub mod judge;
pub mod progress;
pub mod screen;
pub mod session;
