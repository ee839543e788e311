//! Box-moving interpreter.
//!
//! A program is a list of text lines in a tiny assembly language. The
//! machine moves integer boxes from an input queue, through a scratch
//! playground, to an output queue, and grades a run by comparing the
//! output against the level's expected sequence.
//!
//! # Architecture
//!
//! - **Boxes**: [`data_box::DataBox`] is an optionally empty integer and a plain value
//! - **Decoding**: lines are decoded only when reached, so an invalid line
//!   fails the run at that line and nowhere earlier
//! - **Execution model**: one fetch-decode-execute iteration per step, with
//!   direct jumps that do not advance the counter
//! - **Step budget**: every run is bounded by a step limit
//!
//! # Modules
//!
//! - [`data_box`]: The box value type
//! - [`decoder`]: Line decoding and whitelist checks
//! - [`errors`]: Decode, runtime and import error types
//! - [`isa`]: Operation table and operation sets
//! - [`level`]: Static level description
//! - [`program`]: Program text, editing and the import format
//! - [`vm`]: The machine, run reports and step events

pub mod data_box;
pub mod decoder;
pub mod errors;
pub mod isa;
pub mod level;
pub mod program;
pub mod vm;
