//! Human Resource Machine style puzzle game.
//!
//! Provides the box-moving interpreter, the level catalogue with saved
//! progress, a terminal front end and a batch grader.

pub mod config;
pub mod game;
pub mod machine;
pub mod utils;
