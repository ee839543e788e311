//! Runtime configuration for the game binary.
//!
//! Values come from defaults, then `HRM_*` environment variables, then
//! command-line flags, each layer overriding the one before.

use crate::machine::vm::DEFAULT_STEP_LIMIT;
use crate::utils::log::Level;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Pause between animation frames.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);
/// Progress file used when no home directory is known.
pub const FALLBACK_SAVE_PATH: &str = "db.txt";

pub const ENV_SAVE_PATH: &str = "HRM_SAVE_PATH";
pub const ENV_STEP_DELAY: &str = "HRM_STEP_DELAY_MS";
pub const ENV_STEP_LIMIT: &str = "HRM_STEP_LIMIT";
pub const ENV_LOG: &str = "HRM_LOG";
pub const ENV_NO_ANIMATION: &str = "HRM_NO_ANIMATION";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
    #[error("{flag} requires an argument")]
    MissingValue { flag: String },
    #[error("unexpected argument: {arg}")]
    UnknownArgument { arg: String },
}

/// What the command line asked for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Play,
    Help,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Where pass flags are stored.
    pub save_path: PathBuf,
    /// Pause between animation frames.
    pub step_delay: Duration,
    /// Whether runs are played back frame by frame.
    pub animate: bool,
    /// Lines one run may execute.
    pub step_limit: usize,
    pub log_level: Level,
}

/// `~/.hrm/progress.txt`, or `db.txt` in the working directory.
pub fn default_save_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".hrm").join("progress.txt"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SAVE_PATH))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            step_delay: DEFAULT_STEP_DELAY,
            animate: true,
            step_limit: DEFAULT_STEP_LIMIT,
            log_level: Level::Info,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `HRM_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_SAVE_PATH).filter(|p| !p.is_empty()) {
            config.save_path = PathBuf::from(path);
        }
        if let Some(ms) = lookup(ENV_STEP_DELAY) {
            config.step_delay = Duration::from_millis(parse_value(ENV_STEP_DELAY, &ms)?);
        }
        if let Some(limit) = lookup(ENV_STEP_LIMIT) {
            config.step_limit = parse_value(ENV_STEP_LIMIT, &limit)?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = parse_value(ENV_LOG, &level)?;
        }
        if lookup(ENV_NO_ANIMATION).is_some() {
            config.animate = false;
        }
        Ok(config)
    }

    /// Applies command-line flags; `args` excludes the program name.
    pub fn apply_args(&mut self, args: &[String]) -> Result<Command, ConfigError> {
        let value_of = |i: usize| {
            args.get(i + 1).ok_or_else(|| ConfigError::MissingValue {
                flag: args[i].clone(),
            })
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--save" => {
                    self.save_path = PathBuf::from(value_of(i)?);
                    i += 2;
                }
                k @ "--delay" => {
                    self.step_delay = Duration::from_millis(parse_value(k, value_of(i)?)?);
                    i += 2;
                }
                k @ "--step-limit" => {
                    self.step_limit = parse_value(k, value_of(i)?)?;
                    i += 2;
                }
                k @ "--log" => {
                    self.log_level = parse_value(k, value_of(i)?)?;
                    i += 2;
                }
                "--no-animate" => {
                    self.animate = false;
                    i += 1;
                }
                other => {
                    return Err(ConfigError::UnknownArgument {
                        arg: other.to_string(),
                    });
                }
            }
        }
        Ok(Command::Play)
    }
}
