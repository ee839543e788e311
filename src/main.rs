//! Terminal front end of the puzzle game.
//!
//! # Usage
//! ```text
//! hrm [OPTIONS]
//! ```
//!
//! # Options
//! - `--save <file>`: Progress file (defaults to `~/.hrm/progress.txt`)
//! - `--delay <ms>`: Pause between animation frames
//! - `--step-limit <n>`: Lines one run may execute
//! - `--log <level>`: Minimum log level (`debug`, `info`, `warn`, `error`)
//! - `--no-animate`: Show only the final state of each run
//!
//! Every option also has an `HRM_*` environment variable; flags win.

use hrm::config::{Command, Config};
use hrm::game::catalogue::Catalogue;
use hrm::game::progress::FileProgress;
use hrm::game::session::Session;
use hrm::utils::log::set_max_level;
use hrm::{error, info, warn};
use std::env;
use std::io;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("hrm");

    let mut config = Config::from_env().unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
    match config.apply_args(args.get(1..).unwrap_or_default()) {
        Ok(Command::Play) => {}
        Ok(Command::Help) => {
            println!("{}", USAGE.replace("{program}", program));
            return;
        }
        Err(e) => {
            error!("{e}\n");
            print_usage(program);
            process::exit(1);
        }
    }
    set_max_level(config.log_level);

    let store = FileProgress::new(&config.save_path);
    info!("Progress file: {}", store.path().display());

    let stdin = io::stdin();
    let mut session = Session::new(
        Catalogue::builtin(),
        store,
        config,
        stdin.lock(),
        io::stdout(),
    );
    if let Err(e) = session.load_progress() {
        warn!("Starting without saved progress: {e}");
    }
    if let Err(e) = session.run() {
        error!("Terminal I/O failed: {e}");
        process::exit(1);
    }
}

const USAGE: &str = "\
Human Resource Machine

USAGE:
    {program} [OPTIONS]

OPTIONS:
    --save <file>        Progress file (defaults to ~/.hrm/progress.txt)
    --delay <ms>         Pause between animation frames (default 500)
    --step-limit <n>     Lines one run may execute (default 100000)
    --log <level>        Minimum log level: debug, info, warn, error
    --no-animate         Show only the final state of each run
    -h, --help           Print this help message

ENVIRONMENT:
    HRM_SAVE_PATH        Same as --save
    HRM_STEP_DELAY_MS    Same as --delay
    HRM_STEP_LIMIT       Same as --step-limit
    HRM_LOG              Same as --log
    HRM_NO_ANIMATION     Same as --no-animate when set

EXAMPLES:
    # Play with progress kept next to the binary
    {program} --save db.txt

    # Fast runs with debug logging
    {program} --no-animate --log debug
";

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
