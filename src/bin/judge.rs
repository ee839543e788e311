//! Batch grader CLI.
//!
//! Reads grading cases and prints one verdict line per case.
//!
//! # Usage
//! ```text
//! hrm-judge [input] [OPTIONS]
//! ```
//!
//! # Arguments
//! - `input`: Case file (defaults to standard input)
//!
//! # Options
//! - `-o, --output <file>`: Verdict file (defaults to standard output)
//!
//! # Examples
//! ```text
//! hrm-judge in.txt
//! hrm-judge in.txt -o out.txt
//! hrm-judge < in.txt
//! ```

use hrm::game::catalogue::Catalogue;
use hrm::game::judge::grade;
use hrm::{error, info};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("hrm-judge");

    let mut input_path: Option<String> = None;
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("{}", USAGE.replace("{program}", program));
                return;
            }
            k @ ("--output" | "-o") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                output_path = Some(args[i].clone());
                i += 1;
            }
            other if input_path.is_none() && !other.starts_with('-') => {
                input_path = Some(other.to_string());
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(program);
                process::exit(1);
            }
        }
    }

    let reader: Box<dyn BufRead> = match &input_path {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!("Cannot open input file {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    if let Some(parent) = output_path.as_deref().and_then(|p| Path::new(p).parent())
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        error!("Output directory does not exist: {}", parent.display());
        process::exit(1);
    }

    let writer: Box<dyn Write> = match &output_path {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                error!("Cannot create output file {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    match grade(&Catalogue::builtin(), reader, writer) {
        Ok(cases) => info!("Graded {} case(s)", cases),
        Err(e) => {
            error!("Grading stopped: {}", e);
            process::exit(1);
        }
    }
}

const USAGE: &str = "\
Human Resource Machine batch grader

USAGE:
    {program} [input] [OPTIONS]

ARGS:
    [input]                Case file (defaults to standard input)

OPTIONS:
    -o, --output <file>    Verdict file (defaults to standard output)
    -h, --help             Print this help message

INPUT FORMAT:
    First line: number of cases. Each case: a level number line, then an
    instruction count line followed by that many instruction lines.

OUTPUT:
    One line per case: Success, Fail or Error on instruction <line>
";

fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
