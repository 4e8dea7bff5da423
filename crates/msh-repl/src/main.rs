//! msh CLI entry point.
//!
//! Usage:
//!   msh                        # Interactive shell
//!   msh -c <command>           # Evaluate one line and exit
//!   msh script                 # Evaluate a file of input lines
//!   msh [-s N] [-j N] [-l N]   # History / job / line-length limits

use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use msh_kernel::ShellConfig;
use msh_repl::Repl;

const USAGE: &str = "usage: msh [-s NUMBER] [-j NUMBER] [-l NUMBER]";

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("msh: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut config = ShellConfig::default();
    let mut command: Option<String> = None;
    let mut script: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(ExitCode::SUCCESS);
            }
            "--version" | "-V" => {
                println!("msh {}", env!("CARGO_PKG_VERSION"));
                return Ok(ExitCode::SUCCESS);
            }
            "-c" => {
                command = Some(
                    iter.next()
                        .context("-c requires a command argument")?
                        .clone(),
                );
            }
            "-j" | "-l" | "-s" => {
                let Some(value) = iter.next().and_then(|v| parse_limit(v)) else {
                    println!("{USAGE}");
                    return Ok(ExitCode::FAILURE);
                };
                config = match arg.as_str() {
                    "-j" => config.with_max_jobs(value),
                    "-l" => config.with_max_line(value),
                    _ => config.with_max_history(value),
                };
            }
            operand if !operand.starts_with('-') && script.is_none() => {
                script = Some(operand.to_string());
            }
            _ => {
                println!("{USAGE}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let mut repl = Repl::new(config)?;

    if let Some(command) = command {
        repl.run_command(&command)?;
    } else if let Some(path) = script {
        let file =
            File::open(&path).with_context(|| format!("failed to open script: {path}"))?;
        repl.run_reader(BufReader::new(file))?;
    } else if io::stdin().is_terminal() {
        repl.run()?;
    } else {
        let stdin = io::stdin();
        repl.run_reader(stdin.lock())?;
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_limit(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|n| *n > 0)
}

fn print_help() {
    println!(
        r#"msh v{}

Usage:
  msh                        Interactive shell
  msh -c <command>           Evaluate one line and exit
  msh <script>               Evaluate a file of input lines

Options:
  -j NUMBER                  Maximum concurrent jobs (default 16)
  -l NUMBER                  Maximum input line length (default 1024)
  -s NUMBER                  Maximum saved history lines (default 10)
  -c <command>               Evaluate a command string and exit
  -h, --help                 Show this help
  -V, --version              Show version

Job control:
  jobs                       List tracked jobs
  bg %N | fg %N              Resume a job in the background / foreground
  kill <sig> <pid|%N>        Send 2/15/18/19 to a job's process group
  history, !N                List and re-run input lines
"#,
        env!("CARGO_PKG_VERSION")
    );
}
