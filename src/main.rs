use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use ls8::{loader, Cpu, ExitStatus, RunLimits};

/// Runs an LS-8 program.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Program in `.ls8` text form
    program: PathBuf,

    /// Print a TRACE line to stderr before every instruction
    #[arg(long)]
    trace: bool,

    /// Abort after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,
}

fn run(args: &Args) -> anyhow::Result<ExitStatus> {
    let program = loader::load_file(&args.program)?;
    let mut cpu = Cpu::with_program(&program)
        .with_context(|| format!("cannot load {}", args.program.display()))?;

    let limits = RunLimits {
        max_steps: args.max_steps,
        cancel: None,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = if args.trace {
        cpu.run_observed(&mut out, &limits, |snap| eprintln!("{}", snap))
    } else {
        cpu.run_with(&mut out, &limits)
    };
    let status = result
        .with_context(|| format!("{} faulted after {} steps", args.program.display(), cpu.steps()))?;
    out.flush()?;
    Ok(status)
}

fn main() -> ExitCode {
    // RUST_LOG=debug or RUST_LOG=ls8=trace for per-instruction logs
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("running {}", args.program.display());
    match run(&args) {
        Ok(status) => {
            info!("finished: {:?}", status);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
