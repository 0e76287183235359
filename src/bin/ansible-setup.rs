//! ansible-setup CLI
//!
//! Standalone driver: validate the session configuration and run playbooks
//! named on the command line through the same path the test fixture uses.

use std::process::ExitCode;

use clap::Parser;

use ansible_setup::{PlaybookRunner, PlaybookSet, SetupArgs, program_on_path, DEFAULT_PROGRAM};

#[derive(Parser, Debug)]
#[command(name = "ansible-setup")]
#[command(version)]
#[command(about = "Run ansible playbooks as test setup")]
struct Cli {
    #[command(flatten)]
    setup: SetupArgs,

    /// Playbook files to run, in order
    #[arg(value_name = "PLAYBOOK")]
    playbooks: Vec<String>,

    /// Suppress the invocation log
    #[arg(short, long)]
    quiet: bool,

    /// Report whether the automation program is on PATH, then exit
    #[arg(long)]
    probe: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.probe {
        if program_on_path(DEFAULT_PROGRAM) {
            println!("{} found on PATH", DEFAULT_PROGRAM);
            return ExitCode::SUCCESS;
        }
        eprintln!("{} not found on PATH", DEFAULT_PROGRAM);
        return ExitCode::FAILURE;
    }

    let config = cli.setup.into_config();
    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        // configuration errors use the usage-error exit code
        return ExitCode::from(2);
    }

    if cli.playbooks.is_empty() {
        eprintln!("error: no playbook files given");
        return ExitCode::from(2);
    }

    let mut runner = PlaybookRunner::new(config).quiet(cli.quiet);
    let set = PlaybookSet::new(cli.playbooks.iter().cloned());

    match runner.run_set("command line", &set) {
        Ok(()) => {
            for playbook in set.iter() {
                println!("ok    {}", playbook);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if !cli.quiet && !runner.log().is_empty() {
                eprintln!("--- invocations ---");
                for line in runner.log().lines() {
                    eprintln!("{}", line);
                }
            }
            ExitCode::FAILURE
        }
    }
}
