use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{mediate::MediateArg, profile::ProfileArg, validate::ValidateArg};

mod mediate;
mod profile;
mod validate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug events of the analysis to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score classifier predictions against gold labels
    Validate(#[clap(flatten)] ValidateArg),
    /// Run mediation analysis over every mediator
    Mediate(#[clap(flatten)] MediateArg),
    /// Profile strategies by reaction and mediator values
    Profile(#[clap(flatten)] ProfileArg),
}

/// Logs go to stderr; stdout carries reports only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Validate(arg) => validate::run(&arg)?,
        Mode::Mediate(arg) => mediate::run(&arg)?,
        Mode::Profile(arg) => profile::run(&arg)?,
    }
    Ok(())
}
