mod cli;
mod commands;
mod error;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use cli::{CliOpts, Commands};

fn main() -> miette::Result<()> {
    let opts = CliOpts::from_iter(wild::args_os());

    let default_level = if opts.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match opts.cmd {
        Commands::Create(args) => commands::create(args, opts.verbose)?,
        Commands::Extract(args) => commands::extract(args, opts.verbose)?,
        Commands::List(args) => commands::list(args)?,
    };

    Ok(())
}
