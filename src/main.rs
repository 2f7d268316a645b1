//! `swarf-feeds` command

mod cli;

use clap::Parser;
use cli::Cli;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);
    cli::run(cli)
}
