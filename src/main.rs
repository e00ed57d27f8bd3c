//! `reqtrace`: browse the traceability links between requirements.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
