use std::path::{Path, PathBuf};

mod check;
mod list;
mod show;
mod terminal;

use anyhow::Context;
use check::Check;
use clap::ArgAction;
use list::List;
use show::Show;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the documentation project
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the relationships of a requirement
    ///
    /// Outgoing links are those the requirement declares; incoming links are
    /// declared by other requirements and point at it.
    Show(Show),

    /// List requirements
    List(List),

    /// Report dangling links
    ///
    /// Exits with a non-zero status if any link points at a requirement that
    /// does not exist.
    Check(Check),

    /// Print the effective configuration
    Config(Config),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Check(command) => command.run(root)?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {}

impl Config {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = reqtrace::Config::load_or_default(root)
            .with_context(|| format!("failed to load configuration from {}", root.display()))?;
        print!("{}", config.to_toml().context("failed to serialize configuration")?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from(["reqtrace", "show", "REQ-001", "-vv", "--root", "docs"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("docs"));
        assert!(matches!(cli.command, Command::Show(_)));
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(Cli::try_parse_from(["reqtrace", "show", "  "]).is_err());
    }
}
