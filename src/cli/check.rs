use std::{path::PathBuf, process};

use clap::Parser;
use reqtrace::{Directory, domain::DanglingLink};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Report links to requirements that do not exist")]
pub struct Check {
    /// Only print the summary line
    #[arg(short, long)]
    quiet: bool,
}

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::load(&root)?;
        let index = directory.index();
        let dangling: Vec<DanglingLink<'_>> = index.dangling_links().collect();

        if dangling.is_empty() {
            println!(
                "{}",
                format!("✓ {} requirements, no dangling links", index.len()).success()
            );
            return Ok(());
        }

        if !self.quiet {
            for link in &dangling {
                println!("{}", describe(link));
            }
            println!();
        }

        println!("{}", format!("⚠ {} dangling link(s)", dangling.len()).warning());
        process::exit(1);
    }
}

fn describe(link: &DanglingLink<'_>) -> String {
    let location = link
        .source
        .location()
        .map(|location| format!(" ({location})").dim())
        .unwrap_or_default();
    format!(
        "{}{location} --{}--> {} {}",
        link.source.id(),
        link.relation,
        link.target,
        "(not found)".warning()
    )
}
