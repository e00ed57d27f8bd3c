use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use regex::Regex;
use reqtrace::{Config, Directory, LinkIndex, Requirement};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `reqtrace list`.
#[derive(Debug, Parser)]
#[command(about = "List requirements")]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Filter by type (comma-separated, case-insensitive).
    #[arg(long = "type", value_delimiter = ',', value_name = "TYPE")]
    kind: Vec<String>,

    /// Filter by level (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',', value_name = "LEVEL")]
    level: Vec<String>,

    /// Filter by status (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    status: Vec<String>,

    /// Regular expression match against id, title and description.
    #[arg(long)]
    regex: Option<String>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One listed requirement.
#[derive(Debug, Serialize)]
struct Row<'a> {
    id: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    title: &'a str,
    outgoing: usize,
    incoming: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl<'a> Row<'a> {
    fn new(requirement: &'a Requirement, index: &LinkIndex) -> Self {
        Self {
            id: requirement.id().as_str(),
            kind: requirement.kind(),
            level: requirement.level(),
            status: requirement.status(),
            title: requirement.title(),
            outgoing: requirement.links().total(),
            incoming: index.incoming_links(requirement.id()).total(),
            location: requirement.location().map(ToString::to_string),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::load(&root)?;
        let filters = Filters::new(&self)?;
        let index = directory.index();

        let rows: Vec<Row<'_>> = index
            .all_requirements()
            .filter(|requirement| filters.matches(requirement))
            .map(|requirement| Row::new(requirement, index))
            .collect();

        match self.output {
            OutputFormat::Table => render_table(&rows, directory.config()),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &rows)
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Filters {
    kinds: Vec<String>,
    levels: Vec<String>,
    statuses: Vec<String>,
    regex: Option<Regex>,
}

impl Filters {
    fn new(cmd: &List) -> anyhow::Result<Self> {
        let regex = if let Some(pattern) = &cmd.regex {
            Some(Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))?)
        } else {
            None
        };

        let lowercase = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(String::as_str)
                .map(str::to_lowercase)
                .collect()
        };

        Ok(Self {
            kinds: lowercase(&cmd.kind),
            levels: lowercase(&cmd.level),
            statuses: lowercase(&cmd.status),
            regex,
        })
    }

    fn matches(&self, requirement: &Requirement) -> bool {
        let accepts = |allowed: &[String], value: Option<&str>| {
            allowed.is_empty()
                || value.is_some_and(|v| allowed.iter().any(|a| *a == v.to_lowercase()))
        };

        if !accepts(&self.kinds, requirement.kind())
            || !accepts(&self.levels, requirement.level())
            || !accepts(&self.statuses, requirement.status())
        {
            return false;
        }

        if let Some(regex) = &self.regex {
            let haystack = format!(
                "{}\n{}\n{}",
                requirement.id(),
                requirement.title(),
                requirement.description().unwrap_or_default()
            );
            if !regex.is_match(&haystack) {
                return false;
            }
        }

        true
    }
}

fn render_table(rows: &[Row<'_>], config: &Config) {
    if rows.is_empty() {
        println!("{}", "No requirements found".dim());
        return;
    }

    let headers = ["ID", "Type", "Level", "Status", "Title", "Links"];

    let data: Vec<[String; 6]> = rows
        .iter()
        .map(|row| {
            [
                row.id.to_string(),
                row.kind.map(|k| config.type_title(k)).unwrap_or_default(),
                row.level.map(|l| config.level_title(l)).unwrap_or_default(),
                row.status.unwrap_or_default().to_string(),
                row.title.to_string(),
                format!("→{} ←{}", row.outgoing, row.incoming),
            ]
        })
        .collect();

    // Determine column widths for alignment.
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for (row, values) in rows.iter().zip(&data) {
        for (idx, value) in values.iter().enumerate() {
            let width = widths[idx];
            let cell = format!("{value:<width$}");
            // Colour after padding so escape codes don't skew the alignment.
            let cell = if idx == 3 {
                cell.hex(row.status.and_then(|s| config.status_color(s)))
            } else {
                cell
            };
            print!("{cell}  ");
        }
        println!();
    }
}
