use std::{convert::Infallible, path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use reqtrace::{
    Config, Directory, RelationsTree, RelationshipsView, Requirement, RequirementId, ViewNode,
    view::{Leaf, Navigator},
};
use tracing::instrument;

use super::terminal::{self, Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display the relationships of a requirement")]
pub struct Show {
    /// The identifier of the requirement to display
    id: RequirementId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Follow a related requirement and show its relationships instead
    #[arg(long, value_name = "ID")]
    follow: Option<RequirementId>,

    /// Open the shown requirement in EDITOR
    #[arg(long)]
    edit: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::load(&root)?;
        let mut view = directory.into_view();
        view.subscribe(|| tracing::debug!("relationship view changed"));

        view.select(self.id.clone());
        let found = view.selected().is_some();
        if found {
            self.navigate(&mut view)?;
        }

        let tree = view.tree();
        match self.output {
            OutputFormat::Pretty => output_pretty(&tree, view.display_names()),
            OutputFormat::Json => println!("{}", render_json(&tree)?),
        }

        if !found {
            eprintln!("Requirement {} not found", self.id);
            process::exit(1);
        }

        Ok(())
    }

    /// Handles `--follow` and `--edit` for a selection that resolves.
    fn navigate(&self, view: &mut RelationshipsView<Config>) -> anyhow::Result<()> {
        if let Some(target) = &self.follow {
            let tree = view.tree();
            let Some(leaf) = find_leaf(&tree, target) else {
                anyhow::bail!("{target} is not related to {}", self.id);
            };

            let followed = if self.edit {
                view.activate(&leaf, &mut Editor)?
            } else {
                view.activate(&leaf, &mut PrintLocation)?
            };
            if !followed {
                anyhow::bail!("{target} is referenced by {} but does not exist", self.id);
            }
        } else if self.edit {
            if let Some(requirement) = view.selected() {
                Editor.navigate_to(requirement)?;
            }
        }
        Ok(())
    }
}

fn render_json(tree: &RelationsTree) -> anyhow::Result<String> {
    serde_json::to_string_pretty(tree).context("failed to render json output")
}

/// The first leaf for `id`, outgoing before incoming.
fn find_leaf(tree: &RelationsTree, id: &RequirementId) -> Option<Leaf> {
    tree.roots
        .iter()
        .filter_map(|node| match node {
            ViewNode::Direction(group) => Some(group),
            _ => None,
        })
        .flat_map(|group| &group.groups)
        .flat_map(|group| &group.leaves)
        .find(|leaf| &leaf.id == id)
        .cloned()
}

fn output_pretty(tree: &RelationsTree, config: &Config) {
    let narrow = terminal::is_narrow();
    for node in &tree.roots {
        print_node(node, 0, narrow, config);
    }
}

fn print_node(node: &ViewNode, depth: usize, narrow: bool, config: &Config) {
    let indent = "  ".repeat(depth);
    let marker = node.marker().glyph();
    let label = node.label();

    let label = match node {
        ViewNode::Header(_) => label.strong(),
        ViewNode::Direction(_) => label.info(),
        ViewNode::Leaf(leaf) if !leaf.is_navigable() => label.warning(),
        ViewNode::Sentinel(_) => label.dim(),
        ViewNode::RelationType(_) | ViewNode::Leaf(_) => label,
    };

    let description = match node {
        // Statuses are the first thing dropped on narrow terminals.
        ViewNode::Leaf(_) if narrow => None,
        ViewNode::Leaf(leaf) => leaf
            .status()
            .map(|status| status.hex(config.status_color(status))),
        _ => node.description().map(|d| d.dim()),
    };

    match description {
        Some(description) => println!("{indent}{marker} {label}  {description}"),
        None => println!("{indent}{marker} {label}"),
    }

    for child in node.children() {
        print_node(&child, depth + 1, narrow, config);
    }
}

/// Opens a requirement's source file in `$EDITOR`.
struct Editor;

impl Navigator for Editor {
    type Error = anyhow::Error;

    fn navigate_to(&mut self, requirement: &Requirement) -> Result<(), Self::Error> {
        let Some(location) = requirement.location() else {
            anyhow::bail!("no source location for {}", requirement.id());
        };

        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

        let mut command = process::Command::new(&editor);
        if let Some(line) = location.line() {
            command.arg(format!("+{line}"));
        }
        let status = command
            .arg(location.path())
            .status()
            .with_context(|| format!("failed to launch editor '{editor}'"))?;

        if !status.success() {
            anyhow::bail!("Editor exited with non-zero status");
        }

        Ok(())
    }
}

/// Prints where a followed requirement is defined.
struct PrintLocation;

impl Navigator for PrintLocation {
    type Error = Infallible;

    fn navigate_to(&mut self, requirement: &Requirement) -> Result<(), Self::Error> {
        if let Some(location) = requirement.location() {
            println!("{} {location}", requirement.id().as_str().dim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqtrace::{LinkIndex, RequirementStore, domain::DuplicatePolicy};

    use super::*;

    fn id(s: &str) -> RequirementId {
        RequirementId::new(s).unwrap()
    }

    fn view() -> RelationshipsView<Config> {
        let records = [
            Requirement::new(id("REQ-001"), "Brake on obstacle")
                .with_link("satisfies", id("STK-001")),
            Requirement::new(id("STK-001"), "Stop safely"),
        ];
        let store = RequirementStore::new(records, DuplicatePolicy::Reject).unwrap();
        RelationshipsView::new(LinkIndex::new(store), Config::default())
    }

    fn roots(view: &RelationshipsView<Config>) -> Vec<serde_json::Value> {
        let json = render_json(&view.tree()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&json).unwrap();
        json["roots"].as_array().unwrap().clone()
    }

    #[test]
    fn unknown_id_renders_the_placeholder() {
        let mut view = view();
        view.select(id("REQ-404"));
        assert!(view.selected().is_none());

        let roots = roots(&view);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0]["node"], "sentinel");
    }

    #[test]
    fn known_id_renders_header_and_links() {
        let mut view = view();
        view.select(id("STK-001"));

        let roots = roots(&view);
        assert_eq!(roots[0]["node"], "header");
        assert_eq!(roots[1]["node"], "direction");
        assert!(find_leaf(&view.tree(), &id("REQ-001")).is_some());
    }
}
