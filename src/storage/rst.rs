//! reStructuredText item directives.
//!
//! Requirements are written as directives:
//!
//! ```rst
//! .. item:: Brake on obstacle
//!    :id: REQ-001
//!    :type: requirement
//!    :level: system
//!    :satisfies: STK-001, STK-002
//!
//!    The vehicle shall brake when an obstacle is detected.
//! ```
//!
//! `.. graphic::` and `.. listing::` directives carry links the same way;
//! their title is optional and their `:caption:` becomes the description.

use std::{collections::HashMap, path::Path};

use crate::domain::{Config, Location, Requirement, RequirementId};

/// The directives that define traceable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Item,
    Graphic,
    Listing,
}

impl Directive {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "item" => Some(Self::Item),
            "graphic" => Some(Self::Graphic),
            "listing" => Some(Self::Listing),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Graphic => "graphic",
            Self::Listing => "listing",
        }
    }

    const fn default_kind(self) -> &'static str {
        match self {
            Self::Item => "requirement",
            Self::Graphic => "graphic",
            Self::Listing => "listing",
        }
    }
}

/// A directive block as it appears in the source.
#[derive(Debug)]
struct Block<'a> {
    directive: Directive,
    argument: &'a str,
    line: usize,
    fields: HashMap<&'a str, String>,
    content: Vec<&'a str>,
}

/// Parses every item directive in `source`.
///
/// Directives without an `:id:` field are skipped with a warning. Link
/// fields are the `option` names of the relation types in `config`; any
/// other unrecognised field is ignored.
#[must_use]
pub fn parse(source: &str, path: &Path, config: &Config) -> Vec<Requirement> {
    blocks(source)
        .into_iter()
        .filter_map(|block| {
            let requirement = block.to_requirement(path, config);
            if requirement.is_none() {
                tracing::warn!(
                    "skipping {} directive without :id: at {}",
                    block.directive.name(),
                    Location::new(path, block.line),
                );
            }
            requirement
        })
        .collect()
}

fn blocks(source: &str) -> Vec<Block<'_>> {
    let lines: Vec<&str> = source.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some((indent, directive, argument)) = directive(lines[i]) else {
            i += 1;
            continue;
        };

        // The body is every following line that is blank or indented deeper
        // than the directive marker.
        let start = i + 1;
        let mut end = start;
        while end < lines.len() && (is_blank(lines[end]) || indentation(lines[end]) > indent) {
            end += 1;
        }
        while end > start && is_blank(lines[end - 1]) {
            end -= 1;
        }

        let body = &lines[start..end];
        let (fields, field_count) = field_list(body);

        blocks.push(Block {
            directive,
            argument,
            line: i + 1,
            fields,
            content: body[field_count..].to_vec(),
        });
        i = end;
    }

    blocks
}

/// Recognises `.. name:: argument`, returning the marker's indentation.
fn directive(line: &str) -> Option<(usize, Directive, &str)> {
    let trimmed = line.trim_start();
    let (name, argument) = trimmed.strip_prefix("..")?.split_once("::")?;
    let directive = Directive::from_name(name.trim())?;
    Some((indentation(line), directive, argument.trim()))
}

/// Reads the field list at the head of a directive body, returning the
/// fields and the number of lines they span.
///
/// A line indented deeper than the preceding field marker continues that
/// field's value. The list ends at the first blank line or at any other
/// line that is not a field.
fn field_list<'a>(body: &[&'a str]) -> (HashMap<&'a str, String>, usize) {
    let mut fields: Vec<(&'a str, String, usize)> = Vec::new();
    let mut consumed = 0;

    for &line in body {
        if let Some((name, value)) = field(line) {
            fields.push((name, value.to_string(), indentation(line)));
        } else {
            match fields.last_mut() {
                Some((_, value, indent)) if !is_blank(line) && indentation(line) > *indent => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(line.trim());
                }
                _ => break,
            }
        }
        consumed += 1;
    }

    let fields = fields.into_iter().map(|(name, value, _)| (name, value)).collect();
    (fields, consumed)
}

/// Recognises `:name: value`.
fn field(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.trim_start().strip_prefix(':')?.split_once(':')?;
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl Block<'_> {
    fn to_requirement(&self, path: &Path, config: &Config) -> Option<Requirement> {
        let id = RequirementId::new(non_empty(self.fields.get("id"))?).ok()?;

        let title = match (self.directive, self.argument) {
            (Directive::Item, "") => "Untitled".to_string(),
            (_, "") => id.to_string(),
            (_, argument) => argument.to_string(),
        };

        let mut requirement = Requirement::new(id, title)
            .with_kind(non_empty(self.fields.get("type")).unwrap_or(self.directive.default_kind()))
            .with_location(Location::new(path, self.line));

        if let Some(level) = non_empty(self.fields.get("level")) {
            requirement = requirement.with_level(level);
        }

        match (non_empty(self.fields.get("status")), self.directive) {
            (Some(status), _) => requirement = requirement.with_status(status),
            (None, Directive::Item) => requirement = requirement.with_status(config.default_status()),
            (None, _) => {}
        }

        let description = match self.directive {
            Directive::Item => self.description(),
            Directive::Graphic | Directive::Listing => {
                non_empty(self.fields.get("caption")).map(ToString::to_string)
            }
        };
        if let Some(description) = description {
            requirement = requirement.with_description(description);
        }

        for link_type in config.link_types() {
            let Some(value) = self.fields.get(link_type.option.as_str()) else {
                continue;
            };
            for target in value.split(',').filter_map(|t| RequirementId::new(t).ok()) {
                requirement = requirement.with_link(link_type.option.as_str(), target);
            }
        }

        Some(requirement)
    }

    /// The indented content, dedented and trimmed.
    fn description(&self) -> Option<String> {
        let dedent = self
            .content
            .iter()
            .filter(|line| !is_blank(line))
            .map(|line| indentation(line))
            .min()?;

        let text = self
            .content
            .iter()
            .map(|line| line.get(dedent..).unwrap_or("").trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
