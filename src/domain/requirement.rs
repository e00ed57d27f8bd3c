use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::domain::{RelationType, RequirementId};

/// A requirement is an atomic, traceable document node.
///
/// Besides its descriptive metadata, a requirement carries a typed set of
/// outgoing references to other requirements. Those references may point at
/// identifiers that do not exist in the current store; a dangling reference
/// is a valid state, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    id: RequirementId,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Links::is_empty")]
    links: Links,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl Requirement {
    /// Construct a new [`Requirement`] with no classification and no links.
    #[must_use]
    pub fn new(id: RequirementId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            level: None,
            status: None,
            kind: None,
            links: Links::default(),
            location: None,
        }
    }

    /// Set the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the level (e.g. `stakeholder`, `system`).
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Set the status (e.g. `draft`, `approved`).
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the object type (e.g. `requirement`, `graphic`).
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Append a single outgoing link.
    #[must_use]
    pub fn with_link(mut self, relation: impl Into<RelationType>, target: RequirementId) -> Self {
        self.links.push(relation.into(), target);
        self
    }

    /// Replace the outgoing links.
    #[must_use]
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    /// Record where the requirement was defined.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The unique identifier of this requirement.
    #[must_use]
    pub const fn id(&self) -> &RequirementId {
        &self.id
    }

    /// The short human label.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The free-text description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The level tag, if any.
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    /// The status tag, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The object type tag, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The outgoing links declared by this requirement.
    #[must_use]
    pub const fn links(&self) -> &Links {
        &self.links
    }

    /// Where the requirement was defined, if known.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// Outgoing references grouped by relation type.
///
/// Relation types iterate in name order. Within a relation type the targets
/// keep the order they were declared in. Empty target lists may be stored but
/// are dropped by [`Links::non_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<RelationType, Vec<RequirementId>>);

impl Links {
    /// Append `target` to the list for `relation`.
    pub fn push(&mut self, relation: RelationType, target: RequirementId) {
        self.0.entry(relation).or_default().push(target);
    }

    /// Replace the target list for `relation`, returning the previous one.
    pub fn insert(
        &mut self,
        relation: RelationType,
        targets: Vec<RequirementId>,
    ) -> Option<Vec<RequirementId>> {
        self.0.insert(relation, targets)
    }

    /// The targets recorded for `relation`.
    #[must_use]
    pub fn get(&self, relation: &str) -> Option<&[RequirementId]> {
        self.0.get(relation).map(Vec::as_slice)
    }

    /// Whether `target` appears under `relation`.
    #[must_use]
    pub fn contains(&self, relation: &str, target: &str) -> bool {
        self.get(relation)
            .is_some_and(|targets| targets.iter().any(|t| t.as_str() == target))
    }

    /// Iterate over `(relation, targets)` pairs in relation-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&RelationType, &[RequirementId])> {
        self.0
            .iter()
            .map(|(relation, targets)| (relation, targets.as_slice()))
    }

    /// A copy with every empty target list removed.
    #[must_use]
    pub fn non_empty(&self) -> Self {
        self.0
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(relation, targets)| (relation.clone(), targets.clone()))
            .collect()
    }

    /// Total number of targets across all relation types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Whether there are no targets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The number of relation types recorded, including empty ones.
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(RelationType, Vec<RequirementId>)> for Links {
    fn from_iter<T: IntoIterator<Item = (RelationType, Vec<RequirementId>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The source position a requirement was read from.
///
/// The index never interprets this; it is forwarded to navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

impl Location {
    /// A position within a file (1-based line).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
        }
    }

    /// A whole file, without a line.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line: None,
        }
    }

    /// The source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The 1-based line, if known.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RequirementId {
        RequirementId::new(s).unwrap()
    }

    #[test]
    fn links_keep_declaration_order_within_a_relation() {
        let req = Requirement::new(id("A"), "A")
            .with_link("satisfies", id("C"))
            .with_link("satisfies", id("B"));

        let targets: Vec<_> = req
            .links()
            .get("satisfies")
            .unwrap()
            .iter()
            .map(RequirementId::as_str)
            .collect();
        assert_eq!(targets, ["C", "B"]);
    }

    #[test]
    fn non_empty_drops_empty_relations() {
        let mut links = Links::default();
        links.insert(RelationType::new("tests"), Vec::new());
        links.push(RelationType::new("implements"), id("B"));

        assert_eq!(links.relation_count(), 2);
        let filtered = links.non_empty();
        assert_eq!(filtered.relation_count(), 1);
        assert!(filtered.get("tests").is_none());
        assert_eq!(filtered.total(), 1);
    }

    #[test]
    fn empty_lists_count_as_empty() {
        let mut links = Links::default();
        links.insert(RelationType::new("tests"), Vec::new());
        assert!(links.is_empty());
    }

    #[test]
    fn same_target_under_different_relations() {
        let req = Requirement::new(id("A"), "A")
            .with_link("satisfies", id("B"))
            .with_link("implements", id("B"));

        assert!(req.links().contains("satisfies", "B"));
        assert!(req.links().contains("implements", "B"));
        assert_eq!(req.links().total(), 2);
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new("docs/a.rst", 12).to_string(), "docs/a.rst:12");
        assert_eq!(Location::file("reqs.yaml").to_string(), "reqs.yaml");
    }
}
