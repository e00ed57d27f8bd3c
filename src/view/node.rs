//! Nodes of a materialized relationship view.

use serde::Serialize;

use crate::domain::{Direction, RelationType, RequirementId};

/// The label of the sentinel shown when there is nothing to list.
pub const NO_RELATIONSHIPS: &str = "No relationships";

/// The root level of a relationship view.
///
/// Holds, in order: the header for the selected requirement (when it
/// resolves), then either the "no relationships" sentinel or the Outgoing
/// and Incoming direction groups that have entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RelationsTree {
    /// The top-level nodes.
    pub roots: Vec<ViewNode>,
}

impl RelationsTree {
    /// The header of the selected requirement, if one resolved.
    #[must_use]
    pub fn header(&self) -> Option<&Header> {
        self.roots.iter().find_map(|node| match node {
            ViewNode::Header(header) => Some(header),
            _ => None,
        })
    }

    /// The direction group for `direction`, if it has entries.
    #[must_use]
    pub fn direction(&self, direction: Direction) -> Option<&DirectionGroup> {
        self.roots.iter().find_map(|node| match node {
            ViewNode::Direction(group) if group.direction == direction => Some(group),
            _ => None,
        })
    }

    /// Whether the view shows the "no relationships" sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots
            .iter()
            .any(|node| matches!(node, ViewNode::Sentinel(_)))
    }
}

/// A node in the relationship view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ViewNode {
    /// The selected requirement.
    Header(Header),
    /// All relations in one direction.
    Direction(DirectionGroup),
    /// All relations of one type in one direction.
    RelationType(RelationTypeGroup),
    /// One related requirement.
    Leaf(Leaf),
    /// Placeholder when nothing is related.
    Sentinel(Sentinel),
}

impl ViewNode {
    /// Primary display text.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Header(header) => format!("{}: {}", header.id, header.title),
            Self::Direction(group) => group.direction.heading().to_string(),
            Self::RelationType(group) => group.label.clone(),
            Self::Leaf(leaf) => leaf.label.clone(),
            Self::Sentinel(sentinel) => sentinel.label.clone(),
        }
    }

    /// Secondary display text.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        match self {
            Self::Header(header) => {
                let parts: Vec<&str> = [header.level.as_deref(), header.status.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" | "))
            }
            Self::Direction(group) => Some(format!("({})", group.count)),
            Self::RelationType(group) => Some(format!("({})", group.count())),
            Self::Leaf(leaf) => leaf.status().map(ToString::to_string),
            Self::Sentinel(_) => None,
        }
    }

    /// The marker drawn next to the node.
    #[must_use]
    pub const fn marker(&self) -> Marker {
        match self {
            Self::Header(_) => Marker::Requirement,
            Self::Direction(group) => Marker::direction(group.direction),
            Self::RelationType(_) => Marker::Relation,
            Self::Leaf(leaf) => leaf.marker(),
            Self::Sentinel(_) => Marker::Info,
        }
    }

    /// The nodes one level down.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        match self {
            Self::Direction(group) => group
                .groups
                .iter()
                .cloned()
                .map(Self::RelationType)
                .collect(),
            Self::RelationType(group) => group.leaves.iter().cloned().map(Self::Leaf).collect(),
            Self::Header(_) | Self::Leaf(_) | Self::Sentinel(_) => Vec::new(),
        }
    }

    /// Whether the node has children.
    #[must_use]
    pub const fn is_expandable(&self) -> bool {
        matches!(self, Self::Direction(_) | Self::RelationType(_))
    }
}

/// The selected requirement at the top of the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Identifier.
    pub id: RequirementId,
    /// Title.
    pub title: String,
    /// Level tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Status tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The relations of one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionGroup {
    /// Which direction.
    pub direction: Direction,
    /// Total number of leaves below.
    pub count: usize,
    /// One group per non-empty relation type.
    pub groups: Vec<RelationTypeGroup>,
}

impl DirectionGroup {
    /// The group for `relation`, if present.
    #[must_use]
    pub fn group(&self, relation: &str) -> Option<&RelationTypeGroup> {
        self.groups.iter().find(|g| g.relation.as_str() == relation)
    }
}

/// The relations of one type in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationTypeGroup {
    /// The relation type key.
    pub relation: RelationType,
    /// Which direction.
    pub direction: Direction,
    /// The configured (or fallback) display name.
    pub label: String,
    /// The related requirements, sorted by label.
    pub leaves: Vec<Leaf>,
}

impl RelationTypeGroup {
    /// Number of leaves.
    #[must_use]
    pub fn count(&self) -> usize {
        self.leaves.len()
    }
}

/// One related requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaf {
    /// The related identifier.
    pub id: RequirementId,
    /// Which direction the relation runs.
    pub direction: Direction,
    /// `id - title`, or `id (not found)`.
    pub label: String,
    /// Whether the identifier resolved.
    pub target: LeafTarget,
}

impl Leaf {
    /// Whether activating the leaf can navigate somewhere.
    #[must_use]
    pub const fn is_navigable(&self) -> bool {
        matches!(self.target, LeafTarget::Resolved { .. })
    }

    /// The status of the resolved requirement.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match &self.target {
            LeafTarget::Resolved { status } => status.as_deref(),
            LeafTarget::Missing => None,
        }
    }

    /// Direction arrow for resolved leaves, a warning for missing ones.
    #[must_use]
    pub const fn marker(&self) -> Marker {
        match self.target {
            LeafTarget::Resolved { .. } => Marker::direction(self.direction),
            LeafTarget::Missing => Marker::Warning,
        }
    }
}

/// Resolution state of a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LeafTarget {
    /// The identifier exists in the current snapshot.
    Resolved {
        /// The related requirement's status.
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
    /// The identifier is a dangling reference.
    Missing,
}

/// The "no relationships" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentinel {
    /// Display text.
    pub label: String,
}

impl Default for Sentinel {
    fn default() -> Self {
        Self {
            label: NO_RELATIONSHIPS.to_string(),
        }
    }
}

/// Visual marker of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// The selected requirement.
    Requirement,
    /// An outgoing relation.
    Outgoing,
    /// An incoming relation.
    Incoming,
    /// A relation-type group.
    Relation,
    /// An unresolvable reference.
    Warning,
    /// Informational placeholder.
    Info,
}

impl Marker {
    const fn direction(direction: Direction) -> Self {
        match direction {
            Direction::Outgoing => Self::Outgoing,
            Direction::Incoming => Self::Incoming,
        }
    }

    /// A single-character rendering for text surfaces.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Requirement => "◆",
            Self::Outgoing => "→",
            Self::Incoming => "←",
            Self::Relation => "▸",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}
