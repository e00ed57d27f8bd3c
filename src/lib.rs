//! Traceability relations over plain-text requirements
//!
//! Requirements are declared in reStructuredText directives or YAML
//! snapshots. Each one carries typed links to the requirements it depends
//! on; this crate answers, for any requirement, what it links to and what
//! links to it, and shapes the answer into a navigable tree.

pub mod domain;
pub use domain::{
    Config, Direction, LinkIndex, Links, RelationType, Relationships, Requirement, RequirementId,
    RequirementStore,
};

pub mod view;
pub use view::{RelationsTree, RelationshipsView, ViewNode, materialize};

/// Filesystem loading of requirements documents.
pub mod storage;
pub use storage::{Directory, DirectoryLoadError};
