//! YAML requirement snapshots.
//!
//! A snapshot file holds a list of records:
//!
//! ```yaml
//! - id: REQ-001
//!   title: Brake on obstacle
//!   level: system
//!   links:
//!     satisfies: [STK-001]
//! ```
//!
//! Other YAML files (CI settings, tool configuration) share the extension;
//! [`parse`] reports them as [`ParseError::NotRecords`] so the caller can
//! tell them apart from a broken snapshot.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use serde_yaml::Value;

use crate::domain::{Location, RelationType, Requirement, RequirementId};

/// Errors that can occur when parsing a requirements document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document is not valid YAML, or a record is malformed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// The document is valid YAML but not a list of records with ids.
    #[error("document is not a list of requirement records")]
    NotRecords,

    /// A record has a blank identifier.
    #[error("record {index} has an empty id")]
    EmptyId {
        /// Zero-based position of the record in the document.
        index: usize,
    },
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    title: String,
    description: Option<String>,
    level: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    links: BTreeMap<String, Vec<String>>,
}

/// Parses a YAML snapshot.
///
/// Every record is located at `path`; blank link targets are dropped.
///
/// # Errors
///
/// Returns [`ParseError::NotRecords`] if the document is not a list of
/// mappings that each carry an `id` key. Returns another error if the
/// document is not valid YAML, a record is malformed, or a record has a
/// blank identifier.
pub fn parse(source: &str, path: &Path) -> Result<Vec<Requirement>, ParseError> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(source)?;
    if !is_record_list(&document) {
        return Err(ParseError::NotRecords);
    }
    let records: Vec<Record> = serde_yaml::from_value(document)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = RequirementId::new(record.id).map_err(|_| ParseError::EmptyId { index })?;
            let mut requirement =
                Requirement::new(id, record.title).with_location(Location::file(path));

            if let Some(description) = record.description {
                requirement = requirement.with_description(description);
            }
            if let Some(level) = record.level {
                requirement = requirement.with_level(level);
            }
            if let Some(status) = record.status {
                requirement = requirement.with_status(status);
            }
            if let Some(kind) = record.kind {
                requirement = requirement.with_kind(kind);
            }

            for (relation, targets) in record.links {
                let relation = RelationType::new(relation);
                for target in targets.into_iter().filter_map(|t| RequirementId::new(t).ok()) {
                    requirement = requirement.with_link(relation.clone(), target);
                }
            }

            Ok(requirement)
        })
        .collect()
}

fn is_record_list(document: &Value) -> bool {
    document.as_sequence().is_some_and(|items| {
        items
            .iter()
            .all(|item| item.as_mapping().is_some_and(|record| record.contains_key("id")))
    })
}
