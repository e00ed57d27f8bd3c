use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, DuplicatePolicy};

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "reqtrace.toml";

/// A relation type known to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    /// The field name used in source documents, and the relation type key.
    pub option: String,
    /// Display name when viewed from the declaring requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<String>,
    /// Display name when viewed from the target requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming: Option<String>,
}

impl LinkType {
    fn new(option: &str, outgoing: &str, incoming: &str) -> Self {
        Self {
            option: option.to_string(),
            outgoing: Some(outgoing.to_string()),
            incoming: Some(incoming.to_string()),
        }
    }

    /// The configured display name for `direction`.
    #[must_use]
    pub fn display_name(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Outgoing => self.outgoing.as_deref(),
            Direction::Incoming => self.incoming.as_deref(),
        }
    }
}

/// A level tag with a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// The tag as written in source documents.
    pub level: String,
    /// Display title.
    pub title: String,
}

/// A status tag with a display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The tag as written in source documents.
    pub status: String,
    /// Colour as `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An object type with a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    /// The tag as written in source documents.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display title.
    pub title: String,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file")]
    Read(#[from] std::io::Error),
    /// The file is not valid configuration.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}

/// Project configuration.
///
/// Owns the vocabulary the core treats as open-ended: which relation types
/// exist and how they are displayed, and the titles of levels, statuses and
/// object types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    link_types: Vec<LinkType>,
    levels: Vec<Level>,
    statuses: Vec<Status>,
    object_types: Vec<ObjectType>,
    default_status: String,

    /// What to do when two records share an identifier.
    pub duplicate_ids: DuplicatePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            link_types: default_link_types(),
            levels: Vec::new(),
            statuses: Vec::new(),
            object_types: Vec::new(),
            default_status: default_status(),
            duplicate_ids: DuplicatePolicy::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads `reqtrace.toml` from `root`, falling back to defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The configured relation types.
    #[must_use]
    pub fn link_types(&self) -> &[LinkType] {
        &self.link_types
    }

    /// Looks up a relation type by its option name.
    #[must_use]
    pub fn link_type(&self, option: &str) -> Option<&LinkType> {
        self.link_types.iter().find(|lt| lt.option == option)
    }

    /// Replaces the configured relation types.
    pub fn set_link_types(&mut self, link_types: Vec<LinkType>) {
        self.link_types = link_types;
    }

    /// The status given to items that do not declare one.
    #[must_use]
    pub fn default_status(&self) -> &str {
        &self.default_status
    }

    /// The display title of a level, or the level itself title-cased.
    #[must_use]
    pub fn level_title(&self, level: &str) -> String {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .map_or_else(|| title_case(level), |l| l.title.clone())
    }

    /// The display title of an object type, or the type itself title-cased.
    #[must_use]
    pub fn type_title(&self, kind: &str) -> String {
        self.object_types
            .iter()
            .find(|t| t.kind == kind)
            .map_or_else(|| title_case(kind), |t| t.title.clone())
    }

    /// The configured colour of a status.
    #[must_use]
    pub fn status_color(&self, status: &str) -> Option<&str> {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .and_then(|s| s.color.as_deref())
    }
}

fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_status() -> String {
    "draft".to_string()
}

fn default_link_types() -> Vec<LinkType> {
    vec![
        LinkType::new("satisfies", "satisfies", "satisfied_by"),
        LinkType::new("implements", "implements", "implemented_by"),
        LinkType::new("derives_from", "derives_from", "derives_to"),
        LinkType::new("tests", "tests", "tested_by"),
        LinkType::new("links", "links", "links"),
        LinkType::new("depends_on", "depends_on", "impacts"),
    ]
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_status")]
        default_status: String,

        #[serde(default)]
        duplicate_ids: DuplicatePolicy,

        #[serde(default = "default_link_types")]
        link_types: Vec<LinkType>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        levels: Vec<Level>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        statuses: Vec<Status>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        object_types: Vec<ObjectType>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                link_types,
                levels,
                statuses,
                object_types,
                default_status,
                duplicate_ids,
            } => Self {
                link_types,
                levels,
                statuses,
                object_types,
                default_status,
                duplicate_ids,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            link_types: config.link_types,
            levels: config.levels,
            statuses: config.statuses,
            object_types: config.object_types,
            default_status: config.default_status,
            duplicate_ids: config.duplicate_ids,
        }
    }
}
