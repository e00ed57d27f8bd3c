//! A filesystem backed source of requirements
//!
//! The [`Directory`] walks a project root, parses every requirements document
//! it finds and keeps the resulting [`LinkIndex`] together with the project
//! [`Config`].

use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use walkdir::{DirEntry, WalkDir};

use crate::{
    domain::{Config, ConfigError, LinkIndex, Requirement, RequirementStore, StoreError},
    storage::{ParseError, rst, yaml},
    view::RelationshipsView,
};

/// Directory names that are never searched.
const IGNORED_DIRS: &[&str] = &["_build", "target", "node_modules"];

/// The document formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rst,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str)? {
            "rst" => Some(Self::Rst),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A project root and the requirements loaded from it.
#[derive(Debug, Clone)]
pub struct Directory {
    /// The root of the directory requirements are stored in.
    root: PathBuf,
    config: Config,
    index: LinkIndex,
}

impl Directory {
    /// Loads the configuration and every requirement below `root`.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the configuration file exists but cannot be read or parsed
    /// - a requirements document cannot be read or parsed (YAML files that
    ///   are not lists of records are skipped with a warning)
    /// - two records share an identifier and the configured policy rejects
    ///   duplicates
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> Result<Self, DirectoryLoadError> {
        let root = root.as_ref().to_path_buf();
        let config = Config::load_or_default(&root)?;
        let store = load_store(&root, &config)?;
        tracing::info!("loaded {} requirements", store.len());

        Ok(Self {
            root,
            config,
            index: LinkIndex::new(store),
        })
    }

    /// Re-reads the configuration and rebuilds the index from disk.
    ///
    /// On error the previous state is kept.
    ///
    /// # Errors
    ///
    /// See [`Directory::load`].
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn reload(&mut self) -> Result<(), DirectoryLoadError> {
        let config = Config::load_or_default(&self.root)?;
        let store = load_store(&self.root, &config)?;
        self.config = config;
        self.index.rebuild(store);
        Ok(())
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The link index over the loaded requirements.
    #[must_use]
    pub const fn index(&self) -> &LinkIndex {
        &self.index
    }

    /// A relationship view over the loaded requirements, labelled with the
    /// project's display names.
    #[must_use]
    pub fn into_view(self) -> RelationshipsView<Config> {
        RelationshipsView::new(self.index, self.config)
    }
}

/// Errors that can occur when loading a [`Directory`].
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A requirements document could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A requirements document could not be parsed.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// The document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: ParseError,
    },

    /// The parsed records do not form a valid store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn load_store(root: &Path, config: &Config) -> Result<RequirementStore, DirectoryLoadError> {
    let paths = collect_document_paths(root);
    tracing::debug!("found {} requirements documents", paths.len());

    let documents = paths
        .par_iter()
        .map(|path| load_document(path, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RequirementStore::new(
        documents.into_iter().flatten(),
        config.duplicate_ids,
    )?)
}

fn load_document(path: &Path, config: &Config) -> Result<Vec<Requirement>, DirectoryLoadError> {
    let Some(format) = Format::from_path(path) else {
        return Ok(Vec::new());
    };

    let source = std::fs::read_to_string(path).map_err(|source| DirectoryLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = match format {
        Format::Rst => rst::parse(&source, path, config),
        Format::Yaml => match yaml::parse(&source, path) {
            Ok(records) => records,
            Err(ParseError::NotRecords) => {
                tracing::warn!("skipping {}: not a requirements snapshot", path.display());
                Vec::new()
            }
            Err(source) => {
                return Err(DirectoryLoadError::Parse {
                    path: path.to_path_buf(),
                    source,
                });
            }
        },
    };

    tracing::trace!("{}: {} records", path.display(), records.len());
    Ok(records)
}

/// Every document below `root`, in sorted path order.
fn collect_document_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|path| Format::from_path(path).is_some())
        .collect()
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}
