mod directory;
/// reStructuredText item directives.
pub mod rst;
/// YAML requirement snapshots.
pub mod yaml;

pub use directory::{Directory, DirectoryLoadError};
pub use yaml::ParseError;
