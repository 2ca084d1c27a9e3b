//! Core traits for Lexgraph configuration.
//!
//! The resource port lives in [`crate::resource`]; this module holds the
//! configuration abstraction that front-ends implement.

use std::path::PathBuf;

use crate::Result;

/// Trait for application configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use lexgraph_core::traits::ConfigProvider;
/// use lexgraph_core::Result;
///
/// #[derive(Clone)]
/// struct WordNetConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for WordNetConfig {
///     fn project_name(&self) -> &str {
///         "wordnet-metrics"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
///
///     fn cache_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.join("cache"))
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined (e.g., missing
    /// environment variable or invalid configuration).
    fn base_path(&self) -> Result<PathBuf>;

    /// Directory holding serialized graphs, hyponym maps, and root-path maps.
    fn cache_path(&self) -> Result<PathBuf>;
}
