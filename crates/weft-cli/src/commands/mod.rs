//! Command implementations.

pub mod detect;
pub mod find;
pub mod list;
pub mod metrics;
pub mod path;
pub mod visualize;

pub use self::detect::execute_detect;
pub use self::find::execute_find;
pub use self::list::execute_list;
pub use self::metrics::execute_metrics;
pub use self::path::execute_path;
pub use self::visualize::execute_visualize;

use std::path::Path;

/// Resolve a user-supplied path to the store's canonical form.
///
/// Stored relationships use canonical absolute paths; a file that no
/// longer exists on disk can still be queried by whatever form the user
/// supplies.
pub(crate) fn resolve_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}
