//! Find top-level subdirectories and candidate datasets.

use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use log::trace;
use thiserror::Error;

use crate::dataset::DatasetRef;

/// Errors when listing directories
#[derive(Error, Debug)]
pub enum EnumerateError {
    /// The root of the tree is missing or is not a directory.
    #[error("Root directory {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),

    /// The glob pattern built from a path was invalid.
    #[error("Couldn't build a glob pattern for {path}: {source}")]
    Pattern {
        /// The directory being listed
        path: PathBuf,
        /// The underlying pattern error
        source: glob::PatternError,
    },

    /// An entry couldn't be read.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

/// Immediate children of `dir`, sorted by path. Names starting with `.` are
/// skipped, as with a shell `*`. A path that is not a directory has no
/// children.
///
/// # Errors
///
/// Can throw [`EnumerateError`] if an entry can't be read.
pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>, EnumerateError> {
    let pattern = Path::new(&Pattern::escape(&dir.display().to_string())).join("*");
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let entries = glob_with(&pattern.display().to_string(), options).map_err(|source| {
        EnumerateError::Pattern {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    let mut children = entries.collect::<Result<Vec<_>, _>>()?;
    children.sort();
    trace!("{} children in {}", children.len(), dir.display());
    Ok(children)
}

/// The top-level entries of the data tree.
///
/// # Errors
///
/// Can throw [`EnumerateError::MissingRoot`] if `root` isn't a directory.
pub fn list_subdirs(root: &Path) -> Result<Vec<PathBuf>, EnumerateError> {
    if !root.is_dir() {
        return Err(EnumerateError::MissingRoot(root.to_path_buf()));
    }
    list_children(root)
}

/// Every entry of `subdir` is a dataset candidate, whatever its type.
///
/// # Errors
///
/// see [`list_children`]
pub fn list_candidates(subdir: &Path) -> Result<Vec<DatasetRef>, EnumerateError> {
    Ok(list_children(subdir)?
        .into_iter()
        .map(DatasetRef::new)
        .collect())
}
