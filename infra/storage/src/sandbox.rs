use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt { message: path.display().to_string().into(), context: Some(reason.into()) }
}

/// Collapses `.` and `..` lexically; `..` may never climb above the root.
fn collapse(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(path, "Path climbs above the storage root"));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "Absolute paths are not allowed in sandbox"));
            },
        }
    }

    Ok(out)
}

/// Joins a relative path onto `root` and verifies the result stays inside it.
///
/// Existing targets are canonicalized so symlinks cannot escape; missing targets are
/// verified through their nearest existing ancestor.
pub(crate) fn resolve(root: &Path, path: &Path) -> Result<PathBuf, StorageError> {
    let joined = root.join(collapse(path)?);

    let mut ancestor = Some(joined.as_path());
    while let Some(candidate) = ancestor {
        if candidate == root {
            return Ok(joined);
        }
        match candidate.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => return Ok(joined),
            Ok(_) => return Err(traversal(candidate, "Existing path resolves outside sandbox")),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => ancestor = candidate.parent(),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to verify {}", candidate.display()).into()),
                });
            },
        }
    }

    Err(traversal(&joined, "No ancestor inside the sandbox"))
}

/// Turns an absolute path under `root` (or an already relative one) into a root-relative path.
pub(crate) fn relative(root: &Path, path: &Path) -> Result<PathBuf, StorageError> {
    if path.is_relative() {
        return collapse(path);
    }
    if let Ok(stripped) = path.strip_prefix(root) {
        return collapse(stripped);
    }
    let parent = path.parent().and_then(|parent| parent.canonicalize().ok());
    match (parent, path.file_name()) {
        (Some(parent), Some(name)) if parent.starts_with(root) => {
            let stripped = parent.strip_prefix(root).map_err(|_| traversal(path, "Path is outside sandbox"))?;
            collapse(&stripped.join(name))
        },
        _ => Err(traversal(path, "Path is outside sandbox")),
    }
}
