use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

pub(crate) const TMP_MARKER: &str = ".elimtmp.";
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Removes temporary files older than the stale threshold left behind by interrupted writes.
pub(crate) fn purge_tmp(root: &Path) {
    let now = SystemTime::now();
    let mut removed = 0_usize;
    let mut failed = 0_usize;

    for entry in WalkDir::new(root).into_iter().flatten() {
        if !is_tmp(&entry) || !is_stale(&entry, now) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Failed to remove temporary file");
                failed += 1;
            },
        }
    }

    if removed > 0 || failed > 0 {
        info!(removed, failed, "Cleaned up temporary files");
    }
}

pub(crate) fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.starts_with(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}
