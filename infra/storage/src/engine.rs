//! Core storage handle providing sandboxed, atomic file I/O over a single directory tree.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::{maintenance, sandbox};
use std::fs;
use std::io::{ErrorKind, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical root directory.
    pub(crate) root: PathBuf,
    /// Whether the root directory was created while opening.
    pub(crate) created: bool,
    pub(crate) tmp_counter: AtomicU64,
    pub(crate) reads: AtomicU64,
}

/// A thread-safe handle to a sandboxed directory.
///
/// Every path handed to the handle is relative to the root and validated so it cannot
/// escape. Writes go through a unique temporary file followed by a rename, so readers
/// never observe a partially written file.
///
/// # Example
///
/// ```rust
/// use elim_storage::{Storage, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// # let root = tmp.path().join("rules");
/// let storage = Storage::builder().root(&root).create(true).open()?;
/// assert!(storage.created());
///
/// storage.write("spawn.yml", b"radius: 8.0\n")?;
/// assert_eq!(storage.read_to_string("spawn.yml")?, "radius: 8.0\n");
/// assert_eq!(storage.files(Some("yml"))?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage is not opened until you call .open()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// `true` when opening this handle created the root directory.
    #[must_use]
    pub fn created(&self) -> bool {
        self.inner.created
    }

    /// Number of file reads served by this handle.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.inner.reads.load(Ordering::Relaxed)
    }

    /// Resolves a relative path to a physical path inside the root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path is absolute or escapes the root.
    /// Returns [`StorageError::Io`] if an existing ancestor cannot be verified.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        sandbox::resolve(&self.inner.root, path.as_ref())
    }

    /// Converts an absolute path under the root into a root-relative one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path lies outside the root.
    pub fn relative(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        sandbox::relative(&self.inner.root, path.as_ref())
    }

    /// Reads a UTF-8 file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist,
    /// [`StorageError::Encoding`] if it is not valid UTF-8.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<String, StorageError> {
        let resolved = self.resolve(path)?;

        let data = match fs::read(&resolved) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", resolved.display()).into()),
                });
            },
        };
        self.inner.reads.fetch_add(1, Ordering::Relaxed);

        String::from_utf8(data).context(format!("Reading {}", resolved.display()))
    }

    /// Writes a file atomically: unique temporary file, `fsync`, then rename over the target.
    ///
    /// Parent directories are created as needed. Platforms that refuse to rename over an
    /// existing file fall back to remove-then-rename.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the root.
    /// Returns [`StorageError::Io`] on any filesystem failure.
    pub fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create parent of {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.inner.tmp_counter);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).context("Write failed")?;
            file.sync_all().context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &resolved) {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&resolved)
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&temp, &resolved).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    resolved.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display()).into(),
                    ),
                });
            }
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent);
        }

        debug!(path = %resolved.display(), "File saved atomically");
        Ok(())
    }

    /// Creates an empty file unless one already exists. Returns `true` if it was created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file or its parents cannot be created.
    pub fn ensure_file(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create parent of {}", resolved.display()))?;
        }

        match fs::OpenOptions::new().create_new(true).write(true).open(&resolved) {
            Ok(_) => {
                debug!(path = %resolved.display(), "Created empty file");
                Ok(true)
            },
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to create {}", resolved.display()).into()),
            }),
        }
    }

    /// Lists regular files under the root recursively, sorted by path, as absolute paths.
    ///
    /// Temporary files are never listed. With `extension`, only files whose extension
    /// matches exactly are returned. Unreadable entries are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] if the root vanished.
    pub fn files(&self, extension: Option<&str>) -> Result<Vec<PathBuf>, StorageError> {
        if !self.inner.root.is_dir() {
            return Err(StorageError::DirectoryNotFound {
                message: self.inner.root.display().to_string().into(),
                context: None,
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.inner.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable directory entry");
                    continue;
                },
            };
            if !entry.file_type().is_file() || maintenance::is_tmp(&entry) {
                continue;
            }
            let matches = extension
                .is_none_or(|wanted| entry.path().extension().and_then(|ext| ext.to_str()) == Some(wanted));
            if matches {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    pub fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root);
    }
}

fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    target.with_file_name(format!("{}{}.{counter}", maintenance::TMP_MARKER, std::process::id()))
}
