use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing::info;

#[derive(Debug, Clone)]
struct StorageConfig {
    create: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    #[must_use = "Sets whether a missing root directory should be created"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StorageBuilder<N> {
        StorageBuilder { state, config: self.config }
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use = "Creates a new storage builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory of the storage"]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StorageBuilder<WithRoot> {
    /// Opens the storage root.
    ///
    /// 1. A missing root is created when `create(true)` is set (the default) and the handle
    ///    remembers it through [`Storage::created`].
    /// 2. The root is canonicalized so later sandbox checks compare physical paths.
    /// 3. Stale temporary files from interrupted writes are purged.
    ///
    /// # Errors
    ///
    /// * [`StorageError::NotADirectory`] if the root exists but is not a directory.
    /// * [`StorageError::DirectoryNotFound`] if the root is missing and `create` is false.
    /// * [`StorageError::Io`] if the root cannot be created or resolved.
    pub fn open(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        let created = match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => false,
            Ok(_) => {
                return Err(StorageError::NotADirectory {
                    message: root.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) if err.kind() == ErrorKind::NotFound && self.config.create => {
                fs::create_dir_all(root)
                    .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
                info!(path = %root.display(), "Bootstrapped storage root directory");
                true
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::DirectoryNotFound {
                    message: root.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to inspect storage root: {}", root.display()).into()),
                });
            },
        };

        let canonical = fs::canonicalize(root)
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                created,
                tmp_counter: AtomicU64::new(1),
                reads: AtomicU64::new(0),
            }),
        };

        storage.purge_tmp();

        Ok(storage)
    }
}
