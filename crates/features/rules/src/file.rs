//! File-backed persistence: one document per rule under a root directory.

use crate::context::{FILE_KEY, SerializerContext, file_registry};
use crate::error::{RuleError, RuleErrorExt};
use crate::format::{Document, DocumentFormat, YamlFormat};
use crate::listener::DeserializeListener;
use crate::serializer::{BuilderSerializer, RuleSerializer};
use crate::visitor::{Visitor, Visitors};
use elim_model::{Kind, Model, Value};
use elim_storage::{Storage, StorageError};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A model together with the document it was loaded from.
pub struct RuleFileRecord<M> {
    rule: Arc<M>,
    file: PathBuf,
    context: SerializerContext,
}

impl<M> RuleFileRecord<M> {
    #[must_use]
    pub const fn rule(&self) -> &Arc<M> {
        &self.rule
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Registry of the document as it was on disk after loading.
    #[must_use]
    pub const fn context(&self) -> &SerializerContext {
        &self.context
    }
}

impl<M> Clone for RuleFileRecord<M> {
    fn clone(&self) -> Self {
        Self { rule: Arc::clone(&self.rule), file: self.file.clone(), context: self.context.clone() }
    }
}

impl<M: fmt::Debug> fmt::Debug for RuleFileRecord<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleFileRecord").field("rule", &self.rule).field("file", &self.file).finish_non_exhaustive()
    }
}

/// Serializer persisting each model as a document under a storage root.
///
/// The first [`FileSerializer::init`] either scans an existing root or, when the root was
/// created by [`FileSerializer::open`], writes the seeds. Its result is kept for the lifetime of
/// the serializer.
pub struct FileSerializer<M: Model, F: DocumentFormat = YamlFormat> {
    base: BuilderSerializer<M>,
    storage: Storage,
    format: F,
    seeds: BTreeMap<String, Arc<M>>,
    write_back: bool,
    records: Mutex<Option<Arc<[RuleFileRecord<M>]>>>,
    snapshots: RwLock<FxHashMap<PathBuf, SerializerContext>>,
}

impl<M: Model, F: DocumentFormat> fmt::Debug for FileSerializer<M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSerializer")
            .field("model", &M::type_name())
            .field("root", &self.storage.root())
            .field("format", &self.format)
            .field("seeds", &self.seeds.keys().collect::<Vec<_>>())
            .field("write_back", &self.write_back)
            .finish_non_exhaustive()
    }
}

impl<M: Model> FileSerializer<M> {
    /// YAML documents under `root`.
    ///
    /// # Errors
    /// See [`FileSerializer::open`].
    pub fn yaml(root: impl Into<PathBuf>, base: BuilderSerializer<M>) -> Result<Self, RuleError> {
        Self::open(root, YamlFormat, base)
    }
}

impl<M: Model, F: DocumentFormat> FileSerializer<M, F> {
    /// Opens (and creates if missing) the root directory.
    ///
    /// # Errors
    /// Returns `RuleError::Persistence` if the root is not a directory or cannot be created.
    pub fn open(root: impl Into<PathBuf>, format: F, base: BuilderSerializer<M>) -> Result<Self, RuleError> {
        let storage = Storage::builder().root(root).create(true).open().context("Opening rules directory")?;
        Ok(Self {
            base,
            storage,
            format,
            seeds: BTreeMap::new(),
            write_back: true,
            records: Mutex::new(None),
            snapshots: RwLock::new(FxHashMap::default()),
        })
    }

    /// Adds a model written to `<name>.<extension>` when the root is fresh.
    #[must_use = "with_seed returns the updated serializer"]
    pub fn with_seed(mut self, name: impl Into<String>, seed: impl Into<Arc<M>>) -> Self {
        self.seeds.insert(name.into(), seed.into());
        self
    }

    /// Echo deserialized values back into their files (default `true`).
    #[must_use = "with_write_back returns the updated serializer"]
    pub const fn with_write_back(mut self, enabled: bool) -> Self {
        self.write_back = enabled;
        self
    }

    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub const fn base(&self) -> &BuilderSerializer<M> {
        &self.base
    }

    #[must_use]
    pub const fn format(&self) -> &F {
        &self.format
    }

    /// Loads every document once; later calls return the same records without I/O.
    ///
    /// A document that cannot be read, parsed, converted, validated or written back is skipped
    /// with a warning; its rule reaches no listener.
    ///
    /// # Errors
    /// Returns `RuleError::Persistence` if the root cannot be listed, `RuleError::Configuration`
    /// or `RuleError::Internal` from any document, and any error raised while round-tripping a
    /// seed.
    pub fn init(&self) -> Result<Arc<[RuleFileRecord<M>]>, RuleError> {
        let mut slot = self.records.lock();
        if let Some(records) = slot.as_ref() {
            debug!(records = records.len(), "Rule files already loaded");
            return Ok(Arc::clone(records));
        }

        let loaded = if self.storage.created() { self.seed()? } else { self.scan()? };
        let records: Arc<[RuleFileRecord<M>]> = loaded.into();

        info!(
            root = %self.storage.root().display(),
            records = records.len(),
            seeded = self.storage.created(),
            "Rule files loaded"
        );
        *slot = Some(Arc::clone(&records));
        Ok(records)
    }

    /// Records of the last [`FileSerializer::init`], if it ran.
    #[must_use]
    pub fn records(&self) -> Option<Arc<[RuleFileRecord<M>]>> {
        self.records.lock().clone()
    }

    /// The document referenced by the reserved `file` key of `context`.
    ///
    /// # Errors
    /// Returns `RuleError::MissingFileKey` if the context carries no file.
    pub fn file_of(&self, context: &SerializerContext) -> Result<PathBuf, RuleError> {
        context.file().map(Path::to_path_buf).ok_or_else(|| RuleError::MissingFileKey {
            message: format!("key `{FILE_KEY}` is absent").into(),
            context: None,
        })
    }

    /// Latest registry read back from `file` after a deserialization.
    #[must_use]
    pub fn snapshot(&self, file: &Path) -> Option<SerializerContext> {
        let absolute = self.absolute(file);
        self.snapshots.read().get(&absolute).cloned()
    }

    /// Reads `file` into a context: known properties under their declared kinds, other keys
    /// under their runtime kinds, and the reserved `file` key.
    ///
    /// # Errors
    /// Returns `RuleError::Format`/`InvalidDocument` for unreadable documents and
    /// `RuleError::Persistence` if the file cannot be read.
    pub fn read_context(&self, file: &Path) -> Result<SerializerContext, RuleError> {
        let absolute = self.absolute(file);
        let document = self.read_document(&absolute)?;

        let mut builder = file_registry(&absolute);
        for (name, value) in document {
            if name == FILE_KEY {
                continue;
            }
            let kind = self.base.contract().binding(&name).map_or_else(|| value.kind(), |binding| binding.kind());
            builder.push(name, kind, value);
        }
        Ok(SerializerContext::new(builder.build()))
    }

    fn absolute(&self, file: &Path) -> PathBuf {
        if file.is_absolute() { file.to_path_buf() } else { self.storage.root().join(file) }
    }

    fn read_document(&self, absolute: &Path) -> Result<Document, RuleError> {
        let relative = self.storage.relative(absolute)?;
        let text = self.storage.read_to_string(&relative).map_err(|err| match err {
            StorageError::Encoding { .. } => {
                RuleError::InvalidDocument { message: err.to_string().into(), context: None }
            },
            other => RuleError::from(other),
        })?;
        self.format.parse(&text).context(absolute.display().to_string())
    }

    /// Merges `values` into the document at `absolute`, writing only if the text changes.
    fn write_values(&self, absolute: &Path, values: Document) -> Result<(), RuleError> {
        let relative = self.storage.relative(absolute)?;
        self.storage.ensure_file(&relative)?;

        let current = self.storage.read_to_string(&relative)?;
        let mut document = self.format.parse(&current).context(absolute.display().to_string())?;
        document.extend(values);
        document.remove(FILE_KEY);

        let rendered = self.format.render(&document)?;
        if rendered == current {
            debug!(file = %absolute.display(), "Rule document unchanged");
            return Ok(());
        }
        self.storage.write(&relative, rendered.as_bytes())?;
        debug!(file = %absolute.display(), keys = document.len(), "Rule document written");
        Ok(())
    }

    fn load(&self, absolute: &Path) -> Result<RuleFileRecord<M>, RuleError> {
        let context = self.read_context(absolute)?;
        let rule = self.deserialize(&context, None)?;
        let context = self.snapshot(absolute).unwrap_or(context);
        Ok(RuleFileRecord { rule, file: absolute.to_path_buf(), context })
    }

    fn scan(&self) -> Result<Vec<RuleFileRecord<M>>, RuleError> {
        let files = self.storage.files(Some(self.format.extension()))?;
        let mut records = Vec::with_capacity(files.len());

        for file in files {
            match self.load(&file) {
                Ok(record) => {
                    debug!(file = %file.display(), "Rule file loaded");
                    records.push(record);
                },
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "Skipping rule file");
                },
            }
        }
        Ok(records)
    }

    fn seed(&self) -> Result<Vec<RuleFileRecord<M>>, RuleError> {
        let mut records = Vec::with_capacity(self.seeds.len());
        for (name, seed) in &self.seeds {
            let file = self.storage.root().join(format!("{name}.{}", self.format.extension()));
            self.serialize(seed, &SerializerContext::for_file(&file))?;
            records.push(self.load(&file)?);
            debug!(seed = %name, file = %file.display(), "Rule file seeded");
        }
        Ok(records)
    }
}

impl<M: Model, F: DocumentFormat> RuleSerializer<M> for FileSerializer<M, F> {
    fn add_listener(&self, listener: Arc<dyn DeserializeListener<M>>) {
        self.base.add_listener(listener);
    }

    fn serialize(&self, model: &M, context: &SerializerContext) -> Result<(), RuleError> {
        let absolute = self.absolute(&self.file_of(context)?);
        let values = self
            .base
            .contract()
            .bindings()
            .iter()
            .map(|binding| (binding.name().to_owned(), binding.read(model)))
            .collect();
        self.write_values(&absolute, values)
    }

    fn deserialize(
        &self,
        context: &SerializerContext,
        visitor: Option<&mut dyn Visitor<M>>,
    ) -> Result<Arc<M>, RuleError> {
        let Some(file) = context.file() else {
            return self.base.deserialize(context, visitor);
        };
        // Listeners only see models whose document step completed.
        let absolute = self.absolute(file);

        let mut echoed = Document::new();
        let model = if self.write_back {
            let mut echo = |_: &M, name: &str, _: Kind, value: &Value| {
                echoed.insert(name.to_owned(), value.clone());
            };
            match visitor {
                Some(user) => {
                    let mut chain = Visitors::new().chain(&mut echo).chain(user);
                    self.base.assemble(context, Some(&mut chain))?
                },
                None => self.base.assemble(context, Some(&mut echo))?,
            }
        } else {
            self.base.assemble(context, visitor)?
        };

        if self.write_back {
            self.write_values(&absolute, echoed)?;
        }

        let fresh = self.read_context(&absolute)?;
        self.snapshots.write().insert(absolute, fresh);
        self.base.notify(&model, context);
        Ok(model)
    }
}
