use elim_model::{Kind, RegistryBuilder, TypedRegistry, Value};
use std::path::Path;

/// Reserved registry key holding the document a context belongs to.
pub const FILE_KEY: &str = "file";

/// Input and provenance of one (de)serialization: a typed registry of property values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializerContext {
    registry: TypedRegistry,
}

impl SerializerContext {
    #[must_use]
    pub const fn new(registry: TypedRegistry) -> Self {
        Self { registry }
    }

    /// Context carrying only the reserved file key.
    #[must_use]
    pub fn for_file(file: &Path) -> Self {
        Self::new(file_registry(file).build())
    }

    #[must_use]
    pub fn get(&self, name: &str, kind: Kind) -> Option<&Value> {
        self.registry.get(name, kind)
    }

    pub fn get_all<'a>(&'a self, name: &'a str, kind: Kind) -> impl Iterator<Item = &'a Value> + 'a {
        self.registry.get_all(name, kind)
    }

    pub fn merge_into(&self, builder: &mut RegistryBuilder) {
        self.registry.merge_into(builder);
    }

    /// The document this context was read from or will be written to.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.get(FILE_KEY, Kind::Path).and_then(Value::as_path)
    }

    #[must_use]
    pub const fn registry(&self) -> &TypedRegistry {
        &self.registry
    }
}

impl From<TypedRegistry> for SerializerContext {
    fn from(registry: TypedRegistry) -> Self {
        Self::new(registry)
    }
}

/// Registry builder pre-tagged with the reserved file key.
#[must_use]
pub fn file_registry(file: &Path) -> RegistryBuilder {
    TypedRegistry::builder().add(FILE_KEY, Kind::Path, file)
}
