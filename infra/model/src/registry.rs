//! Typed, multi-valued name registry.

use crate::property::Property;
use crate::value::{Kind, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// One `(name, kind, value)` association.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    name: Cow<'static, str>,
    kind: Kind,
    value: Value,
}

impl Entry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// Immutable registry keyed by `(kind, name)`.
///
/// A key may hold several values; lookups return them in insertion order. Identical
/// `(name, kind, value)` triples are stored once. The declared kind is a tag chosen by the
/// writer and may differ from the runtime kind of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedRegistry {
    entries: Arc<[Entry]>,
}

impl TypedRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding a single entry.
    #[must_use]
    pub fn of(name: impl Into<Cow<'static, str>>, kind: Kind, value: impl Into<Value>) -> Self {
        Self::builder().add(name, kind, value).build()
    }

    /// First value registered under `(kind, name)`.
    #[must_use]
    pub fn get(&self, name: &str, kind: Kind) -> Option<&Value> {
        self.entries.iter().find(|entry| entry.kind == kind && entry.name == name).map(|entry| &entry.value)
    }

    pub fn get_all<'a>(&'a self, name: &'a str, kind: Kind) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.kind == kind && entry.name == name)
            .map(|entry| &entry.value)
    }

    /// Typed lookup under `T::KIND`; `None` if absent or the stored value is not a `T`.
    #[must_use]
    pub fn get_as<T: Property>(&self, name: &str) -> Option<T> {
        self.get(name, T::KIND).and_then(|value| T::from_value(value.clone()).ok())
    }

    #[must_use]
    pub fn contains(&self, name: &str, kind: Kind) -> bool {
        self.get(name, kind).is_some()
    }

    /// Copies every entry into `builder`.
    pub fn merge_into(&self, builder: &mut RegistryBuilder) {
        for entry in self.entries.iter() {
            builder.push_entry(entry.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return the updated builder"]
    pub fn add(mut self, name: impl Into<Cow<'static, str>>, kind: Kind, value: impl Into<Value>) -> Self {
        self.push(name, kind, value);
        self
    }

    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, kind: Kind, value: impl Into<Value>) -> &mut Self {
        self.push_entry(Entry { name: name.into(), kind, value: value.into() });
        self
    }

    #[must_use = "builder methods return the updated builder"]
    pub fn merge(mut self, registry: &TypedRegistry) -> Self {
        registry.merge_into(&mut self);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn build(self) -> TypedRegistry {
        TypedRegistry { entries: self.entries.into() }
    }

    fn push_entry(&mut self, entry: Entry) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_scoped_by_kind() {
        let registry = TypedRegistry::builder()
            .add("radius", Kind::Float, 4.0)
            .add("radius", Kind::Text, "four")
            .build();

        assert_eq!(registry.get("radius", Kind::Float), Some(&Value::Float(4.0)));
        assert_eq!(registry.get("radius", Kind::Text), Some(&Value::Text("four".into())));
        assert_eq!(registry.get("radius", Kind::Int), None);
    }

    #[test]
    fn looked_up_value_outlives_the_key() {
        let registry = TypedRegistry::of("maxAmount", Kind::Int, 7);
        let value = {
            let key = String::from("maxAmount");
            registry.get(&key, Kind::Int)
        };
        assert_eq!(value, Some(&Value::Int(7)));
    }

    #[test]
    fn get_returns_first_of_many() {
        let registry = TypedRegistry::builder()
            .add("world", Kind::Text, "nether")
            .add("world", Kind::Text, "overworld")
            .build();

        assert_eq!(registry.get("world", Kind::Text).and_then(Value::as_str), Some("nether"));
        assert_eq!(registry.get_all("world", Kind::Text).count(), 2);
    }

    #[test]
    fn merge_keeps_both_sides_without_duplicates() {
        let left = TypedRegistry::of("file", Kind::Path, std::path::PathBuf::from("a.yml"));
        let right = TypedRegistry::builder()
            .add("file", Kind::Path, std::path::PathBuf::from("a.yml"))
            .add("maxAmount", Kind::Int, 3)
            .build();

        let merged = TypedRegistry::builder().merge(&left).merge(&right).build();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get_as::<u32>("maxAmount"), Some(3));
    }
}
