//! Dynamic values exchanged between documents, registries, and builders.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime type tag of a [`Value`].
///
/// Kinds form a small lattice: `Int` and `Float` specialise `Number`, and every kind
/// specialises `Any`. Assignability follows that lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Any,
    Bool,
    Number,
    Int,
    Float,
    Text,
    List,
    Strings,
    Section,
    Options,
    Path,
}

impl Kind {
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Any => None,
            Self::Int | Self::Float => Some(Self::Number),
            _ => Some(Self::Any),
        }
    }

    /// `true` when a value of kind `other` may be stored where `self` is declared.
    #[must_use]
    pub fn is_assignable_from(self, other: Self) -> bool {
        let mut current = Some(other);
        while let Some(kind) = current {
            if kind == self {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Distance from `Any`; larger means more specific.
    #[must_use]
    pub fn depth(self) -> usize {
        std::iter::successors(self.parent(), |kind| kind.parent()).count()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
            Self::Strings => "strings",
            Self::Section => "section",
            Self::Options => "options",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed value.
///
/// Floats compare and hash by bit pattern so values can live in hashed collections.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Heterogeneous sequence as produced by document parsers.
    List(Vec<Self>),
    /// Homogeneous sequence of strings.
    Strings(Arc<[String]>),
    /// Nested mapping as produced by document parsers.
    Section(BTreeMap<String, Self>),
    /// Flattened option mapping.
    Options(OptionMap),
    Path(PathBuf),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Text(_) => Kind::Text,
            Self::List(_) => Kind::List,
            Self::Strings(_) => Kind::Strings,
            Self::Section(_) => Kind::Section,
            Self::Options(_) => Kind::Options,
            Self::Path(_) => Kind::Path,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Path(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Strings(a), Self::Strings(b)) => a == b,
            (Self::Section(a), Self::Section(b)) => a == b,
            (Self::Options(a), Self::Options(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Self::Bool(value) => value.hash(state),
            Self::Int(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::Text(value) => value.hash(state),
            Self::List(value) => value.hash(state),
            Self::Strings(value) => value.hash(state),
            Self::Section(value) => value.hash(state),
            Self::Options(value) => value.hash(state),
            Self::Path(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Path(value) => write!(f, "{}", value.display()),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&std::path::Path> for Value {
    fn from(value: &std::path::Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<Arc<[String]>> for Value {
    fn from(value: Arc<[String]>) -> Self {
        Self::Strings(value)
    }
}

impl From<OptionMap> for Value {
    fn from(value: OptionMap) -> Self {
        Self::Options(value)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(value: BTreeMap<String, Self>) -> Self {
        Self::Section(value)
    }
}

/// Immutable, cheaply cloneable mapping of option names to values.
///
/// Entries are kept in document form: nested sections and option maps are joined into
/// dotted keys, `Strings` become lists of text and paths become text. A key is stored as
/// given, so empty segments (`.x`, `x.`, `a..b`) survive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OptionMap(Arc<BTreeMap<String, Value>>);

impl OptionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = (*self.0).clone();
        absorb(&mut map, key.into(), value.into());
        Self(Arc::new(map))
    }
}

/// Stores `value` under `key`, splitting nested mappings into `key.child` entries.
fn absorb(map: &mut BTreeMap<String, Value>, key: String, value: Value) {
    match value {
        Value::Section(section) => {
            for (child, nested) in section {
                absorb(map, format!("{key}.{child}"), nested);
            }
        },
        Value::Options(options) => {
            for (child, nested) in options.iter() {
                absorb(map, format!("{key}.{child}"), nested.clone());
            }
        },
        leaf => {
            map.insert(key, to_document_form(leaf));
        },
    }
}

/// Rewrites a value nested below an option entry into the shape a document reads back.
fn to_document_form(value: Value) -> Value {
    match value {
        Value::Strings(items) => Value::List(items.iter().cloned().map(Value::Text).collect()),
        Value::Path(path) => Value::Text(path.to_string_lossy().into_owned()),
        Value::List(items) => Value::List(items.into_iter().map(to_document_form).collect()),
        Value::Section(section) => {
            Value::Section(section.into_iter().map(|(key, nested)| (key, to_document_form(nested))).collect())
        },
        Value::Options(options) => Value::Section(
            options.iter().map(|(key, nested)| (key.to_owned(), to_document_form(nested.clone()))).collect(),
        ),
        scalar => scalar,
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (key, value) in iter {
            absorb(&mut map, key.into(), value.into());
        }
        Self(Arc::new(map))
    }
}

impl From<BTreeMap<String, Value>> for OptionMap {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_assignable_to_number_and_any() {
        assert!(Kind::Number.is_assignable_from(Kind::Int));
        assert!(Kind::Number.is_assignable_from(Kind::Float));
        assert!(Kind::Any.is_assignable_from(Kind::Text));
        assert!(!Kind::Int.is_assignable_from(Kind::Number));
        assert!(!Kind::Text.is_assignable_from(Kind::Int));
    }

    #[test]
    fn depth_orders_specificity() {
        assert_eq!(Kind::Any.depth(), 0);
        assert_eq!(Kind::Number.depth(), 1);
        assert_eq!(Kind::Float.depth(), 2);
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn option_map_with_leaves_original_untouched() {
        let base = OptionMap::from_iter([("tamed", true)]);
        let extended = base.with("named", false);
        assert_eq!(base.len(), 1);
        assert_eq!(extended.get("named"), Some(&Value::Bool(false)));
    }

    #[test]
    fn option_map_stores_values_in_document_form() {
        let mut limits = BTreeMap::new();
        limits.insert("max".to_owned(), Value::Int(3));
        limits.insert("empty".to_owned(), Value::Section(BTreeMap::new()));
        let options = OptionMap::from_iter([
            ("names", Value::Strings(Arc::from(vec!["a".to_owned(), "b".to_owned()]))),
            ("home", Value::Path(PathBuf::from("rules/horse"))),
            ("limits", Value::Section(limits)),
        ]);

        assert_eq!(options.len(), 3);
        assert_eq!(
            options.get("names"),
            Some(&Value::List(vec![Value::Text("a".into()), Value::Text("b".into())]))
        );
        assert_eq!(options.get("home"), Some(&Value::Text("rules/horse".into())));
        assert_eq!(options.get("limits.max"), Some(&Value::Int(3)));
    }

    #[test]
    fn option_map_keeps_empty_key_segments() {
        let options = OptionMap::new().with(".x", 1_i64).with("a..b", 2_i64).with("y.", 3_i64);
        assert_eq!(options.len(), 3);
        assert_eq!(options.get(".x"), Some(&Value::Int(1)));
        assert_eq!(options.get("x"), None);

        let nested = OptionMap::from_iter([("x", true)]);
        assert_eq!(OptionMap::new().with("", nested).get(".x"), Some(&Value::Bool(true)));
    }
}
