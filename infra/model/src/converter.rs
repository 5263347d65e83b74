//! Value converters and the lookup registry used when a stored value does not match the
//! declared kind of a property.

use crate::error::ModelError;
use crate::value::{Kind, OptionMap, Value};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

/// Upper bound on chained conversions for a single value.
pub const MAX_CONVERSION_STEPS: usize = 8;

type ConvertFn = dyn Fn(Value) -> Option<Value> + Send + Sync;

/// A registered conversion from one kind towards another.
///
/// The function returns `None` when it cannot convert the particular value.
#[derive(Clone)]
pub struct Converter {
    source: Kind,
    target: Kind,
    convert: Arc<ConvertFn>,
}

impl Converter {
    pub fn new(
        source: Kind,
        target: Kind,
        convert: impl Fn(Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        Self { source, target, convert: Arc::new(convert) }
    }

    #[must_use]
    pub const fn source(&self) -> Kind {
        self.source
    }

    #[must_use]
    pub const fn target(&self) -> Kind {
        self.target
    }

    #[must_use]
    pub fn apply(&self, value: Value) -> Option<Value> {
        (self.convert)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("source", &self.source).field("target", &self.target).finish_non_exhaustive()
    }
}

/// Converter lookup with a resolution cache.
///
/// An exact `(source, target)` registration always wins. Otherwise the registry falls back
/// to any converter whose source kind accepts the requested one, preferring a matching
/// target, then the most specific source, then the earliest registration. Fallback hits are
/// cached under the exact pair.
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    registered: Vec<Converter>,
    resolved: RwLock<FxHashMap<(Kind, Kind), Converter>>,
}

impl ConverterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard conversions:
    ///
    /// * `list -> strings` for lists of scalars
    /// * `strings -> list`
    /// * `section -> options`, joining nested keys with `.`
    /// * `int -> float`, and `float -> int` for integral floats
    /// * `text -> path`
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with(Kind::List, Kind::Strings, list_to_strings)
            .with(Kind::Strings, Kind::List, |value| match value {
                Value::Strings(items) => Some(Value::List(items.iter().cloned().map(Value::Text).collect())),
                _ => None,
            })
            .with(Kind::Section, Kind::Options, |value| match value {
                Value::Section(section) => Some(Value::Options(flatten_section(section))),
                _ => None,
            })
            .with(Kind::Int, Kind::Float, int_to_float)
            .with(Kind::Float, Kind::Int, float_to_int)
            .with(Kind::Text, Kind::Path, |value| match value {
                Value::Text(text) => Some(Value::Path(PathBuf::from(text))),
                _ => None,
            })
    }

    #[must_use = "builder methods return the updated registry"]
    pub fn with(
        mut self,
        source: Kind,
        target: Kind,
        convert: impl Fn(Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.register(source, target, convert);
        self
    }

    /// Registers a converter, replacing any previous one for the same pair.
    pub fn register(
        &mut self,
        source: Kind,
        target: Kind,
        convert: impl Fn(Value) -> Option<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        let converter = Converter::new(source, target, convert);
        self.registered.retain(|existing| (existing.source, existing.target) != (source, target));
        self.registered.push(converter);

        let resolved = self.resolved.get_mut();
        resolved.clear();
        for registered in &self.registered {
            resolved.insert((registered.source, registered.target), registered.clone());
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// `true` once `(source, target)` resolves without scanning.
    #[must_use]
    pub fn is_cached(&self, source: Kind, target: Kind) -> bool {
        self.resolved.read().contains_key(&(source, target))
    }

    #[must_use]
    pub fn find(&self, source: Kind, target: Kind) -> Option<Converter> {
        if let Some(hit) = self.resolved.read().get(&(source, target)) {
            return Some(hit.clone());
        }

        let fallback = self
            .registered
            .iter()
            .enumerate()
            .filter(|(_, converter)| converter.source.is_assignable_from(source))
            .min_by_key(|(idx, converter)| (converter.target != target, Reverse(converter.source.depth()), *idx))
            .map(|(_, converter)| converter.clone())?;

        trace!(%source, %target, via_source = %fallback.source, via_target = %fallback.target, "Converter resolved by fallback");
        self.resolved.write().insert((source, target), fallback.clone());
        Some(fallback)
    }

    /// Converts `value` towards `target`, returning the original value when no chain of at
    /// most [`MAX_CONVERSION_STEPS`] converters reaches an assignable kind.
    #[must_use]
    pub fn convert_recursively(&self, value: Value, target: Kind) -> Value {
        self.convert_chain(value, target).unwrap_or_else(|original| original)
    }

    /// Like [`Self::convert_recursively`] but reports failure.
    ///
    /// # Errors
    /// Returns `ModelError::ConversionExhausted` when no converter chain reaches `target`.
    pub fn try_convert(&self, value: Value, target: Kind) -> Result<Value, ModelError> {
        self.convert_chain(value, target).map_err(|original| ModelError::ConversionExhausted {
            message: format!("{} -> {target}", original.kind()).into(),
            context: None,
        })
    }

    fn convert_chain(&self, value: Value, target: Kind) -> Result<Value, Value> {
        if target.is_assignable_from(value.kind()) {
            return Ok(value);
        }

        let original = value.clone();
        let mut current = value;
        let mut visited = FxHashSet::default();

        for _ in 0..MAX_CONVERSION_STEPS {
            let kind = current.kind();
            if target.is_assignable_from(kind) {
                return Ok(current);
            }
            if !visited.insert(kind) {
                break;
            }
            let Some(converter) = self.find(kind, target) else {
                break;
            };
            match converter.apply(current) {
                Some(next) => current = next,
                None => return Err(original),
            }
        }

        if target.is_assignable_from(current.kind()) { Ok(current) } else { Err(original) }
    }
}

fn list_to_strings(value: Value) -> Option<Value> {
    let Value::List(items) = value else { return None };
    items
        .into_iter()
        .map(|item| match item {
            Value::Text(text) => Some(text),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Some(item.to_string()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|items| Value::Strings(items.into()))
}

#[allow(clippy::cast_precision_loss)]
fn int_to_float(value: Value) -> Option<Value> {
    match value {
        Value::Int(int) => Some(Value::Float(int as f64)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn float_to_int(value: Value) -> Option<Value> {
    match value {
        Value::Float(float)
            if float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float < i64::MAX as f64 =>
        {
            Some(Value::Int(float as i64))
        },
        _ => None,
    }
}

/// Flattens nested sections into dotted keys; empty sections vanish.
#[must_use]
pub fn flatten_section(section: BTreeMap<String, Value>) -> OptionMap {
    OptionMap::from(section)
}
