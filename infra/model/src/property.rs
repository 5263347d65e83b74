use crate::value::{Kind, OptionMap, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A Rust type that can travel through a [`Value`].
///
/// `from_value` hands the value back on mismatch so callers can report or convert it.
pub trait Property: Sized {
    /// Kind declared by models that store this type.
    const KIND: Kind;

    fn to_value(&self) -> Value;

    /// # Errors
    /// Returns the original value when it does not hold this type.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl Property for bool {
    const KIND: Kind = Kind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for i64 {
    const KIND: Kind = Kind::Int;

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for u32 {
    const KIND: Kind = Kind::Int;

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(inner) => Self::try_from(inner).map_err(|_| Value::Int(inner)),
            other => Err(other),
        }
    }
}

impl Property for f64 {
    const KIND: Kind = Kind::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for String {
    const KIND: Kind = Kind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for PathBuf {
    const KIND: Kind = Kind::Path;

    fn to_value(&self) -> Value {
        Value::Path(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Path(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for Vec<Value> {
    const KIND: Kind = Kind::List;

    fn to_value(&self) -> Value {
        Value::List(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::List(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for Arc<[String]> {
    const KIND: Kind = Kind::Strings;

    fn to_value(&self) -> Value {
        Value::Strings(Self::clone(self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Strings(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for BTreeMap<String, Value> {
    const KIND: Kind = Kind::Section;

    fn to_value(&self) -> Value {
        Value::Section(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Section(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Property for OptionMap {
    const KIND: Kind = Kind::Options;

    fn to_value(&self) -> Value {
        Value::Options(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Options(inner) => Ok(inner),
            other => Err(other),
        }
    }
}
