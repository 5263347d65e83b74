//! # Rules
//!
//! Persistence engine for entity limiter rules.
//!
//! - [`BuilderSerializer`] rebuilds a model from a [`SerializerContext`] through its resolved
//!   construction contract, converting stored values to the declared kinds.
//! - [`FileSerializer`] keeps one document per rule under a directory, seeds a fresh directory
//!   and rewrites documents with the values actually applied.
//! - [`ListeningRuleCollection`] collects every deserialized rule; [`RuleDescriptions`] caches
//!   the filter view of each rule.
//! - [`RuleEngine`] wires all of the above for [`Rule`](elim_domain::rule::Rule).

mod collection;
mod context;
mod description;
mod engine;
mod error;
mod file;
mod format;
mod listener;
mod serializer;
mod visitor;

pub use collection::{ListeningRuleCollection, RuleCollection};
pub use context::{FILE_KEY, SerializerContext, file_registry};
pub use description::{Filter, RuleDescription, RuleDescriptions};
pub use engine::{DEFAULT_SEED, NoRoot, RuleEngine, RuleEngineBuilder, RuleEngineInner, WithRoot};
pub use error::{RuleError, RuleErrorExt};
pub use file::{FileSerializer, RuleFileRecord};
pub use format::{Document, DocumentFormat, YamlFormat};
pub use listener::{DeserializeListener, Listeners};
pub use serializer::{BuilderSerializer, RuleSerializer};
pub use visitor::{Visitor, Visitors};
