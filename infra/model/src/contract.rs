//! Construction contracts: how a model is assembled from named properties.
//!
//! A [`Model`] declares its builder factory, its terminator, one accessor per property and
//! one mutator per property. [`Contract::resolve`] pairs every accessor `name` with the
//! mutator `setName` of the same kind and rejects incomplete declarations.

use crate::error::ModelError;
use crate::value::{Kind, Value};
use fxhash::{FxHashMap, FxHashSet};
use std::fmt;
use tracing::debug;

pub type Factory<B> = fn() -> B;
pub type Terminator<M, B> = fn(B) -> Result<M, ModelError>;
pub type Getter<M> = fn(&M) -> Value;
pub type Setter<B> = fn(&mut B, Value) -> Result<(), Value>;

/// A value type assembled through a builder.
pub trait Model: Sized + Send + Sync + 'static {
    type Builder;

    fn describe(contract: &mut ContractDecl<Self>);

    #[must_use]
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

struct AccessorDecl<M> {
    name: &'static str,
    kind: Kind,
    get: Getter<M>,
}

struct MutatorDecl<B> {
    name: &'static str,
    kind: Kind,
    set: Setter<B>,
}

/// Raw declarations collected from [`Model::describe`].
pub struct ContractDecl<M: Model> {
    factory: Option<Factory<M::Builder>>,
    terminator: Option<Terminator<M, M::Builder>>,
    accessors: Vec<AccessorDecl<M>>,
    mutators: Vec<MutatorDecl<M::Builder>>,
}

impl<M: Model> Default for ContractDecl<M> {
    fn default() -> Self {
        Self { factory: None, terminator: None, accessors: Vec::new(), mutators: Vec::new() }
    }
}

impl<M: Model> fmt::Debug for ContractDecl<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractDecl")
            .field("model", &M::type_name())
            .field("accessors", &self.accessors.iter().map(|a| a.name).collect::<Vec<_>>())
            .field("mutators", &self.mutators.iter().map(|m| m.name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<M: Model> ContractDecl<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&mut self, factory: Factory<M::Builder>) -> &mut Self {
        self.factory = Some(factory);
        self
    }

    pub fn terminator(&mut self, terminator: Terminator<M, M::Builder>) -> &mut Self {
        self.terminator = Some(terminator);
        self
    }

    pub fn accessor(&mut self, name: &'static str, kind: Kind, get: Getter<M>) -> &mut Self {
        self.accessors.push(AccessorDecl { name, kind, get });
        self
    }

    pub fn mutator(&mut self, name: &'static str, kind: Kind, set: Setter<M::Builder>) -> &mut Self {
        self.mutators.push(MutatorDecl { name, kind, set });
        self
    }
}

/// A property paired with its builder mutator.
pub struct Binding<M: Model> {
    name: &'static str,
    kind: Kind,
    get: Getter<M>,
    set: Setter<M::Builder>,
}

impl<M: Model> Binding<M> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn read(&self, model: &M) -> Value {
        (self.get)(model)
    }

    /// # Errors
    /// Hands the value back when the mutator rejects it.
    pub fn write(&self, builder: &mut M::Builder, value: Value) -> Result<(), Value> {
        (self.set)(builder, value)
    }
}

impl<M: Model> fmt::Debug for Binding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("name", &self.name).field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Resolved construction contract of `M`.
pub struct Contract<M: Model> {
    factory: Factory<M::Builder>,
    terminator: Terminator<M, M::Builder>,
    bindings: Vec<Binding<M>>,
}

impl<M: Model> fmt::Debug for Contract<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("model", &M::type_name())
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl<M: Model> Contract<M> {
    /// Resolves the contract declared by `M::describe`.
    ///
    /// # Errors
    /// See [`Self::from_decl`].
    pub fn resolve() -> Result<Self, ModelError> {
        let mut decl = ContractDecl::new();
        M::describe(&mut decl);
        Self::from_decl(decl)
    }

    /// # Errors
    /// * `NoBuilderPathFound` when the factory or terminator is missing.
    /// * `DuplicateProperty` when an accessor name repeats.
    /// * `MissingMutator` when an accessor has no `set` counterpart.
    /// * `MutatorKindMismatch` when the mutator accepts a different kind.
    pub fn from_decl(decl: ContractDecl<M>) -> Result<Self, ModelError> {
        let (Some(factory), Some(terminator)) = (decl.factory, decl.terminator) else {
            return Err(ModelError::NoBuilderPathFound { message: M::type_name().into(), context: None });
        };

        let mutators: FxHashMap<&str, &MutatorDecl<M::Builder>> =
            decl.mutators.iter().map(|mutator| (mutator.name, mutator)).collect();
        let mut seen = FxHashSet::default();
        let mut bindings = Vec::with_capacity(decl.accessors.len());

        for accessor in &decl.accessors {
            if !seen.insert(accessor.name) {
                return Err(ModelError::DuplicateProperty { message: accessor.name.into(), context: None });
            }
            let expected = mutator_name(accessor.name);
            let Some(mutator) = mutators.get(expected.as_str()) else {
                return Err(ModelError::MissingMutator {
                    message: format!("{}::{expected}", M::type_name()).into(),
                    context: None,
                });
            };
            if mutator.kind != accessor.kind {
                return Err(ModelError::MutatorKindMismatch {
                    message: format!("{expected}: expected {}, found {}", accessor.kind, mutator.kind).into(),
                    context: None,
                });
            }
            bindings.push(Binding { name: accessor.name, kind: accessor.kind, get: accessor.get, set: mutator.set });
        }

        debug!(model = M::type_name(), properties = bindings.len(), "Construction contract resolved");
        Ok(Self { factory, terminator, bindings })
    }

    #[must_use]
    pub fn new_builder(&self) -> M::Builder {
        (self.factory)()
    }

    /// # Errors
    /// Propagates the model's own validation failure.
    pub fn build(&self, builder: M::Builder) -> Result<M, ModelError> {
        (self.terminator)(builder)
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding<M>] {
        &self.bindings
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding<M>> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.iter().map(|binding| binding.name)
    }
}

/// Name of the mutator paired with property `name`: `radius` becomes `setRadius`.
#[must_use]
pub fn mutator_name(name: &str) -> String {
    let mut chars = name.chars();
    let mut out = String::from("set");
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Gauge {
        depth: i64,
    }

    impl Model for Gauge {
        type Builder = Self;

        fn describe(contract: &mut ContractDecl<Self>) {
            contract.factory(Self::default);
            contract.terminator(Ok);
            contract.accessor("depth", Kind::Int, |gauge| Value::Int(gauge.depth));
            contract.mutator("setDepth", Kind::Int, |gauge, value| {
                gauge.depth = value.as_i64().ok_or(value)?;
                Ok(())
            });
        }
    }

    #[test]
    fn mutator_name_capitalizes_first_letter() {
        assert_eq!(mutator_name("maxAmount"), "setMaxAmount");
        assert_eq!(mutator_name(""), "set");
    }

    #[test]
    fn resolved_contract_assembles_builder() {
        let contract = Contract::<Gauge>::resolve().unwrap();
        let mut builder = contract.new_builder();
        contract.binding("depth").unwrap().write(&mut builder, Value::Int(3)).unwrap();
        let gauge = contract.build(builder).unwrap();
        assert_eq!(gauge.depth, 3);
    }

    #[test]
    fn mismatched_mutator_kind_is_rejected() {
        let mut decl = ContractDecl::<Gauge>::new();
        decl.factory(Gauge::default).terminator(Ok);
        decl.accessor("depth", Kind::Int, |gauge| Value::Int(gauge.depth));
        decl.mutator("setDepth", Kind::Text, |_, _| Ok(()));

        let err = Contract::from_decl(decl).unwrap_err();
        assert!(matches!(err, ModelError::MutatorKindMismatch { .. }));
    }
}
