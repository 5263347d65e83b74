//! Builder-driven mapping from typed registries to models.

use crate::context::SerializerContext;
use crate::error::RuleError;
use crate::listener::{DeserializeListener, Listeners};
use crate::visitor::Visitor;
use elim_model::{Contract, ConverterRegistry, Model, ModelError, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Two-way mapping between models of type `M` and serializer contexts.
pub trait RuleSerializer<M: Model>: Send + Sync {
    /// Registers a listener notified after every successful deserialization.
    fn add_listener(&self, listener: Arc<dyn DeserializeListener<M>>);

    /// Persists `model` according to `context`.
    ///
    /// # Errors
    /// Implementation specific; the base serializer never fails.
    fn serialize(&self, model: &M, context: &SerializerContext) -> Result<(), RuleError>;

    /// Builds a model from `context`, reporting every applied property to `visitor`.
    ///
    /// # Errors
    /// * `PropertyMissing` in strict mode when a property has no value.
    /// * `ConversionExhausted` when a value cannot be brought to the declared kind.
    /// * `PropertyType` when the builder rejects a value.
    /// * `InvalidModel` when the built model fails validation.
    fn deserialize(
        &self,
        context: &SerializerContext,
        visitor: Option<&mut dyn Visitor<M>>,
    ) -> Result<Arc<M>, RuleError>;
}

/// Base serializer: resolves the construction contract once and drives the builder.
#[derive(Debug)]
pub struct BuilderSerializer<M: Model> {
    contract: Arc<Contract<M>>,
    converters: Arc<ConverterRegistry>,
    strict: bool,
    listeners: Listeners<M>,
}

impl<M: Model> BuilderSerializer<M> {
    /// # Errors
    /// Returns `RuleError::Configuration` when the model's contract does not resolve.
    pub fn new(converters: Arc<ConverterRegistry>, strict: bool) -> Result<Self, RuleError> {
        let contract = Contract::<M>::resolve()?;
        Ok(Self { contract: Arc::new(contract), converters, strict, listeners: Listeners::default() })
    }

    #[must_use]
    pub fn contract(&self) -> &Contract<M> {
        &self.contract
    }

    #[must_use]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Builds a model from `context` and reports its values to `visitor` without notifying
    /// listeners.
    ///
    /// # Errors
    /// Same as [`RuleSerializer::deserialize`].
    pub fn assemble(
        &self,
        context: &SerializerContext,
        visitor: Option<&mut dyn Visitor<M>>,
    ) -> Result<Arc<M>, RuleError> {
        let mut builder = self.contract.new_builder();

        for binding in self.contract.bindings() {
            let name = binding.name();
            let Some(stored) = context.get(name, binding.kind()) else {
                if self.strict {
                    return Err(RuleError::PropertyMissing { message: name.into(), context: None });
                }
                trace!(property = name, "Property absent, keeping builder default");
                continue;
            };

            let value = self.coerce(name, binding.kind(), stored)?;
            binding.write(&mut builder, value).map_err(|rejected| RuleError::PropertyType {
                message: format!("{name}: expected {}, found {} ({rejected})", binding.kind(), rejected.kind()).into(),
                context: None,
            })?;
        }

        let model = Arc::new(self.contract.build(builder).map_err(|err| match err {
            ModelError::InvalidModel { message, .. } => RuleError::InvalidModel { message, context: None },
            other => RuleError::from(other),
        })?);

        if let Some(visitor) = visitor {
            for binding in self.contract.bindings() {
                visitor.visit_value(&model, binding.name(), binding.kind(), &binding.read(&model));
            }
        }

        debug!(model = M::type_name(), file = ?context.file(), "Model deserialized");
        Ok(model)
    }

    /// Notifies every registered listener of `model`.
    pub fn notify(&self, model: &Arc<M>, context: &SerializerContext) {
        self.listeners.notify(model, context);
    }

    fn coerce(&self, name: &str, declared: elim_model::Kind, value: &Value) -> Result<Value, RuleError> {
        if declared.is_assignable_from(value.kind()) {
            return Ok(value.clone());
        }
        let converted = self.converters.convert_recursively(value.clone(), declared);
        if declared.is_assignable_from(converted.kind()) {
            trace!(property = name, from = %value.kind(), to = %declared, "Converted property value");
            Ok(converted)
        } else {
            Err(RuleError::ConversionExhausted {
                message: format!("{name}: {} -> {declared}", value.kind()).into(),
                context: None,
            })
        }
    }
}

impl<M: Model> RuleSerializer<M> for BuilderSerializer<M> {
    fn add_listener(&self, listener: Arc<dyn DeserializeListener<M>>) {
        self.listeners.add(listener);
    }

    fn serialize(&self, _model: &M, context: &SerializerContext) -> Result<(), RuleError> {
        trace!(model = M::type_name(), file = ?context.file(), "Base serializer has nothing to persist");
        Ok(())
    }

    fn deserialize(
        &self,
        context: &SerializerContext,
        visitor: Option<&mut dyn Visitor<M>>,
    ) -> Result<Arc<M>, RuleError> {
        let model = self.assemble(context, visitor)?;
        self.notify(&model, context);
        Ok(model)
    }
}
