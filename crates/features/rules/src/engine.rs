use crate::collection::{ListeningRuleCollection, RuleCollection};
use crate::description::{RuleDescription, RuleDescriptions};
use crate::error::RuleError;
use crate::file::{FileSerializer, RuleFileRecord};
use crate::serializer::BuilderSerializer;
use elim_domain::config::EngineConfig;
use elim_domain::rule::Rule;
use elim_model::ConverterRegistry;
use private::Sealed;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// File name (without extension) of the rule seeded into a fresh directory.
pub const DEFAULT_SEED: &str = "myRule";

#[derive(Debug)]
pub struct RuleEngineInner {
    serializer: FileSerializer<Rule>,
    collection: ListeningRuleCollection<Rule>,
    descriptions: RuleDescriptions,
}

/// File-backed rule set with a listening collection and a description cache.
///
/// # Example
///
/// ```rust,no_run
/// use elim_rules::RuleEngine;
///
/// # fn main() -> Result<(), elim_rules::RuleError> {
/// let engine = RuleEngine::builder().root("rules").default_seed().build()?;
/// for rule in engine.init()? {
///     let description = engine.describe(&rule);
///     println!("{:?} limited to {}", description.entity_types(), rule.max_amount());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    inner: Arc<RuleEngineInner>,
}

impl Deref for RuleEngine {
    type Target = RuleEngineInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl RuleEngine {
    #[must_use = "The engine is not created until you call .build()"]
    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::new()
    }

    /// Loads the rule files once and returns the collected rules.
    ///
    /// # Errors
    /// Propagates unrecoverable errors from [`FileSerializer::init`].
    pub fn init(&self) -> Result<Vec<Arc<Rule>>, RuleError> {
        self.serializer.init()?;
        let rules = self.rules();
        info!(rules = rules.len(), root = %self.root().display(), "Rule engine initialized");
        Ok(rules)
    }

    #[must_use]
    pub fn rules(&self) -> Vec<Arc<Rule>> {
        self.collection.rules()
    }

    #[must_use]
    pub fn describe(&self, rule: &Arc<Rule>) -> Arc<RuleDescription> {
        self.descriptions.describe(rule)
    }

    /// Descriptions of every collected rule, in collection order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<Arc<RuleDescription>> {
        self.rules().iter().map(|rule| self.describe(rule)).collect()
    }

    /// Clears the collected rules and their cached descriptions.
    pub fn invalidate_cache(&self) {
        self.collection.invalidate_cache();
        self.descriptions.invalidate();
        debug!("Rule caches invalidated");
    }

    #[must_use]
    pub fn records(&self) -> Option<Arc<[RuleFileRecord<Rule>]>> {
        self.serializer.records()
    }

    #[must_use]
    pub fn serializer(&self) -> &FileSerializer<Rule> {
        &self.serializer
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.serializer.storage().root()
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

#[derive(Debug)]
struct EngineSettings {
    strict: bool,
    write_back: bool,
    converters: Option<Arc<ConverterRegistry>>,
    seeds: BTreeMap<String, Rule>,
    description_capacity: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict: false,
            write_back: true,
            converters: None,
            seeds: BTreeMap::new(),
            description_capacity: RuleDescriptions::DEFAULT_CAPACITY,
        }
    }
}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct RuleEngineBuilder<S: Sealed = NoRoot> {
    state: S,
    settings: EngineSettings,
}

#[allow(private_bounds)]
impl<S: Sealed> RuleEngineBuilder<S> {
    #[must_use = "Sets whether missing properties fail a rule file"]
    pub const fn strict(mut self, enable: bool) -> Self {
        self.settings.strict = enable;
        self
    }

    #[must_use = "Sets whether applied values are written back to their files"]
    pub const fn write_back(mut self, enable: bool) -> Self {
        self.settings.write_back = enable;
        self
    }

    #[must_use = "Sets the converter registry (defaults to the built-in converters)"]
    pub fn converters(mut self, converters: Arc<ConverterRegistry>) -> Self {
        self.settings.converters = Some(converters);
        self
    }

    #[must_use = "Adds a rule written to a fresh rules directory"]
    pub fn seed(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.settings.seeds.insert(name.into(), rule);
        self
    }

    #[must_use = "Adds rules written to a fresh rules directory"]
    pub fn seeds<I, N>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = (N, Rule)>,
        N: Into<String>,
    {
        self.settings.seeds.extend(seeds.into_iter().map(|(name, rule)| (name.into(), rule)));
        self
    }

    /// Seeds [`DEFAULT_SEED`] with the default rule.
    #[must_use = "Adds the default seed"]
    pub fn default_seed(self) -> Self {
        self.seed(DEFAULT_SEED, Rule::default())
    }

    #[must_use = "Sets the maximum number of cached descriptions"]
    pub const fn description_capacity(mut self, capacity: u64) -> Self {
        self.settings.description_capacity = capacity;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> RuleEngineBuilder<N> {
        RuleEngineBuilder { state, settings: self.settings }
    }
}

impl RuleEngineBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the rules directory"]
    pub fn root(self, path: impl Into<PathBuf>) -> RuleEngineBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }

    /// Applies every engine setting of the host configuration.
    #[must_use = "Applies the engine configuration"]
    pub fn config(self, config: &EngineConfig) -> RuleEngineBuilder<WithRoot> {
        let builder = self
            .strict(config.strict)
            .write_back(config.write_back)
            .description_capacity(config.description_capacity);
        let builder = if config.seed_defaults { builder.default_seed() } else { builder };
        builder.root(config.rules_dir.clone())
    }
}

impl RuleEngineBuilder<WithRoot> {
    /// Opens the rules directory and wires the collection and description cache.
    ///
    /// # Errors
    ///
    /// * `RuleError::Configuration` if the rule contract does not resolve.
    /// * `RuleError::Persistence` if the root cannot be opened or created.
    pub fn build(self) -> Result<RuleEngine, RuleError> {
        let EngineSettings { strict, write_back, converters, seeds, description_capacity } = self.settings;
        let converters = converters.unwrap_or_else(|| Arc::new(ConverterRegistry::with_defaults()));

        let base = BuilderSerializer::new(converters, strict)?;
        let collection = ListeningRuleCollection::attach(&base);

        let mut serializer = FileSerializer::yaml(self.state.0, base)?.with_write_back(write_back);
        for (name, rule) in seeds {
            serializer = serializer.with_seed(name, rule);
        }

        debug!(?serializer, strict, "Rule engine built");
        Ok(RuleEngine {
            inner: Arc::new(RuleEngineInner {
                serializer,
                collection,
                descriptions: RuleDescriptions::new(description_capacity),
            }),
        })
    }
}
