//! Filter view of a rule and its cache.

use elim_domain::filters::{self, ENTITY_TYPE, NAMED, TAMED};
use elim_domain::rule::Rule;
use elim_model::{Kind, Value};
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One built-in filter a rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    name: &'static str,
    value: Value,
}

impl Filter {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// The filters of a rule: its allowed entity types and every option naming a built-in filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescription {
    rule: Arc<Rule>,
    filters: Vec<Filter>,
}

impl RuleDescription {
    #[must_use]
    pub fn new(rule: Arc<Rule>) -> Self {
        let mut filters: Vec<Filter> = rule
            .allowed_entities()
            .iter()
            .map(|entity| Filter { name: ENTITY_TYPE, value: Value::Text(entity.clone()) })
            .collect();

        for (option, value) in rule.options().iter() {
            let Some(name) = filters::builtin(option) else {
                debug!(option, "Ignoring option without a built-in filter");
                continue;
            };
            if !accepts(name, value) {
                debug!(option, kind = %value.kind(), "Ignoring filter option of unexpected kind");
                continue;
            }
            let filter = Filter { name, value: value.clone() };
            if !filters.contains(&filter) {
                filters.push(filter);
            }
        }

        Self { rule, filters }
    }

    #[must_use]
    pub const fn rule(&self) -> &Arc<Rule> {
        &self.rule
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filters_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.filters.iter().filter(move |filter| filter.name == name).map(Filter::value)
    }

    /// Entity types this rule is restricted to; empty means every type.
    #[must_use]
    pub fn entity_types(&self) -> Vec<&str> {
        self.filters_named(ENTITY_TYPE).filter_map(Value::as_str).collect()
    }

    /// Required value of the `tamed` filter, if the rule sets one.
    #[must_use]
    pub fn tamed(&self) -> Option<bool> {
        self.filters_named(TAMED).find_map(Value::as_bool)
    }

    /// Required value of the `named` filter, if the rule sets one.
    #[must_use]
    pub fn named(&self) -> Option<bool> {
        self.filters_named(NAMED).find_map(Value::as_bool)
    }
}

fn accepts(filter: &str, value: &Value) -> bool {
    match filter {
        ENTITY_TYPE => value.kind() == Kind::Text,
        _ => value.kind() == Kind::Bool,
    }
}

/// Owned cache of [`RuleDescription`]s keyed by rule value.
#[derive(Clone)]
pub struct RuleDescriptions {
    cache: Cache<Arc<Rule>, Arc<RuleDescription>>,
}

impl fmt::Debug for RuleDescriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptions").field("entries", &self.cache.entry_count()).finish()
    }
}

impl RuleDescriptions {
    pub const DEFAULT_CAPACITY: u64 = 1024;

    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self { cache: Cache::new(capacity) }
    }

    /// Cached description of `rule`, computed on first use.
    #[must_use]
    pub fn describe(&self, rule: &Arc<Rule>) -> Arc<RuleDescription> {
        self.cache.get_with(Arc::clone(rule), || Arc::new(RuleDescription::new(Arc::clone(rule))))
    }

    #[must_use]
    pub fn contains(&self, rule: &Rule) -> bool {
        self.cache.contains_key(rule)
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for RuleDescriptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elim_model::OptionMap;

    fn rule(options: OptionMap) -> Arc<Rule> {
        let rule = Rule::builder()
            .allowed_entities(Arc::from(["ZOMBIE".to_owned(), "SKELETON".to_owned()]))
            .options(options)
            .build()
            .expect("valid rule");
        Arc::new(rule)
    }

    #[test]
    fn allowed_entities_become_entity_type_filters() {
        let description = RuleDescription::new(rule(OptionMap::new()));
        assert_eq!(description.entity_types(), ["ZOMBIE", "SKELETON"]);
        assert_eq!(description.tamed(), None);
    }

    #[test]
    fn only_builtin_options_of_the_right_kind_are_kept() {
        let options = OptionMap::new().with("tamed", true).with("named", "yes").with("glowing", true);
        let description = RuleDescription::new(rule(options));

        assert_eq!(description.tamed(), Some(true));
        assert_eq!(description.named(), None);
        assert_eq!(description.filters().len(), 3);
    }

    #[test]
    fn entity_type_option_is_not_duplicated() {
        let description = RuleDescription::new(rule(OptionMap::new().with("entity_type", "ZOMBIE")));
        assert_eq!(description.entity_types(), ["ZOMBIE", "SKELETON"]);
    }

    #[test]
    fn cache_returns_the_same_description_until_invalidated() {
        let descriptions = RuleDescriptions::default();
        let rule = rule(OptionMap::new());

        let first = descriptions.describe(&rule);
        let second = descriptions.describe(&Arc::new(rule.as_ref().clone()));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(descriptions.contains(&rule));

        descriptions.invalidate();
        let third = descriptions.describe(&rule);
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
