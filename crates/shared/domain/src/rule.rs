use elim_model::{ModelError, OptionMap, value_model};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const DEFAULT_RADIUS: f64 = 16.0;
pub const DEFAULT_MAX_AMOUNT: u32 = 50;

/// A limit on how many entities may gather within a radius.
///
/// Empty `allowed_entities` or `allowed_worlds` mean "every entity" and "every world".
/// Rules are immutable; use [`Rule::to_builder`] to derive a modified copy.
#[value_model(validate = Rule::validate)]
#[derive(Clone)]
pub struct Rule {
    allowed_entities: Arc<[String]>,
    allowed_worlds: Arc<[String]>,
    #[model(copy, default = DEFAULT_RADIUS)]
    radius: f64,
    #[model(copy, default = DEFAULT_MAX_AMOUNT)]
    max_amount: u32,
    options: OptionMap,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.allowed_entities == other.allowed_entities
            && self.allowed_worlds == other.allowed_worlds
            && self.radius.to_bits() == other.radius.to_bits()
            && self.max_amount == other.max_amount
            && self.options == other.options
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.allowed_entities.hash(state);
        self.allowed_worlds.hash(state);
        self.radius.to_bits().hash(state);
        self.max_amount.hash(state);
        self.options.hash(state);
    }
}

impl Rule {
    /// Rejects radii that are negative or not finite.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidModel` describing the offending value.
    pub fn validate(rule: &Self) -> Result<(), ModelError> {
        if rule.radius.is_finite() && rule.radius >= 0.0 {
            Ok(())
        } else {
            Err(ModelError::invalid(format!("radius must be a finite, non-negative number, got {}", rule.radius)))
        }
    }

    #[must_use]
    pub fn applies_to_world(&self, world: &str) -> bool {
        self.allowed_worlds.is_empty() || self.allowed_worlds.iter().any(|allowed| allowed == world)
    }

    #[must_use]
    pub fn applies_to_entity(&self, entity: &str) -> bool {
        self.allowed_entities.is_empty()
            || self.allowed_entities.iter().any(|allowed| allowed.eq_ignore_ascii_case(entity))
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            allowed_entities: Arc::default(),
            allowed_worlds: Arc::default(),
            radius: DEFAULT_RADIUS,
            max_amount: DEFAULT_MAX_AMOUNT,
            options: OptionMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elim_model::{Contract, Kind};

    #[test]
    fn defaults_match_builder() {
        let built = Rule::builder().build().unwrap();
        assert_eq!(built, Rule::default());
        assert_eq!(built.max_amount(), DEFAULT_MAX_AMOUNT);
    }

    #[test]
    fn contract_exposes_camel_case_properties() {
        let contract = Contract::<Rule>::resolve().unwrap();
        let names: Vec<_> = contract.property_names().collect();
        assert_eq!(names, ["allowedEntities", "allowedWorlds", "radius", "maxAmount", "options"]);
        assert_eq!(contract.binding("options").map(|b| b.kind()), Some(Kind::Options));
    }

    #[test]
    fn negative_radius_is_invalid() {
        assert!(Rule::builder().radius(-2.0).build().is_err());
        assert!(Rule::builder().radius(f64::NAN).build().is_err());
    }

    #[test]
    fn empty_lists_match_everything() {
        let rule = Rule::default();
        assert!(rule.applies_to_world("world_nether"));
        assert!(rule.applies_to_entity("ZOMBIE"));

        let scoped = Rule::builder().allowed_worlds(Arc::from(["world".to_owned()])).build().unwrap();
        assert!(scoped.applies_to_world("world"));
        assert!(!scoped.applies_to_world("world_nether"));
    }
}
