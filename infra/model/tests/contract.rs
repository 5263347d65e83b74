use elim_model::{
    Contract, ContractDecl, Kind, Model, ModelError, OptionMap, Property, Value, value_model,
};
use std::sync::Arc;

#[value_model(validate = Zone::validate)]
#[derive(Clone, PartialEq)]
pub struct Zone {
    #[model(copy, default = 8.0)]
    radius: f64,
    #[model(copy, default = 10)]
    max_count: u32,
    allowed_worlds: Arc<[String]>,
    #[model(rename = "flags")]
    options: OptionMap,
}

impl Zone {
    fn validate(zone: &Self) -> Result<(), ModelError> {
        if zone.radius < 0.0 {
            return Err(ModelError::invalid("radius must not be negative"));
        }
        Ok(())
    }
}

#[value_model(rename_all = "snake_case")]
pub struct Marker {
    display_name: String,
}

#[test]
fn generated_contract_lists_properties_in_declaration_order() {
    let contract = Contract::<Zone>::resolve().unwrap();
    let names: Vec<_> = contract.property_names().collect();
    assert_eq!(names, ["radius", "maxCount", "allowedWorlds", "flags"]);
    assert_eq!(contract.binding("maxCount").unwrap().kind(), Kind::Int);
    assert_eq!(contract.binding("allowedWorlds").unwrap().kind(), Kind::Strings);
}

#[test]
fn builder_defaults_and_accessors() {
    let zone = Zone::builder().build().unwrap();
    assert_eq!(zone.radius().to_bits(), 8.0_f64.to_bits());
    assert_eq!(zone.max_count(), 10);
    assert!(zone.allowed_worlds().is_empty());
    assert!(zone.options().is_empty());
}

#[test]
fn validation_rejects_built_value() {
    let err = Zone::builder().radius(-1.0).build().unwrap_err();
    assert!(matches!(err, ModelError::InvalidModel { .. }));
}

#[test]
fn to_builder_round_trips_values() {
    let zone = Zone::builder().max_count(3).allowed_worlds(Arc::from(["nether".to_owned()])).build().unwrap();
    let copy = zone.to_builder().build().unwrap();
    assert!(zone == copy);
}

#[test]
fn contract_writes_through_mutators() {
    let contract = Contract::<Zone>::resolve().unwrap();
    let mut builder = contract.new_builder();
    contract.binding("maxCount").unwrap().write(&mut builder, Value::Int(42)).unwrap();
    let rejected = contract.binding("maxCount").unwrap().write(&mut builder, Value::Text("x".into()));
    assert_eq!(rejected, Err(Value::Text("x".into())));

    let zone = contract.build(builder).unwrap();
    assert_eq!(zone.max_count(), 42);
    assert_eq!(contract.binding("maxCount").unwrap().read(&zone), 42_u32.to_value());
}

#[test]
fn snake_case_naming_keeps_field_names() {
    let contract = Contract::<Marker>::resolve().unwrap();
    assert_eq!(contract.property_names().collect::<Vec<_>>(), ["display_name"]);
    let marker = Marker::builder().display_name("spawn".to_owned()).build().unwrap();
    assert_eq!(marker.display_name(), "spawn");
}

struct Orphan;

impl Model for Orphan {
    type Builder = ();

    fn describe(contract: &mut ContractDecl<Self>) {
        contract.factory(|| ());
        contract.terminator(|()| Ok(Orphan));
        contract.accessor("size", Kind::Int, |_| Value::Int(0));
    }
}

struct NoBuilder;

impl Model for NoBuilder {
    type Builder = ();

    fn describe(contract: &mut ContractDecl<Self>) {
        contract.accessor("size", Kind::Int, |_| Value::Int(0));
    }
}

#[test]
fn accessor_without_mutator_is_reported() {
    let err = Contract::<Orphan>::resolve().unwrap_err();
    assert!(matches!(err, ModelError::MissingMutator { .. }));
    assert!(err.to_string().contains("setSize"));
}

#[test]
fn missing_builder_path_is_reported() {
    let err = Contract::<NoBuilder>::resolve().unwrap_err();
    assert!(matches!(err, ModelError::NoBuilderPathFound { .. }));
}
