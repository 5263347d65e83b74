use elim_model::{Contract, Kind, ModelError, Value, value_model};
use std::sync::Arc;

#[value_model(rename_all = "snake_case", validate = Spawner::validate)]
#[derive(Clone, PartialEq)]
pub struct Spawner {
    #[model(copy, default = 4)]
    max_nearby: u32,
    #[model(rename = "mobs")]
    entity_types: Arc<[String]>,
    label: String,
}

impl Spawner {
    fn validate(spawner: &Self) -> Result<(), ModelError> {
        if spawner.max_nearby == 0 { Err(ModelError::invalid("max_nearby must be positive")) } else { Ok(()) }
    }
}

fn main() {
    let contract = Contract::<Spawner>::resolve().unwrap();
    let names: Vec<_> = contract.property_names().collect();
    assert_eq!(names, ["max_nearby", "mobs", "label"]);
    assert_eq!(contract.binding("mobs").map(|b| b.kind()), Some(Kind::Strings));

    let spawner = Spawner::builder().label("cave".to_owned()).build().unwrap();
    assert_eq!(spawner.max_nearby(), 4);
    assert_eq!(spawner.label(), "cave");

    let mut builder = spawner.to_builder();
    builder.set_max_nearby(0);
    assert!(builder.build().is_err());

    let mut builder = contract.new_builder();
    let mobs = contract.binding("mobs").unwrap();
    mobs.write(&mut builder, Value::Strings(Arc::from(["BAT".to_owned()]))).unwrap();
    let built = contract.build(builder).unwrap();
    assert_eq!(built.entity_types().as_ref(), ["BAT".to_owned()]);
    assert_eq!(mobs.read(&built), Value::Strings(Arc::from(["BAT".to_owned()])));
}
