use super::{Document, DocumentFormat};
use crate::error::RuleError;
use elim_model::{OptionMap, Value};
use serde_yaml::{Mapping, Number, Value as Yaml};
use std::collections::BTreeMap;
use tracing::trace;

/// YAML documents (`.yml`).
///
/// Options are stored as nested sections and flattened on read by the `Section -> Options`
/// converter; [`YamlFormat::render`] nests dotted option keys again.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl YamlFormat {
    pub const EXTENSION: &'static str = "yml";
}

impl DocumentFormat for YamlFormat {
    fn extension(&self) -> &str {
        Self::EXTENSION
    }

    fn parse(&self, text: &str) -> Result<Document, RuleError> {
        let root: Yaml = serde_yaml::from_str(text)?;
        match root {
            Yaml::Null => Ok(Document::new()),
            Yaml::Mapping(mapping) => Ok(mapping_to_section(mapping)),
            Yaml::Tagged(tagged) => match tagged.value {
                Yaml::Mapping(mapping) => Ok(mapping_to_section(mapping)),
                other => Err(shape_error(&other)),
            },
            other => Err(shape_error(&other)),
        }
    }

    fn render(&self, document: &Document) -> Result<String, RuleError> {
        let mut mapping = Mapping::new();
        for (key, value) in document {
            mapping.insert(Yaml::String(key.clone()), to_yaml(value));
        }
        Ok(serde_yaml::to_string(&Yaml::Mapping(mapping))?)
    }
}

fn shape_error(found: &Yaml) -> RuleError {
    let kind = match found {
        Yaml::Bool(_) => "boolean",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        _ => "non-mapping value",
    };
    RuleError::InvalidDocument { message: format!("expected a mapping at top level, found a {kind}").into(), context: None }
}

fn key_to_string(key: Yaml) -> Option<String> {
    match key {
        Yaml::String(key) => Some(key),
        Yaml::Number(number) => Some(number.to_string()),
        Yaml::Bool(flag) => Some(flag.to_string()),
        other => {
            trace!(key = ?other, "Ignoring non-scalar mapping key");
            None
        },
    }
}

fn mapping_to_section(mapping: Mapping) -> BTreeMap<String, Value> {
    mapping
        .into_iter()
        .filter_map(|(key, value)| Some((key_to_string(key)?, from_yaml(value)?)))
        .collect()
}

/// `None` for nulls, which behave as absent keys.
fn from_yaml(value: Yaml) -> Option<Value> {
    match value {
        Yaml::Null => None,
        Yaml::Bool(flag) => Some(Value::Bool(flag)),
        Yaml::Number(number) => Some(number_to_value(&number)),
        Yaml::String(text) => Some(Value::Text(text)),
        Yaml::Sequence(items) => Some(Value::List(items.into_iter().filter_map(from_yaml).collect())),
        Yaml::Mapping(mapping) => Some(Value::Section(mapping_to_section(mapping))),
        Yaml::Tagged(tagged) => from_yaml(tagged.value),
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_to_value(number: &Number) -> Value {
    if let Some(int) = number.as_i64() {
        Value::Int(int)
    } else if let Some(unsigned) = number.as_u64() {
        Value::Float(unsigned as f64)
    } else {
        Value::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

fn to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Bool(flag) => Yaml::Bool(*flag),
        Value::Int(int) => Yaml::Number((*int).into()),
        Value::Float(float) => Yaml::Number((*float).into()),
        Value::Text(text) => Yaml::String(text.clone()),
        Value::List(items) => Yaml::Sequence(items.iter().map(to_yaml).collect()),
        Value::Strings(items) => Yaml::Sequence(items.iter().cloned().map(Yaml::String).collect()),
        Value::Section(section) => {
            Yaml::Mapping(section.iter().map(|(key, value)| (Yaml::String(key.clone()), to_yaml(value))).collect())
        },
        Value::Options(options) => unflatten(options),
        Value::Path(path) => Yaml::String(path.display().to_string()),
    }
}

/// Nests dotted option keys: `a.b: 1` becomes `a: { b: 1 }`. A key whose prefix already holds
/// a scalar is kept verbatim.
fn unflatten(options: &OptionMap) -> Yaml {
    let mut root = Mapping::new();
    for (key, value) in options.iter() {
        insert_path(&mut root, key, to_yaml(value));
    }
    Yaml::Mapping(root)
}

fn insert_path(mapping: &mut Mapping, key: &str, value: Yaml) {
    let Some((head, rest)) = key.split_once('.') else {
        mapping.insert(Yaml::String(key.to_owned()), value);
        return;
    };

    let slot = mapping.entry(Yaml::String(head.to_owned())).or_insert_with(|| Yaml::Mapping(Mapping::new()));
    match slot {
        Yaml::Mapping(child) => insert_path(child, rest, value),
        _ => {
            mapping.insert(Yaml::String(key.to_owned()), value);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elim_model::Kind;

    #[test]
    fn empty_text_is_an_empty_document() {
        assert!(YamlFormat.parse("").expect("parse").is_empty());
        assert!(YamlFormat.parse("# nothing\n").expect("parse").is_empty());
    }

    #[test]
    fn scalars_keep_their_runtime_kinds() {
        let doc = YamlFormat.parse("radius: 8\nmaxAmount: 3\nname: spawn\nratio: 0.5\nflag: true\n").expect("parse");
        assert_eq!(doc["radius"], Value::Int(8));
        assert_eq!(doc["ratio"], Value::Float(0.5));
        assert_eq!(doc["name"], Value::Text("spawn".into()));
        assert_eq!(doc["flag"], Value::Bool(true));
    }

    #[test]
    fn sequences_and_sections_stay_untyped() {
        let doc = YamlFormat.parse("allowedEntities: [ZOMBIE, SKELETON]\noptions:\n  tamed: true\n").expect("parse");
        assert_eq!(doc["allowedEntities"].kind(), Kind::List);
        assert_eq!(doc["options"].kind(), Kind::Section);
    }

    #[test]
    fn nulls_are_dropped() {
        let doc = YamlFormat.parse("radius: ~\nallowedWorlds: [world, ~]\n").expect("parse");
        assert!(!doc.contains_key("radius"));
        assert_eq!(doc["allowedWorlds"], Value::List(vec![Value::Text("world".into())]));
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let err = YamlFormat.parse("- a\n- b\n").expect_err("sequence root");
        assert!(matches!(err, RuleError::InvalidDocument { .. }));

        let err = YamlFormat.parse("key: [unclosed\n").expect_err("malformed");
        assert!(matches!(err, RuleError::Format { .. }));
    }

    #[test]
    fn dotted_options_are_nested_on_render() {
        let options = OptionMap::new().with("entity_type", "ZOMBIE").with("spawn.reason", "NATURAL");
        let mut doc = Document::new();
        doc.insert("options".into(), Value::Options(options));

        let text = YamlFormat.render(&doc).expect("render");
        let back = YamlFormat.parse(&text).expect("parse");
        let Value::Section(section) = &back["options"] else { panic!("options should be a section") };
        assert_eq!(section["entity_type"], Value::Text("ZOMBIE".into()));
        assert!(matches!(section["spawn"], Value::Section(_)));
    }

    #[test]
    fn strings_render_as_sequences() {
        let mut doc = Document::new();
        doc.insert("allowedWorlds".into(), Value::Strings(["world".to_owned(), "nether".to_owned()].into()));
        let text = YamlFormat.render(&doc).expect("render");
        assert!(text.contains("- world"));
        assert!(text.contains("- nether"));
    }
}
