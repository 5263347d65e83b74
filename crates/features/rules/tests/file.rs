use elim_domain::rule::Rule;
use elim_model::{ConverterRegistry, Kind, OptionMap, Value};
use elim_rules::*;
use elim_storage::StorageError;
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn open(root: &Path, strict: bool) -> FileSerializer<Rule> {
    let base = BuilderSerializer::new(Arc::new(ConverterRegistry::with_defaults()), strict).unwrap();
    FileSerializer::yaml(root, base).unwrap()
}

/// YAML that refuses to emit any document whose `maxAmount` equals `marker`.
#[derive(Debug)]
struct RefusingYaml {
    marker: i64,
}

impl DocumentFormat for RefusingYaml {
    fn extension(&self) -> &str {
        YamlFormat.extension()
    }

    fn parse(&self, text: &str) -> Result<Document, RuleError> {
        YamlFormat.parse(text)
    }

    fn render(&self, document: &Document) -> Result<String, RuleError> {
        if document.get("maxAmount") == Some(&Value::Int(self.marker)) {
            let source = StorageError::Io { source: std::io::Error::other("disk full"), context: None };
            return Err(RuleError::Persistence { source, context: None });
        }
        YamlFormat.render(document)
    }
}

fn open_refusing(root: &Path, marker: i64) -> FileSerializer<Rule, RefusingYaml> {
    let base = BuilderSerializer::new(Arc::new(ConverterRegistry::with_defaults()), false).unwrap();
    FileSerializer::open(root, RefusingYaml { marker }, base).unwrap()
}

fn sample() -> Rule {
    Rule::builder()
        .allowed_entities(Arc::from(["ZOMBIE".to_owned(), "SKELETON".to_owned()]))
        .allowed_worlds(Arc::from(["world".to_owned()]))
        .radius(12.5)
        .max_amount(9)
        .options(OptionMap::new().with("tamed", false).with("entity_type", "ZOMBIE"))
        .build()
        .unwrap()
}

#[test]
fn test_round_trip_through_file() {
    let temp = TempDir::new().unwrap();
    let serializer = open(temp.path(), true);
    let context = SerializerContext::for_file(Path::new("sample.yml"));

    serializer.serialize(&sample(), &context).unwrap();
    let read = serializer.read_context(Path::new("sample.yml")).unwrap();
    let rule = serializer.deserialize(&read, None).unwrap();

    assert_eq!(*rule, sample());
    assert_eq!(read.file(), Some(serializer.storage().root().join("sample.yml").as_path()));
}

#[test]
fn test_file_key_is_never_written() {
    let temp = TempDir::new().unwrap();
    let serializer = open(temp.path(), false);

    serializer.serialize(&sample(), &SerializerContext::for_file(Path::new("a.yml"))).unwrap();
    let text = std::fs::read_to_string(serializer.storage().root().join("a.yml")).unwrap();

    assert!(!text.contains(FILE_KEY));
    assert!(text.contains("maxAmount: 9"));
    assert!(text.contains("tamed: false"));
}

#[test]
fn test_serialize_without_file_key_fails() {
    let temp = TempDir::new().unwrap();
    let serializer = open(temp.path(), false);

    let err = serializer.serialize(&sample(), &SerializerContext::default()).unwrap_err();
    assert!(matches!(err, RuleError::MissingFileKey { .. }));
    assert!(serializer.file_of(&SerializerContext::for_file(Path::new("x.yml"))).is_ok());
}

#[test]
fn test_write_back_fills_defaults_and_keeps_unknown_keys() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("partial.yml"), "maxAmount: 3\ncomment: keep me\n").unwrap();
    let serializer = open(temp.path(), false);

    let records = serializer.init().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rule().max_amount(), 3);

    let text = std::fs::read_to_string(serializer.storage().root().join("partial.yml")).unwrap();
    assert!(text.contains("radius: 16.0"), "{text}");
    assert!(text.contains("allowedEntities: []"), "{text}");
    assert!(text.contains("comment: keep me"), "{text}");

    let snapshot = serializer.snapshot(Path::new("partial.yml")).unwrap();
    assert!(snapshot.get("radius", Kind::Float).is_some());
    assert_eq!(records[0].context(), &snapshot);
}

#[test]
fn test_write_back_disabled_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("partial.yml"), "maxAmount: 3\n").unwrap();
    let serializer = open(temp.path(), false).with_write_back(false);

    serializer.init().unwrap();
    let text = std::fs::read_to_string(temp.path().join("partial.yml")).unwrap();
    assert_eq!(text, "maxAmount: 3\n");
    assert!(serializer.snapshot(Path::new("partial.yml")).is_some());
}

#[test]
fn test_fresh_directory_is_seeded() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("rules");
    let serializer = open(&root, true).with_seed("myRule", Rule::default());

    let records = serializer.init().unwrap();
    let files = serializer.storage().files(Some("yml")).unwrap();

    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("myRule.yml"));
    assert_eq!(records.len(), 1);
    assert_eq!(**records[0].rule(), Rule::default());
}

#[test]
fn test_seeds_are_ignored_for_existing_directory() {
    let temp = TempDir::new().unwrap();
    let serializer = open(temp.path(), false).with_seed("myRule", Rule::default());

    assert!(serializer.init().unwrap().is_empty());
    assert!(serializer.storage().files(None).unwrap().is_empty());
}

#[test]
fn test_second_init_performs_no_reads() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("one.yml"), "maxAmount: 1\n").unwrap();
    let serializer = open(temp.path(), false);

    let first = serializer.init().unwrap();
    let reads = serializer.storage().reads();
    let second = serializer.init().unwrap();

    assert_eq!(serializer.storage().reads(), reads);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(serializer.records().is_some());
}

#[test]
fn test_malformed_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    for amount in 1..=3 {
        std::fs::write(temp.path().join(format!("rule{amount}.yml")), format!("maxAmount: {amount}\n")).unwrap();
    }
    std::fs::write(temp.path().join("broken.yml"), "allowedEntities: [ZOMBIE\n").unwrap();
    let serializer = open(temp.path(), false);
    let collection = ListeningRuleCollection::attach(&serializer);

    let records = serializer.init().unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(collection.len(), 3);
}

#[test]
fn test_failed_write_back_skips_only_that_file() {
    let temp = TempDir::new().unwrap();
    for amount in 1..=4 {
        std::fs::write(temp.path().join(format!("rule{amount}.yml")), format!("maxAmount: {amount}\n")).unwrap();
    }
    let serializer = open_refusing(temp.path(), 4);
    let collection = ListeningRuleCollection::attach(&serializer);

    let records = serializer.init().unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|record| record.rule().max_amount() != 4));
    assert_eq!(collection.len(), 3);
    let mut loaded: Vec<_> = records.iter().map(|record| Arc::clone(record.rule())).collect();
    let mut collected = collection.rules();
    loaded.sort_by_key(|rule| rule.max_amount());
    collected.sort_by_key(|rule| rule.max_amount());
    assert_eq!(loaded, collected);
}

#[test]
fn test_failed_write_back_notifies_no_listener() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("full.yml"), "maxAmount: 4\n").unwrap();
    let serializer = open_refusing(temp.path(), 4);
    let collection = ListeningRuleCollection::attach(&serializer);

    let context = serializer.read_context(Path::new("full.yml")).unwrap();
    let err = serializer.deserialize(&context, None).unwrap_err();

    assert!(matches!(err, RuleError::Persistence { .. }));
    assert!(!err.is_fatal());
    assert!(collection.is_empty());
    assert!(serializer.snapshot(Path::new("full.yml")).is_none());
}

#[test]
fn test_longest_file_name_loads() {
    let temp = TempDir::new().unwrap();
    let name = format!("{}.yml", "r".repeat(248));
    std::fs::write(temp.path().join(&name), "maxAmount: 4\n").unwrap();
    std::fs::write(temp.path().join("short.yml"), "maxAmount: 1\n").unwrap();
    let serializer = open(temp.path(), false);
    let collection = ListeningRuleCollection::attach(&serializer);

    let records = serializer.init().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(collection.len(), 2);
    let text = std::fs::read_to_string(temp.path().join(&name)).unwrap();
    assert!(text.contains("radius: 16.0"), "{text}");
    assert_eq!(serializer.storage().files(None).unwrap().len(), 2);
}

#[test]
fn test_strict_scan_skips_incomplete_files() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("partial.yml"), "maxAmount: 3\n").unwrap();
    let complete = open(temp.path(), false);
    complete.serialize(&sample(), &SerializerContext::for_file(Path::new("full.yml"))).unwrap();

    let strict = open(temp.path(), true);
    let records = strict.init().unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].file().ends_with("full.yml"));
}

#[test]
fn test_nested_directories_and_foreign_extensions() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("overworld/caves")).unwrap();
    std::fs::write(temp.path().join("overworld/caves/bats.yml"), "allowedEntities: [BAT]\n").unwrap();
    std::fs::write(temp.path().join("notes.txt"), "not a rule").unwrap();
    std::fs::write(temp.path().join("list.yml"), "- not\n- a mapping\n").unwrap();
    let serializer = open(temp.path(), false);

    let records = serializer.init().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rule().allowed_entities().as_ref(), ["BAT".to_owned()]);
}

#[test]
fn test_file_root_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("rules");
    std::fs::write(&file, "").unwrap();
    let base = BuilderSerializer::<Rule>::new(Arc::new(ConverterRegistry::with_defaults()), false).unwrap();

    let err = FileSerializer::yaml(&file, base).unwrap_err();
    assert!(matches!(err, RuleError::Persistence { .. }));
}

fn arb_option_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6_f64..1.0e6).prop_map(Value::Float),
        "[a-zA-Z0-9_ ]{0,8}".prop_map(Value::Text),
        prop::collection::vec("[A-Z]{1,4}", 0..3).prop_map(|items| Value::Strings(Arc::from(items))),
        "[a-z]{1,6}(/[a-z]{1,6}){0,2}".prop_map(|path| Value::Path(PathBuf::from(path))),
    ]
}

fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        prop::collection::vec("[A-Z]{1,8}", 0..4),
        prop::collection::vec("[a-z_]{1,10}", 0..3),
        0.0_f64..1_000.0,
        any::<u32>(),
        prop::collection::vec(("[a-z.]{0,6}", arb_option_value()), 0..5),
    )
        .prop_map(|(entities, worlds, radius, max_amount, options)| {
            Rule::builder()
                .allowed_entities(entities.into())
                .allowed_worlds(worlds.into())
                .radius(radius)
                .max_amount(max_amount)
                .options(options.into_iter().collect())
                .build()
                .unwrap()
        })
}

#[test]
fn test_option_shapes_survive_round_trip() {
    let temp = TempDir::new().unwrap();
    let serializer = open(temp.path(), true);
    let options = OptionMap::new()
        .with("types", Value::Strings(Arc::from(["A".to_owned()])))
        .with(".x", true)
        .with("a..b", 2_i64)
        .with("home", Value::Path(PathBuf::from("rules/horse")));
    let rule = Rule::builder().max_amount(1).options(options).build().unwrap();

    serializer.serialize(&rule, &SerializerContext::for_file(Path::new("shapes.yml"))).unwrap();
    let context = serializer.read_context(Path::new("shapes.yml")).unwrap();
    let back = serializer.deserialize(&context, None).unwrap();

    assert_eq!(*back, rule);
    assert_eq!(back.options().get(".x"), Some(&Value::Bool(true)));
    assert_eq!(back.options().get("types"), Some(&Value::List(vec![Value::Text("A".into())])));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_serialized_rules_read_back_equal(rule in arb_rule()) {
        let temp = TempDir::new().unwrap();
        let serializer = open(temp.path(), true);
        serializer.serialize(&rule, &SerializerContext::for_file(Path::new("rule.yml"))).unwrap();

        let context = serializer.read_context(Path::new("rule.yml")).unwrap();
        let back = serializer.deserialize(&context, None).unwrap();
        prop_assert_eq!(&*back, &rule);
    }
}
