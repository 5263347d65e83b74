use elim::domain::config::EngineConfig;
use elim::domain::rule::Rule;
use tempfile::TempDir;

#[test]
fn test_init_seeds_and_loads() {
    let temp = TempDir::new().unwrap();
    let config = EngineConfig { rules_dir: temp.path().join("rules"), ..EngineConfig::default() };

    let engine = elim::init(&config).unwrap();

    assert_eq!(engine.rules().len(), 1);
    assert_eq!(*engine.rules()[0], Rule::default());
}

#[test]
fn test_init_fails_on_file_root() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("rules");
    std::fs::write(&file, "").unwrap();
    let config = EngineConfig { rules_dir: file, ..EngineConfig::default() };

    assert!(matches!(elim::init(&config), Err(elim::RuleError::Persistence { .. })));
}

#[test]
fn test_features_registry() {
    assert!(elim::features::is_enabled("rules"));
    assert!(!elim::features::is_enabled("spawners"));
}
