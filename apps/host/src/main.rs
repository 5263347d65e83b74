mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use elim::domain::config::HostConfig;
use elim::kernel::config::load_config;
use elim_logger::{Logger, parse_level};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config: HostConfig = load_config(args.config.as_ref()).context("Critical: Configuration is malformed")?;
    if let Some(rules_dir) = args.rules_dir {
        config.engine.rules_dir = rules_dir;
    }
    if args.strict {
        config.engine.strict = true;
    }

    let logging = &config.logging;
    let _log = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&logging.level)?)
        .env_filter(logging.env_filter.clone().unwrap_or_default())
        .console(logging.console)
        .json(logging.json)
        .directory(logging.path.clone())
        .init()?;

    let engine = elim::init(&config.engine).context("Critical: Rule engine failed to start")?;

    for rule in engine.rules() {
        let description = engine.describe(&rule);
        info!(
            entities = ?description.entity_types(),
            worlds = ?rule.allowed_worlds(),
            radius = rule.radius(),
            max_amount = rule.max_amount(),
            tamed = ?description.tamed(),
            named = ?description.named(),
            "Rule loaded"
        );
    }

    Ok(())
}
