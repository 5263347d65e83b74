//! Command-line interface of the host binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "elim-host")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Loads entity limiter rules and reports their filters")]
pub(crate) struct Args {
    /// Configuration file without extension; `elim` is used when omitted and may be absent.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Overrides `engine.rules_dir`.
    #[arg(short, long)]
    pub(crate) rules_dir: Option<PathBuf>,

    /// Skips rule files with missing properties instead of applying defaults.
    #[arg(long)]
    pub(crate) strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn overrides_are_parsed() {
        let args = Args::parse_from(["elim-host", "--config", "conf/elim", "-r", "/srv/rules", "--strict"]);
        assert_eq!(args.config, Some(PathBuf::from("conf/elim")));
        assert_eq!(args.rules_dir, Some(PathBuf::from("/srv/rules")));
        assert!(args.strict);
    }
}
