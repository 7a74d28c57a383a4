pub(crate) mod compile;
pub(crate) mod inspect;
pub(crate) mod lookup;
pub(crate) mod rules;

use std::path::Path;

use formc_core::{FormError, ParseOptions, RuleEngine};

use crate::config::{self, LoadedConfig};
use crate::{report_error, OutputFormat};

/// Load the configuration or exit 1.
pub(crate) fn load_config(path: Option<&Path>, output: OutputFormat, quiet: bool) -> LoadedConfig {
    match config::load(path) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, output, quiet);
            std::process::exit(1);
        }
    }
}

/// Open the lookup source and build the rule engine around it. The engine
/// owns the source; dropping it closes the connection.
pub(crate) fn build_engine(
    loaded: &LoadedConfig,
    lookup: Option<&Path>,
) -> Result<RuleEngine, FormError> {
    let source = loaded.open_lookup(lookup)?;
    RuleEngine::new(loaded.config.rules.clone(), source)
}

pub(crate) fn parse_options(loaded: &LoadedConfig) -> ParseOptions {
    ParseOptions {
        label_class: loaded.config.compile.label_class.clone(),
    }
}
