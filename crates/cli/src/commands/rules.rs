use std::path::Path;

use super::load_config;
use crate::{report_error, OutputFormat};

/// Print the rule table in effect: the built-in table with the config's
/// `[rules]` overrides applied.
pub(crate) fn cmd_rules(config: Option<&Path>, output: OutputFormat, quiet: bool) {
    let loaded = load_config(config, output, quiet);
    let table = &loaded.config.rules;
    let rendered = match output {
        OutputFormat::Text => toml::to_string_pretty(table).map_err(|e| e.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(table).map_err(|e| e.to_string()),
    };
    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(msg) => {
            report_error(&format!("could not render rule table: {}", msg), output, quiet);
            std::process::exit(1);
        }
    }
}
