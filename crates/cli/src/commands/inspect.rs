use std::path::Path;

use formc_core::{parse_file, Document, FormError};

use super::{build_engine, load_config, parse_options};
use crate::{fail_with, OutputFormat};

/// Parse `markup` (label-known rules included) and list what was found.
pub(crate) fn cmd_inspect(
    markup: &Path,
    config: Option<&Path>,
    lookup: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let loaded = load_config(config, output, quiet);
    let parsed: Result<Document, FormError> = build_engine(&loaded, lookup)
        .and_then(|mut engine| parse_file(markup, &parse_options(&loaded), &mut engine));
    let doc = match parsed {
        Ok(d) => d,
        Err(e) => fail_with(e.to_json_value(), &e.to_string(), output, quiet),
    };

    match output {
        OutputFormat::Text => {
            for (i, section) in doc.sections().iter().enumerate() {
                println!("{}: {}", i, section);
            }
            if !quiet {
                println!(
                    "Found {} sections with {} fields.",
                    doc.len(),
                    doc.field_count()
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&doc).unwrap_or_default();
            println!("{}", json);
        }
    }
}
