use std::path::Path;

use formc_core::FormError;

use super::load_config;
use crate::{fail_with, LookupTable, OutputFormat};

/// Query the configured lookup source and print the rows.
pub(crate) fn cmd_lookup(
    table: LookupTable,
    config: Option<&Path>,
    lookup: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let loaded = load_config(config, output, quiet);
    let result = loaded.open_lookup(lookup).and_then(|mut source| match table {
        LookupTable::Reasons => source.reason_codes().map(|rows| {
            let text = rows
                .iter()
                .map(|r| format!("{}\t{}", r.id, r.description))
                .collect::<Vec<_>>();
            (serde_json::to_value(&rows), text)
        }),
        LookupTable::Sites => source.sites().map(|rows| {
            let text = rows
                .iter()
                .map(|r| format!("{}\t{}\t{}", r.internal_id, r.site_id, r.site_name))
                .collect::<Vec<_>>();
            (serde_json::to_value(&rows), text)
        }),
    });

    let (json, lines) = match result {
        Ok(rows) => rows,
        Err(e) => {
            let e = FormError::from(e);
            fail_with(e.to_json_value(), &e.to_string(), output, quiet);
        }
    };
    match output {
        OutputFormat::Text => {
            for line in lines {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let json = json.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
}
