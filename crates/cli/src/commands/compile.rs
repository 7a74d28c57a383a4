use std::path::Path;

use formc_codegen::{generate, write_atomic, EmitError, GenerateConfig, Generated, Templates};
use formc_core::parse_file;

use super::{build_engine, load_config, parse_options};
use crate::config::LoadedConfig;
use crate::{fail_with, report_error, OutputFormat};

pub(crate) struct CompileArgs<'a> {
    pub config: Option<&'a Path>,
    pub input: Option<&'a Path>,
    pub header: Option<&'a Path>,
    pub trailer: Option<&'a Path>,
    pub out: Option<&'a Path>,
    pub lookup: Option<&'a Path>,
    pub stdout: bool,
}

pub(crate) fn cmd_compile(args: CompileArgs<'_>, output: OutputFormat, quiet: bool) {
    let loaded = load_config(args.config, output, quiet);
    let settings = &loaded.config.compile;

    let require = |flag: Option<&Path>, configured, what: &str, key: &str| {
        loaded.pick(flag, configured).unwrap_or_else(|| {
            let msg = format!("no {}: pass --{} or set [compile].{}", what, key, key);
            report_error(&msg, output, quiet);
            std::process::exit(1);
        })
    };
    let input = require(args.input, settings.input.as_ref(), "input document", "input");
    let header = require(args.header, settings.header.as_ref(), "header template", "header");
    let trailer = require(args.trailer, settings.trailer.as_ref(), "trailer template", "trailer");
    let target = if args.stdout {
        None
    } else {
        Some(require(args.out, settings.output.as_ref(), "output path", "out"))
    };

    let generated = match run(&loaded, &input, &header, &trailer, args.lookup) {
        Ok(g) => g,
        Err(e) => fail_emit(e, output, quiet),
    };

    let Some(target) = target else {
        print!("{}", generated.text);
        return;
    };
    if let Err(e) = write_atomic(&target, &generated.text) {
        fail_emit(e, output, quiet);
    }

    if !quiet {
        match output {
            OutputFormat::Text => println!(
                "Generated {} ({} sections, {} fields)",
                target.display(),
                generated.sections,
                generated.fields
            ),
            OutputFormat::Json => {
                let summary = serde_json::json!({
                    "output": target.display().to_string(),
                    "sections": generated.sections,
                    "fields": generated.fields,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).unwrap_or_default()
                );
            }
        }
    }
}

/// Read, parse and generate entirely in memory. The lookup source lives
/// only for the duration of this call, whichever way it returns.
fn run(
    loaded: &LoadedConfig,
    input: &Path,
    header: &Path,
    trailer: &Path,
    lookup: Option<&Path>,
) -> Result<Generated, EmitError> {
    let templates = Templates::load(header, trailer)?;
    let mut engine = build_engine(loaded, lookup)?;
    let mut doc = parse_file(input, &parse_options(loaded), &mut engine)?;
    let config = GenerateConfig {
        indent: loaded.config.compile.indent.clone(),
    };
    generate(&mut doc, &mut engine, &templates, &config)
}

fn fail_emit(e: EmitError, output: OutputFormat, quiet: bool) -> ! {
    fail_with(e.to_json_value(), &e.to_string(), output, quiet)
}
