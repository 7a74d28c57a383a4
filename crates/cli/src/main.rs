mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Which lookup rows to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LookupTable {
    Reasons,
    Sites,
}

/// formc form-definition compiler.
#[derive(Parser)]
#[command(name = "formc", version, about = "formc form-definition compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log rule and parser decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a markup form definition into a Python form program
    Compile {
        /// Path to the config file (default: formc.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Markup document to compile
        #[arg(long)]
        input: Option<PathBuf>,
        /// Header template; its first line is dropped
        #[arg(long)]
        header: Option<PathBuf>,
        /// Trailer template, copied verbatim
        #[arg(long)]
        trailer: Option<PathBuf>,
        /// Where to write the generated program
        #[arg(long)]
        out: Option<PathBuf>,
        /// Lookup source: a .json rows file or an SQLite database
        #[arg(long)]
        lookup: Option<PathBuf>,
        /// Print the generated program instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Parse a markup document and list its sections and fields
    Inspect {
        /// Markup document to parse
        markup: PathBuf,
        /// Path to the config file (default: formc.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Lookup source: a .json rows file or an SQLite database
        #[arg(long)]
        lookup: Option<PathBuf>,
    },

    /// Print the effective rule table
    Rules {
        /// Path to the config file (default: formc.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Query the lookup source and print its rows
    Lookup {
        /// Rows to list
        #[arg(value_enum)]
        table: LookupTable,
        /// Path to the config file (default: formc.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Lookup source: a .json rows file or an SQLite database
        #[arg(long)]
        lookup: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            config,
            input,
            header,
            trailer,
            out,
            lookup,
            stdout,
        } => {
            commands::compile::cmd_compile(
                commands::compile::CompileArgs {
                    config: config.as_deref(),
                    input: input.as_deref(),
                    header: header.as_deref(),
                    trailer: trailer.as_deref(),
                    out: out.as_deref(),
                    lookup: lookup.as_deref(),
                    stdout,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Inspect {
            markup,
            config,
            lookup,
        } => {
            commands::inspect::cmd_inspect(
                &markup,
                config.as_deref(),
                lookup.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Rules { config } => {
            commands::rules::cmd_rules(config.as_deref(), cli.output, cli.quiet);
        }
        Commands::Lookup {
            table,
            config,
            lookup,
        } => {
            commands::lookup::cmd_lookup(
                table,
                config.as_deref(),
                lookup.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Log to stderr. `FORMC_LOG` takes an `EnvFilter` directive; the default
/// is `warn`, and `--verbose` raises it to `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FORMC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Report an error message to stderr in the requested format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}

/// Report a structured compiler error and exit 1. JSON output carries the
/// error's own fields; text output the message alone.
pub(crate) fn fail_with(json: serde_json::Value, msg: &str, output: OutputFormat, quiet: bool) -> ! {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&json)
                .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\"")));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", msg);
            }
        }
    }
    process::exit(1);
}
