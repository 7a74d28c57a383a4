//! `formc.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! input = "fixtures/ispy2.jsp"
//! header = "templates/header.py"
//! trailer = "templates/trailer.py"
//! output = "generated/ispy2_mri.py"
//!
//! [lookup]
//! kind = "sqlite"
//! path = "breastdb.sqlite"
//!
//! [rules]
//! duplicate_choices = "reject"
//! expected_fields = ["id"]
//! ```
//!
//! Relative paths are taken from the directory holding the config file.
//! Every key is optional; `[rules]` entries override single entries of the
//! built-in rule table.

use std::path::{Path, PathBuf};

use formc_core::RuleTable;
use formc_lookup::{
    LookupError, LookupSource, NoLookup, SqliteLookup, SqliteQueries, StaticLookup,
};
use serde::{Deserialize, Serialize};

/// Config file looked for in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG: &str = "formc.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FormcConfig {
    pub compile: CompileSettings,
    pub lookup: LookupSettings,
    pub rules: RuleTable,
}

/// `[compile]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CompileSettings {
    pub input: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub trailer: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Leader of every generated statement line.
    pub indent: String,
    /// Class value marking a label cell.
    pub label_class: String,
}

impl Default for CompileSettings {
    fn default() -> Self {
        CompileSettings {
            input: None,
            header: None,
            trailer: None,
            output: None,
            indent: "\t\t".to_string(),
            label_class: "fieldName".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LookupKind {
    Sqlite,
    Static,
    #[default]
    None,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LookupSettings {
    pub kind: LookupKind,
    pub path: Option<PathBuf>,
    pub reason_query: Option<String>,
    pub site_query: Option<String>,
}

/// A parsed config and the directory its relative paths hang off.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: FormcConfig,
    pub base_dir: PathBuf,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Load the config named by `--config`, or `formc.toml` in the working
/// directory if present, or the defaults.
///
/// Returns a human-readable error string on failure.
pub(crate) fn load(explicit: Option<&Path>) -> Result<LoadedConfig, String> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG);
            if !p.is_file() {
                tracing::debug!("no {} found; using defaults", DEFAULT_CONFIG);
                return Ok(LoadedConfig {
                    config: FormcConfig::default(),
                    base_dir: PathBuf::from("."),
                });
            }
            p
        }
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let config: FormcConfig = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    let base_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tracing::debug!(config = %path.display(), "configuration loaded");
    Ok(LoadedConfig { config, base_dir })
}

impl LoadedConfig {
    /// Resolve a path from the config file against its directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Pick a path: the command-line value as given, else the config value
    /// resolved against the config directory.
    pub fn pick(&self, flag: Option<&Path>, configured: Option<&PathBuf>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| configured.map(|p| self.resolve(p)))
    }

    fn queries(&self) -> SqliteQueries {
        let mut queries = SqliteQueries::default();
        if let Some(q) = &self.config.lookup.reason_query {
            queries.reason_query = q.clone();
        }
        if let Some(q) = &self.config.lookup.site_query {
            queries.site_query = q.clone();
        }
        queries
    }

    /// Open the lookup source. A `--lookup` path overrides the configured
    /// one; its kind follows from the extension (`.json` is static rows,
    /// anything else an SQLite database).
    pub fn open_lookup(&self, flag: Option<&Path>) -> Result<Box<dyn LookupSource>, LookupError> {
        let (kind, path) = match flag {
            Some(p) => {
                let kind = if p.extension().is_some_and(|e| e == "json") {
                    LookupKind::Static
                } else {
                    LookupKind::Sqlite
                };
                (kind, Some(p.to_path_buf()))
            }
            None => (
                self.config.lookup.kind,
                self.config.lookup.path.as_deref().map(|p| self.resolve(p)),
            ),
        };

        let need_path = || {
            path.clone().ok_or_else(|| LookupError::Config {
                message: format!("[lookup] kind = \"{:?}\" needs a path", kind).to_lowercase(),
            })
        };
        let source: Box<dyn LookupSource> = match kind {
            LookupKind::Sqlite => Box::new(SqliteLookup::open(&need_path()?, self.queries())?),
            LookupKind::Static => Box::new(StaticLookup::from_json_file(&need_path()?)?),
            LookupKind::None => Box::new(NoLookup),
        };
        tracing::debug!(lookup = source.name(), "lookup source opened");
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(toml_src: &str) -> LoadedConfig {
        LoadedConfig {
            config: toml::from_str(toml_src).unwrap(),
            base_dir: PathBuf::from("/srv/forms"),
        }
    }

    #[test]
    fn test_defaults_when_sections_absent() {
        let c = loaded("");
        assert_eq!(c.config.compile.indent, "\t\t");
        assert_eq!(c.config.compile.label_class, "fieldName");
        assert_eq!(c.config.lookup.kind, LookupKind::None);
        assert_eq!(c.config.rules, RuleTable::default());
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let c = loaded("[compile]\ninput = \"a/form.jsp\"\noutput = \"/abs/out.py\"\n");
        assert_eq!(
            c.pick(None, c.config.compile.input.as_ref()),
            Some(PathBuf::from("/srv/forms/a/form.jsp"))
        );
        assert_eq!(
            c.pick(None, c.config.compile.output.as_ref()),
            Some(PathBuf::from("/abs/out.py"))
        );
        assert_eq!(
            c.pick(Some(Path::new("b.jsp")), c.config.compile.input.as_ref()),
            Some(PathBuf::from("b.jsp"))
        );
    }

    #[test]
    fn test_rules_override_single_entries() {
        let c = loaded("[rules]\ndrop_sections = []\nduplicate_choices = \"reject\"\n");
        assert!(c.config.rules.drop_sections.is_empty());
        assert_eq!(
            c.config.rules.duplicate_choices,
            formc_core::DuplicateChoices::Reject
        );
        assert!(c.config.rules.date_sections.contains_key("MRI Date"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<FormcConfig>("[compile]\ninptu = \"x\"\n").is_err());
        assert!(toml::from_str::<FormcConfig>("[lokup]\n").is_err());
    }

    #[test]
    fn test_query_overrides() {
        let c = loaded("[lookup]\nkind = \"sqlite\"\nreason_query = \"SELECT 1, 'x'\"\n");
        let q = c.queries();
        assert_eq!(q.reason_query, "SELECT 1, 'x'");
        assert_eq!(q.site_query, SqliteQueries::default().site_query);
    }

    #[test]
    fn test_lookup_kind_needs_path() {
        let c = loaded("[lookup]\nkind = \"static\"\n");
        let err = c.open_lookup(None).err().unwrap();
        assert!(err.to_string().contains("needs a path"));
    }

    #[test]
    fn test_no_lookup_by_default() {
        let c = loaded("");
        let source = c.open_lookup(None).unwrap();
        assert_eq!(source.name(), "none");
    }
}
