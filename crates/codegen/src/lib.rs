//! formc-codegen: turns a parsed form [`Document`] into the source of a
//! Python/PySide form program.
//!
//! Generation is split in two: [`emit`] applies the emission-time rules and
//! produces structured statements, [`python`] lays them out as text. The
//! whole program is assembled in memory; [`write_atomic`] puts it on disk.

pub mod emit;
pub mod error;
pub mod output;
pub mod python;
pub mod template;

pub use emit::{emit_document, Emission, GROUP_COLUMNS};
pub use error::EmitError;
pub use output::write_atomic;
pub use python::PythonWriter;
pub use template::Templates;

use formc_core::{Document, RuleEngine};

/// Layout settings of the generated program.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Prefix of every generated statement line.
    pub indent: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            indent: "\t\t".to_string(),
        }
    }
}

/// A complete generated program.
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub sections: usize,
    pub fields: usize,
}

/// Generate the program text for `doc`: header, one block per surviving
/// section, trailer.
pub fn generate(
    doc: &mut Document,
    engine: &mut RuleEngine,
    templates: &Templates,
    config: &GenerateConfig,
) -> Result<Generated, EmitError> {
    let emission = emit_document(doc, engine)?;

    let mut text = String::new();
    templates.write_header(&mut text);
    PythonWriter::new(&config.indent).write_all(&emission.statements, &mut text);
    templates.write_trailer(&mut text);

    Ok(Generated {
        text,
        sections: emission.sections,
        fields: emission.fields.len(),
    })
}
