//! The structural model of a form: a [`Document`] of [`Section`]s, each
//! holding one or more [`Field`]s.
//!
//! Produced by the parser, rewritten by the rule engine, consumed by the
//! emitter. Nothing here is shared outside the document that owns it.

mod field;
mod section;

pub use field::{
    clean_name, is_identifier, CheckBox, CustomCheckBox, DateTriplet, DynamicSelect, Field,
    Select, TextArea, TextLine,
};
pub use section::{Document, Section};

use serde::Serialize;

use crate::error::FormError;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

/// Where in the markup a construct was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

impl Provenance {
    pub fn new(file: &str, line: u32) -> Self {
        Provenance {
            file: file.to_owned(),
            line,
        }
    }

    /// A shape violation located here.
    pub fn err(&self, message: impl Into<String>) -> FormError {
        FormError::shape(&self.file, self.line, message)
    }
}
