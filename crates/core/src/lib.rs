#![allow(clippy::result_large_err)]
//! formc-core: reads a legacy markup form definition and builds the
//! structural model the code generator works from.
//!
//! # Public API
//!
//! - [`parse_document()`] / [`parse_file()`] -- markup to [`Document`]
//! - [`RuleEngine`] -- applies a [`RuleTable`] during parsing and emission
//! - [`FormError`] -- every fatal condition of a compilation
//! - Model types: [`Document`], [`Section`], [`Field`] and its variants
//! - Emission statements: [`Statement`], [`WidgetExpr`], [`Arg`]

pub mod attrs;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod rules;
pub mod stmt;

// ── Convenience re-exports ───────────────────────────────────────────

pub use engine::{Disposition, RuleEngine};
pub use error::FormError;
pub use model::{
    CheckBox, CustomCheckBox, DateTriplet, Document, DynamicSelect, Field, Provenance, Section,
    Select, TextArea, TextLine,
};
pub use parser::{parse_document, parse_file, ParseOptions};
pub use rules::{DuplicateChoices, DynamicSectionRule, ReasonSectionRule, RuleTable};
pub use stmt::{Arg, Statement, WidgetExpr};
