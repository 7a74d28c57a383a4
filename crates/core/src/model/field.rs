//! Field variants and their construction from markup attributes.

use std::fmt;

use serde::Serialize;

use super::Provenance;
use crate::attrs::reconstruct_value;
use crate::error::FormError;
use crate::lexer::Attr;
use crate::stmt::{Arg, Statement, WidgetExpr};

// ──────────────────────────────────────────────
// Variant payloads
// ──────────────────────────────────────────────

/// `<input type="text">`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLine {
    pub name: String,
    pub max_length: Option<u32>,
    pub display_width: Option<u32>,
    /// Initial value written in the markup, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Replacement constructor expression set by a rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
}

/// `<textarea>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextArea {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub wrap: bool,
}

/// `<input type="checkbox">`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckBox {
    pub name: String,
    /// Whether the box carries its own name as a caption.
    pub show_label: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A checkbox injected by a rule, with a caption that differs from its name
/// and an optional tag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomCheckBox {
    pub name: String,
    pub label: String,
    pub tag_value: Option<i64>,
}

/// `<select>` with the choices of its `<option>` children, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Select {
    pub name: String,
    pub choices: Vec<String>,
}

impl Select {
    pub fn add_choice(&mut self, choice: impl Into<String>) {
        self.choices.push(choice.into());
    }

    pub fn replace_choices(&mut self, choices: &[String]) {
        self.choices = choices.to_vec();
    }

    /// Choices that occur more than once, each reported once, in first-seen order.
    pub fn duplicate_choices(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups: Vec<&str> = Vec::new();
        for c in &self.choices {
            if !seen.insert(c.as_str()) && !dups.contains(&c.as_str()) {
                dups.push(c);
            }
        }
        dups
    }
}

/// A day/month/year date picker. Never parsed from markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTriplet {
    pub name: String,
}

/// A combo box whose choices the generated program reads at run time from
/// the form member named `source_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicSelect {
    pub name: String,
    pub source_key: String,
}

// ──────────────────────────────────────────────
// Field
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Field {
    TextLine(TextLine),
    TextArea(TextArea),
    CheckBox(CheckBox),
    CustomCheckBox(CustomCheckBox),
    Select(Select),
    DateTriplet(DateTriplet),
    DynamicSelect(DynamicSelect),
}

impl Field {
    /// Build a text line from the attributes of an `<input type="text">`.
    pub fn text_line(attrs: Vec<Attr>, prov: &Provenance) -> Result<Field, FormError> {
        let (rest, value) = reconstruct_value(attrs);
        let mut name = None;
        let mut max_length = None;
        let mut display_width = None;
        for (attr, v) in rest {
            match attr.as_str() {
                "type" => expect_type(v, "text", prov)?,
                "name" => name = Some(required(&attr, v, prov)?),
                "maxlength" => max_length = Some(parse_count(&attr, v, prov)?),
                "size" => display_width = Some(parse_count(&attr, v, prov)?),
                _ => return Err(unexpected(&attr, "text input", prov)),
            }
        }
        Ok(Field::TextLine(TextLine {
            name: field_name(name, "text input", prov)?,
            max_length,
            display_width,
            value,
            constructor: None,
        }))
    }

    /// Build a text area from the attributes of a `<textarea>`.
    pub fn text_area(attrs: Vec<Attr>, prov: &Provenance) -> Result<Field, FormError> {
        let (rest, _) = reconstruct_value(attrs);
        let mut name = None;
        let mut rows = None;
        let mut cols = None;
        let mut wrap = false;
        for (attr, v) in rest {
            match attr.as_str() {
                "name" => name = Some(required(&attr, v, prov)?),
                "rows" => rows = Some(parse_count(&attr, v, prov)?),
                "cols" => cols = Some(parse_count(&attr, v, prov)?),
                "wrap" => wrap = true,
                _ => return Err(unexpected(&attr, "text area", prov)),
            }
        }
        let name = field_name(name, "text area", prov)?;
        let rows = rows.ok_or_else(|| prov.err(format!("text area '{}' has no rows", name)))?;
        let cols = cols.ok_or_else(|| prov.err(format!("text area '{}' has no cols", name)))?;
        Ok(Field::TextArea(TextArea {
            name,
            rows,
            cols,
            wrap,
        }))
    }

    /// Build a checkbox from the attributes of an `<input type="checkbox">`.
    pub fn check_box(attrs: Vec<Attr>, prov: &Provenance) -> Result<Field, FormError> {
        let (rest, value) = reconstruct_value(attrs);
        let mut name = None;
        for (attr, v) in rest {
            match attr.as_str() {
                "type" => expect_type(v, "checkbox", prov)?,
                "name" => name = Some(required(&attr, v, prov)?),
                _ => return Err(unexpected(&attr, "checkbox", prov)),
            }
        }
        Ok(Field::CheckBox(CheckBox {
            name: field_name(name, "checkbox", prov)?,
            show_label: true,
            value,
        }))
    }

    /// Build an empty select from the attributes of a `<select>`.
    pub fn select(attrs: Vec<Attr>, prov: &Provenance) -> Result<Select, FormError> {
        let (rest, _) = reconstruct_value(attrs);
        let mut name = None;
        for (attr, v) in rest {
            match attr.as_str() {
                "name" => name = Some(required(&attr, v, prov)?),
                _ => return Err(unexpected(&attr, "select", prov)),
            }
        }
        Ok(Select {
            name: field_name(name, "select", prov)?,
            choices: Vec::new(),
        })
    }

    pub fn custom_check_box(name: &str, label: &str, tag_value: Option<i64>) -> Field {
        Field::CustomCheckBox(CustomCheckBox {
            name: name.to_string(),
            label: label.to_string(),
            tag_value,
        })
    }

    pub fn date_triplet(name: &str) -> Field {
        Field::DateTriplet(DateTriplet {
            name: name.to_string(),
        })
    }

    pub fn dynamic_select(name: &str, source_key: &str) -> Field {
        Field::DynamicSelect(DynamicSelect {
            name: name.to_string(),
            source_key: source_key.to_string(),
        })
    }

    /// Canonical name: the backing-store column and the generated member name.
    pub fn name(&self) -> &str {
        match self {
            Field::TextLine(f) => &f.name,
            Field::TextArea(f) => &f.name,
            Field::CheckBox(f) => &f.name,
            Field::CustomCheckBox(f) => &f.name,
            Field::Select(f) => &f.name,
            Field::DateTriplet(f) => &f.name,
            Field::DynamicSelect(f) => &f.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Field::TextLine(_) => "TextLine",
            Field::TextArea(_) => "TextArea",
            Field::CheckBox(_) => "CheckBox",
            Field::CustomCheckBox(_) => "CustomCheckBox",
            Field::Select(_) => "Select",
            Field::DateTriplet(_) => "DateTriplet",
            Field::DynamicSelect(_) => "DynamicSelect",
        }
    }

    /// Push the statements that construct and register this field's widget,
    /// and return the field's name.
    pub fn render(&self, out: &mut Vec<Statement>) -> &str {
        let name = self.name();
        let expr = match self {
            Field::TextLine(f) => match &f.constructor {
                Some(ctor) => WidgetExpr::Verbatim(ctor.clone()),
                None => WidgetExpr::call("BLineEdit", vec![]),
            },
            Field::TextArea(f) => WidgetExpr::call(
                "BTextEdit",
                vec![Arg::Form, Arg::Int(f.rows.into()), Arg::Int(f.cols.into())],
            ),
            Field::CheckBox(f) => {
                if f.show_label {
                    WidgetExpr::call("BCheckBox", vec![Arg::Str(f.name.clone()), Arg::Form])
                } else {
                    WidgetExpr::call("BCheckBox", vec![Arg::Form])
                }
            }
            Field::CustomCheckBox(f) => {
                let mut args = vec![Arg::Str(f.label.clone()), Arg::Form];
                if let Some(tag) = f.tag_value {
                    args.push(Arg::Int(tag));
                }
                WidgetExpr::call("BCheckBox", args)
            }
            Field::Select(_) => WidgetExpr::call("BComboBox", vec![]),
            Field::DateTriplet(_) => WidgetExpr::call("BSmallDateWidget", vec![]),
            Field::DynamicSelect(f) => WidgetExpr::call(
                "BSiteComboBox",
                vec![Arg::Keyword(
                    "data".to_string(),
                    Box::new(Arg::FormMember(f.source_key.clone())),
                )],
            ),
        };
        out.push(Statement::Construct {
            name: name.to_string(),
            expr,
        });
        if let Field::Select(f) = self {
            out.push(Statement::AddItems {
                name: name.to_string(),
                items: f.choices.clone(),
            });
        }
        out.push(Statement::Register {
            name: name.to_string(),
        });
        name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::TextLine(t) => write!(f, "Text({})", t.name),
            Field::TextArea(t) => write!(f, "TextArea({}, {}x{})", t.name, t.rows, t.cols),
            Field::CheckBox(c) => write!(f, "CheckBox({})", c.name),
            Field::CustomCheckBox(c) => match c.tag_value {
                Some(tag) => write!(f, "CustCheck({}, {}, {})", c.name, c.label, tag),
                None => write!(f, "CustCheck({}, {})", c.name, c.label),
            },
            Field::Select(s) => write!(f, "Select({}: {})", s.name, s.choices.join(", ")),
            Field::DateTriplet(d) => write!(f, "Date({})", d.name),
            Field::DynamicSelect(d) => write!(f, "DynCombo({}, {})", d.name, d.source_key),
        }
    }
}

// ──────────────────────────────────────────────
// Attribute helpers
// ──────────────────────────────────────────────

/// Strip a trailing `[]` array marker.
pub fn clean_name(raw: &str) -> &str {
    raw.strip_suffix("[]").unwrap_or(raw)
}

/// True for names usable as members of the generated program.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn field_name(raw: Option<String>, what: &str, prov: &Provenance) -> Result<String, FormError> {
    let raw = raw.ok_or_else(|| prov.err(format!("{} has no name", what)))?;
    let name = clean_name(&raw);
    if !is_identifier(name) {
        return Err(prov.err(format!("{} name '{}' is not an identifier", what, raw)));
    }
    Ok(name.to_string())
}

fn expect_type(v: Option<String>, expected: &str, prov: &Provenance) -> Result<(), FormError> {
    if v.as_deref() == Some(expected) {
        Ok(())
    } else {
        Err(prov.err(format!(
            "expected type=\"{}\", got {:?}",
            expected,
            v.unwrap_or_default()
        )))
    }
}

fn required(attr: &str, v: Option<String>, prov: &Provenance) -> Result<String, FormError> {
    v.ok_or_else(|| prov.err(format!("attribute '{}' has no value", attr)))
}

fn parse_count(attr: &str, v: Option<String>, prov: &Provenance) -> Result<u32, FormError> {
    let v = required(attr, v, prov)?;
    v.trim()
        .parse::<u32>()
        .map_err(|_| prov.err(format!("attribute '{}' is not a count: {:?}", attr, v)))
}

fn unexpected(attr: &str, what: &str, prov: &Provenance) -> FormError {
    prov.err(format!("unexpected attribute '{}' on {}", attr, what))
}
