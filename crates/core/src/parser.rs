//! Structural parser: turns the token stream of one form document into a
//! [`Document`].
//!
//! The parser is a three-state machine over the tokens produced by
//! [`crate::lexer::lex`]:
//!
//! - `Idle`: between label cells.
//! - `InLabel`: inside a label cell; non-blank text becomes label lines.
//! - `InSelect`: inside a `<select>`; `<option>` tags add choices.
//!
//! A label cell (a `<td>` carrying the configured marker class) closes the
//! open section and opens the next one. Anything that does not fit the one
//! document shape the compiler knows is a shape violation.

use std::path::Path;

use crate::engine::RuleEngine;
use crate::error::FormError;
use crate::lexer::{lex, Attr, Spanned, Token};
use crate::model::{Document, Field, Provenance, Section, Select};

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Class attribute value that marks a label cell.
    pub label_class: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            label_class: "fieldName".to_string(),
        }
    }
}

enum State {
    Idle,
    InLabel,
    InSelect(Select, Provenance),
}

/// Parse `src` into a document, running label-known rules as labels are read.
pub fn parse_document(
    src: &str,
    file: &str,
    options: &ParseOptions,
    engine: &mut RuleEngine,
) -> Result<Document, FormError> {
    let tokens = lex(src, file)?;
    let mut parser = Parser {
        file,
        options,
        engine,
        doc: Document::new(file),
        open: None,
        state: State::Idle,
    };
    for Spanned { token, line } in tokens {
        parser.step(token, line)?;
    }
    tracing::debug!(
        file,
        sections = parser.doc.len(),
        fields = parser.doc.field_count(),
        "document parsed"
    );
    Ok(parser.doc)
}

/// Read the markup document at `path` fully into memory and parse it.
pub fn parse_file(
    path: &Path,
    options: &ParseOptions,
    engine: &mut RuleEngine,
) -> Result<Document, FormError> {
    let src = std::fs::read_to_string(path).map_err(|e| FormError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_document(&src, &path.display().to_string(), options, engine)
}

struct Parser<'a> {
    file: &'a str,
    options: &'a ParseOptions,
    engine: &'a mut RuleEngine,
    doc: Document,
    open: Option<Section>,
    state: State,
}

impl<'a> Parser<'a> {
    fn step(&mut self, token: Token, line: u32) -> Result<(), FormError> {
        let prov = Provenance::new(self.file, line);
        match token {
            Token::StartTag { name, attrs } => self.start_tag(&name, attrs, prov),
            Token::EndTag { name } => self.end_tag(&name, prov),
            Token::Text(text) => self.text(&text),
            Token::Eof => self.finish(prov),
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: Vec<Attr>, prov: Provenance) -> Result<(), FormError> {
        match tag {
            "td" if self.is_label_cell(&attrs) => {
                if let State::InSelect(select, _) = &self.state {
                    return Err(prov.err(format!(
                        "label cell inside select '{}'",
                        select.name
                    )));
                }
                self.close_section();
                tracing::debug!(line = prov.line, "section opened");
                self.open = Some(Section::new(prov));
                self.state = State::InLabel;
            }
            "input" => {
                let kind = attrs
                    .iter()
                    .find(|(n, _)| n == "type")
                    .and_then(|(_, v)| v.clone())
                    .ok_or_else(|| prov.err("input has no type"))?;
                match kind.as_str() {
                    "text" => {
                        let field = Field::text_line(attrs, &prov)?;
                        self.add_field(field, &prov)?;
                    }
                    "checkbox" => {
                        let field = Field::check_box(attrs, &prov)?;
                        self.add_field(field, &prov)?;
                    }
                    other => {
                        tracing::debug!(line = prov.line, kind = other, "input ignored");
                    }
                }
            }
            "textarea" => {
                let field = Field::text_area(attrs, &prov)?;
                self.add_field(field, &prov)?;
            }
            "select" => {
                if let State::InSelect(outer, _) = &self.state {
                    return Err(prov.err(format!("select nested inside select '{}'", outer.name)));
                }
                let select = Field::select(attrs, &prov)?;
                self.state = State::InSelect(select, prov);
            }
            "option" => {
                let State::InSelect(select, _) = &mut self.state else {
                    return Err(prov.err("option outside select"));
                };
                match attrs.into_iter().next() {
                    Some((n, Some(v))) if n == "value" => select.add_choice(v),
                    _ => {
                        return Err(prov.err(format!(
                            "option of '{}' does not start with a value",
                            select.name
                        )))
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: &str, prov: Provenance) -> Result<(), FormError> {
        match tag {
            "td" | "tr" | "table" => {
                if matches!(self.state, State::InLabel) {
                    self.state = State::Idle;
                }
            }
            "select" => match std::mem::replace(&mut self.state, State::Idle) {
                State::InSelect(select, opened) => {
                    tracing::debug!(field = %select.name, choices = select.choices.len(), "select closed");
                    self.add_field(Field::Select(select), &opened)?;
                }
                other => {
                    self.state = other;
                    return Err(prov.err("</select> without an open select"));
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), FormError> {
        if !matches!(self.state, State::InLabel) {
            return Ok(());
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        if let Some(section) = self.open.as_mut() {
            section.add_label(text);
            self.engine.on_label_known(section)?;
        }
        Ok(())
    }

    fn finish(&mut self, prov: Provenance) -> Result<(), FormError> {
        if let State::InSelect(select, opened) = &self.state {
            return Err(prov.err(format!(
                "select '{}' opened on line {} is never closed",
                select.name, opened.line
            )));
        }
        self.close_section();
        Ok(())
    }

    fn is_label_cell(&self, attrs: &[Attr]) -> bool {
        attrs.iter().any(|(n, v)| {
            n == "class"
                && v.as_deref()
                    .is_some_and(|v| v.split_whitespace().any(|c| c == self.options.label_class))
        })
    }

    fn add_field(&mut self, field: Field, prov: &Provenance) -> Result<(), FormError> {
        if matches!(self.state, State::InSelect(..)) {
            return Err(prov.err(format!("{} '{}' inside a select", field.kind(), field.name())));
        }
        let section = self
            .open
            .as_mut()
            .ok_or_else(|| prov.err(format!("{} '{}' before any label cell", field.kind(), field.name())))?;
        tracing::debug!(field = %field.name(), kind = field.kind(), "field added");
        section.add_field(field);
        Ok(())
    }

    fn close_section(&mut self) {
        if let Some(section) = self.open.take() {
            self.doc.push(section);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;
    use formc_lookup::{NoLookup, ReasonCode, StaticLookup};

    fn engine() -> RuleEngine {
        RuleEngine::new(RuleTable::default(), Box::new(NoLookup)).unwrap()
    }

    fn parse(src: &str) -> Result<Document, FormError> {
        parse_document(src, "t.jsp", &ParseOptions::default(), &mut engine())
    }

    fn summaries(doc: &Document) -> Vec<String> {
        doc.sections().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sections_in_source_order() {
        let doc = parse(
            r#"<html><body><table>
<tr><td class="fieldName">ISPY-2 ID</td>
<td><input type="text" name="ispy2_id" maxlength="16" size="10" value=""></td></tr>
<tr><td class="fieldName">Breast</td>
<td><select name="breast"><option value="L">Left<option value="R">Right</select></td></tr>
<tr><td class="fieldName">Comments<br>(free text)</td>
<td><textarea name="comments" rows="3" cols="40" wrap></textarea></td></tr>
</table></body></html>"#,
        )
        .unwrap();
        assert_eq!(
            summaries(&doc),
            vec![
                "ISPY-2 ID: Text(ispy2_id)",
                "Breast: Select(breast: L, R)",
                "Comments | (free text): TextArea(comments, 3x40)",
            ]
        );
        assert_eq!(doc.sections()[1].provenance().line, 4);
    }

    #[test]
    fn test_label_known_injection_precedes_inputs() {
        let doc = parse(
            r#"<table><tr><td class="fieldName">MRI Date</td><td>
<input type="text" name="mri_month" value=""><input type="text" name="mri_day" value="">
</td></tr></table>"#,
        )
        .unwrap();
        assert_eq!(
            summaries(&doc),
            vec!["MRI Date: Date(mri_date); Text(mri_month); Text(mri_day)"]
        );
    }

    #[test]
    fn test_reason_checkboxes_come_from_lookup() {
        let lookup = StaticLookup::with_rows(
            "rows",
            vec![
                ReasonCode {
                    id: 2,
                    description: "Wrong sequence".into(),
                },
                ReasonCode {
                    id: 8,
                    description: "skipped".into(),
                },
            ],
            vec![],
        );
        let mut engine = RuleEngine::new(RuleTable::default(), Box::new(lookup)).unwrap();
        let doc = parse_document(
            r#"<td class="fieldName">If not compliant, what was deviation?</td>
<td><input type="checkbox" name="deviation[]" value="1"></td>"#,
            "t.jsp",
            &ParseOptions::default(),
            &mut engine,
        )
        .unwrap();
        assert_eq!(
            summaries(&doc),
            vec!["If not compliant, what was deviation?: CustCheck(discrep2, Wrong sequence, 2); CheckBox(deviation)"]
        );
    }

    #[test]
    fn test_label_ends_at_cell_end_and_ignored_inputs() {
        let doc = parse(
            r#"<td class="fieldName">Auto Timing</td><td>not a label
<input type="checkbox" name="auto_timing"><input type="hidden" name="id" value="3">
<input type="submit" value="Save"></td>"#,
        )
        .unwrap();
        assert_eq!(summaries(&doc), vec!["Auto Timing: CheckBox(auto_timing)"]);
    }

    #[test]
    fn test_other_class_is_not_a_label() {
        let doc = parse(
            r#"<td class="fieldName">A</td><td class="header">B</td><td><input type="text" name="a"></td>"#,
        )
        .unwrap();
        assert_eq!(summaries(&doc), vec!["A: Text(a)"]);
    }

    #[test]
    fn test_custom_label_class() {
        let options = ParseOptions {
            label_class: "lbl".to_string(),
        };
        let doc = parse_document(
            r#"<td class="wide lbl">Site</td><td><input type="text" name="site"></td>"#,
            "t.jsp",
            &options,
            &mut engine(),
        )
        .unwrap();
        assert_eq!(summaries(&doc), vec!["Site: Text(site)"]);
    }

    #[test]
    fn test_embedded_quote_value_survives() {
        let doc = parse(
            r#"<td class="fieldName">Tumor Volume Submitted</td><td>
<input type="text" name="tumor_volume" value="5" cc"></td>"#,
        )
        .unwrap();
        match &doc.sections()[0].fields()[0] {
            Field::TextLine(t) => assert_eq!(t.value.as_deref(), Some("5cc\"")),
            other => panic!("expected TextLine, got {:?}", other),
        }
    }

    #[test]
    fn test_input_before_label_is_shape_error() {
        let err = parse(r#"<table><tr><td><input type="text" name="x"></td></tr></table>"#)
            .unwrap_err();
        assert!(matches!(err, FormError::Shape { line: 1, .. }));
        assert!(err.to_string().contains("before any label cell"));
    }

    #[test]
    fn test_option_outside_select_is_shape_error() {
        let err = parse(r#"<td class="fieldName">A</td><option value="1">"#).unwrap_err();
        assert!(err.to_string().contains("option outside select"));
    }

    #[test]
    fn test_option_without_value_is_shape_error() {
        let err = parse(
            r#"<td class="fieldName">A</td><select name="a"><option selected>x</select>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not start with a value"));
    }

    #[test]
    fn test_nested_select_is_shape_error() {
        let err = parse(
            r#"<td class="fieldName">A</td><select name="a"><select name="b"></select></select>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nested"));
    }

    #[test]
    fn test_unclosed_select_is_shape_error() {
        let err = parse("<td class=\"fieldName\">A</td>\n<select name=\"a\">\n<option value=\"1\">")
            .unwrap_err();
        assert!(err.to_string().contains("never closed"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_stray_select_end_is_shape_error() {
        let err = parse(r#"<td class="fieldName">A</td></select>"#).unwrap_err();
        assert!(err.to_string().contains("without an open select"));
    }

    #[test]
    fn test_other_input_kinds_are_skipped() {
        for kind in ["radio", "password", "image", "hidden", "submit"] {
            let src = format!(
                r#"<td class="fieldName">A</td><td><input type="text" name="a"><input type="{}" name="r"></td>"#,
                kind
            );
            let doc = parse(&src).unwrap();
            let names: Vec<&str> = doc.sections()[0].fields().iter().map(|f| f.name()).collect();
            assert_eq!(names, vec!["a"], "kind {}", kind);
        }
    }

    #[test]
    fn test_reason_section_without_lookup_is_fatal() {
        let err = parse(r#"<td class="fieldName">If not compliant, what was deviation?</td>"#)
            .unwrap_err();
        assert_eq!(err.kind(), "lookup");
    }

    #[test]
    fn test_parse_file_reports_missing_document() {
        let err = parse_file(
            Path::new("/nonexistent/form.jsp"),
            &ParseOptions::default(),
            &mut engine(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_trailing_section_flushed_at_end() {
        let doc = parse(r#"<td class="fieldName">FOV<td><input type="text" name="fov1">"#).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.field_count(), 1);
    }
}
