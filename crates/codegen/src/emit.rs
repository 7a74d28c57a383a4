//! Generation rules: walk the finished document and produce the statement
//! list of the generated form, with emission-time rules applied.
//!
//! Text layout is not decided here; see [`crate::python`].

use std::collections::HashSet;

use formc_core::{Disposition, Document, FormError, RuleEngine, Statement};

/// Widgets per grid row in a multi-field section.
pub const GROUP_COLUMNS: usize = 3;

/// The statements of the form body and what they contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub statements: Vec<Statement>,
    /// Sections emitted as rows.
    pub sections: usize,
    /// Emitted field names, in order.
    pub fields: Vec<String>,
    /// Sections a section rule dropped.
    pub dropped: usize,
    /// Sections left out without a rule: no label, no fields, or every
    /// field dropped.
    pub skipped: usize,
}

/// Apply emission-time rules to `doc` and build the statement list.
///
/// Sections run through the section rules first; a dropped section never
/// reaches the field rules. Fields keep their stored order.
pub fn emit_document(doc: &mut Document, engine: &mut RuleEngine) -> Result<Emission, FormError> {
    let mut out = Emission::default();
    let mut seen: HashSet<String> = HashSet::new();

    for section in doc.sections_mut() {
        if !section.is_complete() {
            tracing::debug!(
                line = section.provenance().line,
                "incomplete section skipped"
            );
            out.skipped += 1;
            continue;
        }
        if engine.on_emit_section(section)? == Disposition::Drop {
            out.dropped += 1;
            continue;
        }

        let mut block = Vec::new();
        let mut names = Vec::new();
        for field in section.fields_mut() {
            if engine.on_emit_field(field)? == Disposition::Drop {
                continue;
            }
            let name = field.render(&mut block).to_string();
            if !seen.insert(name.clone()) {
                return Err(FormError::model(&name, "emitted more than once"));
            }
            names.push(name);
        }

        match names.as_slice() {
            [] => {
                tracing::debug!(label = ?section.label(), "every field dropped; section skipped");
                out.skipped += 1;
                continue;
            }
            [only] => block.push(Statement::UseWidget { name: only.clone() }),
            many => {
                block.push(Statement::OpenGroup);
                for (i, name) in many.iter().enumerate() {
                    block.push(Statement::PlaceInGroup {
                        name: name.clone(),
                        row: i / GROUP_COLUMNS,
                        col: i % GROUP_COLUMNS,
                    });
                }
                block.push(Statement::CloseGroup);
            }
        }
        block.push(Statement::AddRow {
            caption: section.labels().to_vec(),
        });
        if engine.is_automatic(section) {
            block.push(Statement::MarkAutomatic);
        }

        out.statements.append(&mut block);
        out.sections += 1;
        out.fields.append(&mut names);
    }

    let emitted: Vec<&str> = out.fields.iter().map(String::as_str).collect();
    engine.missing_expected_fields(&emitted);

    tracing::info!(
        parsed = doc.len(),
        sections = out.sections,
        dropped = out.dropped,
        skipped = out.skipped,
        fields = out.fields.len(),
        "form emitted"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formc_core::{parse_document, Arg, ParseOptions, RuleTable, WidgetExpr};
    use formc_lookup::NoLookup;

    fn emit(src: &str) -> Result<Emission, FormError> {
        emit_with(src, RuleTable::default())
    }

    fn emit_with(src: &str, table: RuleTable) -> Result<Emission, FormError> {
        let mut engine = RuleEngine::new(table, Box::new(NoLookup)).unwrap();
        let mut doc = parse_document(src, "t.jsp", &ParseOptions::default(), &mut engine)?;
        emit_document(&mut doc, &mut engine)
    }

    fn row(label: &str, inputs: &str) -> String {
        format!(
            "<tr><td class=\"fieldName\">{}</td><td>{}</td></tr>\n",
            label, inputs
        )
    }

    fn text_inputs(names: &[&str]) -> String {
        names
            .iter()
            .map(|n| format!("<input type=\"text\" name=\"{}\">", n))
            .collect()
    }

    #[test]
    fn test_single_field_section_uses_widget_directly() {
        let e = emit(&row("Comments", &text_inputs(&["comments"]))).unwrap();
        assert_eq!(
            &e.statements[2..],
            &[
                Statement::UseWidget {
                    name: "comments".into()
                },
                Statement::AddRow {
                    caption: vec!["Comments".into()]
                },
            ]
        );
    }

    #[test]
    fn test_group_wraps_after_third_field() {
        let e = emit(&row("FOV", &text_inputs(&["a", "b", "c", "d"]))).unwrap();
        let places: Vec<(usize, usize)> = e
            .statements
            .iter()
            .filter_map(|s| match s {
                Statement::PlaceInGroup { row, col, .. } => Some((*row, *col)),
                _ => None,
            })
            .collect();
        assert_eq!(places, vec![(0, 0), (0, 1), (0, 2), (1, 0)]);
        assert!(e.statements.contains(&Statement::OpenGroup));
        assert!(e.statements.contains(&Statement::CloseGroup));
        assert_eq!(e.statements.last(), Some(&Statement::MarkAutomatic));
    }

    #[test]
    fn test_dropped_sections_are_not_counted() {
        let src = [
            row("Breast", &text_inputs(&["breast"])),
            row("Problems loading on AEGIS", &text_inputs(&["aegis"])),
            row("Comments", &text_inputs(&["comments"])),
        ]
        .concat();
        let e = emit(&src).unwrap();
        assert_eq!(e.sections, 2);
        assert_eq!(e.dropped, 1);
        assert_eq!(e.skipped, 0);
        assert_eq!(e.fields, vec!["breast", "comments"]);
    }

    #[test]
    fn test_section_with_every_field_dropped_emits_nothing() {
        let src = row("Old date", &text_inputs(&["mri_month", "mri_day", "mri_year"]));
        let e = emit(&src).unwrap();
        assert_eq!(e.sections, 0);
        assert_eq!(e.skipped, 1);
        assert!(e.statements.is_empty());
    }

    #[test]
    fn test_mri_date_keeps_only_injected_picker() {
        let src = row("MRI Date", &text_inputs(&["mri_month", "mri_day", "mri_year"]));
        let e = emit(&src).unwrap();
        assert_eq!(e.fields, vec!["mri_date"]);
        assert!(e.statements.contains(&Statement::UseWidget {
            name: "mri_date".into()
        }));
        assert_eq!(e.statements.last(), Some(&Statement::MarkAutomatic));
    }

    #[test]
    fn test_duplicate_emitted_name_is_model_error() {
        let src = [
            row("A", &text_inputs(&["x"])),
            row("B", &text_inputs(&["x"])),
        ]
        .concat();
        match emit(&src).unwrap_err() {
            FormError::ModelConsistency { name, .. } => assert_eq!(name, "x"),
            other => panic!("expected ModelConsistency, got {:?}", other),
        }
    }

    #[test]
    fn test_label_without_fields_is_skipped() {
        let src = [
            "<tr><td class=\"fieldName\">Heading only</td></tr>\n".to_string(),
            row("Breast", &text_inputs(&["breast"])),
        ]
        .concat();
        let e = emit(&src).unwrap();
        assert_eq!(e.sections, 1);
        assert_eq!(e.skipped, 1);
    }

    #[test]
    fn test_every_parsed_section_is_accounted_for() {
        let src = [
            "<tr><td class=\"fieldName\">Heading only</td></tr>\n".to_string(),
            row("Breast", &text_inputs(&["breast"])),
            row("Problems loading on AEGIS", &text_inputs(&["aegis"])),
            row("Old date", &text_inputs(&["mri_month"])),
            row("Comments", &text_inputs(&["comments"])),
        ]
        .concat();
        let mut engine = RuleEngine::new(RuleTable::default(), Box::new(NoLookup)).unwrap();
        let mut doc =
            parse_document(&src, "t.jsp", &ParseOptions::default(), &mut engine).unwrap();
        let e = emit_document(&mut doc, &mut engine).unwrap();
        assert_eq!(doc.len(), 5);
        assert_eq!((e.sections, e.dropped, e.skipped), (2, 1, 2));
        assert_eq!(e.sections, doc.len() - e.dropped - e.skipped);
    }

    #[test]
    fn test_checkbox_caption_decided_before_field_rules() {
        let src = row(
            "Flag",
            "<input type=\"checkbox\" name=\"flag\"><input type=\"text\" name=\"deviation_other_reason\">",
        );
        let e = emit(&src).unwrap();
        assert_eq!(e.fields, vec!["flag"]);
        assert!(e.statements.contains(&Statement::Construct {
            name: "flag".into(),
            expr: WidgetExpr::call("BCheckBox", vec![Arg::Str("flag".into()), Arg::Form]),
        }));
    }

    #[test]
    fn test_multiline_caption_kept_in_order() {
        let e = emit(
            "<td class=\"fieldName\">Scan Duration<br>(minutes)</td><td><input type=\"text\" name=\"scan_duration\"></td>",
        )
        .unwrap();
        assert!(e.statements.contains(&Statement::AddRow {
            caption: vec!["Scan Duration".into(), "(minutes)".into()]
        }));
    }
}
