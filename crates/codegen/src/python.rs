//! Python text for emitted statements.

use formc_core::{Arg, Statement, WidgetExpr};

/// Lays statements out one per line, each prefixed by `leader`.
pub struct PythonWriter<'a> {
    leader: &'a str,
}

impl<'a> PythonWriter<'a> {
    pub fn new(leader: &'a str) -> Self {
        PythonWriter { leader }
    }

    pub fn write_all(&self, statements: &[Statement], out: &mut String) {
        for stmt in statements {
            self.write(stmt, out);
        }
    }

    pub fn write(&self, stmt: &Statement, out: &mut String) {
        match stmt {
            Statement::Construct { name, expr } => {
                self.line(out, &format!("self.{} = {}", name, expr_text(expr)))
            }
            Statement::AddItems { name, items } => {
                let items: Vec<String> = items.iter().map(|i| quote(i)).collect();
                self.line(out, &format!("self.{}.addItems([{}])", name, items.join(", ")));
            }
            Statement::Register { name } => {
                self.line(out, &format!("self._fields['{}'] = self.{}", name, name))
            }
            Statement::UseWidget { name } => self.line(out, &format!("group = self.{}", name)),
            Statement::OpenGroup => {
                self.line(out, "group = QGroupBox()");
                self.line(out, "box = QGridLayout()");
            }
            Statement::PlaceInGroup { name, row, col } => {
                self.line(out, &format!("box.addWidget(self.{}, {}, {})", name, row, col))
            }
            Statement::CloseGroup => self.line(out, "group.setLayout(box)"),
            Statement::AddRow { caption } => {
                // one caption line per label, joined by an escaped newline
                let text: Vec<String> = caption.iter().map(|l| escape(l)).collect();
                self.line(
                    out,
                    &format!("self.outer.addRow(\"{}\", group)", text.join("\\n")),
                );
            }
            Statement::MarkAutomatic => {
                self.line(out, "self._mark_automatic(self.outer, group)")
            }
        }
    }

    fn line(&self, out: &mut String, text: &str) {
        out.push_str(self.leader);
        out.push_str(text);
        out.push('\n');
    }
}

fn expr_text(expr: &WidgetExpr) -> String {
    match expr {
        WidgetExpr::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(arg_text).collect();
            format!("{}({})", callee, args.join(", "))
        }
        WidgetExpr::Verbatim(text) => text.clone(),
    }
}

fn arg_text(arg: &Arg) -> String {
    match arg {
        Arg::Str(s) => quote(s),
        Arg::Int(n) => n.to_string(),
        Arg::Form => "self".to_string(),
        Arg::FormMember(m) => format!("self.{}", m),
        Arg::Keyword(k, v) => format!("{}={}", k, arg_text(v)),
    }
}

/// A double-quoted Python string literal.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

/// Escape `s` for use inside a double-quoted Python string literal.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use formc_core::Field;

    fn text_of(statements: &[Statement]) -> String {
        let mut out = String::new();
        PythonWriter::new("\t\t").write_all(statements, &mut out);
        out
    }

    fn rendered(field: &Field) -> String {
        let mut stmts = Vec::new();
        field.render(&mut stmts);
        text_of(&stmts)
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
        assert_eq!(escape("x\ty\nz\r"), "x\\ty\\nz\\r");
        assert_eq!(quote("plain"), "\"plain\"");
    }

    #[test]
    fn test_custom_checkbox_with_tag() {
        assert_eq!(
            rendered(&Field::custom_check_box("discrep3", "Late \"exam\"", Some(3))),
            "\t\tself.discrep3 = BCheckBox(\"Late \\\"exam\\\"\", self, 3)\n\
             \t\tself._fields['discrep3'] = self.discrep3\n"
        );
    }

    #[test]
    fn test_dynamic_select_reads_form_member() {
        assert_eq!(
            rendered(&Field::dynamic_select("site", "siteRecs")),
            "\t\tself.site = BSiteComboBox(data=self.siteRecs)\n\
             \t\tself._fields['site'] = self.site\n"
        );
    }

    #[test]
    fn test_date_triplet() {
        assert_eq!(
            rendered(&Field::date_triplet("mri_date")),
            "\t\tself.mri_date = BSmallDateWidget()\n\
             \t\tself._fields['mri_date'] = self.mri_date\n"
        );
    }

    #[test]
    fn test_select_items_are_quoted() {
        let field = Field::Select(formc_core::Select {
            name: "breast".into(),
            choices: vec!["L".into(), "R\"".into()],
        });
        assert_eq!(
            rendered(&field),
            "\t\tself.breast = BComboBox()\n\
             \t\tself.breast.addItems([\"L\", \"R\\\"\"])\n\
             \t\tself._fields['breast'] = self.breast\n"
        );
    }

    #[test]
    fn test_text_area() {
        let field = Field::TextArea(formc_core::TextArea {
            name: "comments".into(),
            rows: 4,
            cols: 60,
            wrap: true,
        });
        assert!(rendered(&field).starts_with("\t\tself.comments = BTextEdit(self, 4, 60)\n"));
    }

    #[test]
    fn test_group_block() {
        let text = text_of(&[
            Statement::OpenGroup,
            Statement::PlaceInGroup {
                name: "fov1".into(),
                row: 0,
                col: 0,
            },
            Statement::PlaceInGroup {
                name: "fov2".into(),
                row: 0,
                col: 1,
            },
            Statement::CloseGroup,
            Statement::AddRow {
                caption: vec!["FOV".into(), "(mm)".into()],
            },
            Statement::MarkAutomatic,
        ]);
        assert_eq!(
            text,
            "\t\tgroup = QGroupBox()\n\
             \t\tbox = QGridLayout()\n\
             \t\tbox.addWidget(self.fov1, 0, 0)\n\
             \t\tbox.addWidget(self.fov2, 0, 1)\n\
             \t\tgroup.setLayout(box)\n\
             \t\tself.outer.addRow(\"FOV\\n(mm)\", group)\n\
             \t\tself._mark_automatic(self.outer, group)\n"
        );
    }
}
