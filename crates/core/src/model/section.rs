use std::fmt;

use serde::Serialize;

use super::{Field, Provenance};
use crate::error::FormError;

/// One labelled row of the form: label lines on the left, fields on the right.
///
/// A section with no labels or no fields is still being built and is never
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    labels: Vec<String>,
    fields: Vec<Field>,
    prov: Provenance,
}

impl Section {
    pub fn new(prov: Provenance) -> Self {
        Section {
            labels: Vec::new(),
            fields: Vec::new(),
            prov,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The first label line; rules key on it.
    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn provenance(&self) -> &Provenance {
        &self.prov
    }

    /// Append a label line, trimmed.
    pub fn add_label(&mut self, text: &str) {
        self.labels.push(text.trim().to_string());
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Replace the field called `name` by `field`, keeping its position.
    ///
    /// A missing `name` means a rule targets a field the section does not
    /// have, which is an error.
    pub fn replace(&mut self, name: &str, field: Field) -> Result<(), FormError> {
        let slot = self
            .fields
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| {
                FormError::model(
                    name,
                    format!(
                        "no such field in section '{}' (line {})",
                        self.labels.join(" | "),
                        self.prov.line
                    ),
                )
            })?;
        *slot = field;
        Ok(())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_complete(&self) -> bool {
        !self.labels.is_empty() && !self.fields.is_empty()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.labels.join(" | "))?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// The sections of one markup document, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub file: String,
    sections: Vec<Section>,
}

impl Document {
    pub fn new(file: &str) -> Self {
        Document {
            file: file.to_owned(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(Section::field_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_with(names: &[&str]) -> Section {
        let mut s = Section::new(Provenance::new("t.jsp", 1));
        s.add_label("Scan");
        for n in names {
            s.add_field(Field::date_triplet(n));
        }
        s
    }

    fn names(s: &Section) -> Vec<&str> {
        s.fields().iter().map(Field::name).collect()
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut s = section_with(&["a", "b", "c"]);
        s.replace("b", Field::dynamic_select("b", "recs")).unwrap();
        assert_eq!(names(&s), vec!["a", "b", "c"]);
        assert_eq!(s.fields()[1].kind(), "DynamicSelect");
        assert_eq!(s.fields()[0].kind(), "DateTriplet");
        assert_eq!(s.fields()[2].kind(), "DateTriplet");
    }

    #[test]
    fn test_replace_missing_name_fails() {
        let mut s = section_with(&["a"]);
        let err = s.replace("site", Field::date_triplet("site")).unwrap_err();
        match err {
            FormError::ModelConsistency { name, .. } => assert_eq!(name, "site"),
            other => panic!("expected ModelConsistency, got {:?}", other),
        }
        assert_eq!(names(&s), vec!["a"]);
    }

    #[test]
    fn test_labels_trimmed_and_completeness() {
        let mut s = Section::new(Provenance::new("t.jsp", 1));
        assert!(!s.is_complete());
        s.add_label("  MRI Date \n");
        assert_eq!(s.label(), Some("MRI Date"));
        assert!(!s.is_complete());
        s.add_field(Field::date_triplet("mri_date"));
        assert!(s.is_complete());
        assert_eq!(s.field_count(), 1);
    }

    #[test]
    fn test_display() {
        let mut s = section_with(&["x", "y"]);
        s.add_label("second");
        assert_eq!(s.to_string(), "Scan | second: Date(x); Date(y)");
    }

    #[test]
    fn test_document_counts() {
        let mut d = Document::new("t.jsp");
        assert!(d.is_empty());
        d.push(section_with(&["a", "b"]));
        d.push(section_with(&["c"]));
        assert_eq!(d.len(), 2);
        assert_eq!(d.field_count(), 3);
    }
}
