//! The rule engine: applies the [`RuleTable`] to sections and fields.
//!
//! Rules run at two points. [`RuleEngine::on_label_known`] runs from the
//! parser as soon as a section's first label line is read, before any of the
//! section's inputs have been seen; it may only add fields. The `on_emit_*`
//! hooks run from the emitter over the finished document, sections first and
//! then each surviving field, in document order.

use formc_lookup::LookupSource;
use regex::Regex;

use crate::error::FormError;
use crate::model::{Field, Section};
use crate::rules::{DuplicateChoices, RuleTable};

/// Whether a section or field survives into the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Drop,
}

pub struct RuleEngine {
    table: RuleTable,
    drop_pattern: Option<Regex>,
    lookup: Box<dyn LookupSource>,
}

impl RuleEngine {
    /// Build an engine around `table`, taking ownership of the lookup source
    /// for the engine's lifetime.
    pub fn new(table: RuleTable, lookup: Box<dyn LookupSource>) -> Result<Self, FormError> {
        let drop_pattern = table
            .drop_field_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| FormError::Rules(format!("drop_field_pattern: {}", e)))?;
        for name in table.constructor_overrides.keys() {
            if table.choice_overrides.contains_key(name) {
                return Err(FormError::Rules(format!(
                    "field '{}' has both a choice override and a constructor override",
                    name
                )));
            }
        }
        tracing::debug!(lookup = lookup.name(), "rule engine ready");
        Ok(RuleEngine {
            table,
            drop_pattern,
            lookup,
        })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Section-label rules. Fires once per section, on its first label line.
    pub fn on_label_known(&mut self, section: &mut Section) -> Result<(), FormError> {
        if section.labels().len() != 1 {
            return Ok(());
        }
        let label = section.labels()[0].clone();

        if let Some(rule) = &self.table.reason_section {
            if rule.label == label {
                let codes = self.lookup.reason_codes()?;
                let mut injected = 0usize;
                for code in codes {
                    if rule.skip_ids.contains(&code.id) {
                        continue;
                    }
                    let name = format!("{}{}", rule.name_prefix, code.id);
                    section.add_field(Field::custom_check_box(
                        &name,
                        &code.description,
                        Some(code.id),
                    ));
                    injected += 1;
                }
                tracing::debug!(label = %label, injected, "reason-code checkboxes");
                return Ok(());
            }
        }

        if let Some(name) = self.table.date_sections.get(&label) {
            tracing::debug!(label = %label, field = %name, "date field injected");
            section.add_field(Field::date_triplet(name));
        }
        Ok(())
    }

    /// Section-level rules at emission time. May rewrite the section's
    /// fields in place; returns whether the section is emitted at all.
    pub fn on_emit_section(&mut self, section: &mut Section) -> Result<Disposition, FormError> {
        let Some(label) = section.label().map(str::to_owned) else {
            return Ok(Disposition::Keep);
        };

        if section.field_count() == 1 {
            if let Field::CheckBox(cb) = &mut section.fields_mut()[0] {
                // the row caption already says what the box means
                cb.show_label = false;
            }
        }

        if let Some(rule) = self.table.dynamic_sections.iter().find(|r| r.label == label) {
            section.replace(
                &rule.field,
                Field::dynamic_select(&rule.field, &rule.source_key),
            )?;
            tracing::debug!(label = %label, field = %rule.field, "run-time combo box");
            return Ok(Disposition::Keep);
        }

        if self.table.drop_sections.contains(&label) {
            tracing::debug!(label = %label, "section dropped");
            return Ok(Disposition::Drop);
        }
        Ok(Disposition::Keep)
    }

    /// True when the section's content can usually be read from the
    /// auxiliary input file.
    pub fn is_automatic(&self, section: &Section) -> bool {
        section
            .label()
            .is_some_and(|l| self.table.automatic_sections.iter().any(|a| a == l))
    }

    /// Field-level rules at emission time. May rewrite the field in place;
    /// returns whether the field is emitted.
    pub fn on_emit_field(&self, field: &mut Field) -> Result<Disposition, FormError> {
        let name = field.name().to_string();

        if let Some(choices) = self.table.choice_overrides.get(&name) {
            match field {
                Field::Select(s) => s.replace_choices(choices),
                other => {
                    return Err(FormError::model(
                        &name,
                        format!("choice override targets a {} field", other.kind()),
                    ))
                }
            }
            self.check_choices(field)?;
            return Ok(Disposition::Keep);
        }

        if let Some(ctor) = self.table.constructor_overrides.get(&name) {
            match field {
                Field::TextLine(t) => t.constructor = Some(ctor.clone()),
                other => {
                    return Err(FormError::model(
                        &name,
                        format!("constructor override targets a {} field", other.kind()),
                    ))
                }
            }
            return Ok(Disposition::Keep);
        }

        let pattern_hit = self
            .drop_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(&name));
        if pattern_hit || self.table.drop_fields.contains(&name) {
            tracing::debug!(field = %name, "field dropped");
            return Ok(Disposition::Drop);
        }

        self.check_choices(field)?;
        Ok(Disposition::Keep)
    }

    fn check_choices(&self, field: &Field) -> Result<(), FormError> {
        let Field::Select(select) = field else {
            return Ok(());
        };
        let dups = select.duplicate_choices();
        if dups.is_empty() {
            return Ok(());
        }
        match self.table.duplicate_choices {
            DuplicateChoices::Keep => Ok(()),
            DuplicateChoices::Warn => {
                tracing::warn!(field = %select.name, duplicates = ?dups, "select offers duplicate choices");
                Ok(())
            }
            DuplicateChoices::Reject => Err(FormError::model(
                &select.name,
                format!("duplicate choices {:?}", dups),
            )),
        }
    }

    /// Report expected backing-store fields that no emitted field provides.
    pub fn missing_expected_fields(&self, emitted: &[&str]) -> Vec<String> {
        let missing: Vec<String> = self
            .table
            .expected_fields
            .iter()
            .filter(|f| !emitted.contains(&f.as_str()))
            .cloned()
            .collect();
        for name in &missing {
            tracing::warn!(field = %name, "expected field is not on the generated form");
        }
        missing
    }
}
