//! The rule table: which labels and field names trigger which rewrite.
//!
//! The table is data. [`RuleTable::default`] is the built-in table for the
//! ISPY-2 MRI receipt form; a config file may override any entry, and keys it
//! leaves out keep their built-in value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inject one checkbox per reason code when a section carries exactly this label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonSectionRule {
    pub label: String,
    /// Checkbox names are `<name_prefix><id>`.
    pub name_prefix: String,
    /// Reason ids never offered on the form.
    #[serde(default)]
    pub skip_ids: Vec<i64>,
}

/// Replace a section's field by a run-time-resolved combo box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSectionRule {
    pub label: String,
    pub field: String,
    pub source_key: String,
}

/// What to do when a select offers the same choice twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateChoices {
    /// Emit as written.
    Keep,
    /// Emit as written and log a warning.
    #[default]
    Warn,
    /// Fail the compilation.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleTable {
    /// Section label -> name of a date field injected when the label is seen.
    pub date_sections: BTreeMap<String, String>,
    pub reason_section: Option<ReasonSectionRule>,
    /// Section labels whose whole section is left out of the form.
    pub drop_sections: Vec<String>,
    pub dynamic_sections: Vec<DynamicSectionRule>,
    /// Section labels usually filled from the auxiliary input file.
    pub automatic_sections: Vec<String>,
    /// Field name -> replacement choice list, in display order.
    pub choice_overrides: BTreeMap<String, Vec<String>>,
    /// Field name -> replacement widget constructor for text lines.
    pub constructor_overrides: BTreeMap<String, String>,
    /// Field names left out of the form.
    pub drop_fields: Vec<String>,
    /// Field names matching this regular expression are left out of the form.
    pub drop_field_pattern: Option<String>,
    pub duplicate_choices: DuplicateChoices,
    /// Backing-store columns expected among the emitted fields; absences
    /// are reported as warnings.
    pub expected_fields: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleTable {
    fn default() -> Self {
        let date_sections = [
            ("MRI Date", "mri_date"),
            ("Report received date", "report_received"),
            ("Report returned to site", "report_returned"),
        ]
        .into_iter()
        .map(|(l, n)| (l.to_string(), n.to_string()))
        .collect();

        let choice_overrides = [(
            "visit_number".to_string(),
            strings(&[
                "1", "A3w", "A6w", "A12w", "B3w", "B6w", "B12w", "S1", "5", "2", "2.5", "3",
                "3.5", "4",
            ]),
        )]
        .into_iter()
        .collect();

        let int_entry = "BIntEdit()";
        let constructor_overrides = [
            ("deviation_late_exam_overdue", int_entry),
            ("pe_threshold", int_entry),
            ("fov1", int_entry),
            ("fov2", int_entry),
            ("scan_duration", "BNumEdit(p=5, s=2)"),
        ]
        .into_iter()
        .map(|(n, c)| (n.to_string(), c.to_string()))
        .collect();

        RuleTable {
            date_sections,
            reason_section: Some(ReasonSectionRule {
                label: "If not compliant, what was deviation?".to_string(),
                name_prefix: "discrep".to_string(),
                skip_ids: vec![7, 8, 11, 12],
            }),
            drop_sections: strings(&[
                "Special Handling necessary (header reading, other)",
                "Problems loading on AEGIS",
            ]),
            dynamic_sections: vec![DynamicSectionRule {
                label: "Site".to_string(),
                field: "site".to_string(),
                source_key: "siteRecs".to_string(),
            }],
            automatic_sections: strings(&[
                "ISPY-2 ID",
                "MRI Date",
                "Breast",
                "Site",
                "Tumor Volume Submitted",
                "Auto Timing",
                "Scan Duration",
                "PE Threshold Processed",
                "Background/Grey Threshold",
                "FOV",
            ]),
            choice_overrides,
            constructor_overrides,
            drop_fields: strings(&["deviation", "deviation_other_reason"]),
            drop_field_pattern: Some(
                r"^(mri|(report_(received|returned)))_(month|day|year)$".to_string(),
            ),
            duplicate_choices: DuplicateChoices::Warn,
            expected_fields: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_visit_numbers_in_order() {
        let t = RuleTable::default();
        let visits = &t.choice_overrides["visit_number"];
        assert_eq!(visits.len(), 14);
        assert_eq!(visits[0], "1");
        assert_eq!(visits[3], "A12w");
        assert_eq!(visits[13], "4");
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let t: RuleTable = serde_json::from_value(serde_json::json!({
            "drop_sections": ["Comments"],
            "duplicate_choices": "reject",
            "expected_fields": ["id"]
        }))
        .unwrap();
        assert_eq!(t.drop_sections, vec!["Comments"]);
        assert_eq!(t.duplicate_choices, DuplicateChoices::Reject);
        assert_eq!(t.expected_fields, vec!["id"]);
        assert_eq!(t.date_sections.get("MRI Date").unwrap(), "mri_date");
        assert!(t.reason_section.is_some());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let r: Result<RuleTable, _> =
            serde_json::from_value(serde_json::json!({ "drop_section": ["x"] }));
        assert!(r.is_err());
    }
}
