use formc_lookup::LookupError;

/// A compilation error. Every variant is fatal: compilation stops and no
/// output is written.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The markup does not have the single document shape the compiler
    /// understands (unknown attribute, unexpected nesting, missing token).
    #[error("{file}:{line}: {message}")]
    Shape {
        file: String,
        line: u32,
        message: String,
    },

    /// A rule or the emitter referenced a field that is not where it was
    /// expected, or two emitted fields share a name.
    #[error("field '{name}': {message}")]
    ModelConsistency { name: String, message: String },

    /// The lookup source could not be reached or a query failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The rule table itself is invalid.
    #[error("invalid rule table: {0}")]
    Rules(String),

    /// An input file could not be read.
    #[error("cannot read '{path}': {message}")]
    Io { path: String, message: String },
}

impl FormError {
    pub fn shape(file: &str, line: u32, message: impl Into<String>) -> Self {
        FormError::Shape {
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn model(name: &str, message: impl Into<String>) -> Self {
        FormError::ModelConsistency {
            name: name.to_owned(),
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            FormError::Shape { .. } => "shape",
            FormError::ModelConsistency { .. } => "model",
            FormError::Lookup(_) => "lookup",
            FormError::Rules(_) => "rules",
            FormError::Io { .. } => "io",
        }
    }

    /// Serialize to a JSON object for machine-readable error output.
    /// Fields that do not apply to the variant are `null`.
    pub fn to_json_value(&self) -> serde_json::Value {
        let (file, line, name) = match self {
            FormError::Shape { file, line, .. } => (Some(file.as_str()), Some(*line), None),
            FormError::ModelConsistency { name, .. } => (None, None, Some(name.as_str())),
            FormError::Io { path, .. } => (Some(path.as_str()), None, None),
            FormError::Lookup(_) | FormError::Rules(_) => (None, None, None),
        };
        serde_json::json!({
            "kind":    self.kind(),
            "file":    file,
            "line":    line,
            "name":    name,
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display_has_location() {
        let e = FormError::shape("form.jsp", 12, "unexpected <option> outside <select>");
        assert_eq!(
            e.to_string(),
            "form.jsp:12: unexpected <option> outside <select>"
        );
        assert_eq!(e.kind(), "shape");
    }

    #[test]
    fn test_model_json_carries_name() {
        let e = FormError::model("site", "no such field in section");
        let v = e.to_json_value();
        assert_eq!(v["kind"], "model");
        assert_eq!(v["name"], "site");
        assert!(v["file"].is_null());
    }

    #[test]
    fn test_lookup_error_converts() {
        let e: FormError = LookupError::Config {
            message: "nothing configured".to_string(),
        }
        .into();
        assert_eq!(e.kind(), "lookup");
        assert!(e.to_string().contains("nothing configured"));
    }
}
