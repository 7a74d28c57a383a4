use formc_core::FormError;

/// Error type for code generation.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The model or rule table is inconsistent.
    #[error(transparent)]
    Model(#[from] FormError),

    /// A header or trailer template could not be read.
    #[error("template '{path}': {message}")]
    Template { path: String, message: String },

    /// The generated program could not be written.
    #[error("cannot write '{path}': {message}")]
    Write { path: String, message: String },
}

impl EmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            EmitError::Model(e) => e.kind(),
            EmitError::Template { .. } => "template",
            EmitError::Write { .. } => "write",
        }
    }

    /// JSON form for `--output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            EmitError::Model(e) => e.to_json_value(),
            EmitError::Template { path, message } | EmitError::Write { path, message } => {
                serde_json::json!({
                    "kind":    self.kind(),
                    "file":    path,
                    "line":    null,
                    "name":    null,
                    "message": message,
                })
            }
        }
    }
}
