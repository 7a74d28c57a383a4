/// All errors that can be returned by a [`LookupSource`](crate::LookupSource).
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The data source could not be opened.
    #[error("cannot connect to lookup source '{source_name}': {message}")]
    Connect {
        source_name: String,
        message: String,
    },

    /// A query failed to prepare or execute.
    #[error("lookup query failed ({query}): {message}")]
    Query { query: String, message: String },

    /// A returned row did not have the expected shape.
    #[error("unexpected row from lookup query ({query}): {message}")]
    Row { query: String, message: String },

    /// No usable source is configured for the requested data.
    #[error("lookup source not configured: {message}")]
    Config { message: String },
}
