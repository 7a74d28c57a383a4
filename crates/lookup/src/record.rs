use serde::{Deserialize, Serialize};

/// One enumerated reason code, e.g. a protocol-deviation reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCode {
    pub id: i64,
    pub description: String,
}

/// One study site as consumed by the generated program's site selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Key used when writing to the backing store.
    pub internal_id: i64,
    /// Externally visible site number.
    pub site_id: i64,
    pub site_name: String,
}
