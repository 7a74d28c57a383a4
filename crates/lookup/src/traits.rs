use crate::error::LookupError;
use crate::record::{ReasonCode, SiteRecord};

/// A source of externally enumerated rows.
///
/// Rows are returned in source order; callers rely on that order being
/// stable so that generated output is reproducible.
///
/// Methods take `&mut self` because a backend may hold a single live
/// connection. Implementations release that connection when dropped.
pub trait LookupSource {
    /// Human-readable name of the source, used in diagnostics.
    fn name(&self) -> &str;

    /// Enumerate reason codes as `(id, description)` rows.
    fn reason_codes(&mut self) -> Result<Vec<ReasonCode>, LookupError>;

    /// Enumerate sites as `(internal_id, site_id, site_name)` rows.
    fn sites(&mut self) -> Result<Vec<SiteRecord>, LookupError>;
}
