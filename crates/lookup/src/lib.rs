//! formc-lookup: the external data source consulted while compiling a form.
//!
//! The compiler needs one enumerated list at build time (reason codes for the
//! deviation section). The generated program needs the site list at run time;
//! it is exposed here so a configured source can be checked from the CLI.
//!
//! A [`LookupSource`] is acquired once before parsing and owned by the rule
//! engine for the whole compilation. Backends release their connection on
//! drop, so a failed compile never leaks it.

mod error;
mod record;
mod sqlite;
mod static_source;
mod traits;

pub use error::LookupError;
pub use record::{ReasonCode, SiteRecord};
pub use sqlite::{SqliteLookup, SqliteQueries};
pub use static_source::{NoLookup, StaticLookup};
pub use traits::LookupSource;
