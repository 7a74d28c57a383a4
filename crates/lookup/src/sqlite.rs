//! SQLite-backed lookup source.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::record::{ReasonCode, SiteRecord};
use crate::traits::LookupSource;

/// The SQL run against the database for each kind of lookup.
///
/// Each query must return columns in the documented order; extra columns
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteQueries {
    /// Columns: `id INTEGER, description TEXT`.
    pub reason_query: String,
    /// Columns: `internal_id INTEGER, site_id INTEGER, site_name TEXT`.
    pub site_query: String,
}

impl Default for SqliteQueries {
    fn default() -> Self {
        SqliteQueries {
            reason_query:
                "SELECT id, deviation FROM ispy2_deviation_reason ORDER BY position ASC".to_string(),
            site_query: "SELECT id, site, name FROM ispy2_sites ORDER BY name ASC".to_string(),
        }
    }
}

/// A lookup source holding one open, read-only SQLite connection.
///
/// The connection is closed when the value is dropped.
pub struct SqliteLookup {
    name: String,
    conn: Connection,
    queries: SqliteQueries,
}

impl SqliteLookup {
    /// Open the database at `path` read-only.
    pub fn open(path: &Path, queries: SqliteQueries) -> Result<Self, LookupError> {
        let name = path.display().to_string();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| LookupError::Connect {
            source_name: name.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(source = %name, "opened lookup database");
        Ok(SqliteLookup {
            name,
            conn,
            queries,
        })
    }

    /// Wrap an already-open connection.
    pub fn from_connection(name: &str, conn: Connection, queries: SqliteQueries) -> Self {
        SqliteLookup {
            name: name.to_string(),
            conn,
            queries,
        }
    }

    fn collect<T>(
        &self,
        query: &str,
        map: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, LookupError> {
        let query_err = |e: rusqlite::Error| LookupError::Query {
            query: query.to_string(),
            message: e.to_string(),
        };
        let mut stmt = self.conn.prepare(query).map_err(query_err)?;
        let rows = stmt.query_map([], |row| map(row)).map_err(query_err)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| LookupError::Row {
                query: query.to_string(),
                message: e.to_string(),
            })?);
        }
        tracing::debug!(source = %self.name, rows = out.len(), "lookup query");
        Ok(out)
    }
}

impl LookupSource for SqliteLookup {
    fn name(&self) -> &str {
        &self.name
    }

    fn reason_codes(&mut self) -> Result<Vec<ReasonCode>, LookupError> {
        self.collect(&self.queries.reason_query, |row| {
            Ok(ReasonCode {
                id: row.get(0)?,
                description: row.get(1)?,
            })
        })
    }

    fn sites(&mut self) -> Result<Vec<SiteRecord>, LookupError> {
        self.collect(&self.queries.site_query, |row| {
            Ok(SiteRecord {
                internal_id: row.get(0)?,
                site_id: row.get(1)?,
                site_name: row.get(2)?,
            })
        })
    }
}
