//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Pipelines and metrics call store methods — they never execute SQL
//! directly.

mod calls;

pub use calls::{DimensionOption, FilterOptions};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{DashError, DashResult};
use crate::types::{ExternalId, TenantId};

/// Display name given to tenants provisioned lazily on first upload.
pub const DEFAULT_TENANT_NAME: &str = "Default Organization";

pub struct CallStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: TenantId,
    pub external_id: ExternalId,
    pub name: String,
    pub created_at: String,
}

impl CallStore {
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new isolated database.
    pub fn reopen(&self) -> DashResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DashResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    /// Connectivity precheck, run before any bulk write begins. Cold-start
    /// latency is a known cause, so failure carries retry guidance.
    pub fn ping(&self) -> DashResult<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| DashError::StoreUnavailable {
                details: format!("{e}; the database may be starting up, retry shortly"),
            })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    // ── Tenant ─────────────────────────────────────────────────

    pub fn find_tenant(&self, external_id: &str) -> DashResult<Option<Tenant>> {
        let tenant = self
            .conn
            .query_row(
                "SELECT id, external_id, name, created_at
                 FROM tenant WHERE external_id = ?1",
                params![external_id],
                |row| {
                    Ok(Tenant {
                        id: row.get(0)?,
                        external_id: row.get(1)?,
                        name: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(tenant)
    }

    pub fn create_tenant(&self, external_id: &str, name: &str) -> DashResult<Tenant> {
        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            external_id: external_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.conn.execute(
            "INSERT INTO tenant (id, external_id, name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tenant.id,
                tenant.external_id,
                tenant.name,
                tenant.created_at
            ],
        )?;
        Ok(tenant)
    }

    /// Resolve a tenant by its identity-provider key, provisioning one
    /// with the default display name if none exists yet.
    pub fn find_or_create_tenant(&self, external_id: &str) -> DashResult<Tenant> {
        match self.find_tenant(external_id)? {
            Some(tenant) => Ok(tenant),
            None => self.create_tenant(external_id, DEFAULT_TENANT_NAME),
        }
    }

    pub fn require_tenant(&self, external_id: &str) -> DashResult<Tenant> {
        self.find_tenant(external_id)?
            .ok_or_else(|| DashError::TenantNotFound {
                external_id: external_id.to_string(),
            })
    }

    pub fn tenant_count(&self) -> DashResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM tenant", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
