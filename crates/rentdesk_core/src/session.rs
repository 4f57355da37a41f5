//! Durable session slot.
//!
//! # Responsibility
//! - Persist the authenticated principal under one named key.
//! - Read it back on process start to restore the session.
//!
//! # Invariants
//! - At most one principal is stored per slot key.
//! - `clear` on an empty slot is a no-op.
//! - An undecodable payload is reported, never silently dropped.

use crate::db::DbError;
use crate::model::principal::Principal;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which the current user is stored.
pub const CURRENT_USER_KEY: &str = "current_user";

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Db(DbError),
    /// Stored payload is not a valid serialized principal.
    Corrupt(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt(err) => write!(f, "stored session is corrupt: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupt(err) => Some(err),
        }
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the single current-session slot.
pub trait SessionSlot {
    fn load(&self) -> SessionResult<Option<Principal>>;
    fn save(&self, principal: &Principal) -> SessionResult<()>;
    fn clear(&self) -> SessionResult<()>;
}

/// SQLite-backed session slot.
///
/// Expects a connection returned by `open_db`/`open_db_in_memory`, so the
/// `session_slots` table already exists.
pub struct SqliteSessionSlot<'conn> {
    conn: &'conn Connection,
    key: &'static str,
}

impl<'conn> SqliteSessionSlot<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, CURRENT_USER_KEY)
    }

    pub fn with_key(conn: &'conn Connection, key: &'static str) -> Self {
        Self { conn, key }
    }
}

impl SessionSlot for SqliteSessionSlot<'_> {
    fn load(&self) -> SessionResult<Option<Principal>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM session_slots WHERE slot_key = ?1;",
                [self.key],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|payload| serde_json::from_str(&payload).map_err(SessionError::Corrupt))
            .transpose()
    }

    fn save(&self, principal: &Principal) -> SessionResult<()> {
        let payload = serde_json::to_string(principal).map_err(SessionError::Corrupt)?;
        self.conn.execute(
            "INSERT INTO session_slots (slot_key, payload) VALUES (?1, ?2)
             ON CONFLICT(slot_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key, payload],
        )?;
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        self.conn
            .execute("DELETE FROM session_slots WHERE slot_key = ?1;", [self.key])?;
        Ok(())
    }
}

impl<S: SessionSlot + ?Sized> SessionSlot for &S {
    fn load(&self) -> SessionResult<Option<Principal>> {
        (**self).load()
    }

    fn save(&self, principal: &Principal) -> SessionResult<()> {
        (**self).save(principal)
    }

    fn clear(&self) -> SessionResult<()> {
        (**self).clear()
    }
}
