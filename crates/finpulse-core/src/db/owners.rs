//! Owner operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Owner, OwnerId};

impl Database {
    /// Create an owner, or return the existing id for the same email
    pub fn upsert_owner(&self, name: &str, email: &str) -> Result<OwnerId> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM owners WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO owners (name, email) VALUES (?, ?)",
            params![name, email],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get an owner by id
    pub fn get_owner(&self, id: OwnerId) -> Result<Option<Owner>> {
        let conn = self.conn()?;
        let owner = conn
            .query_row(
                "SELECT id, name, email, created_at FROM owners WHERE id = ?",
                params![id],
                |row| {
                    let created_at_str: String = row.get(3)?;
                    Ok(Owner {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .optional()?;
        Ok(owner)
    }

    /// Get an owner, failing with `NotFound` when it does not exist
    pub fn require_owner(&self, id: OwnerId) -> Result<Owner> {
        self.get_owner(id)?
            .ok_or_else(|| Error::NotFound(format!("Owner {}", id)))
    }

    /// List all owners
    pub fn list_owners(&self) -> Result<Vec<Owner>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, email, created_at FROM owners ORDER BY id")?;

        let owners = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(Owner {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(owners)
    }
}
