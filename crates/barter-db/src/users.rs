use barter_types::models::User;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::UserRow;
use crate::{Database, Result};

impl Database {
    pub fn create_user(&self, id: Uuid, username: &str, password_hash: &str) -> Result<User> {
        let created_at = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.to_string(), username, password_hash, created_at],
            )?;
            Ok(())
        })?;

        Ok(User {
            id,
            username: username.to_string(),
            created_at,
        })
    }

    /// Includes the password hash; only the login path should need this.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password, created_at FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], user_row).optional()?;
    Ok(row)
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}
