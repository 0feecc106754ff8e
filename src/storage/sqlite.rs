//! SQLite user storage
//!
//! One connection behind a mutex; every query runs on tokio's blocking pool.
//! The schema is versioned with `PRAGMA user_version` and migrated on open.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::traits::UserStorage;
use crate::auth::user::User;
use crate::error::{Result, TokenGateError};

/// Ordered schema migrations; index + 1 is the schema version they produce
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "ALTER TABLE users ADD COLUMN email TEXT",
];

const USER_COLUMNS: &str = "id, username, password_hash, email, created_at";

/// User storage with SQLite backend
pub struct SqliteUserStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStorage {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    TokenGateError::StoreUnavailable(format!(
                        "Cannot create database directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        log::info!("Opened SQLite user store at {}", path);
        Self::from_connection(conn)
    }

    /// Private database that lives as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Current schema version
    pub async fn schema_version(&self) -> Result<i64> {
        self.run(|conn| schema_version(conn)).await
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock()?;
            f(&conn)
        })
        .await?
    }
}

fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Apply every migration newer than the stored schema version, each in its
/// own transaction together with the version bump
fn migrate(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;
    let target = MIGRATIONS.len() as i64;

    if current > target {
        return Err(TokenGateError::StoreUnavailable(format!(
            "Database schema version {} is newer than supported version {}",
            current, target
        )));
    }

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        log::info!("Applied user store migration {}", version);
    }

    Ok(())
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl UserStorage for SqliteUserStorage {
    async fn create_user(&self, user: User) -> Result<()> {
        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password_hash, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.username,
                    user.password_hash,
                    user.email,
                    user.created_at,
                ],
            );

            match inserted {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => {
                    Err(TokenGateError::UserAlreadyExists(user.username))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            Ok(conn
                .query_row(&sql, params![user_id], row_to_user)
                .optional()?)
        })
        .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        self.run(move |conn| {
            let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
            Ok(conn
                .query_row(&sql, params![username], row_to_user)
                .optional()?)
        })
        .await
    }

    async fn count_users(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
