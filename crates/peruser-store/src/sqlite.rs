//! SQLite implementation of the RecordStore trait.
//!
//! This is the persistent storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use peruser_core::{ApiKey, NewUser, User, UserIndex, UserUpdate};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{next_free_index, RecordStore};

const SELECT_USER: &str = "SELECT idx, api_key, name, admin, enabled FROM users";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        index: UserIndex::new(row.get::<_, String>("idx")?),
        key: ApiKey::new(row.get::<_, String>("api_key")?),
        name: row.get("name")?,
        admin: row.get("admin")?,
        enabled: row.get("enabled")?,
    })
}

fn find_by_index(conn: &Connection, index: &UserIndex) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            &format!("{SELECT_USER} WHERE idx = ?1"),
            params![index.as_str()],
            row_to_user,
        )
        .optional()?)
}

fn key_in_use(conn: &Connection, key: &ApiKey) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM users WHERE api_key = ?1",
            params![key.as_str()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create(&self, new: NewUser) -> Result<User> {
        new.validate()?;

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let (index, assigned) = match &new.index {
                Some(index) => {
                    if find_by_index(&tx, index)?.is_some() {
                        return Err(StoreError::Conflict(format!(
                            "index {} already exists",
                            index
                        )));
                    }
                    (index.clone(), None)
                }
                None => {
                    let start: i64 = tx.query_row(
                        "SELECT value FROM store_counters WHERE name = 'next_index'",
                        [],
                        |row| row.get(0),
                    )?;
                    let (n, index) = next_free_index(start.max(1) as u64, |i| {
                        Ok(find_by_index(&tx, i)?.is_some())
                    })?;
                    (index, Some(n))
                }
            };

            let key = new.key.clone().unwrap_or_else(ApiKey::generate);
            if key_in_use(&tx, &key)? {
                return Err(StoreError::Conflict("api key already in use".into()));
            }

            if let Some(n) = assigned {
                tx.execute(
                    "UPDATE store_counters SET value = ?1 WHERE name = 'next_index'",
                    params![(n + 1) as i64],
                )?;
            }

            let user = new.into_user(index, key);
            let now = crate::now_millis();
            tx.execute(
                "INSERT INTO users (idx, api_key, name, admin, enabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    user.index.as_str(),
                    user.key.as_str(),
                    user.name,
                    user.admin,
                    user.enabled,
                    now
                ],
            )?;
            tx.commit()?;

            Ok(user)
        })
        .await
    }

    async fn read_by_key(&self, key: &str) -> Result<User> {
        let key = key.to_owned();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{SELECT_USER} WHERE api_key = ?1"),
                params![key],
                row_to_user,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound("no user for api key".into()))
        })
        .await
    }

    async fn read_by_index(&self, index: &UserIndex) -> Result<User> {
        let index = index.clone();
        self.with_conn(move |conn| {
            find_by_index(conn, &index)?.ok_or_else(|| StoreError::NotFound(index.to_string()))
        })
        .await
    }

    async fn read_all(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY seq"))?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
        .await
    }

    async fn update_by_index(&self, index: &UserIndex, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let index = index.clone();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let mut user = find_by_index(&tx, &index)?
                .ok_or_else(|| StoreError::NotFound(index.to_string()))?;

            if let Some(new_key) = &update.key {
                if *new_key != user.key && key_in_use(&tx, new_key)? {
                    return Err(StoreError::Conflict("api key already in use".into()));
                }
            }

            update.apply_to(&mut user);
            tx.execute(
                "UPDATE users SET api_key = ?2, name = ?3, admin = ?4, enabled = ?5, updated_at = ?6
                 WHERE idx = ?1",
                params![
                    index.as_str(),
                    user.key.as_str(),
                    user.name,
                    user.admin,
                    user.enabled,
                    crate::now_millis()
                ],
            )?;
            tx.commit()?;

            Ok(user)
        })
        .await
    }

    async fn delete_by_index(&self, index: &UserIndex) -> Result<()> {
        let index = index.clone();
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM users WHERE idx = ?1", params![index.as_str()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(index.to_string()));
            }
            Ok(())
        })
        .await
    }
}
