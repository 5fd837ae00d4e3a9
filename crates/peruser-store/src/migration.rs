//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, crate::now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        2 => apply_v2(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- User records. `seq` fixes creation order; `idx` and `api_key` are
        -- the external and credential identifiers.
        CREATE TABLE users (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            idx TEXT NOT NULL UNIQUE,
            api_key TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            admin INTEGER NOT NULL DEFAULT 0,
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Migration v2: persisted counter for store-assigned indexes.
///
/// Seeded past the creation sequence and past every numeric index still
/// present.
fn apply_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE store_counters (
            name TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        INSERT INTO store_counters (name, value)
        SELECT 'next_index', MAX(
            COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'users'), 0),
            COALESCE((SELECT MAX(CAST(idx AS INTEGER)) FROM users
                      WHERE idx NOT GLOB '*[^0-9]*'), 0)
        ) + 1;
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
        assert!(tables.contains(&"store_counters".to_string()));
    }

    fn next_index(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT value FROM store_counters WHERE name = 'next_index'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_counter_starts_at_one() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        assert_eq!(next_index(&conn), 1);
    }

    #[test]
    fn test_v2_seeds_counter_past_existing_indexes() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )",
        )
        .unwrap();
        apply_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (1, 0)",
            [],
        )
        .unwrap();
        for (idx, key) in [("alice", "a"), ("7", "b"), ("3", "c")] {
            conn.execute(
                "INSERT INTO users (idx, api_key, name, created_at, updated_at)
                 VALUES (?1, ?2, ?1, 0, 0)",
                [idx, key],
            )
            .unwrap();
        }
        conn.execute("DELETE FROM users WHERE idx = '7'", []).unwrap();
        conn.execute(
            "INSERT INTO users (idx, api_key, name, created_at, updated_at)
             VALUES ('5', 'd', '5', 0, 0)",
            [],
        )
        .unwrap();

        migrate(&mut conn).unwrap();

        // Four rows were ever inserted; "5" is the largest numeric index left.
        assert_eq!(next_index(&conn), 6);
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, 0)",
            [CURRENT_VERSION + 1],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
