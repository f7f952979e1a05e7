//! Embedded schema migrations
//!
//! Each migration runs once inside its own transaction and is recorded in
//! `schema_version`.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

struct Migration {
    id: &'static str,
    sql: &'static str,
}

fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_initial_schema",
        sql: include_str!("../../migrations/001_initial_schema.sql"),
    }]
}

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    for migration in migrations() {
        apply_migration(conn, &migration)?;
    }
    Ok(())
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let already_applied = conn
        .query_row(
            "SELECT 1 FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if already_applied {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| Error::store(format!("migration {} failed: {}", migration.id, e)))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at) VALUES (?1, ?2)",
        rusqlite::params![migration.id, chrono::Utc::now().timestamp()],
    )?;
    tx.commit()?;

    debug!(migration = migration.id, "Applied migration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('heroes', 'locations', 'transformations')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }
}
