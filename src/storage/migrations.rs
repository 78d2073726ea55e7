//! Schema upgrades for databases created by older Koffan builds.
//!
//! Each file under `/migrations/` adds a column that later releases rely on.
//! Fresh databases already have every column, so a duplicate-column failure
//! only marks the migration as applied.

use rusqlite::{Connection, Result};
use tracing::{debug, info};

struct Migration {
    version: &'static str,
    sql: &'static str,
}

/// Applied in order; versions are the SQL file stems.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001_add_item_uncertain",
        sql: include_str!("../../migrations/001_add_item_uncertain.sql"),
    },
    Migration {
        version: "002_add_history_usage_count",
        sql: include_str!("../../migrations/002_add_history_usage_count.sql"),
    },
    Migration {
        version: "003_add_list_icon",
        sql: include_str!("../../migrations/003_add_list_icon.sql"),
    },
];

/// Run all pending migrations on the database.
///
/// Already-applied migrations (tracked in `schema_migrations`) are skipped,
/// so this is safe to call on every open.
///
/// # Errors
///
/// Returns an error if a migration fails to apply. ALTER TABLE errors for
/// duplicate columns are logged and the migration is marked complete, since
/// the base DDL already creates those columns on fresh databases.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let applied: std::collections::HashSet<String> = conn
        .prepare("SELECT version FROM schema_migrations")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    for migration in MIGRATIONS {
        if applied.contains(migration.version) {
            continue;
        }

        info!(version = migration.version, "Applying migration");

        if let Err(e) = conn.execute_batch(migration.sql) {
            if e.to_string().contains("duplicate column name") {
                debug!(
                    version = migration.version,
                    "Migration partially applied (columns exist), marking complete"
                );
            } else {
                return Err(e);
            }
        }

        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![migration.version, chrono::Utc::now().timestamp_millis()],
        )?;

        info!(version = migration.version, "Migration complete");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;

    fn migration_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version LIKE '0%'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_run_migrations_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        run_migrations(&conn).expect("Migrations should apply to fresh database");
        assert_eq!(migration_count(&conn), MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_run_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(migration_count(&conn), MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_legacy_tables_gain_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE lists (id INTEGER PRIMARY KEY, name TEXT NOT NULL, sort_order INTEGER,
                                 is_active INTEGER, created_at INTEGER, updated_at INTEGER);
             CREATE TABLE items (id INTEGER PRIMARY KEY, section_id INTEGER, name TEXT,
                                 description TEXT, completed INTEGER, sort_order INTEGER,
                                 created_at INTEGER, updated_at INTEGER);
             CREATE TABLE item_history (id INTEGER PRIMARY KEY, name TEXT UNIQUE COLLATE NOCASE,
                                        last_section_id INTEGER, last_used_at INTEGER);",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let has_uncertain = conn
            .prepare("SELECT 1 FROM pragma_table_info('items') WHERE name = 'uncertain'")
            .unwrap()
            .exists([])
            .unwrap();
        assert!(has_uncertain);

        let has_icon = conn
            .prepare("SELECT 1 FROM pragma_table_info('lists') WHERE name = 'icon'")
            .unwrap()
            .exists([])
            .unwrap();
        assert!(has_icon);
    }
}
