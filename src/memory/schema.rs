/*!
 * Translation memory schema definition and versioning.
 *
 * A single `translation_memory` table keyed by (source text hash, target
 * language) holds all remembered translations, alongside a `schema_version`
 * table so future releases can migrate old store files in place.
 */

use anyhow::Result;
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema, creating tables on first open
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        info!("Creating translation memory schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version < SCHEMA_VERSION {
        info!(
            "Migrating translation memory schema from v{} to v{}",
            version, SCHEMA_VERSION
        );
        migrate_schema(conn, version)?;
    } else {
        debug!("Translation memory schema up to date (v{})", version);
    }

    Ok(())
}

/// Get the current schema version, or 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get::<_, i64>(0).map(|count| count > 0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT version FROM schema_version WHERE id = 1",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Persist the schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all tables for a fresh database
fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL keeps each set() durable without blocking concurrent reads
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA foreign_keys=ON;
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS translation_memory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_hash TEXT NOT NULL,
            source_text TEXT NOT NULL,
            language TEXT NOT NULL,
            translation TEXT NOT NULL,
            hit_count INTEGER DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(source_hash, language)
        );

        CREATE INDEX IF NOT EXISTS idx_memory_lookup ON translation_memory(source_hash, language);
        CREATE INDEX IF NOT EXISTS idx_memory_language ON translation_memory(language);
        "#,
    )?;

    info!("Translation memory schema created");
    Ok(())
}

/// Migrate the schema from an older version
fn migrate_schema(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < SCHEMA_VERSION {
        match current {
            // Migration steps get added here as the schema evolves
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown translation memory schema version: {}. Cannot migrate.",
                    current
                ));
            }
        }
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    info!("Schema migration completed to v{}", SCHEMA_VERSION);
    Ok(())
}
