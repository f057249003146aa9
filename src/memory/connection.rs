/*!
 * Database connection management for the translation memory.
 *
 * This module handles SQLite connection creation, schema initialization,
 * and async-safe access patterns using tokio's spawn_blocking.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;

/// Database connection wrapper with thread-safe access
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open (or create) a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create translation memory directory: {:?}", parent)
                })?;
            }
        }

        info!("Opening translation memory at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open translation memory: {:?}", db_path))?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory translation memory");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

        f(&conn)
    }

    /// Execute a database operation asynchronously using spawn_blocking
    ///
    /// This is the preferred method for async contexts as it prevents
    /// blocking the async runtime.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<MemoryStats> {
        self.execute(|conn| {
            let entry_count: i64 = conn
                .query_row("SELECT COUNT(*) FROM translation_memory", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0);

            let total_hits: i64 = conn
                .query_row(
                    "SELECT COALESCE(SUM(hit_count), 0) FROM translation_memory",
                    [],
                    |row| row.get(0),
                )
                .unwrap_or(0);

            let mut stmt = conn.prepare(
                "SELECT language, COUNT(*) FROM translation_memory GROUP BY language ORDER BY language",
            )?;
            let per_language: Vec<(String, i64)> = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .filter_map(|r| r.ok())
                .collect();

            // File size is meaningless for in-memory databases
            let file_size = if self.db_path.to_string_lossy() != ":memory:" {
                std::fs::metadata(&self.db_path)
                    .map(|m| m.len())
                    .unwrap_or(0)
            } else {
                0
            };

            Ok(MemoryStats {
                entry_count,
                total_hits,
                per_language,
                file_size_bytes: file_size,
            })
        })
    }
}

/// Translation memory statistics
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Number of remembered translations
    pub entry_count: i64,
    /// Total lookup hits across all entries
    pub total_hits: i64,
    /// Entry counts broken down by target language
    pub per_language: Vec<(String, i64)>,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entries: {}, Hits: {}, Size: {} KB",
            self.entry_count,
            self.total_hits,
            self.file_size_bytes / 1024
        )?;

        if !self.per_language.is_empty() {
            let breakdown: Vec<String> = self
                .per_language
                .iter()
                .map(|(language, count)| format!("{}: {}", language, count))
                .collect();
            write!(f, " ({})", breakdown.join(", "))?;
        }

        Ok(())
    }
}
