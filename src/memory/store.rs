/*!
 * Store operations for the translation memory.
 *
 * Exposes the `TranslationStore` capability the translation engine is
 * injected with, plus the SQLite-backed implementation used in production.
 * Lookups and writes are point operations keyed by (source text, target
 * language); every write is immediately durable.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::path::Path;

use super::connection::{DatabaseConnection, MemoryStats};

/// Compute the SHA256 hex digest used as the source-text key
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Durable lookup table mapping (source text, target language) to a translation
///
/// The engine receives this as an injected capability so tests can substitute
/// an in-memory database for the per-project store file.
#[async_trait]
pub trait TranslationStore: Send + Sync + Debug {
    /// Look up the remembered translation for the pair, if any
    async fn get(&self, source: &str, language: &str) -> Result<Option<String>>;

    /// Insert or overwrite the remembered translation for the pair
    async fn set(&self, source: &str, language: &str, translation: &str) -> Result<()>;

    /// Usage statistics for reporting
    async fn stats(&self) -> Result<MemoryStats>;
}

/// SQLite-backed translation memory
#[derive(Debug, Clone)]
pub struct SqliteMemory {
    db: DatabaseConnection,
}

impl SqliteMemory {
    /// Open (or create) the store file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: DatabaseConnection::new(path)?,
        })
    }

    /// Create a store backed by an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: DatabaseConnection::new_in_memory()?,
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        self.db.path()
    }
}

#[async_trait]
impl TranslationStore for SqliteMemory {
    async fn get(&self, source: &str, language: &str) -> Result<Option<String>> {
        let source_hash = hash_text(source);
        let language = language.to_string();

        self.db
            .execute_async(move |conn| {
                let result: Option<(i64, String)> = conn
                    .query_row(
                        "SELECT id, translation FROM translation_memory
                         WHERE source_hash = ?1 AND language = ?2",
                        params![source_hash, language],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                if let Some((id, translation)) = result {
                    conn.execute(
                        "UPDATE translation_memory SET hit_count = hit_count + 1 WHERE id = ?1",
                        [id],
                    )?;
                    debug!("Memory hit ({})", language);
                    Ok(Some(translation))
                } else {
                    Ok(None)
                }
            })
            .await
    }

    async fn set(&self, source: &str, language: &str, translation: &str) -> Result<()> {
        let source_hash = hash_text(source);
        let source = source.to_string();
        let language = language.to_string();
        let translation = translation.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_memory (
                        source_hash, source_text, language, translation,
                        hit_count, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
                    ON CONFLICT(source_hash, language)
                    DO UPDATE SET translation = excluded.translation,
                                  updated_at = excluded.updated_at
                    "#,
                    params![source_hash, source, language, translation, now],
                )?;
                Ok(())
            })
            .await
    }

    async fn stats(&self) -> Result<MemoryStats> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || db.stats())
            .await
            .context("Database task panicked")?
    }
}
