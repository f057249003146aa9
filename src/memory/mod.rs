/*!
 * Persistent translation memory backed by SQLite.
 *
 * The memory maps (source text, target language) pairs to previously
 * obtained translations so repeated runs avoid redundant provider calls.
 * Storage is per-project: a small database file under the working
 * directory, created on first open.
 */

pub mod connection;
pub mod schema;
pub mod store;

// Re-export main types
pub use connection::{DatabaseConnection, MemoryStats};
pub use store::{hash_text, SqliteMemory, TranslationStore};
