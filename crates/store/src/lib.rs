//! # Code Index Store
//!
//! Durable SQLite-backed catalog of projects, files, symbols, aliases and
//! references, plus the advisory lock that serializes indexing runs on a
//! project. One `Store` wraps one `rusqlite::Connection`; schema migrations
//! run on open and are idempotent across restarts.

mod error;
pub mod lock;
mod models;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use lock::{acquire, extend, extend_lock, locked, release, LockHandle};
pub use models::{AliasRow, File, IndexingStep, Node, NodeType, Project, Reference};
pub use schema::LATEST_SCHEMA_VERSION;
pub use store::Store;
