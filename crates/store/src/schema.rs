//! Idempotent schema migrations, keyed by a `schema_version` table.

use crate::error::Result;
use log::{debug, info};
use rusqlite::Connection;

pub const LATEST_SCHEMA_VERSION: i64 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    create_schema_version_table(conn)?;
    let current = schema_version(conn)?;

    if current >= LATEST_SCHEMA_VERSION {
        debug!("store schema up to date at version {current}");
        return Ok(());
    }

    info!("migrating store schema {current} -> {LATEST_SCHEMA_VERSION}");
    for version in (current + 1)..=LATEST_SCHEMA_VERSION {
        apply(conn, version)?;
        record_version(conn, version)?;
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT MAX(version) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(None);
    Ok(version.unwrap_or(0))
}

fn record_version(conn: &Connection, version: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![version, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn apply(conn: &Connection, version: i64) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        other => Err(crate::error::StoreError::Migration {
            version: other,
            reason: "no migration registered for this version".to_string(),
        }),
    }
}

fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            root_path TEXT NOT NULL UNIQUE,
            languages TEXT NOT NULL DEFAULT '[]',
            root_file_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE files (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            path TEXT NOT NULL,
            language TEXT,
            indexing_step TEXT NOT NULL DEFAULT 'complete',
            chunks INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_indexed_at TEXT NOT NULL,
            parent_id TEXT REFERENCES files(id) ON DELETE CASCADE,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            UNIQUE (path, project_id)
        );
        CREATE INDEX ix_files_parent ON files(parent_id);
        CREATE INDEX ix_files_project_last_indexed_at ON files(project_id, last_indexed_at);
        CREATE INDEX ix_files_project_indexing_step ON files(project_id, indexing_step);

        CREATE TABLE nodes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            global_qualifier TEXT NOT NULL,
            definition TEXT,
            type TEXT NOT NULL,
            file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            UNIQUE (global_qualifier, project_id)
        );
        CREATE INDEX ix_nodes_name_project ON nodes(name, project_id);
        CREATE INDEX ix_nodes_type_project ON nodes(type, project_id);
        CREATE INDEX ix_nodes_file ON nodes(file_id);

        CREATE TABLE aliases (
            local_qualifier TEXT NOT NULL,
            global_qualifier TEXT NOT NULL,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            file_id TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            PRIMARY KEY (local_qualifier, project_id)
        );
        CREATE INDEX ix_alias_file ON aliases(file_id);

        CREATE TABLE node_references (
            source_node_id TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
            target_node_id TEXT NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
            line_number INTEGER NOT NULL,
            PRIMARY KEY (source_node_id, target_node_id, line_number)
        );
        CREATE INDEX ix_source_node ON node_references(source_node_id);
        CREATE INDEX ix_target_node ON node_references(target_node_id);

        CREATE TABLE indexing_locks (
            lock_key TEXT PRIMARY KEY,
            holder TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}
