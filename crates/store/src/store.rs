use crate::error::{Result, StoreError};
use crate::models::{AliasRow, File, IndexingStep, Node, NodeType, Project, Reference};
use crate::schema;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

/// Durable catalog of projects, files, symbols, aliases and references.
///
/// Wraps a single `rusqlite::Connection` opened in WAL mode. Callers on the
/// indexing pipeline open one `Store` per file-processing task; SQLite
/// serializes writers internally, which is sufficient at the worker-pool
/// scale this component targets.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        schema::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ---------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------

    pub fn create_project(&self, name: &str, root_path: &str) -> Result<Project> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO projects (name, root_path, languages, created_at, updated_at)
             VALUES (?1, ?2, '[]', ?3, ?3)",
            params![name, root_path, now.to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_project(id)?.ok_or(StoreError::ProjectNotFound(id))
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT id, name, root_path, languages, root_file_id, created_at, updated_at
                 FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_project(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn set_root_file(&self, project_id: i64, file_id: Uuid) -> Result<()> {
        self.conn.execute(
            "UPDATE projects SET root_file_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![file_id.to_string(), Utc::now().to_rfc3339(), project_id],
        )?;
        Ok(())
    }

    pub fn record_languages(&self, project_id: i64, languages: &[String]) -> Result<()> {
        let encoded = serde_json::to_string(languages)?;
        self.conn.execute(
            "UPDATE projects SET languages = ?1, updated_at = ?2 WHERE id = ?3",
            params![encoded, Utc::now().to_rfc3339(), project_id],
        )?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------

    pub fn upsert_file(&self, file: &File) -> Result<()> {
        self.conn.execute(
            "INSERT INTO files (
                id, name, path, language, indexing_step, chunks,
                created_at, updated_at, last_indexed_at, parent_id, project_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT (path, project_id) DO UPDATE SET
                name = excluded.name,
                language = excluded.language,
                indexing_step = excluded.indexing_step,
                chunks = excluded.chunks,
                updated_at = excluded.updated_at,
                last_indexed_at = excluded.last_indexed_at,
                parent_id = excluded.parent_id",
            params![
                file.id.to_string(),
                file.name,
                file.path,
                file.language,
                file.indexing_step.as_str(),
                file.chunks,
                file.created_at.to_rfc3339(),
                file.updated_at.to_rfc3339(),
                file.last_indexed_at.to_rfc3339(),
                file.parent_id.map(|id| id.to_string()),
                file.project_id,
            ],
        )?;
        Ok(())
    }

    pub fn get_file_by_path(&self, project_id: i64, path: &str) -> Result<Option<File>> {
        self.conn
            .query_row(
                "SELECT id, name, path, language, indexing_step, chunks,
                        created_at, updated_at, last_indexed_at, parent_id, project_id
                 FROM files WHERE project_id = ?1 AND path = ?2",
                params![project_id, path],
                row_to_file,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_files(&self, ids: &[Uuid]) -> Result<()> {
        for id in ids {
            self.conn
                .execute("DELETE FROM files WHERE id = ?1", params![id.to_string()])?;
        }
        Ok(())
    }

    pub fn files_at_step(
        &self,
        project_id: i64,
        step: IndexingStep,
        batch_size: usize,
    ) -> Result<Vec<File>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, language, indexing_step, chunks,
                    created_at, updated_at, last_indexed_at, parent_id, project_id
             FROM files WHERE project_id = ?1 AND indexing_step = ?2
             ORDER BY path LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![project_id, step.as_str(), batch_size as i64],
            row_to_file,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Files whose `last_indexed_at` predates `cutoff` — i.e. weren't seen
    /// during the traversal that started at `cutoff`. Used to detect files
    /// removed from the filesystem since the previous run.
    pub fn files_not_touched_since(&self, project_id: i64, cutoff: DateTime<Utc>) -> Result<Vec<File>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, language, indexing_step, chunks,
                    created_at, updated_at, last_indexed_at, parent_id, project_id
             FROM files WHERE project_id = ?1 AND last_indexed_at < ?2",
        )?;
        let rows = stmt.query_map(params![project_id, cutoff.to_rfc3339()], row_to_file)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn touch_file(&self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE files SET last_indexed_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), id.to_string()],
        )?;
        Ok(())
    }

    pub fn set_file_step(&self, id: Uuid, step: IndexingStep) -> Result<()> {
        self.conn.execute(
            "UPDATE files SET indexing_step = ?1, updated_at = ?2 WHERE id = ?3",
            params![step.as_str(), Utc::now().to_rfc3339(), id.to_string()],
        )?;
        Ok(())
    }

    pub fn set_chunk_count(&self, id: Uuid, chunks: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE files SET chunks = ?1, updated_at = ?2 WHERE id = ?3",
            params![chunks, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------

    pub fn create_node(&self, node: &Node) -> Result<()> {
        self.conn.execute(
            "INSERT INTO nodes (id, name, global_qualifier, definition, type, file_id, project_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (global_qualifier, project_id) DO UPDATE SET
                name = excluded.name,
                definition = excluded.definition,
                type = excluded.type,
                file_id = excluded.file_id",
            params![
                node.id.to_string(),
                node.name,
                node.global_qualifier,
                node.definition,
                node.node_type.as_str(),
                node.file_id.to_string(),
                node.project_id,
            ],
        )?;
        Ok(())
    }

    pub fn find_node_by_qualifier(&self, project_id: i64, qualifier: &str) -> Option<Uuid> {
        self.conn
            .query_row(
                "SELECT id FROM nodes WHERE project_id = ?1 AND global_qualifier = ?2",
                params![project_id, qualifier],
                |row| {
                    let raw: String = row.get(0)?;
                    Ok(raw)
                },
            )
            .ok()
            .and_then(|raw| Uuid::parse_str(&raw).ok())
    }

    // ---------------------------------------------------------------
    // Aliases
    // ---------------------------------------------------------------

    pub fn create_alias(&self, alias: &AliasRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO aliases (local_qualifier, global_qualifier, project_id, file_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (local_qualifier, project_id) DO UPDATE SET
                global_qualifier = excluded.global_qualifier,
                file_id = excluded.file_id",
            params![
                alias.local_qualifier,
                alias.global_qualifier,
                alias.project_id,
                alias.file_id.to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn find_aliases_by_prefixes(
        &self,
        project_id: i64,
        prefixes: &[String],
    ) -> Result<Vec<AliasRow>> {
        let mut out = Vec::new();
        for prefix in prefixes {
            let alias = self
                .conn
                .query_row(
                    "SELECT local_qualifier, global_qualifier, project_id, file_id
                     FROM aliases WHERE project_id = ?1 AND local_qualifier = ?2",
                    params![project_id, prefix],
                    row_to_alias,
                )
                .optional()?;
            if let Some(alias) = alias {
                out.push(alias);
            }
        }
        Ok(out)
    }

    // ---------------------------------------------------------------
    // References
    // ---------------------------------------------------------------

    pub fn create_reference(&self, reference: &Reference) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO node_references (source_node_id, target_node_id, line_number)
             VALUES (?1, ?2, ?3)",
            params![
                reference.source_node_id.to_string(),
                reference.target_node_id.to_string(),
                reference.line_number,
            ],
        )?;
        Ok(())
    }
}

impl codeindex_resolver::AliasLookup for Store {
    fn find_alias_by_prefixes(
        &self,
        project_id: i64,
        prefixes: &[String],
    ) -> Option<codeindex_resolver::Alias> {
        self.find_aliases_by_prefixes(project_id, prefixes)
            .ok()?
            .into_iter()
            .next()
            .map(|row| codeindex_resolver::Alias {
                local_qualifier: row.local_qualifier,
                global_qualifier: row.global_qualifier,
            })
    }

    fn find_node_by_qualifier(&self, project_id: i64, qualifier: &str) -> Option<Uuid> {
        Store::find_node_by_qualifier(self, project_id, qualifier)
    }
}

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    let languages_json: String = row.get(3)?;
    let languages: Vec<String> = serde_json::from_str(&languages_json).unwrap_or_default();
    let root_file_id: Option<String> = row.get(4)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        root_path: row.get(2)?,
        languages,
        root_file_id: root_file_id.and_then(|s| Uuid::parse_str(&s).ok()),
        created_at: parse_rfc3339(row, 5)?,
        updated_at: parse_rfc3339(row, 6)?,
    })
}

fn row_to_file(row: &Row) -> rusqlite::Result<File> {
    let id: String = row.get(0)?;
    let step: String = row.get(4)?;
    let parent_id: Option<String> = row.get(9)?;
    Ok(File {
        id: Uuid::parse_str(&id).map_err(|_| invalid_uuid("files.id"))?,
        name: row.get(1)?,
        path: row.get(2)?,
        language: row.get(3)?,
        indexing_step: IndexingStep::parse(&step).unwrap_or(IndexingStep::Complete),
        chunks: row.get(5)?,
        created_at: parse_rfc3339(row, 6)?,
        updated_at: parse_rfc3339(row, 7)?,
        last_indexed_at: parse_rfc3339(row, 8)?,
        parent_id: parent_id.and_then(|s| Uuid::parse_str(&s).ok()),
        project_id: row.get(10)?,
    })
}

fn row_to_alias(row: &Row) -> rusqlite::Result<AliasRow> {
    let file_id: String = row.get(3)?;
    Ok(AliasRow {
        local_qualifier: row.get(0)?,
        global_qualifier: row.get(1)?,
        project_id: row.get(2)?,
        file_id: Uuid::parse_str(&file_id).map_err(|_| invalid_uuid("aliases.file_id"))?,
    })
}

#[allow(dead_code)]
fn row_to_node(row: &Row) -> rusqlite::Result<Node> {
    let id: String = row.get(0)?;
    let file_id: String = row.get(5)?;
    let node_type: String = row.get(4)?;
    Ok(Node {
        id: Uuid::parse_str(&id).map_err(|_| invalid_uuid("nodes.id"))?,
        name: row.get(1)?,
        global_qualifier: row.get(2)?,
        definition: row.get(3)?,
        node_type: NodeType::parse(&node_type).unwrap_or(NodeType::Module),
        file_id: Uuid::parse_str(&file_id).map_err(|_| invalid_uuid("nodes.file_id"))?,
        project_id: row.get(6)?,
    })
}

fn parse_rfc3339(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_uuid("timestamp"))
}

fn invalid_uuid(column: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnName(column.to_string())
}
