use crate::error::{IndexerError, Result};
use crate::options::IndexingOptions;
use crate::scanner::{FileScanner, ScannedEntry};
use chrono::{DateTime, Utc};
use codeindex_chunker::{Chunker, ChunkerConfig, ChunkingStrategy};
use codeindex_parser::{ParseContext, Parser as ParserTrait, PythonParser};
use codeindex_store::{File as StoreFile, IndexingStep, LockHandle, Store};
use rusqlite::Connection;
use codeindex_vector_store::{
    Chunk as VectorChunk, EmbeddingProvider, SqliteVectorStore,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Summary of a completed (or aborted) indexing run.
#[derive(Debug, Clone)]
pub struct IndexingStatus {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// Paths whose symbols/aliases/references were (re)built this run —
    /// the union of both parser stages, since a new or modified file runs
    /// through `Definitions` then `References` in the same call to `run`.
    pub codegraph_indexed_paths: Vec<String>,
    /// Paths that were chunked and embedded this run.
    pub vector_indexed_paths: Vec<String>,
}

/// Registers a new project at `root_path`, which must already exist on disk.
pub fn create_project(store: &Store, name: &str, root_path: &Path) -> Result<i64> {
    if !root_path.exists() {
        return Err(IndexerError::InvalidPath(root_path.display().to_string()));
    }
    let project = store.create_project(name, &root_path.to_string_lossy())?;
    Ok(project.id)
}

/// Runs the three-phase indexing pipeline for `project_id` to completion.
///
/// `db_path` identifies the catalog database; phase workers each open their
/// own connection against it rather than sharing one, matching SQLite's own
/// multi-writer story under WAL. `vectors` is shared across workers behind a
/// mutex since it wraps a loaded embedding model that is expensive to reload
/// per task.
pub async fn run<E>(
    db_path: &Path,
    vectors: Arc<Mutex<SqliteVectorStore<E>>>,
    project_id: i64,
    options: IndexingOptions,
) -> Result<IndexingStatus>
where
    E: EmbeddingProvider + Send + 'static,
{
    let started_at = Utc::now();
    let db_path = db_path.to_path_buf();
    let coordinator = Store::open(&db_path)?;

    let lock_key = format!("lock:indexing:{project_id}");
    let holder = format!("indexer-{}", Uuid::new_v4());
    let mut lock = codeindex_store::acquire(coordinator.connection(), &lock_key, &holder, lock_ttl())?
        .ok_or(IndexerError::LockHeld(project_id))?;

    let outcome = run_inner(
        &coordinator,
        &db_path,
        &vectors,
        project_id,
        &options,
        started_at,
        &mut lock,
    )
    .await;

    if let Err(err) = codeindex_store::release(coordinator.connection(), &lock) {
        log::warn!("failed to release indexing lock for project {project_id}: {err}");
    }
    outcome.map(|(codegraph_indexed_paths, vector_indexed_paths)| IndexingStatus {
        started_at,
        duration: (Utc::now() - started_at).to_std().unwrap_or_default(),
        codegraph_indexed_paths,
        vector_indexed_paths,
    })
}

#[allow(clippy::too_many_arguments)]
async fn run_inner<E>(
    coordinator: &Store,
    db_path: &Path,
    vectors: &Arc<Mutex<SqliteVectorStore<E>>>,
    project_id: i64,
    options: &IndexingOptions,
    started_at: DateTime<Utc>,
    lock: &mut LockHandle,
) -> Result<(Vec<String>, Vec<String>)>
where
    E: EmbeddingProvider + Send + 'static,
{
    let project = coordinator
        .get_project(project_id)?
        .ok_or(IndexerError::ProjectNotFound(project_id))?;
    let root = PathBuf::from(&project.root_path);

    if !root.exists() {
        coordinator.delete_project(project_id)?;
        return Ok((Vec::new(), Vec::new()));
    }

    reconcile(coordinator, project_id, &root, options, started_at, vectors)?;

    let definitions_done = run_parser_stage(
        db_path,
        coordinator.connection(),
        lock,
        project_id,
        options,
        IndexingStep::Definitions,
        IndexingStep::References,
        ParseOp::Definitions,
    )
    .await?;

    let references_done = run_parser_stage(
        db_path,
        coordinator.connection(),
        lock,
        project_id,
        options,
        IndexingStep::References,
        IndexingStep::Vector,
        ParseOp::References,
    )
    .await?;

    let mut seen: HashSet<String> = definitions_done.iter().cloned().collect();
    let mut codegraph_indexed_paths = definitions_done;
    for path in references_done {
        if seen.insert(path.clone()) {
            codegraph_indexed_paths.push(path);
        }
    }
    codegraph_indexed_paths.sort();

    let vector_indexed_paths =
        run_vector_stage(db_path, coordinator.connection(), lock, vectors, project_id, options)
            .await?;

    Ok((codegraph_indexed_paths, vector_indexed_paths))
}

/// Doc ids covering every chunk a file is on record as owning, built from
/// its stored `chunks` count rather than the chunks themselves — the file
/// being deleted, and its source on disk, may already be gone.
fn chunk_doc_ids(file_id: Uuid, chunks: i64) -> Vec<String> {
    (0..chunks).map(|i| codeindex_vector_store::doc_id(file_id, i)).collect()
}

/// Traverses the project root, diffing it against the catalog: new paths
/// are inserted, modified files are re-created at the `Definitions`/`Vector`
/// step (dropping any prior symbols via C1's cascade and their chunks via an
/// explicit C2 delete), unmodified paths are marked seen, and paths no
/// longer on disk are deleted after the walk.
fn reconcile<E: EmbeddingProvider>(
    store: &Store,
    project_id: i64,
    root: &Path,
    options: &IndexingOptions,
    run_started_at: DateTime<Utc>,
    vectors: &Arc<Mutex<SqliteVectorStore<E>>>,
) -> Result<()> {
    let root_path_str = root.to_string_lossy().to_string();
    let root_id = match store.get_file_by_path(project_id, &root_path_str)? {
        Some(existing) => {
            store.touch_file(existing.id, run_started_at)?;
            existing.id
        }
        None => {
            let id = Uuid::new_v4();
            store.upsert_file(&StoreFile {
                id,
                name: file_name(root),
                path: root_path_str.clone(),
                language: None,
                indexing_step: IndexingStep::Complete,
                chunks: 0,
                created_at: run_started_at,
                updated_at: run_started_at,
                last_indexed_at: run_started_at,
                parent_id: None,
                project_id,
            })?;
            id
        }
    };
    store.set_root_file(project_id, root_id)?;

    let mut path_to_id: HashMap<PathBuf, Uuid> = HashMap::new();
    path_to_id.insert(root.to_path_buf(), root_id);

    let scanner = FileScanner::new(options)?;
    let mut languages: HashSet<String> = HashSet::new();

    for entry in scanner.walk(root) {
        let parent_id = entry
            .path
            .parent()
            .and_then(|p| path_to_id.get(p))
            .copied()
            .unwrap_or(root_id);

        if entry.is_dir {
            let id = reconcile_directory(store, project_id, &entry, parent_id, run_started_at)?;
            path_to_id.insert(entry.path.clone(), id);
            continue;
        }

        let extension = entry
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let language = options.language_extensions.get(&extension).cloned();
        let indexed =
            language.is_some() || options.indexed_extensions.iter().any(|e| e == &extension);
        if !indexed {
            continue;
        }
        if let Some(lang) = &language {
            languages.insert(lang.clone());
        }
        reconcile_file(store, project_id, &entry, &language, parent_id, run_started_at, vectors)?;
    }

    let stale = store.files_not_touched_since(project_id, run_started_at)?;
    if !stale.is_empty() {
        let stale_doc_ids: Vec<String> = stale
            .iter()
            .filter(|f| f.chunks > 0)
            .flat_map(|f| chunk_doc_ids(f.id, f.chunks))
            .collect();
        if !stale_doc_ids.is_empty() {
            vectors
                .lock()
                .expect("vector store mutex poisoned")
                .delete(&stale_doc_ids)?;
        }
        let ids: Vec<Uuid> = stale.iter().map(|f| f.id).collect();
        store.delete_files(&ids)?;
    }

    if !languages.is_empty() {
        let mut list: Vec<String> = languages.into_iter().collect();
        list.sort();
        store.record_languages(project_id, &list)?;
    }

    Ok(())
}

fn reconcile_directory(
    store: &Store,
    project_id: i64,
    entry: &ScannedEntry,
    parent_id: Uuid,
    run_started_at: DateTime<Utc>,
) -> Result<Uuid> {
    let path_str = entry.path.to_string_lossy().to_string();
    match store.get_file_by_path(project_id, &path_str)? {
        Some(existing) => {
            store.touch_file(existing.id, run_started_at)?;
            Ok(existing.id)
        }
        None => {
            let id = Uuid::new_v4();
            store.upsert_file(&StoreFile {
                id,
                name: file_name(&entry.path),
                path: path_str,
                language: None,
                indexing_step: IndexingStep::Complete,
                chunks: 0,
                created_at: run_started_at,
                updated_at: run_started_at,
                last_indexed_at: run_started_at,
                parent_id: Some(parent_id),
                project_id,
            })?;
            Ok(id)
        }
    }
}

fn reconcile_file<E: EmbeddingProvider>(
    store: &Store,
    project_id: i64,
    entry: &ScannedEntry,
    language: &Option<String>,
    parent_id: Uuid,
    run_started_at: DateTime<Utc>,
    vectors: &Arc<Mutex<SqliteVectorStore<E>>>,
) -> Result<()> {
    let path_str = entry.path.to_string_lossy().to_string();
    let initial_step = if language.is_some() {
        IndexingStep::Definitions
    } else {
        IndexingStep::Vector
    };

    match store.get_file_by_path(project_id, &path_str)? {
        Some(existing) if existing.last_indexed_at >= entry.mtime => {
            store.touch_file(existing.id, run_started_at)?;
        }
        Some(existing) => {
            if existing.chunks > 0 {
                vectors
                    .lock()
                    .expect("vector store mutex poisoned")
                    .delete(&chunk_doc_ids(existing.id, existing.chunks))?;
            }
            store.delete_files(&[existing.id])?;
            store.upsert_file(&StoreFile {
                id: Uuid::new_v4(),
                name: file_name(&entry.path),
                path: path_str,
                language: language.clone(),
                indexing_step: initial_step,
                chunks: 0,
                created_at: run_started_at,
                updated_at: run_started_at,
                last_indexed_at: run_started_at,
                parent_id: Some(parent_id),
                project_id,
            })?;
        }
        None => {
            store.upsert_file(&StoreFile {
                id: Uuid::new_v4(),
                name: file_name(&entry.path),
                path: path_str,
                language: language.clone(),
                indexing_step: initial_step,
                chunks: 0,
                created_at: run_started_at,
                updated_at: run_started_at,
                last_indexed_at: run_started_at,
                parent_id: Some(parent_id),
                project_id,
            })?;
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[derive(Clone, Copy)]
enum ParseOp {
    Definitions,
    References,
}

fn parser_for(language: Option<&str>) -> Option<Box<dyn ParserTrait>> {
    match language {
        Some("python") => Some(Box::new(PythonParser::new())),
        _ => None,
    }
}

fn lock_ttl() -> chrono::Duration {
    chrono::Duration::seconds(120)
}

/// Renews `lock` only when `extend_lock`'s quarter-TTL policy says it's due,
/// reconstructing the last renewal time from `expires_at - ttl` rather than
/// threading a separate timestamp through every caller.
fn renew_lock_if_due(lock_conn: &Connection, lock: &mut LockHandle, ttl: chrono::Duration) -> Result<()> {
    let now = Utc::now();
    let last_extended_at = lock.expires_at - ttl;
    if codeindex_store::extend_lock(last_extended_at, now, ttl) != last_extended_at {
        codeindex_store::extend(lock_conn, lock, ttl)?;
    }
    Ok(())
}

/// Runs one parser stage to exhaustion: repeatedly pulls up to `batch_size`
/// files at `from_step`, processes up to `max_workers` of them concurrently
/// (each on its own catalog connection), advances each to `to_step`, and
/// loops until the step is empty.
#[allow(clippy::too_many_arguments)]
async fn run_parser_stage(
    db_path: &Path,
    lock_conn: &Connection,
    lock: &mut LockHandle,
    project_id: i64,
    options: &IndexingOptions,
    from_step: IndexingStep,
    to_step: IndexingStep,
    op: ParseOp,
) -> Result<Vec<String>> {
    let coordinator = Store::open(db_path)?;
    let mut completed_paths = Vec::new();
    let semaphore = Arc::new(Semaphore::new(options.max_workers.max(1)));

    loop {
        let batch = coordinator.files_at_step(project_id, from_step, options.batch_size)?;
        if batch.is_empty() {
            break;
        }
        renew_lock_if_due(lock_conn, lock, lock_ttl())?;

        let mut tasks = JoinSet::new();
        for file in batch {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore closed");
            let db_path = db_path.to_path_buf();
            let path = file.path.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                process_one_file(&db_path, project_id, &file, op, to_step).map(|()| path)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let path = joined.map_err(|e| IndexerError::TaskPanicked(e.to_string()))??;
            completed_paths.push(path);
        }
    }

    Ok(completed_paths)
}

fn process_one_file(
    db_path: &Path,
    project_id: i64,
    file: &StoreFile,
    op: ParseOp,
    to_step: IndexingStep,
) -> Result<()> {
    let store = Store::open(db_path)?;
    let Some(parser) = parser_for(file.language.as_deref()) else {
        store.set_file_step(file.id, to_step)?;
        return Ok(());
    };

    let source = match std::fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(err) => {
            log::warn!("skipping {}: {err}", file.path);
            store.set_file_step(file.id, to_step)?;
            return Ok(());
        }
    };

    let project_root = store
        .get_project(project_id)?
        .map(|p| PathBuf::from(p.root_path))
        .unwrap_or_default();
    let mut ctx = ParseContext::new(project_id, &project_root, file, &store, &source);

    match op {
        ParseOp::Definitions => parser.extract_definitions(&mut ctx)?,
        ParseOp::References => parser.extract_references(&mut ctx)?,
    }

    store.set_file_step(file.id, to_step)?;
    Ok(())
}

/// Runs the vector stage to exhaustion: chunks each file at the `Vector`
/// step, embeds and upserts its chunks, and advances it to `Complete`.
async fn run_vector_stage<E>(
    db_path: &Path,
    lock_conn: &Connection,
    lock: &mut LockHandle,
    vectors: &Arc<Mutex<SqliteVectorStore<E>>>,
    project_id: i64,
    options: &IndexingOptions,
) -> Result<Vec<String>>
where
    E: EmbeddingProvider + Send + 'static,
{
    let coordinator = Store::open(db_path)?;
    let mut completed_paths = Vec::new();

    loop {
        let batch = coordinator.files_at_step(project_id, IndexingStep::Vector, options.batch_size)?;
        if batch.is_empty() {
            break;
        }
        renew_lock_if_due(lock_conn, lock, lock_ttl())?;

        for file in batch {
            vectorize_one_file(db_path, vectors, project_id, &file, options)?;
            completed_paths.push(file.path.clone());
        }
    }

    Ok(completed_paths)
}

fn vectorize_one_file<E>(
    db_path: &Path,
    vectors: &Arc<Mutex<SqliteVectorStore<E>>>,
    project_id: i64,
    file: &StoreFile,
    options: &IndexingOptions,
) -> Result<()>
where
    E: EmbeddingProvider,
{
    let store = Store::open(db_path)?;
    let source = match std::fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(err) => {
            log::warn!("skipping {}: {err}", file.path);
            store.set_file_step(file.id, IndexingStep::Complete)?;
            return Ok(());
        }
    };

    let config = ChunkerConfig {
        strategy: ChunkingStrategy::Ast,
        target_chunk_tokens: options.chunk_size,
        ..ChunkerConfig::default()
    };
    let chunker = Chunker::new(config);
    let code_chunks = chunker.chunk_str(&source, Some(file.path.as_str()))?;

    let chunks: Vec<VectorChunk> = code_chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let node_ids = chunk
                .metadata
                .qualified_name
                .as_deref()
                .and_then(|qn| store.find_node_by_qualifier(project_id, qn))
                .into_iter()
                .collect();
            VectorChunk {
                file_id: file.id,
                chunk_id: index as i64,
                text: chunk.content,
                token_count: chunk.token_count,
                node_ids,
                language: chunk.metadata.language,
            }
        })
        .collect();

    let chunk_count = chunks.len() as i64;
    if !chunks.is_empty() {
        let guard = vectors.lock().expect("vector store mutex poisoned");
        guard.upsert(&chunks)?;
    }

    store.set_chunk_count(file.id, chunk_count)?;
    store.set_file_step(file.id, IndexingStep::Complete)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeindex_vector_store::test_support::StubEmbeddingProvider;
    use codeindex_vector_store::{ChunkFilter, SqliteVectorStore};
    use std::fs;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn reconcile_creates_rows_for_new_python_file() {
        let project_dir = TempDir::new().unwrap();
        fs::write(project_dir.path().join("main.py"), "def greet():\n    pass\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let project = store
            .create_project("demo", &project_dir.path().to_string_lossy())
            .unwrap();
        reconcile(
            &store,
            project.id,
            project_dir.path(),
            &IndexingOptions::default(),
            Utc::now(),
            &test_vectors(),
        )
        .unwrap();

        let file = store
            .get_file_by_path(
                project.id,
                &project_dir.path().join("main.py").to_string_lossy(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(file.indexing_step.as_str(), "definitions");
        assert_eq!(file.language.as_deref(), Some("python"));
    }

    #[test]
    fn reconcile_removes_rows_for_deleted_files() {
        let project_dir = TempDir::new().unwrap();
        let doomed = project_dir.path().join("doomed.py");
        fs::write(&doomed, "x = 1\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let project = store
            .create_project("demo", &project_dir.path().to_string_lossy())
            .unwrap();
        let options = IndexingOptions::default();
        let vectors = test_vectors();
        reconcile(&store, project.id, project_dir.path(), &options, Utc::now(), &vectors).unwrap();
        assert!(store
            .get_file_by_path(project.id, &doomed.to_string_lossy())
            .unwrap()
            .is_some());

        fs::remove_file(&doomed).unwrap();
        reconcile(
            &store,
            project.id,
            project_dir.path(),
            &options,
            Utc::now() + chrono::Duration::seconds(1),
            &vectors,
        )
        .unwrap();
        assert!(store
            .get_file_by_path(project.id, &doomed.to_string_lossy())
            .unwrap()
            .is_none());
    }

    #[test]
    fn reconcile_deletes_vector_chunks_for_removed_files() {
        let project_dir = TempDir::new().unwrap();
        let doomed = project_dir.path().join("doomed.py");
        fs::write(&doomed, "x = 1\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let project = store
            .create_project("demo", &project_dir.path().to_string_lossy())
            .unwrap();
        let options = IndexingOptions::default();
        let vectors = test_vectors();
        reconcile(&store, project.id, project_dir.path(), &options, Utc::now(), &vectors).unwrap();

        let doomed_file = store
            .get_file_by_path(project.id, &doomed.to_string_lossy())
            .unwrap()
            .unwrap();
        store.set_chunk_count(doomed_file.id, 2).unwrap();
        {
            let guard = vectors.lock().unwrap();
            guard
                .upsert(&[
                    sample_chunk(doomed_file.id, 0),
                    sample_chunk(doomed_file.id, 1),
                ])
                .unwrap();
        }

        fs::remove_file(&doomed).unwrap();
        reconcile(
            &store,
            project.id,
            project_dir.path(),
            &options,
            Utc::now() + chrono::Duration::seconds(1),
            &vectors,
        )
        .unwrap();

        let guard = vectors.lock().unwrap();
        let remaining = guard
            .get(
                &ChunkFilter {
                    file_id: Some(doomed_file.id),
                    ..Default::default()
                },
                10,
                0,
            )
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn reconcile_deletes_vector_chunks_for_modified_files() {
        let project_dir = TempDir::new().unwrap();
        let path = project_dir.path().join("changed.py");
        fs::write(&path, "x = 1\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let project = store
            .create_project("demo", &project_dir.path().to_string_lossy())
            .unwrap();
        let options = IndexingOptions::default();
        let vectors = test_vectors();
        reconcile(&store, project.id, project_dir.path(), &options, Utc::now(), &vectors).unwrap();

        let original = store
            .get_file_by_path(project.id, &path.to_string_lossy())
            .unwrap()
            .unwrap();
        store.set_chunk_count(original.id, 1).unwrap();
        {
            let guard = vectors.lock().unwrap();
            guard.upsert(&[sample_chunk(original.id, 0)]).unwrap();
        }

        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&path, "x = 2\ny = 3\n").unwrap();
        reconcile(
            &store,
            project.id,
            project_dir.path(),
            &options,
            Utc::now() + chrono::Duration::seconds(1),
            &vectors,
        )
        .unwrap();

        let guard = vectors.lock().unwrap();
        let remaining = guard
            .get(
                &ChunkFilter {
                    file_id: Some(original.id),
                    ..Default::default()
                },
                10,
                0,
            )
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn reconcile_skips_directories_matching_the_skip_pattern() {
        let project_dir = TempDir::new().unwrap();
        fs::create_dir(project_dir.path().join("__pycache__")).unwrap();
        fs::write(project_dir.path().join("__pycache__/cache.py"), "x = 1\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let project = store
            .create_project("demo", &project_dir.path().to_string_lossy())
            .unwrap();
        reconcile(
            &store,
            project.id,
            project_dir.path(),
            &IndexingOptions::default(),
            Utc::now(),
            &test_vectors(),
        )
        .unwrap();

        assert!(store
            .get_file_by_path(
                project.id,
                &project_dir.path().join("__pycache__").to_string_lossy()
            )
            .unwrap()
            .is_none());
    }

    fn test_vectors() -> Arc<Mutex<SqliteVectorStore<StubEmbeddingProvider>>> {
        Arc::new(Mutex::new(
            SqliteVectorStore::open_in_memory(StubEmbeddingProvider { dimensions: 8 }).unwrap(),
        ))
    }

    fn sample_chunk(file_id: Uuid, chunk_id: i64) -> VectorChunk {
        VectorChunk {
            file_id,
            chunk_id,
            text: format!("chunk {chunk_id}"),
            token_count: 4,
            node_ids: Vec::new(),
            language: Some("python".to_string()),
        }
    }

    #[tokio::test]
    async fn end_to_end_run_indexes_a_small_python_project() {
        let project_dir = TempDir::new().unwrap();
        fs::write(
            project_dir.path().join("greeter.py"),
            "def greet(name):\n    return name\n\n\ndef main():\n    greet(\"world\")\n",
        )
        .unwrap();

        let db_file = NamedTempFile::new().unwrap();
        let db_path = db_file.path().to_path_buf();
        let project_id = {
            let store = Store::open(&db_path).unwrap();
            create_project(&store, "demo", project_dir.path()).unwrap()
        };

        let vectors = test_vectors();

        let status = run(&db_path, vectors.clone(), project_id, IndexingOptions::default())
            .await
            .unwrap();

        let greeter_path = project_dir.path().join("greeter.py").to_string_lossy().to_string();
        assert_eq!(status.codegraph_indexed_paths, vec![greeter_path.clone()]);
        assert_eq!(status.vector_indexed_paths, vec![greeter_path]);

        let store = Store::open(&db_path).unwrap();
        let file = store
            .get_file_by_path(
                project_id,
                &project_dir.path().join("greeter.py").to_string_lossy(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(file.indexing_step.as_str(), "complete");
        assert!(file.chunks >= 1);

        let guard = vectors.lock().unwrap();
        let hits = guard.get(&ChunkFilter::default(), 10, 0).unwrap();
        assert!(!hits.is_empty());
    }
}
