//! Thin binary wrapping the indexing pipeline: `create-project` registers a
//! directory, `index` drives it through definitions, references and vector
//! stages to completion.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeindex_indexer::IndexingOptions;
use codeindex_store::Store;
use codeindex_vector_store::{OrtEmbeddingProvider, SqliteVectorStore};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "codeindex", about = "Structural and semantic code indexing")]
struct Cli {
    /// Path to the catalog database.
    #[arg(long, global = true, default_value = "codeindex.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new project rooted at an existing directory.
    CreateProject {
        name: String,
        root: PathBuf,
    },
    /// Run the indexing pipeline for a project to completion.
    Index {
        project_id: i64,

        #[arg(long)]
        max_workers: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Path to the vector store database.
        #[arg(long, default_value = "codeindex.vectors.db")]
        vector_db: PathBuf,
        /// Path to an ONNX embedding model.
        #[arg(long)]
        model: PathBuf,
        /// Path to the matching tokenizer.json.
        #[arg(long)]
        tokenizer: PathBuf,
        /// Embedding dimensionality the model produces.
        #[arg(long, default_value_t = 384)]
        dimensions: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::CreateProject { name, root } => create_project(&cli.db, &name, &root),
        Commands::Index {
            project_id,
            max_workers,
            batch_size,
            chunk_size,
            vector_db,
            model,
            tokenizer,
            dimensions,
        } => {
            index(
                &cli.db,
                project_id,
                max_workers,
                batch_size,
                chunk_size,
                &vector_db,
                &model,
                &tokenizer,
                dimensions,
            )
            .await
        }
    }
}

fn create_project(db: &Path, name: &str, root: &Path) -> Result<()> {
    let root = root
        .canonicalize()
        .with_context(|| format!("project root {} does not exist", root.display()))?;
    let store = Store::open(db).context("opening catalog database")?;
    let project_id = codeindex_indexer::create_project(&store, name, &root)?;
    println!("{}", serde_json::json!({ "project_id": project_id }));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn index(
    db: &Path,
    project_id: i64,
    max_workers: Option<usize>,
    batch_size: Option<usize>,
    chunk_size: Option<usize>,
    vector_db: &Path,
    model: &Path,
    tokenizer: &Path,
    dimensions: usize,
) -> Result<()> {
    let mut options = IndexingOptions::default();

    let project_root = {
        let store = Store::open(db).context("opening catalog database")?;
        let project = store
            .get_project(project_id)?
            .with_context(|| format!("project {project_id} not found"))?;
        PathBuf::from(project.root_path)
    };
    config::load(&project_root)?.apply_to(&mut options);

    if let Some(max_workers) = max_workers {
        options.max_workers = max_workers;
    }
    if let Some(batch_size) = batch_size {
        options.batch_size = batch_size;
    }
    if let Some(chunk_size) = chunk_size {
        options.chunk_size = chunk_size;
    }

    let embedder = OrtEmbeddingProvider::load(model, tokenizer, dimensions)
        .context("loading embedding model")?;
    let vectors = Arc::new(Mutex::new(
        SqliteVectorStore::open(vector_db, embedder).context("opening vector store")?,
    ));

    let status = codeindex_indexer::run(db, vectors, project_id, options).await?;
    println!(
        "{}",
        serde_json::json!({
            "started_at": status.started_at.to_rfc3339(),
            "duration_ms": status.duration.as_millis(),
            "codegraph_indexed_paths": status.codegraph_indexed_paths,
            "vector_indexed_paths": status.vector_indexed_paths,
        })
    );
    Ok(())
}
