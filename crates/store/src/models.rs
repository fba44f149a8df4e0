use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage a file has reached in the three-phase pipeline. Stored as its
/// lowercase name; unrecognized values fail to load rather than silently
/// defaulting, since a corrupt stage would desync the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingStep {
    Definitions,
    References,
    Vector,
    Complete,
}

impl IndexingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexingStep::Definitions => "definitions",
            IndexingStep::References => "references",
            IndexingStep::Vector => "vector",
            IndexingStep::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "definitions" => Some(IndexingStep::Definitions),
            "references" => Some(IndexingStep::References),
            "vector" => Some(IndexingStep::Vector),
            "complete" => Some(IndexingStep::Complete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Module,
    Function,
    Class,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Module => "module",
            NodeType::Function => "function",
            NodeType::Class => "class",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "module" => Some(NodeType::Module),
            "function" => Some(NodeType::Function),
            "class" => Some(NodeType::Class),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub root_path: String,
    pub languages: Vec<String>,
    pub root_file_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct File {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub language: Option<String>,
    pub indexing_step: IndexingStep,
    pub chunks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_indexed_at: DateTime<Utc>,
    pub parent_id: Option<Uuid>,
    pub project_id: i64,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: Uuid,
    pub name: String,
    pub global_qualifier: String,
    pub definition: Option<String>,
    pub node_type: NodeType,
    pub file_id: Uuid,
    pub project_id: i64,
}

#[derive(Debug, Clone)]
pub struct AliasRow {
    pub local_qualifier: String,
    pub global_qualifier: String,
    pub project_id: i64,
    pub file_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub source_node_id: Uuid,
    pub target_node_id: Uuid,
    pub line_number: i64,
}
