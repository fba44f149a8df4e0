use crate::contextual_imports::{extract_imports_from_lines, filter_relevant_imports};
use crate::error::Result;
use crate::language::Language;
use tree_sitter::{Node, Parser};

/// The syntactic role a chunk plays, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    Module,
    Function,
    Method,
    Struct,
    Enum,
    Class,
    Trait,
    Interface,
    Other,
}

impl ChunkType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Method => "method",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Class => "class",
            Self::Trait => "trait",
            Self::Interface => "interface",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkingStrategy {
    Ast,
    LineCount,
}

impl Default for ChunkingStrategy {
    fn default() -> Self {
        Self::Ast
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapStrategy {
    None,
    Contextual,
}

impl Default for OverlapStrategy {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub strategy: ChunkingStrategy,
    pub overlap: OverlapStrategy,
    pub target_chunk_tokens: usize,
    pub max_chunk_tokens: usize,
    pub min_chunk_tokens: usize,
    pub include_imports: bool,
    pub include_parent_context: bool,
    pub include_documentation: bool,
    pub max_imports_per_chunk: usize,
    pub supported_languages: Vec<Language>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::default(),
            overlap: OverlapStrategy::default(),
            target_chunk_tokens: 400,
            max_chunk_tokens: 1200,
            min_chunk_tokens: 20,
            include_imports: true,
            include_parent_context: true,
            include_documentation: true,
            max_imports_per_chunk: 8,
            supported_languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChunkMetadata {
    pub symbol_name: Option<String>,
    pub qualified_name: Option<String>,
    pub parent_scope: Option<String>,
    pub chunk_type: Option<ChunkType>,
    pub context_imports: Vec<String>,
    pub documentation: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CodeChunk {
    pub content: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub token_count: usize,
    pub metadata: ChunkMetadata,
}

pub struct Chunker {
    config: ChunkerConfig,
}

/// Raw definition-like item extracted from a parse tree, before metadata enrichment.
struct RawItem<'a> {
    node: Node<'a>,
    chunk_type: ChunkType,
    name: String,
    parent_scope: Option<String>,
}

impl Chunker {
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn chunk_str(&self, source: &str, path: Option<&str>) -> Result<Vec<CodeChunk>> {
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file_path = path.unwrap_or("").to_string();
        let language = path.map_or(Language::Unknown, Language::from_path);
        let file_imports =
            extract_imports_from_lines(language, &source.lines().collect::<Vec<_>>(), usize::MAX);

        let use_ast = matches!(self.config.strategy, ChunkingStrategy::Ast)
            && language.supports_ast()
            && (self.config.supported_languages.is_empty()
                || self.config.supported_languages.contains(&language));

        let mut chunks = if use_ast {
            self.chunk_ast(source, &file_path, language, &file_imports)?
        } else {
            self.chunk_lines(source, &file_path, language, &file_imports)
        };

        self.merge_small_chunks(&mut chunks);
        Ok(chunks)
    }

    fn chunk_ast(
        &self,
        source: &str,
        file_path: &str,
        language: Language,
        file_imports: &[String],
    ) -> Result<Vec<CodeChunk>> {
        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|_| crate::error::ChunkerError::ParseFailed)?;
        let tree = parser
            .parse(source, None)
            .ok_or(crate::error::ChunkerError::ParseFailed)?;

        let mut items = Vec::new();
        collect_items(tree.root_node(), source, language, None, &mut items);

        let mut chunks = Vec::with_capacity(items.len());
        for item in items {
            let text = node_text(item.node, source);
            let documentation = self
                .config
                .include_documentation
                .then(|| leading_doc_comment(item.node, source))
                .flatten();

            let qualified_name = if self.config.include_parent_context {
                match &item.parent_scope {
                    Some(scope) => format!("{scope}::{}", item.name),
                    None => item.name.clone(),
                }
            } else {
                item.name.clone()
            };

            let context_imports = if self.config.include_imports {
                filter_relevant_imports(
                    language,
                    file_imports,
                    &text,
                    self.config.max_imports_per_chunk,
                )
            } else {
                Vec::new()
            };

            chunks.push(CodeChunk {
                token_count: estimate_tokens(&text),
                content: text,
                file_path: file_path.to_string(),
                start_line: item.node.start_position().row + 1,
                end_line: item.node.end_position().row + 1,
                metadata: ChunkMetadata {
                    symbol_name: Some(item.name),
                    qualified_name: Some(qualified_name),
                    parent_scope: if self.config.include_parent_context {
                        item.parent_scope
                    } else {
                        None
                    },
                    chunk_type: Some(item.chunk_type),
                    context_imports,
                    documentation,
                    language: Some(language.as_str().to_string()),
                },
            });
        }

        Ok(chunks)
    }

    fn chunk_lines(
        &self,
        source: &str,
        file_path: &str,
        language: Language,
        file_imports: &[String],
    ) -> Vec<CodeChunk> {
        let lines: Vec<&str> = source.lines().collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let lines_per_chunk = (self.config.target_chunk_tokens / 4).max(1);
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < lines.len() {
            let end = (start + lines_per_chunk).min(lines.len());
            let content = lines[start..end].join("\n");
            let context_imports = if self.config.include_imports {
                filter_relevant_imports(
                    language,
                    file_imports,
                    &content,
                    self.config.max_imports_per_chunk,
                )
            } else {
                Vec::new()
            };

            chunks.push(CodeChunk {
                token_count: estimate_tokens(&content),
                content,
                file_path: file_path.to_string(),
                start_line: start + 1,
                end_line: end,
                metadata: ChunkMetadata {
                    symbol_name: None,
                    qualified_name: None,
                    parent_scope: None,
                    chunk_type: None,
                    context_imports,
                    documentation: None,
                    language: (language != Language::Unknown)
                        .then(|| language.as_str().to_string()),
                },
            });

            start = end;
        }

        chunks
    }

    /// Merges an undersized chunk into its predecessor, unless doing so would
    /// hide an addressable symbol (a chunk with its own `symbol_name`).
    fn merge_small_chunks(&self, chunks: &mut Vec<CodeChunk>) {
        if self.config.min_chunk_tokens == 0 || chunks.len() < 2 {
            return;
        }

        let mut merged: Vec<CodeChunk> = Vec::with_capacity(chunks.len());
        for chunk in chunks.drain(..) {
            let should_merge = merged
                .last()
                .is_some_and(|prev| prev.token_count < self.config.min_chunk_tokens)
                && chunk.metadata.symbol_name.is_none();

            if should_merge {
                let prev = merged.last_mut().expect("checked above");
                prev.content.push('\n');
                prev.content.push_str(&chunk.content);
                prev.end_line = chunk.end_line;
                prev.token_count += chunk.token_count;
            } else {
                merged.push(chunk);
            }
        }

        *chunks = merged;
    }
}

fn collect_items<'a>(
    node: Node<'a>,
    source: &str,
    language: Language,
    parent_scope: Option<String>,
    out: &mut Vec<RawItem<'a>>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match language {
            Language::Rust => collect_rust_item(child, source, &parent_scope, out),
            Language::Python => collect_python_item(child, source, &parent_scope, out),
            Language::JavaScript | Language::TypeScript => {
                collect_js_item(child, source, &parent_scope, out);
            }
            _ => {}
        }
    }
}

fn collect_rust_item<'a>(
    node: Node<'a>,
    source: &str,
    parent_scope: &Option<String>,
    out: &mut Vec<RawItem<'a>>,
) {
    match node.kind() {
        "function_item" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: if parent_scope.is_some() {
                        ChunkType::Method
                    } else {
                        ChunkType::Function
                    },
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "struct_item" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Struct,
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "enum_item" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Enum,
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "trait_item" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Trait,
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "impl_item" => {
            let scope = impl_parent_scope(node, source);
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    collect_rust_item(child, source, &Some(scope.clone()), out);
                }
            }
        }
        "mod_item" => {
            if let Some(name) = field_text(node, "name", source) {
                if node.child_by_field_name("body").is_some() {
                    out.push(RawItem {
                        node,
                        chunk_type: ChunkType::Module,
                        name,
                        parent_scope: parent_scope.clone(),
                    });
                }
            }
        }
        _ => {}
    }
}

fn collect_python_item<'a>(
    node: Node<'a>,
    source: &str,
    parent_scope: &Option<String>,
    out: &mut Vec<RawItem<'a>>,
) {
    match node.kind() {
        "function_definition" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: if parent_scope.is_some() {
                        ChunkType::Method
                    } else {
                        ChunkType::Function
                    },
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "class_definition" => {
            if let Some(name) = field_text(node, "name", source) {
                let scope = parent_scope
                    .as_ref()
                    .map_or_else(|| name.clone(), |p| format!("{p}::{name}"));
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Class,
                    name: name.clone(),
                    parent_scope: parent_scope.clone(),
                });
                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        collect_python_item(child, source, &Some(scope.clone()), out);
                    }
                }
            }
        }
        _ => {}
    }
}

fn collect_js_item<'a>(
    node: Node<'a>,
    source: &str,
    parent_scope: &Option<String>,
    out: &mut Vec<RawItem<'a>>,
) {
    match node.kind() {
        "function_declaration" => {
            if let Some(name) = field_text(node, "name", source) {
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Function,
                    name,
                    parent_scope: parent_scope.clone(),
                });
            }
        }
        "class_declaration" => {
            if let Some(name) = field_text(node, "name", source) {
                let scope = parent_scope
                    .as_ref()
                    .map_or_else(|| name.clone(), |p| format!("{p}::{name}"));
                out.push(RawItem {
                    node,
                    chunk_type: ChunkType::Class,
                    name: name.clone(),
                    parent_scope: parent_scope.clone(),
                });
                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        if child.kind() == "method_definition" {
                            if let Some(mname) = field_text(child, "name", source) {
                                out.push(RawItem {
                                    node: child,
                                    chunk_type: ChunkType::Method,
                                    name: mname,
                                    parent_scope: Some(scope.clone()),
                                });
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn field_text(node: Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, source))
}

fn node_text(node: Node, source: &str) -> String {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or_default()
        .to_string()
}

/// Determines the impl's subject type: the type after `for` for trait impls,
/// otherwise the inherent impl's sole type.
fn impl_parent_scope(node: Node, source: &str) -> String {
    let header_end = node
        .child_by_field_name("body")
        .map_or(node.end_byte(), |b| b.start_byte());
    let header = source
        .get(node.start_byte()..header_end)
        .unwrap_or_default();

    let rest = header.trim_start_matches("impl").trim_start();
    let rest = strip_leading_generics(rest);

    if let Some(idx) = find_top_level_for(rest) {
        rest[idx + 5..].trim().to_string()
    } else {
        rest.trim().to_string()
    }
}

fn strip_leading_generics(text: &str) -> &str {
    if !text.starts_with('<') {
        return text;
    }
    let mut depth = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return text[i + 1..].trim_start();
                }
            }
            _ => {}
        }
    }
    text
}

fn find_top_level_for(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth -= 1,
            _ => {}
        }
        if depth == 0 && text[i..].starts_with(" for ") {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn leading_doc_comment(node: Node, source: &str) -> Option<String> {
    let mut sibling = node.prev_sibling();
    let mut lines = Vec::new();
    while let Some(s) = sibling {
        if s.kind() == "line_comment" || s.kind() == "comment" {
            let text = node_text(s, source);
            let trimmed = text
                .trim_start_matches("///")
                .trim_start_matches("//!")
                .trim_start_matches('#')
                .trim();
            lines.push(trimmed.to_string());
            sibling = s.prev_sibling();
        } else {
            break;
        }
    }
    if lines.is_empty() {
        None
    } else {
        lines.reverse();
        Some(lines.join("\n"))
    }
}

fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}
