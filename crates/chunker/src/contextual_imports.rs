use crate::language::Language;
use std::collections::HashSet;

/// Pull the identifiers a single import statement brings into scope, so a
/// chunk's body can be checked for which of its file's imports it actually
/// uses.
pub fn extract_identifiers_from_import(language: Language, import: &str) -> Vec<String> {
    match language {
        Language::Rust => rust_import_identifiers(import),
        Language::Python => python_import_identifiers(import),
        Language::JavaScript | Language::TypeScript => es_import_identifiers(import),
        _ => Vec::new(),
    }
}

fn rust_import_identifiers(import: &str) -> Vec<String> {
    // use std::collections::HashMap -> HashMap
    // use crate::error::{Result, Error} -> Result, Error
    let Some(last_segment) = import.split("::").last() else {
        return Vec::new();
    };
    let trimmed = last_segment.trim();
    match trimmed.strip_prefix('{') {
        Some(inner) => split_nonempty(inner.trim_end().trim_end_matches('}'), ','),
        None if !trimmed.is_empty() => vec![trimmed.to_string()],
        None => Vec::new(),
    }
}

fn python_import_identifiers(import: &str) -> Vec<String> {
    // from x import A, B -> A, B; import x -> x
    import
        .split_once("import")
        .map(|(_, rest)| split_nonempty(rest, ','))
        .unwrap_or_default()
}

fn es_import_identifiers(import: &str) -> Vec<String> {
    // import { A, B } from 'x' -> A, B
    match (import.find('{'), import.find('}')) {
        (Some(start), Some(end)) if end > start + 1 => split_nonempty(&import[start + 1..end], ','),
        _ => Vec::new(),
    }
}

fn split_nonempty(text: &str, sep: char) -> Vec<String> {
    text.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only the imports whose brought-in identifiers actually appear in
/// `code_content`, bounded to `limit`. Languages without an identifier
/// heuristic fall back to the first `limit` imports unfiltered.
pub fn filter_relevant_imports(
    language: Language,
    file_imports: &[String],
    code_content: &str,
    limit: usize,
) -> Vec<String> {
    if limit == 0 || file_imports.is_empty() || code_content.is_empty() {
        return Vec::new();
    }

    if !language.supports_ast() {
        return file_imports.iter().take(limit).cloned().collect();
    }

    file_imports
        .iter()
        .filter(|import| {
            extract_identifiers_from_import(language, import)
                .iter()
                .any(|ident| code_content.contains(ident.as_str()))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Scan raw source lines for import/use statements, deduplicating and
/// stopping at `limit`. Used to seed a file's import list before any chunk
/// boundaries are known.
pub fn extract_imports_from_lines(language: Language, lines: &[&str], limit: usize) -> Vec<String> {
    if limit == 0 || lines.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in lines {
        if out.len() >= limit {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || !is_import_line(language, trimmed) {
            continue;
        }

        let cleaned = trimmed.trim_end_matches(';').trim().to_string();
        if !cleaned.is_empty() && seen.insert(cleaned.clone()) {
            out.push(cleaned);
        }
    }

    out
}

fn is_import_line(language: Language, line: &str) -> bool {
    match language {
        Language::Rust => {
            let line = line.strip_prefix("pub ").unwrap_or(line);
            line.starts_with("use ") || line.starts_with("extern crate ")
        }
        Language::Python => line.starts_with("import ") || line.starts_with("from "),
        Language::JavaScript | Language::TypeScript => {
            line.starts_with("import ") || line.contains("require(")
        }
        Language::Go | Language::Java | Language::Swift | Language::Kotlin => {
            line.starts_with("import ")
        }
        Language::CSharp => line.starts_with("using "),
        Language::Ruby => line.starts_with("require ") || line.starts_with("include "),
        Language::C | Language::Cpp => line.starts_with("#include "),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_brace_import_yields_each_identifier() {
        let idents = extract_identifiers_from_import(Language::Rust, "use crate::error::{Result, Error}");
        assert_eq!(idents, vec!["Result", "Error"]);
    }

    #[test]
    fn python_from_import_yields_each_identifier() {
        let idents = extract_identifiers_from_import(Language::Python, "from pkg import a, b");
        assert_eq!(idents, vec!["a", "b"]);
    }

    #[test]
    fn filter_relevant_imports_drops_unused_imports() {
        let imports = vec!["use std::fmt::Display".to_string(), "use std::fs::File".to_string()];
        let relevant = filter_relevant_imports(Language::Rust, &imports, "impl Display for Foo {}", 10);
        assert_eq!(relevant, vec!["use std::fmt::Display".to_string()]);
    }

    #[test]
    fn filter_relevant_imports_passes_through_unsupported_languages() {
        let imports = vec!["#include <stdio.h>".to_string()];
        let relevant = filter_relevant_imports(Language::C, &imports, "int main() {}", 10);
        assert_eq!(relevant, imports);
    }

    #[test]
    fn extract_imports_from_lines_dedupes_and_respects_limit() {
        let source = vec!["use std::fmt;", "use std::fmt;", "use std::fs;", "fn main() {}"];
        let imports = extract_imports_from_lines(Language::Rust, &source, 1);
        assert_eq!(imports, vec!["use std::fmt"]);
    }
}
