//! Text-level parsing of Python import statements into alias rows.
//!
//! Node discovery (which statements are imports, and the scope they sit
//! in) comes from walking the tree-sitter tree; the statement text itself
//! is parsed with plain string splitting rather than tree-sitter's import
//! grammar fields, since the construction rules below are fully specified
//! by shape alone and don't need a field-accurate parse.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAlias {
    pub local_qualifier: String,
    pub global_qualifier: String,
}

/// Parses an `import ...` statement (no `from`) into alias rows scoped to
/// `module_qualifier`.
pub fn parse_import_statement(text: &str, module_qualifier: &str) -> Vec<ImportAlias> {
    let rest = text.trim().trim_start_matches("import").trim();
    rest.split(',')
        .filter_map(|item| {
            let (name, alias) = split_as_clause(item.trim());
            if name.is_empty() {
                return None;
            }
            let local_name = alias.unwrap_or(name);
            Some(ImportAlias {
                local_qualifier: format!("{module_qualifier}.{local_name}"),
                global_qualifier: name.to_string(),
            })
        })
        .collect()
}

/// Parses a `from ... import ...` statement into alias rows, handling
/// relative imports by consuming `level` trailing segments of
/// `module_qualifier`.
pub fn parse_import_from_statement(text: &str, module_qualifier: &str) -> Vec<ImportAlias> {
    let rest = text.trim().trim_start_matches("from").trim();
    let Some(import_at) = find_keyword(rest, "import") else {
        return Vec::new();
    };
    let module_clause = rest[..import_at].trim();
    let names_clause = rest[import_at + "import".len()..].trim();

    let (level, module_name) = split_relative(module_clause);
    let names_clause = names_clause.trim_start_matches('(').trim_end_matches(')');

    names_clause
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() || item == "*" {
                return None;
            }
            let (name, alias) = split_as_clause(item);
            if name.is_empty() {
                return None;
            }
            let local_name = alias.unwrap_or(name);
            Some(ImportAlias {
                local_qualifier: format!("{module_qualifier}.{local_name}"),
                global_qualifier: global_qualifier_for_from_import(
                    module_qualifier,
                    level,
                    module_name.as_deref(),
                    name,
                ),
            })
        })
        .collect()
}

fn split_as_clause(item: &str) -> (&str, Option<&str>) {
    match find_keyword(item, "as") {
        Some(idx) => {
            let name = item[..idx].trim();
            let alias = item[idx + "as".len()..].trim();
            (name, Some(alias))
        }
        None => (item.trim(), None),
    }
}

/// Finds a whole-word occurrence of `keyword` in `text`, avoiding matches
/// inside longer identifiers (e.g. `import` inside `reimport_thing`).
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let klen = keyword.len();
    let mut idx = 0;
    while let Some(offset) = text[idx..].find(keyword) {
        let start = idx + offset;
        let end = start + klen;
        let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let after_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            return Some(start);
        }
        idx = start + klen;
        if idx >= text.len() {
            break;
        }
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn split_relative(module_clause: &str) -> (usize, Option<String>) {
    let level = module_clause.chars().take_while(|c| *c == '.').count();
    let remainder = &module_clause[level..];
    let module_name = if remainder.is_empty() {
        None
    } else {
        Some(remainder.to_string())
    };
    (level, module_name)
}

fn global_qualifier_for_from_import(
    module_qualifier: &str,
    level: usize,
    module_name: Option<&str>,
    name: &str,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if level > 0 {
        let segments: Vec<&str> = module_qualifier.split('.').collect();
        let keep = segments.len().saturating_sub(level);
        parts.extend(segments[..keep].iter().map(|s| s.to_string()));
    }
    if let Some(module_name) = module_name {
        parts.push(module_name.to_string());
    }
    parts.push(name.to_string());
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_import() {
        let aliases = parse_import_statement("import x", "m");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "m.x".to_string(),
                global_qualifier: "x".to_string(),
            }]
        );
    }

    #[test]
    fn import_with_alias() {
        let aliases = parse_import_statement("import x as y", "m");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "m.y".to_string(),
                global_qualifier: "x".to_string(),
            }]
        );
    }

    #[test]
    fn dotted_import() {
        let aliases = parse_import_statement("import x.y", "m");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "m.x.y".to_string(),
                global_qualifier: "x.y".to_string(),
            }]
        );
    }

    #[test]
    fn from_import() {
        let aliases = parse_import_from_statement("from x import z", "m");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "m.z".to_string(),
                global_qualifier: "x.z".to_string(),
            }]
        );
    }

    #[test]
    fn from_import_with_alias() {
        let aliases = parse_import_from_statement("from x import z as w", "m");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "m.w".to_string(),
                global_qualifier: "x.z".to_string(),
            }]
        );
    }

    #[test]
    fn relative_from_import_consumes_trailing_segments() {
        // module qualifier "pkg.sub.file", level-2 relative import
        let aliases = parse_import_from_statement("from ..other import z", "pkg.sub.file");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "pkg.sub.file.z".to_string(),
                global_qualifier: "pkg.other.z".to_string(),
            }]
        );
    }

    #[test]
    fn relative_from_import_with_no_module_name() {
        let aliases = parse_import_from_statement("from . import z", "pkg.sub.file");
        assert_eq!(
            aliases,
            vec![ImportAlias {
                local_qualifier: "pkg.sub.file.z".to_string(),
                global_qualifier: "pkg.sub.z".to_string(),
            }]
        );
    }

    #[test]
    fn multiple_names_in_one_statement() {
        let aliases = parse_import_statement("import a, b as c", "m");
        assert_eq!(
            aliases,
            vec![
                ImportAlias {
                    local_qualifier: "m.a".to_string(),
                    global_qualifier: "a".to_string(),
                },
                ImportAlias {
                    local_qualifier: "m.c".to_string(),
                    global_qualifier: "b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn wildcard_import_yields_no_aliases() {
        assert!(parse_import_from_statement("from x import *", "m").is_empty());
    }
}
