//! Resolves a dotted local qualifier to the symbol it ultimately denotes by
//! walking alias chains with longest-prefix match.
//!
//! An alias maps a `local_qualifier` (as seen in the module that imported it)
//! to a `global_qualifier` (the name it points at, possibly itself an
//! alias). Resolution rewrites the unmatched suffix onto the alias's target
//! and recurses until either a concrete symbol is found or no alias matches.

use uuid::Uuid;

/// Maximum alias chain depth before giving up. Alias chains in well-formed
/// projects are a handful of hops deep; this bounds pathological or cyclic
/// data rather than looping.
pub const MAX_RESOLUTION_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct Alias {
    pub local_qualifier: String,
    pub global_qualifier: String,
}

/// Backing lookups the resolver needs. Implemented by the relational store
/// in production, and by a plain map in tests.
pub trait AliasLookup {
    /// Returns the alias, among `prefixes`, whose `local_qualifier` is the
    /// longest match, if any.
    fn find_alias_by_prefixes(&self, project_id: i64, prefixes: &[String]) -> Option<Alias>;

    /// Returns the symbol id for an exact qualifier, if one is defined.
    fn find_node_by_qualifier(&self, project_id: i64, qualifier: &str) -> Option<Uuid>;
}

/// Resolves `qualifier` within `project_id` to a concrete symbol id, or
/// `None` if no alias or symbol matches.
pub fn resolve(lookup: &dyn AliasLookup, project_id: i64, qualifier: &str) -> Option<Uuid> {
    resolve_inner(lookup, project_id, qualifier, 0)
}

fn resolve_inner(
    lookup: &dyn AliasLookup,
    project_id: i64,
    qualifier: &str,
    depth: usize,
) -> Option<Uuid> {
    if depth >= MAX_RESOLUTION_DEPTH {
        return None;
    }

    let prefixes = prefixes_longest_first(qualifier);
    if let Some(alias) = lookup.find_alias_by_prefixes(project_id, &prefixes) {
        let suffix = qualifier[alias.local_qualifier.len()..].trim_start_matches('.');
        let rewritten = if suffix.is_empty() {
            alias.global_qualifier
        } else {
            format!("{}.{}", alias.global_qualifier, suffix)
        };
        return resolve_inner(lookup, project_id, &rewritten, depth + 1);
    }

    lookup.find_node_by_qualifier(project_id, qualifier)
}

/// `a.b.c` -> `["a.b.c", "a.b", "a"]`.
fn prefixes_longest_first(qualifier: &str) -> Vec<String> {
    let parts: Vec<&str> = qualifier.split('.').collect();
    (1..=parts.len())
        .rev()
        .map(|n| parts[..n].join("."))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeStore {
        aliases: HashMap<String, Alias>,
        nodes: HashMap<String, Uuid>,
    }

    impl AliasLookup for FakeStore {
        fn find_alias_by_prefixes(&self, _project_id: i64, prefixes: &[String]) -> Option<Alias> {
            prefixes.iter().find_map(|p| self.aliases.get(p).cloned())
        }

        fn find_node_by_qualifier(&self, _project_id: i64, qualifier: &str) -> Option<Uuid> {
            self.nodes.get(qualifier).copied()
        }
    }

    #[test]
    fn prefixes_are_longest_first() {
        assert_eq!(
            prefixes_longest_first("a.b.c"),
            vec!["a.b.c".to_string(), "a.b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn resolves_direct_symbol_with_no_alias() {
        let target = Uuid::new_v4();
        let store = FakeStore {
            aliases: HashMap::new(),
            nodes: HashMap::from([("file.simple_fn".to_string(), target)]),
        };
        assert_eq!(resolve(&store, 1, "file.simple_fn"), Some(target));
    }

    #[test]
    fn resolves_through_a_single_alias_hop() {
        let target = Uuid::new_v4();
        let store = FakeStore {
            aliases: HashMap::from([(
                "file1.file2".to_string(),
                Alias {
                    local_qualifier: "file1.file2".to_string(),
                    global_qualifier: "file2".to_string(),
                },
            )]),
            nodes: HashMap::from([("file2".to_string(), target)]),
        };
        assert_eq!(resolve(&store, 1, "file1.file2"), Some(target));
    }

    #[test]
    fn resolves_longest_prefix_and_rewrites_suffix() {
        let target = Uuid::new_v4();
        let store = FakeStore {
            aliases: HashMap::from([(
                "file1.func4a".to_string(),
                Alias {
                    local_qualifier: "file1.func4a".to_string(),
                    global_qualifier: "module1.file3.func4a".to_string(),
                },
            )]),
            nodes: HashMap::from([("module1.file3.func4a".to_string(), target)]),
        };
        assert_eq!(resolve(&store, 1, "file1.func4a"), Some(target));
    }

    #[test]
    fn resolves_through_chained_aliases() {
        let target = Uuid::new_v4();
        let store = FakeStore {
            aliases: HashMap::from([
                (
                    "file1.f3a".to_string(),
                    Alias {
                        local_qualifier: "file1.f3a".to_string(),
                        global_qualifier: "module1.func3a".to_string(),
                    },
                ),
                (
                    "module1.func3a".to_string(),
                    Alias {
                        local_qualifier: "module1.func3a".to_string(),
                        global_qualifier: "module1.file3.func3a".to_string(),
                    },
                ),
            ]),
            nodes: HashMap::from([("module1.file3.func3a".to_string(), target)]),
        };
        assert_eq!(resolve(&store, 1, "file1.f3a"), Some(target));
    }

    #[test]
    fn resolves_a_sub_attribute_of_an_aliased_prefix() {
        let target = Uuid::new_v4();
        let store = FakeStore {
            aliases: HashMap::from([(
                "file1.mod_alias".to_string(),
                Alias {
                    local_qualifier: "file1.mod_alias".to_string(),
                    global_qualifier: "pkg.real_mod".to_string(),
                },
            )]),
            nodes: HashMap::from([("pkg.real_mod.thing".to_string(), target)]),
        };
        assert_eq!(resolve(&store, 1, "file1.mod_alias.thing"), Some(target));
    }

    #[test]
    fn missing_qualifier_resolves_to_none() {
        let store = FakeStore {
            aliases: HashMap::new(),
            nodes: HashMap::new(),
        };
        assert_eq!(resolve(&store, 1, "nope.nothing"), None);
    }

    struct CyclicStore;
    impl AliasLookup for CyclicStore {
        fn find_alias_by_prefixes(&self, _project_id: i64, prefixes: &[String]) -> Option<Alias> {
            let local = prefixes.first().cloned().unwrap_or_default();
            Some(Alias {
                global_qualifier: local.clone(),
                local_qualifier: local,
            })
        }

        fn find_node_by_qualifier(&self, _project_id: i64, _qualifier: &str) -> Option<Uuid> {
            None
        }
    }

    #[test]
    fn cyclic_alias_chain_terminates_at_depth_bound() {
        assert_eq!(resolve(&CyclicStore, 1, "a.b"), None);
    }
}
