use crate::context::ParseContext;
use crate::error::{ParserError, Result};
use crate::imports::{parse_import_from_statement, parse_import_statement};
use crate::Parser as ParserTrait;
use codeindex_store::{AliasRow, Node, NodeType, Reference};
use tree_sitter::{Node as TsNode, Parser as TsParser};
use uuid::Uuid;

/// Populates the store from Python source: module/function/class symbols,
/// import aliases, and caller/callee reference edges.
pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, source: &str) -> Result<tree_sitter::Tree> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::Language(e.to_string()))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParserError::Encoding("failed to parse python source".to_string()))
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserTrait for PythonParser {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extract_definitions(&self, ctx: &mut ParseContext) -> Result<()> {
        let tree = self.parse_tree(ctx.source)?;

        if tree.root_node().has_error() {
            log::warn!("syntax error in {}, skipping", ctx.file.path);
            return Ok(());
        }

        let module_qualifier = ctx.module_qualifier();
        let module_id = Uuid::new_v4();
        ctx.store.create_node(&Node {
            id: module_id,
            name: ctx.file.name.clone(),
            global_qualifier: module_qualifier.clone(),
            definition: None,
            node_type: NodeType::Module,
            file_id: ctx.file.id,
            project_id: ctx.project_id,
        })?;

        walk_definitions(
            tree.root_node(),
            ctx.source,
            &module_qualifier,
            &module_qualifier,
            module_id,
            module_id,
            ctx,
        )?;

        ctx.tree = Some(tree);
        Ok(())
    }

    fn extract_references(&self, ctx: &mut ParseContext) -> Result<()> {
        let tree = self.parse_tree(ctx.source)?;
        if tree.root_node().has_error() {
            return Ok(());
        }

        let module_qualifier = ctx.module_qualifier();
        walk_references(tree.root_node(), ctx.source, &module_qualifier, ctx)?;

        ctx.tree = Some(tree);
        Ok(())
    }
}

/// `scope_qualifier`/`scope_id` track the immediate enclosing symbol;
/// `module_qualifier`/`module_id` stay fixed at the file's module symbol so
/// every definition, however deeply nested, also gets a module-level
/// reference edge.
#[allow(clippy::too_many_arguments)]
fn walk_definitions(
    node: TsNode,
    source: &str,
    scope_qualifier: &str,
    module_qualifier: &str,
    scope_id: Uuid,
    module_id: Uuid,
    ctx: &mut ParseContext,
) -> Result<()> {
    match node.kind() {
        "function_definition" | "class_definition" => {
            let Some(name) = field_text(node, "name", source) else {
                return Ok(());
            };
            let global_qualifier = format!("{scope_qualifier}.{name}");
            let definition = Some(node_text(node, source));
            let node_type = if node.kind() == "class_definition" {
                NodeType::Class
            } else {
                NodeType::Function
            };
            let id = Uuid::new_v4();
            ctx.store.create_node(&Node {
                id,
                name,
                global_qualifier: global_qualifier.clone(),
                definition,
                node_type,
                file_id: ctx.file.id,
                project_id: ctx.project_id,
            })?;

            let line_number = (node.start_position().row + 1) as i64;
            ctx.store.create_reference(&Reference {
                source_node_id: module_id,
                target_node_id: id,
                line_number,
            })?;
            if scope_id != module_id {
                ctx.store.create_reference(&Reference {
                    source_node_id: scope_id,
                    target_node_id: id,
                    line_number,
                })?;
            }

            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    walk_definitions(
                        child,
                        source,
                        &global_qualifier,
                        module_qualifier,
                        id,
                        module_id,
                        ctx,
                    )?;
                }
            }
        }
        "import_statement" => {
            let text = node_text(node, source);
            for alias in parse_import_statement(&text, module_qualifier) {
                create_alias(ctx, alias)?;
            }
        }
        "import_from_statement" => {
            let text = node_text(node, source);
            for alias in parse_import_from_statement(&text, module_qualifier) {
                create_alias(ctx, alias)?;
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_definitions(
                    child,
                    source,
                    scope_qualifier,
                    module_qualifier,
                    scope_id,
                    module_id,
                    ctx,
                )?;
            }
        }
    }
    Ok(())
}

fn create_alias(ctx: &ParseContext, alias: crate::imports::ImportAlias) -> Result<()> {
    ctx.store.create_alias(&AliasRow {
        local_qualifier: alias.local_qualifier,
        global_qualifier: alias.global_qualifier,
        project_id: ctx.project_id,
        file_id: ctx.file.id,
    })?;
    Ok(())
}

fn walk_references(
    node: TsNode,
    source: &str,
    scope_qualifier: &str,
    ctx: &mut ParseContext,
) -> Result<()> {
    match node.kind() {
        "function_definition" | "class_definition" => {
            let Some(name) = field_text(node, "name", source) else {
                return Ok(());
            };
            let global_qualifier = format!("{scope_qualifier}.{name}");
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    walk_references(child, source, &global_qualifier, ctx)?;
                }
            }
        }
        "call" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                if matches!(function_node.kind(), "identifier" | "attribute") {
                    let callee = node_text(function_node, source);
                    if let Some(target_id) =
                        codeindex_resolver::resolve(ctx.store, ctx.project_id, &callee)
                    {
                        if let Some(source_id) =
                            ctx.store.find_node_by_qualifier(ctx.project_id, scope_qualifier)
                        {
                            let line_number = (node.start_position().row + 1) as i64;
                            ctx.store.create_reference(&Reference {
                                source_node_id: source_id,
                                target_node_id: target_id,
                                line_number,
                            })?;
                        }
                    }
                }
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_references(child, source, scope_qualifier, ctx)?;
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_references(child, source, scope_qualifier, ctx)?;
            }
        }
    }
    Ok(())
}

fn field_text(node: TsNode, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field).map(|n| node_text(n, source))
}

fn node_text(node: TsNode, source: &str) -> String {
    source[node.start_byte()..node.end_byte()].to_string()
}
