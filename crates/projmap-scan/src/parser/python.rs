use std::path::Path;

use projmap_core::{Language, Result};
use tree_sitter::Node;

use super::{node_text, parse_syntax, StructureParser};
use crate::tree::{StructuralNode, StructuralTree};

/// Python adapter backed by `tree-sitter-python`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use projmap_scan::parser::{PythonParser, StructureParser};
/// use projmap_scan::tree::StructuralNode;
///
/// let tree = PythonParser.parse("import os\n", Path::new("m.py")).unwrap();
/// assert_eq!(tree.items, vec![StructuralNode::Import(vec!["os".into()])]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl StructureParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn parse(&self, source: &str, path: &Path) -> Result<StructuralTree> {
        let tree = parse_syntax(tree_sitter_python::LANGUAGE.into(), source, path)?;
        Ok(StructuralTree::new(lower_statements(
            tree.root_node(),
            source.as_bytes(),
        )))
    }
}

fn lower_statements(parent: Node, source: &[u8]) -> Vec<StructuralNode> {
    let mut out = Vec::new();
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        if let Some(node) = lower_statement(child, source) {
            out.push(node);
        }
    }
    out
}

fn lower_statement(node: Node, source: &[u8]) -> Option<StructuralNode> {
    match node.kind() {
        "import_statement" => Some(StructuralNode::Import(import_names(node, source))),
        "import_from_statement" | "future_import_statement" => {
            Some(StructuralNode::Import(from_import_names(node, source)))
        }
        "class_definition" => {
            let name = node_text(&node.child_by_field_name("name")?, source);
            let body = node
                .child_by_field_name("body")
                .map(|b| lower_statements(b, source))
                .unwrap_or_default();
            Some(StructuralNode::Class { name, body })
        }
        // Covers `async def` too: the grammar marks it with an `async` token.
        "function_definition" => {
            let name = node_text(&node.child_by_field_name("name")?, source);
            let body = node
                .child_by_field_name("body")
                .map(|b| lower_statements(b, source))
                .unwrap_or_default();
            Some(StructuralNode::Function { name, body })
        }
        "decorated_definition" => node
            .child_by_field_name("definition")
            .and_then(|def| lower_statement(def, source)),
        "if_statement" | "for_statement" | "while_statement" | "try_statement"
        | "with_statement" => {
            let body = lower_clauses(node, source);
            (!body.is_empty()).then_some(StructuralNode::Block(body))
        }
        _ => None,
    }
}

/// Statements of every clause of a compound statement, in source order.
fn lower_clauses(node: Node, source: &[u8]) -> Vec<StructuralNode> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "block" => out.extend(lower_statements(child, source)),
            "elif_clause" | "else_clause" | "except_clause" | "except_group_clause"
            | "finally_clause" => out.extend(lower_clauses(child, source)),
            _ => {}
        }
    }
    out
}

/// `import a.b, c as d` -> `["a.b", "c"]`
fn import_names(node: Node, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        if let Some(name) = imported_module(child, source) {
            names.push(name);
        }
    }
    names
}

/// `from pkg import x, y as z` -> `["pkg.x", "pkg.y"]`
fn from_import_names(node: Node, source: &[u8]) -> Vec<String> {
    let module = node
        .child_by_field_name("module_name")
        .map(|m| node_text(&m, source))
        .unwrap_or_else(|| "__future__".to_string());

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        if let Some(name) = imported_module(child, source) {
            names.push(qualify(&module, &name));
        }
    }

    let mut cursor = node.walk();
    let wildcard = node
        .named_children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import");
    if wildcard {
        names.push(qualify(&module, "*"));
    }

    names
}

fn imported_module(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(node_text(&node, source)),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source)),
        _ => None,
    }
}

fn qualify(module: &str, name: &str) -> String {
    if module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}
