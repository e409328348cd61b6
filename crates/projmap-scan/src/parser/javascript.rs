use std::path::Path;

use projmap_core::{Language, Result};
use tree_sitter::Node;

use super::{node_text, parse_syntax, StructureParser};
use crate::tree::{StructuralNode, StructuralTree};

/// JavaScript adapter backed by `tree-sitter-javascript`.
///
/// Imports are recorded by module specifier (`import x from "react"` gives
/// `"react"`). Functions bound through `const f = () => {}` count as
/// functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptParser;

impl StructureParser for JavaScriptParser {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn parse(&self, source: &str, path: &Path) -> Result<StructuralTree> {
        let tree = parse_syntax(tree_sitter_javascript::LANGUAGE.into(), source, path)?;
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
        lower_statement(child, source, &mut out);
    }
    out
}

fn lower_statement(node: Node, source: &[u8], out: &mut Vec<StructuralNode>) {
    match node.kind() {
        "import_statement" => {
            if let Some(specifier) = node.child_by_field_name("source") {
                out.push(StructuralNode::Import(vec![string_value(specifier, source)]));
            }
        }
        "export_statement" => {
            let mut inner = Vec::new();
            if let Some(decl) = node.child_by_field_name("declaration") {
                lower_statement(decl, source, &mut inner);
            } else if let Some(value) = node.child_by_field_name("value") {
                lower_default_export(value, source, &mut inner);
            }
            if !inner.is_empty() {
                out.push(StructuralNode::Block(inner));
            }
        }
        "class_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                out.push(lower_class(node_text(&name, source), node, source));
            }
        }
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                out.push(StructuralNode::Function {
                    name: node_text(&name, source),
                    body: function_body(node, source),
                });
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() == "variable_declarator" {
                    lower_declarator(declarator, source, out);
                }
            }
        }
        _ => {}
    }
}

/// `const f = () => {}` binds a function; `const C = class {}` binds a class.
fn lower_declarator(node: Node, source: &[u8], out: &mut Vec<StructuralNode>) {
    let (Some(name), Some(value)) = (
        node.child_by_field_name("name"),
        node.child_by_field_name("value"),
    ) else {
        return;
    };
    if name.kind() != "identifier" {
        return;
    }
    let name = node_text(&name, source);

    match value.kind() {
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            out.push(StructuralNode::Function {
                name,
                body: function_body(value, source),
            });
        }
        "class" => out.push(lower_class(name, value, source)),
        _ => {}
    }
}

/// `export default class App {}` may parse as a named class expression.
fn lower_default_export(value: Node, source: &[u8], out: &mut Vec<StructuralNode>) {
    let Some(name) = value.child_by_field_name("name") else {
        return;
    };
    let name = node_text(&name, source);
    match value.kind() {
        "class" => out.push(lower_class(name, value, source)),
        "function_expression" | "function" | "generator_function" => {
            out.push(StructuralNode::Function {
                name,
                body: function_body(value, source),
            });
        }
        _ => {}
    }
}

fn lower_class(name: String, node: Node, source: &[u8]) -> StructuralNode {
    let mut body = Vec::new();
    if let Some(class_body) = node.child_by_field_name("body") {
        let mut cursor = class_body.walk();
        for member in class_body.named_children(&mut cursor) {
            if member.kind() != "method_definition" {
                continue;
            }
            if let Some(method) = member.child_by_field_name("name") {
                body.push(StructuralNode::Function {
                    name: node_text(&method, source),
                    body: function_body(member, source),
                });
            }
        }
    }
    StructuralNode::Class { name, body }
}

fn function_body(node: Node, source: &[u8]) -> Vec<StructuralNode> {
    match node.child_by_field_name("body") {
        Some(body) if body.kind() == "statement_block" => lower_statements(body, source),
        _ => Vec::new(),
    }
}

/// Text of a string literal without its quotes.
fn string_value(node: Node, source: &[u8]) -> String {
    node_text(&node, source)
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}
