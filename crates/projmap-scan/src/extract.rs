use projmap_core::{ClassEntity, FileEntities};

use crate::tree::{StructuralNode, StructuralTree};

/// Collect the per-file record from a structural tree.
///
/// Module scope yields imports, classes and top-level functions, looking
/// through non-scoping blocks. Methods are only the functions that are direct
/// children of a class body; nested classes, conditional definitions and
/// anything inside a function body are ignored.
///
/// # Examples
///
/// ```
/// use projmap_scan::extract::extract_entities;
/// use projmap_scan::tree::{StructuralNode, StructuralTree};
///
/// let tree = StructuralTree::new(vec![
///     StructuralNode::Import(vec!["os".into()]),
///     StructuralNode::Function { name: "main".into(), body: vec![] },
/// ]);
/// let entities = extract_entities(&tree);
/// assert_eq!(entities.imports, vec!["os"]);
/// assert_eq!(entities.functions, vec!["main"]);
/// assert!(entities.classes.is_empty());
/// ```
pub fn extract_entities(tree: &StructuralTree) -> FileEntities {
    let mut entities = FileEntities::default();
    collect_module_scope(&tree.items, &mut entities);
    entities
}

fn collect_module_scope(nodes: &[StructuralNode], entities: &mut FileEntities) {
    for node in nodes {
        match node {
            StructuralNode::Import(names) => entities.imports.extend(names.iter().cloned()),
            StructuralNode::Class { name, body } => {
                let mut methods = Vec::new();
                collect_methods(body, &mut methods);
                entities.classes.push(ClassEntity {
                    name: name.clone(),
                    methods,
                });
            }
            StructuralNode::Function { name, .. } => entities.functions.push(name.clone()),
            StructuralNode::Block(inner) => collect_module_scope(inner, entities),
        }
    }
}

fn collect_methods(nodes: &[StructuralNode], methods: &mut Vec<String>) {
    for node in nodes {
        match node {
            StructuralNode::Function { name, .. } => methods.push(name.clone()),
            StructuralNode::Block(_)
            | StructuralNode::Class { .. }
            | StructuralNode::Import(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::parser::{JavaScriptParser, PythonParser, StructureParser};

    fn func(name: &str, body: Vec<StructuralNode>) -> StructuralNode {
        StructuralNode::Function {
            name: name.into(),
            body,
        }
    }

    fn class(name: &str, body: Vec<StructuralNode>) -> StructuralNode {
        StructuralNode::Class {
            name: name.into(),
            body,
        }
    }

    fn python(source: &str) -> FileEntities {
        extract_entities(&PythonParser.parse(source, Path::new("m.py")).unwrap())
    }

    #[test]
    fn methods_are_not_top_level_functions() {
        let tree = StructuralTree::new(vec![
            func("f", Vec::new()),
            class("C", vec![func("g", Vec::new())]),
        ]);
        let entities = extract_entities(&tree);

        assert_eq!(entities.functions, vec!["f"]);
        assert_eq!(
            entities.classes,
            vec![ClassEntity {
                name: "C".into(),
                methods: vec!["g".into()],
            }]
        );
    }

    #[test]
    fn class_without_methods_has_empty_list() {
        let entities = extract_entities(&StructuralTree::new(vec![class("Empty", Vec::new())]));
        assert_eq!(entities.classes[0].methods, Vec::<String>::new());
    }

    #[test]
    fn nested_classes_are_not_methods() {
        let tree = StructuralTree::new(vec![class(
            "Outer",
            vec![
                func("a", Vec::new()),
                class("Inner", vec![func("hidden", Vec::new())]),
                func("b", Vec::new()),
            ],
        )]);
        let entities = extract_entities(&tree);

        assert_eq!(entities.classes.len(), 1);
        assert_eq!(entities.classes[0].methods, vec!["a", "b"]);
    }

    #[test]
    fn function_bodies_are_opaque() {
        let tree = StructuralTree::new(vec![func(
            "outer",
            vec![
                func("inner", Vec::new()),
                class("Local", Vec::new()),
                StructuralNode::Import(vec!["lazy".into()]),
            ],
        )]);
        let entities = extract_entities(&tree);

        assert_eq!(entities.functions, vec!["outer"]);
        assert!(entities.classes.is_empty());
        assert!(entities.imports.is_empty());
    }

    #[test]
    fn blocks_are_transparent_at_module_scope_only() {
        let tree = StructuralTree::new(vec![
            StructuralNode::Block(vec![
                StructuralNode::Import(vec!["json".into()]),
                func("maybe", Vec::new()),
            ]),
            class(
                "C",
                vec![StructuralNode::Block(vec![func("conditional", Vec::new())])],
            ),
        ]);
        let entities = extract_entities(&tree);

        assert_eq!(entities.imports, vec!["json"]);
        assert_eq!(entities.functions, vec!["maybe"]);
        assert!(entities.classes[0].methods.is_empty());
    }

    #[test]
    fn conditional_definitions_in_class_body_are_not_methods() {
        let entities = python(
            r#"
class C:
    def direct(self):
        pass

    if True:
        def m(self):
            pass

    try:
        def t(self):
            pass
    except ImportError:
        pass
"#,
        );

        assert_eq!(entities.classes.len(), 1);
        assert_eq!(entities.classes[0].methods, vec!["direct"]);
        assert!(entities.functions.is_empty());
    }

    #[test]
    fn empty_tree_gives_empty_record() {
        let entities = extract_entities(&StructuralTree::default());
        assert!(entities.is_empty());
    }

    #[test]
    fn python_end_to_end() {
        let entities = python(
            r#"
import os
from typing import List

class MyClass:
    def method_one(self):
        pass

    async def method_two(self):
        def helper():
            pass

def top_level_function():
    def nested():
        pass

async def async_function():
    pass
"#,
        );

        assert_eq!(entities.imports, vec!["os", "typing.List"]);
        assert_eq!(
            entities.classes,
            vec![ClassEntity {
                name: "MyClass".into(),
                methods: vec!["method_one".into(), "method_two".into()],
            }]
        );
        assert_eq!(
            entities.functions,
            vec!["top_level_function", "async_function"]
        );
    }

    #[test]
    fn only_imports_in_order() {
        let entities = python("import a\nimport b\n");
        assert_eq!(entities.imports, vec!["a", "b"]);
        assert!(entities.classes.is_empty());
        assert!(entities.functions.is_empty());
    }

    #[test]
    fn javascript_end_to_end() {
        let source = r#"
import fs from "fs";

export class Store {
    load() {}
    save() {}
}

export function main() {}
const helper = () => 1;
"#;
        let tree = JavaScriptParser.parse(source, Path::new("app.js")).unwrap();
        let entities = extract_entities(&tree);

        assert_eq!(entities.imports, vec!["fs"]);
        assert_eq!(entities.classes[0].name, "Store");
        assert_eq!(entities.classes[0].methods, vec!["load", "save"]);
        assert_eq!(entities.functions, vec!["main", "helper"]);
    }
}
