//! Structural parser adapters.
//!
//! Each supported language has one [`StructureParser`] implementation that
//! runs a tree-sitter grammar and lowers the syntax tree into a
//! [`StructuralTree`]. Files with any syntax error are rejected whole.

mod javascript;
mod python;

use std::path::Path;

use projmap_core::{Language, ProjmapError, Result};
use tree_sitter::{Node, Parser, Tree};

use crate::tree::StructuralTree;

pub use javascript::JavaScriptParser;
pub use python::PythonParser;

/// Converts source text into a [`StructuralTree`].
///
/// Implementations must be deterministic: the same text always lowers to the
/// same tree.
pub trait StructureParser: Send + Sync {
    /// Language this adapter understands.
    fn language(&self) -> Language;

    /// Parse `source`. `path` is only used for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ProjmapError::Parse`] if the text is not valid for the
    /// language.
    fn parse(&self, source: &str, path: &Path) -> Result<StructuralTree>;
}

/// The adapter for `language`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use projmap_core::Language;
/// use projmap_scan::parser::parser_for;
///
/// let parser = parser_for(Language::Python);
/// let tree = parser.parse("def hello():\n    pass\n", Path::new("hello.py")).unwrap();
/// assert_eq!(tree.items.len(), 1);
/// ```
pub fn parser_for(language: Language) -> Box<dyn StructureParser> {
    match language {
        Language::Python => Box::new(PythonParser),
        Language::JavaScript => Box::new(JavaScriptParser),
    }
}

/// Run a tree-sitter grammar over `source` and reject any tree with errors.
pub(crate) fn parse_syntax(
    grammar: tree_sitter::Language,
    source: &str,
    path: &Path,
) -> Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&grammar).map_err(|e| ProjmapError::Parse {
        path: path.to_path_buf(),
        message: format!("failed to set language: {e}"),
    })?;

    let Some(tree) = parser.parse(source, None) else {
        return Err(ProjmapError::Parse {
            path: path.to_path_buf(),
            message: "parser produced no tree".into(),
        });
    };

    if let Some(bad) = first_error(tree.root_node()) {
        let pos = bad.start_position();
        let location = format!("line {}, column {}", pos.row + 1, pos.column + 1);
        let message = if bad.is_missing() {
            format!("missing `{}` at {location}", bad.kind())
        } else {
            format!("syntax error at {location}")
        };
        return Err(ProjmapError::Parse {
            path: path.to_path_buf(),
            message,
        });
    }

    Ok(tree)
}

/// First error or missing node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn node_text(node: &Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}
