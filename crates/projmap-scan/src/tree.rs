//! Parser-independent structural tree.
//!
//! Parser adapters lower their grammar-specific syntax trees into this shape;
//! the entity extractor only ever sees a [`StructuralTree`].

/// The lexical skeleton of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralTree {
    /// Statements of interest at module scope, in source order.
    pub items: Vec<StructuralNode>,
}

/// One structurally relevant statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralNode {
    /// An import statement and the target names it declares.
    Import(Vec<String>),
    /// A class declaration with its lowered body.
    Class {
        name: String,
        body: Vec<StructuralNode>,
    },
    /// A function or method declaration with its lowered body.
    Function {
        name: String,
        body: Vec<StructuralNode>,
    },
    /// A compound statement that does not open a new scope
    /// (`if`, `try`, `with`, loops, `export` wrappers).
    Block(Vec<StructuralNode>),
}

impl StructuralTree {
    pub fn new(items: Vec<StructuralNode>) -> Self {
        Self { items }
    }
}
