//! FILENAME: formula-parser/src/analysis.rs
//! PURPOSE: Read-only queries over a parsed formula.
//! CONTEXT: Dependency tracking needs to know which cells and ranges a
//! formula touches, and tooling wants the functions it calls. Both walk the
//! AST without evaluating anything.

use crate::ast::{CellExpr, Node, RangeExpr};

/// A reference found in a formula, borrowed from the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference<'a> {
    /// A single cell, or a lone `$A` / `$1` open reference.
    Cell(&'a CellExpr),
    /// A range; its endpoints are not reported separately.
    Range(&'a RangeExpr),
}

/// Collects every reference in source order.
pub fn collect_references(node: &Node) -> Vec<Reference<'_>> {
    let mut refs = Vec::new();
    node.walk(&mut |n| match n {
        Node::Cell(cell) => refs.push(Reference::Cell(cell)),
        Node::Range(range) => refs.push(Reference::Range(range)),
        _ => {}
    });
    refs
}

/// Collects the names of all called functions in source order, as written.
pub fn collect_function_names(node: &Node) -> Vec<&str> {
    let mut names = Vec::new();
    node.walk(&mut |n| {
        if let Node::FunCall(call) = n {
            names.push(call.name.raw.as_str());
        }
    });
    names
}
