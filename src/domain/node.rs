// Graph nodes: one per program element (AST node, token, comment, symbol).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node, unique within one graph and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Token,
    AstElement,
    CommentLine,
    CommentBlock,
    CommentJavadoc,
    AstRoot,
    IdentifierToken,
    FakeAst,
    Symbol,
    SymbolTyp,
    SymbolVar,
    SymbolMth,
    Type,
    MethodSignature,
    AstLeaf,
    SyntheticAstElement,
}

impl NodeKind {
    pub const ALL: [NodeKind; 16] = [
        NodeKind::Token,
        NodeKind::AstElement,
        NodeKind::CommentLine,
        NodeKind::CommentBlock,
        NodeKind::CommentJavadoc,
        NodeKind::AstRoot,
        NodeKind::IdentifierToken,
        NodeKind::FakeAst,
        NodeKind::Symbol,
        NodeKind::SymbolTyp,
        NodeKind::SymbolVar,
        NodeKind::SymbolMth,
        NodeKind::Type,
        NodeKind::MethodSignature,
        NodeKind::AstLeaf,
        NodeKind::SyntheticAstElement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Token => "TOKEN",
            NodeKind::AstElement => "AST_ELEMENT",
            NodeKind::CommentLine => "COMMENT_LINE",
            NodeKind::CommentBlock => "COMMENT_BLOCK",
            NodeKind::CommentJavadoc => "COMMENT_JAVADOC",
            NodeKind::AstRoot => "AST_ROOT",
            NodeKind::IdentifierToken => "IDENTIFIER_TOKEN",
            NodeKind::FakeAst => "FAKE_AST",
            NodeKind::Symbol => "SYMBOL",
            NodeKind::SymbolTyp => "SYMBOL_TYP",
            NodeKind::SymbolVar => "SYMBOL_VAR",
            NodeKind::SymbolMth => "SYMBOL_MTH",
            NodeKind::Type => "TYPE",
            NodeKind::MethodSignature => "METHOD_SIGNATURE",
            NodeKind::AstLeaf => "AST_LEAF",
            NodeKind::SyntheticAstElement => "SYNTHETIC_AST_ELEMENT",
        }
    }

    /// Kinds removed by leaf pruning once they have no successors.
    pub fn is_prunable(self) -> bool {
        matches!(self, NodeKind::AstElement | NodeKind::SyntheticAstElement)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A program element in the feature graph.
///
/// Nodes are immutable once created; a graph changes a node only by
/// replacing it with a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Source text payload, possibly empty
    pub contents: String,
    /// Char offset of the first character
    pub start_position: usize,
    /// Char offset one past the last character
    pub end_position: usize,
    /// 1-based line of `start_position`
    pub start_line: usize,
    /// 1-based line of `end_position`
    pub end_line: usize,
}

impl FeatureNode {
    /// Text shown for the node: its contents, or the kind name if there are none.
    pub fn display_text(&self) -> &str {
        if self.contents.is_empty() {
            self.kind.as_str()
        } else {
            &self.contents
        }
    }

    pub fn has_span(&self, start: usize, end: usize) -> bool {
        self.start_position == start && self.end_position == end
    }
}
