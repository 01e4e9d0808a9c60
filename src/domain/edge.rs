// Graph edges: directed, typed relationships between two nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::node::NodeId;

/// Stable index of an edge slot in a graph's edge store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

/// Classification of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    AssociatedToken,
    NextToken,
    AstChild,
    None,
    LastWrite,
    LastUse,
    ComputedFrom,
    ReturnsTo,
    FormalArgName,
    GuardedBy,
    GuardedByNegation,
    LastLexicalUse,
    Comment,
    AssociatedSymbol,
    HasType,
    AssignableTo,
    MethodSignature,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 17] = [
        EdgeKind::AssociatedToken,
        EdgeKind::NextToken,
        EdgeKind::AstChild,
        EdgeKind::None,
        EdgeKind::LastWrite,
        EdgeKind::LastUse,
        EdgeKind::ComputedFrom,
        EdgeKind::ReturnsTo,
        EdgeKind::FormalArgName,
        EdgeKind::GuardedBy,
        EdgeKind::GuardedByNegation,
        EdgeKind::LastLexicalUse,
        EdgeKind::Comment,
        EdgeKind::AssociatedSymbol,
        EdgeKind::HasType,
        EdgeKind::AssignableTo,
        EdgeKind::MethodSignature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::AssociatedToken => "ASSOCIATED_TOKEN",
            EdgeKind::NextToken => "NEXT_TOKEN",
            EdgeKind::AstChild => "AST_CHILD",
            EdgeKind::None => "NONE",
            EdgeKind::LastWrite => "LAST_WRITE",
            EdgeKind::LastUse => "LAST_USE",
            EdgeKind::ComputedFrom => "COMPUTED_FROM",
            EdgeKind::ReturnsTo => "RETURNS_TO",
            EdgeKind::FormalArgName => "FORMAL_ARG_NAME",
            EdgeKind::GuardedBy => "GUARDED_BY",
            EdgeKind::GuardedByNegation => "GUARDED_BY_NEGATION",
            EdgeKind::LastLexicalUse => "LAST_LEXICAL_USE",
            EdgeKind::Comment => "COMMENT",
            EdgeKind::AssociatedSymbol => "ASSOCIATED_SYMBOL",
            EdgeKind::HasType => "HAS_TYPE",
            EdgeKind::AssignableTo => "ASSIGNABLE_TO",
            EdgeKind::MethodSignature => "METHOD_SIGNATURE",
        }
    }

    /// Edges derived purely from syntax shape.
    pub fn is_structural(self) -> bool {
        matches!(self, EdgeKind::AstChild | EdgeKind::NextToken)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship. Two edges with the same source, destination and
/// kind compare equal, but a graph may still hold both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureEdge {
    pub source_id: NodeId,
    pub destination_id: NodeId,
    pub kind: EdgeKind,
}

impl FeatureEdge {
    pub fn new(source_id: NodeId, destination_id: NodeId, kind: EdgeKind) -> Self {
        Self {
            source_id,
            destination_id,
            kind,
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source_id == node || self.destination_id == node
    }
}

impl fmt::Display for FeatureEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source_id, self.kind, self.destination_id)
    }
}
