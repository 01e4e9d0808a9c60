use thiserror::Error;

use crate::domain::edge::FeatureEdge;
use crate::domain::node::NodeId;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Precondition failures raised by [`crate::domain::graph::FeatureGraph`].
///
/// None of these are transient; they indicate a bug in whatever pass is
/// building or querying the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),

    #[error("no edge {0} is in the graph")]
    UnknownEdge(FeatureEdge),

    #[error("node {0} has no syntax association")]
    NodeNotAssociated(NodeId),

    #[error("node {node} is associated with {count} syntax keys")]
    AmbiguousAssociation { node: NodeId, count: usize },

    #[error("graph invariant violated: {0}")]
    InvariantViolation(String),

    #[error("node {0} has no associated identifier token")]
    NoIdentifier(NodeId),

    #[error("node id {0} appears more than once")]
    DuplicateNode(NodeId),
}
