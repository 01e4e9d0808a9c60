// Domain model for feature graphs: nodes, edges, the graph container and line mapping.

pub mod edge;
pub mod error;
pub mod graph;
pub mod line_map;
pub mod node;

pub use edge::{EdgeId, EdgeKind, FeatureEdge};
pub use error::GraphError;
pub use graph::{FeatureGraph, SyntaxKey};
pub use line_map::LineMap;
pub use node::{FeatureNode, NodeId, NodeKind};
