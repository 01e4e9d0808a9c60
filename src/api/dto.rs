use serde::{Deserialize, Serialize};

use crate::domain::edge::FeatureEdge;
use crate::domain::node::FeatureNode;

/// Flat, self-contained snapshot of a feature graph.
///
/// This is the form a graph takes on disk or on the wire. List order is
/// insertion order and carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub source_file: String,
    pub nodes: Vec<FeatureNode>,
    pub edges: Vec<FeatureEdge>,
}

impl GraphRecord {
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_bincode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    pub fn from_bincode(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }
}
