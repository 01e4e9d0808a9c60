use std::collections::HashMap;

use crate::domain::node::NodeId;
use crate::ports::{TypeDescriptor, TypeOracle};

/// In-memory type information keyed by graph node.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, TypeDescriptor>,
}

impl TypeTable {
    pub fn insert(&mut self, node: NodeId, descriptor: TypeDescriptor) {
        self.types.insert(node, descriptor);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Approximate type name of `node`, if known.
    pub fn approx_type_name(&self, node: NodeId) -> Option<&str> {
        self.types.get(&node).map(|t| t.name.as_str())
    }
}

impl TypeOracle for TypeTable {
    fn type_of(&self, node: NodeId) -> Option<&TypeDescriptor> {
        self.types.get(&node)
    }

    // Annotations carry no subtyping, so only identical names are assignable.
    fn is_assignable(&self, from: NodeId, to: NodeId) -> bool {
        match (self.types.get(&from), self.types.get(&to)) {
            (Some(a), Some(b)) => a.name == b.name,
            _ => false,
        }
    }
}
