//! Feature Graph
//!
//! A directed multigraph over program elements. Nodes are created
//! incrementally by a traversal pass, deduplicated by the identity of the
//! syntax element they came from; analysis passes then query the graph by
//! edge kind and add semantic edges.
//!
//! Storage is a flat edge store plus per-node outgoing/incoming index lists.
//! Removed edges leave a tombstone, so an [`EdgeId`] never changes meaning.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::api::dto::GraphRecord;
use crate::domain::edge::{EdgeId, EdgeKind, FeatureEdge};
use crate::domain::error::{GraphError, Result};
use crate::domain::line_map::LineMap;
use crate::domain::node::{FeatureNode, NodeId, NodeKind};

/// Opaque handle the traversal assigns to a syntax element.
///
/// Visiting the same element twice must produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxKey(pub u64);

impl SyntaxKey {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

pub struct FeatureGraph {
    source_file: String,
    line_map: LineMap,
    nodes: BTreeMap<NodeId, FeatureNode>,
    edges: Vec<Option<FeatureEdge>>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,
    associations: HashMap<SyntaxKey, NodeId>,
    // Reverse of `associations`
    associated_keys: HashMap<NodeId, Vec<SyntaxKey>>,
    next_id: u64,
    live_edges: usize,
}

impl FeatureGraph {
    pub fn new(source_file: impl Into<String>, line_map: LineMap) -> Self {
        Self {
            source_file: source_file.into(),
            line_map,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            associations: HashMap::new(),
            associated_keys: HashMap::new(),
            next_id: 0,
            live_edges: 0,
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    // ─────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────

    /// Create the node for a syntax element, or return the one already
    /// created for `key`. A repeated call ignores its other arguments.
    pub fn create_node(
        &mut self,
        kind: NodeKind,
        contents: impl Into<String>,
        start: usize,
        end: usize,
        key: SyntaxKey,
    ) -> &FeatureNode {
        let id = match self.associations.get(&key) {
            Some(&existing) => existing,
            None => {
                let id = self.insert_node(kind, contents.into(), start, end);
                self.associations.insert(key, id);
                self.associated_keys.entry(id).or_default().push(key);
                id
            }
        };
        &self.nodes[&id]
    }

    /// Create a node with no syntax association, e.g. a synthesized symbol.
    pub fn create_node_detached(
        &mut self,
        kind: NodeKind,
        contents: impl Into<String>,
        start: usize,
        end: usize,
    ) -> &FeatureNode {
        let id = self.insert_node(kind, contents.into(), start, end);
        &self.nodes[&id]
    }

    fn insert_node(&mut self, kind: NodeKind, contents: String, start: usize, end: usize) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let node = FeatureNode {
            id,
            kind,
            contents,
            start_position: start,
            end_position: end,
            start_line: self.line_map.line_number(start),
            end_line: self.line_map.line_number(end),
        };
        self.nodes.insert(id, node);
        id
    }

    /// Add an edge. Self-loops and parallel edges are allowed.
    pub fn add_edge(&mut self, source: NodeId, dest: NodeId, kind: EdgeKind) -> Result<EdgeId> {
        self.require(source)?;
        self.require(dest)?;
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(FeatureEdge::new(source, dest, kind)));
        self.outgoing.entry(source).or_default().push(id);
        self.incoming.entry(dest).or_default().push(id);
        self.live_edges += 1;
        Ok(id)
    }

    /// Node previously created for `key`, if it is still in the graph.
    pub fn node_for_key(&self, key: SyntaxKey) -> Option<&FeatureNode> {
        self.associations.get(&key).and_then(|id| self.nodes.get(id))
    }

    /// Point the syntax key of `old` at `new` instead. Graph membership of
    /// both nodes is left alone.
    pub fn replace_node_association(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.require(old)?;
        self.require(new)?;
        let key = match self.associated_keys.get(&old).map(Vec::as_slice) {
            None | Some([]) => return Err(GraphError::NodeNotAssociated(old)),
            Some([key]) => *key,
            Some(keys) => {
                return Err(GraphError::AmbiguousAssociation {
                    node: old,
                    count: keys.len(),
                })
            }
        };
        self.associated_keys.remove(&old);
        self.associations.insert(key, new);
        self.associated_keys.entry(new).or_default().push(key);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Removal
    // ─────────────────────────────────────────────────────────────────────

    /// Remove a node with every edge incident to it. Its syntax keys are
    /// forgotten, so creating a node for them again yields a fresh node.
    pub fn remove_node(&mut self, id: NodeId) -> Result<FeatureNode> {
        let node = self.nodes.remove(&id).ok_or(GraphError::UnknownNode(id))?;
        let mut incident = self.outgoing.remove(&id).unwrap_or_default();
        incident.extend(self.incoming.remove(&id).unwrap_or_default());
        for edge_id in incident {
            self.detach_edge(edge_id);
        }
        for key in self.associated_keys.remove(&id).unwrap_or_default() {
            self.associations.remove(&key);
        }
        Ok(node)
    }

    /// Remove one instance of an edge equal to `edge`.
    pub fn remove_edge(&mut self, edge: &FeatureEdge) -> Result<()> {
        let found = self.outgoing.get(&edge.source_id).and_then(|ids| {
            ids.iter()
                .copied()
                .find(|id| self.edges[id.0].as_ref() == Some(edge))
        });
        match found {
            Some(id) => {
                self.detach_edge(id);
                Ok(())
            }
            None => Err(GraphError::UnknownEdge(*edge)),
        }
    }

    /// Remove the edge stored at `id`, if it is still live.
    pub fn remove_edge_at(&mut self, id: EdgeId) -> Option<FeatureEdge> {
        self.detach_edge(id)
    }

    fn detach_edge(&mut self, id: EdgeId) -> Option<FeatureEdge> {
        let edge = self.edges.get_mut(id.0)?.take()?;
        if let Some(ids) = self.outgoing.get_mut(&edge.source_id) {
            ids.retain(|&e| e != id);
        }
        if let Some(ids) = self.incoming.get_mut(&edge.destination_id) {
            ids.retain(|&e| e != id);
        }
        self.live_edges -= 1;
        Some(edge)
    }

    /// Remove AST elements without successors until none are left. Removing
    /// a leaf can turn its parent into a leaf, hence the loop.
    pub fn prune_leaf_ast_nodes(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let leaves: Vec<NodeId> = self
                .nodes
                .values()
                .filter(|n| n.kind.is_prunable() && self.out_degree(n.id) == 0)
                .map(|n| n.id)
                .collect();
            if leaves.is_empty() {
                break;
            }
            for id in leaves {
                if self.remove_node(id).is_ok() {
                    removed += 1;
                }
            }
        }
        debug!(removed, file = %self.source_file, "pruned leaf AST nodes");
        removed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&FeatureNode> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&FeatureEdge> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &FeatureNode> {
        self.nodes.values()
    }

    pub fn nodes_of_kind(&self, kinds: &[NodeKind]) -> Vec<&FeatureNode> {
        self.nodes.values().filter(|n| kinds.contains(&n.kind)).collect()
    }

    /// The single `AST_ROOT` node.
    pub fn root(&self) -> Result<&FeatureNode> {
        let roots = self.nodes_of_kind(&[NodeKind::AstRoot]);
        match roots.as_slice() {
            [root] => Ok(*root),
            _ => Err(GraphError::InvariantViolation(format!(
                "expected exactly one AST_ROOT node in {}, found {}",
                self.source_file,
                roots.len()
            ))),
        }
    }

    pub fn tokens(&self) -> Vec<&FeatureNode> {
        self.nodes_of_kind(&[NodeKind::Token, NodeKind::IdentifierToken])
    }

    pub fn ast_nodes(&self) -> Vec<&FeatureNode> {
        self.nodes_of_kind(&[NodeKind::AstElement])
    }

    pub fn comments(&self) -> Vec<&FeatureNode> {
        self.nodes_of_kind(&[
            NodeKind::CommentBlock,
            NodeKind::CommentJavadoc,
            NodeKind::CommentLine,
        ])
    }

    pub fn symbols(&self) -> Vec<&FeatureNode> {
        self.nodes_of_kind(&[NodeKind::Symbol])
    }

    /// All live edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &FeatureEdge> {
        self.edges.iter().flatten()
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> Vec<&FeatureEdge> {
        self.edges().filter(|e| e.kind == kind).collect()
    }

    /// Edges with `id` at either end. A self-loop is listed once.
    pub fn edges_incident_to(&self, id: NodeId) -> Result<Vec<&FeatureEdge>> {
        self.require(id)?;
        let mut ids: Vec<EdgeId> = self.out_ids(id).iter().chain(self.in_ids(id)).copied().collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.into_iter().filter_map(|e| self.edge(e)).collect())
    }

    /// Every edge from `a` to `b`, parallel edges included.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Result<Vec<&FeatureEdge>> {
        self.require(a)?;
        self.require(b)?;
        Ok(self
            .out_ids(a)
            .iter()
            .filter_map(|&e| self.edge(e))
            .filter(|e| e.destination_id == b)
            .collect())
    }

    pub fn successors(&self, id: NodeId) -> Result<Vec<&FeatureNode>> {
        self.neighbours(id, None, Direction::Outgoing)
    }

    /// Nodes one hop away along an edge whose kind is in `kinds`.
    pub fn successors_of_kind(&self, id: NodeId, kinds: &[EdgeKind]) -> Result<Vec<&FeatureNode>> {
        self.neighbours(id, Some(kinds), Direction::Outgoing)
    }

    pub fn predecessors(&self, id: NodeId) -> Result<Vec<&FeatureNode>> {
        self.neighbours(id, None, Direction::Incoming)
    }

    pub fn predecessors_of_kind(&self, id: NodeId, kinds: &[EdgeKind]) -> Result<Vec<&FeatureNode>> {
        self.neighbours(id, Some(kinds), Direction::Incoming)
    }

    fn neighbours(
        &self,
        id: NodeId,
        kinds: Option<&[EdgeKind]>,
        direction: Direction,
    ) -> Result<Vec<&FeatureNode>> {
        self.require(id)?;
        let edge_ids = match direction {
            Direction::Outgoing => self.out_ids(id),
            Direction::Incoming => self.in_ids(id),
        };
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for edge in edge_ids.iter().filter_map(|&e| self.edge(e)) {
            if kinds.map_or(false, |k| !k.contains(&edge.kind)) {
                continue;
            }
            let other = match direction {
                Direction::Outgoing => edge.destination_id,
                Direction::Incoming => edge.source_id,
            };
            if seen.insert(other) {
                if let Some(node) = self.nodes.get(&other) {
                    result.push(node);
                }
            }
        }
        Ok(result)
    }

    /// Nodes whose span is exactly `start..end`.
    pub fn find_nodes_by_span(&self, start: usize, end: usize) -> Vec<&FeatureNode> {
        self.nodes.values().filter(|n| n.has_span(start, end)).collect()
    }

    /// The identifier token standing for `id`: the node itself if it is one,
    /// otherwise its `ASSOCIATED_TOKEN` successor of identifier kind.
    ///
    /// Callers must ensure there is at most one such successor. If there are
    /// several, the earliest-added edge wins.
    pub fn to_identifier_node(&self, id: NodeId) -> Result<&FeatureNode> {
        let node = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
        if node.kind == NodeKind::IdentifierToken {
            return Ok(node);
        }
        let candidates: Vec<&FeatureNode> = self
            .successors_of_kind(id, &[EdgeKind::AssociatedToken])?
            .into_iter()
            .filter(|n| n.kind == NodeKind::IdentifierToken)
            .collect();
        if candidates.len() > 1 {
            warn!(node = %id, count = candidates.len(), "several identifier tokens associated, using the first");
        }
        candidates.into_iter().next().ok_or(GraphError::NoIdentifier(id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot of every node and edge. Also known as the serializable form.
    pub fn to_record(&self) -> GraphRecord {
        GraphRecord {
            source_file: self.source_file.clone(),
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges().copied().collect(),
        }
    }

    /// Rebuild a graph from a record, keeping ids, spans and lines as stored.
    ///
    /// The rebuilt graph has no source text, so nodes created on it later get
    /// line 1.
    pub fn from_record(record: GraphRecord) -> Result<Self> {
        let mut graph = FeatureGraph::new(record.source_file, LineMap::default());
        for node in record.nodes {
            let id = node.id;
            if graph.nodes.insert(id, node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
            let next = id.0.checked_add(1).ok_or_else(|| {
                GraphError::InvariantViolation(format!("node id space exhausted at {}", id))
            })?;
            graph.next_id = graph.next_id.max(next);
        }
        for edge in record.edges {
            graph.add_edge(edge.source_id, edge.destination_id, edge.kind)?;
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            file = %graph.source_file,
            "rebuilt graph from record"
        );
        Ok(graph)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────

    fn require(&self, id: NodeId) -> Result<()> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    fn out_ids(&self, id: NodeId) -> &[EdgeId] {
        self.outgoing.get(&id).map_or(&[], Vec::as_slice)
    }

    fn in_ids(&self, id: NodeId) -> &[EdgeId] {
        self.incoming.get(&id).map_or(&[], Vec::as_slice)
    }

    fn out_degree(&self, id: NodeId) -> usize {
        self.out_ids(id).len()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> FeatureGraph {
        FeatureGraph::new("Test.java", LineMap::new("class A {\n  int x;\n}\n"))
    }

    fn detached(g: &mut FeatureGraph, kind: NodeKind) -> NodeId {
        g.create_node_detached(kind, "", 0, 0).id
    }

    #[test]
    fn test_create_node_assigns_lines() {
        let mut g = graph();
        let node = g.create_node(NodeKind::AstElement, "x", 12, 18, SyntaxKey(1));
        assert_eq!(node.start_line, 2);
        assert_eq!(node.end_line, 2);
        assert_eq!(node.id, NodeId(0));
    }

    #[test]
    fn test_create_node_is_idempotent_per_key() {
        let mut g = graph();
        let first = g.create_node(NodeKind::AstElement, "a", 0, 1, SyntaxKey(7)).id;
        let second = g.create_node(NodeKind::Token, "b", 5, 6, SyntaxKey(7)).clone();
        assert_eq!(first, second.id);
        assert_eq!(second.kind, NodeKind::AstElement);
        assert_eq!(second.contents, "a");
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_add_edge_rejects_unknown_nodes() {
        let mut g = graph();
        let a = detached(&mut g, NodeKind::Token);
        assert_eq!(
            g.add_edge(a, NodeId(99), EdgeKind::NextToken),
            Err(GraphError::UnknownNode(NodeId(99)))
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_edge_ids_survive_removal() {
        let mut g = graph();
        let a = detached(&mut g, NodeKind::Token);
        let b = detached(&mut g, NodeKind::Token);
        let first = g.add_edge(a, b, EdgeKind::NextToken).unwrap();
        let second = g.add_edge(a, b, EdgeKind::LastUse).unwrap();
        assert!(g.remove_edge_at(first).is_some());
        assert!(g.remove_edge_at(first).is_none());
        assert_eq!(g.edge(second).map(|e| e.kind), Some(EdgeKind::LastUse));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_remove_edge_removes_one_instance() {
        let mut g = graph();
        let a = detached(&mut g, NodeKind::Token);
        let b = detached(&mut g, NodeKind::Token);
        g.add_edge(a, b, EdgeKind::LastUse).unwrap();
        g.add_edge(a, b, EdgeKind::LastUse).unwrap();
        let edge = FeatureEdge::new(a, b, EdgeKind::LastUse);
        g.remove_edge(&edge).unwrap();
        assert_eq!(g.edges_between(a, b).unwrap().len(), 1);
        g.remove_edge(&edge).unwrap();
        assert_eq!(g.remove_edge(&edge), Err(GraphError::UnknownEdge(edge)));
    }

    #[test]
    fn test_remove_node_forgets_association() {
        let mut g = graph();
        let a = g.create_node(NodeKind::AstElement, "", 0, 1, SyntaxKey(3)).id;
        g.remove_node(a).unwrap();
        assert!(g.node_for_key(SyntaxKey(3)).is_none());
        let again = g.create_node(NodeKind::AstElement, "", 0, 1, SyntaxKey(3)).id;
        assert_ne!(a, again);
        assert_eq!(g.remove_node(a), Err(GraphError::UnknownNode(a)));
    }

    #[test]
    fn test_replace_node_association() {
        let mut g = graph();
        let old = g.create_node(NodeKind::AstElement, "old", 0, 1, SyntaxKey(10)).id;
        let new = g.create_node_detached(NodeKind::AstElement, "new", 0, 1).id;
        g.replace_node_association(old, new).unwrap();
        assert_eq!(g.node_for_key(SyntaxKey(10)).map(|n| n.id), Some(new));
        assert!(g.contains_node(old));
        assert_eq!(
            g.replace_node_association(old, new),
            Err(GraphError::NodeNotAssociated(old))
        );

        // `new` now holds key 10; give it a second key to make it ambiguous
        let other = g.create_node(NodeKind::AstElement, "other", 0, 1, SyntaxKey(11)).id;
        g.replace_node_association(other, new).unwrap();
        assert_eq!(
            g.replace_node_association(new, old),
            Err(GraphError::AmbiguousAssociation { node: new, count: 2 })
        );
    }

    #[test]
    fn test_root_requires_exactly_one() {
        let mut g = graph();
        assert!(matches!(g.root(), Err(GraphError::InvariantViolation(_))));
        let r = detached(&mut g, NodeKind::AstRoot);
        assert_eq!(g.root().map(|n| n.id), Ok(r));
        detached(&mut g, NodeKind::AstRoot);
        assert!(matches!(g.root(), Err(GraphError::InvariantViolation(_))));
    }

    #[test]
    fn test_filtered_successors_deduplicate() {
        let mut g = graph();
        let a = detached(&mut g, NodeKind::AstElement);
        let b = detached(&mut g, NodeKind::AstElement);
        let c = detached(&mut g, NodeKind::AstElement);
        g.add_edge(a, b, EdgeKind::AstChild).unwrap();
        g.add_edge(a, b, EdgeKind::LastUse).unwrap();
        g.add_edge(a, c, EdgeKind::LastUse).unwrap();

        let ids = |nodes: Vec<&FeatureNode>| nodes.into_iter().map(|n| n.id).collect::<Vec<_>>();
        assert_eq!(ids(g.successors(a).unwrap()), vec![b, c]);
        assert_eq!(ids(g.successors_of_kind(a, &[EdgeKind::AstChild]).unwrap()), vec![b]);
        assert_eq!(ids(g.predecessors_of_kind(b, &[EdgeKind::LastUse]).unwrap()), vec![a]);
        assert!(g.predecessors_of_kind(c, &[EdgeKind::AstChild]).unwrap().is_empty());
        assert!(g.successors(NodeId(42)).is_err());
    }

    #[test]
    fn test_find_nodes_by_span() {
        let mut g = graph();
        let a = g.create_node_detached(NodeKind::Token, "int", 12, 15).id;
        g.create_node_detached(NodeKind::Token, "x", 16, 17);
        let found: Vec<NodeId> = g.find_nodes_by_span(12, 15).into_iter().map(|n| n.id).collect();
        assert_eq!(found, vec![a]);
        assert!(g.find_nodes_by_span(12, 17).is_empty());
    }

    #[test]
    fn test_to_identifier_node_without_candidate() {
        let mut g = graph();
        let e = detached(&mut g, NodeKind::AstElement);
        let t = detached(&mut g, NodeKind::Token);
        g.add_edge(e, t, EdgeKind::AssociatedToken).unwrap();
        assert_eq!(g.to_identifier_node(e), Err(GraphError::NoIdentifier(e)));
    }

    #[test]
    fn test_prune_is_iterative() {
        let mut g = graph();
        let root = detached(&mut g, NodeKind::AstRoot);
        let a = detached(&mut g, NodeKind::AstElement);
        let b = detached(&mut g, NodeKind::SyntheticAstElement);
        let c = detached(&mut g, NodeKind::AstElement);
        let token = detached(&mut g, NodeKind::IdentifierToken);
        let d = detached(&mut g, NodeKind::AstElement);
        g.add_edge(root, a, EdgeKind::AstChild).unwrap();
        g.add_edge(a, b, EdgeKind::AstChild).unwrap();
        g.add_edge(b, c, EdgeKind::AstChild).unwrap();
        g.add_edge(root, d, EdgeKind::AstChild).unwrap();
        g.add_edge(d, token, EdgeKind::AssociatedToken).unwrap();

        assert_eq!(g.prune_leaf_ast_nodes(), 3);
        let remaining: Vec<NodeId> = g.nodes().map(|n| n.id).collect();
        assert_eq!(remaining, vec![root, token, d]);
        assert_eq!(g.prune_leaf_ast_nodes(), 0);
    }

    #[test]
    fn test_from_record_rejects_duplicates_and_dangling_edges() {
        let mut g = graph();
        let a = detached(&mut g, NodeKind::Token);
        let mut record = g.to_record();
        record.nodes.push(record.nodes[0].clone());
        assert!(matches!(
            FeatureGraph::from_record(record),
            Err(GraphError::DuplicateNode(id)) if id == a
        ));

        let mut record = g.to_record();
        record.edges.push(FeatureEdge::new(a, NodeId(8), EdgeKind::LastUse));
        assert!(matches!(
            FeatureGraph::from_record(record),
            Err(GraphError::UnknownNode(NodeId(8)))
        ));
    }

    #[test]
    fn test_from_record_continues_id_sequence() {
        let mut g = graph();
        detached(&mut g, NodeKind::Token);
        detached(&mut g, NodeKind::Token);
        g.remove_node(NodeId(0)).unwrap();
        let mut rebuilt = FeatureGraph::from_record(g.to_record()).unwrap();
        assert_eq!(rebuilt.create_node_detached(NodeKind::Token, "", 0, 0).id, NodeId(2));
    }

    #[test]
    fn test_from_record_rejects_last_node_id() {
        let mut g = graph();
        detached(&mut g, NodeKind::Token);
        let mut record = g.to_record();
        record.nodes[0].id = NodeId(u64::MAX);
        let bytes = record.to_json(false).unwrap();
        let decoded = GraphRecord::from_json(bytes.as_bytes()).unwrap();
        assert!(matches!(
            FeatureGraph::from_record(decoded),
            Err(GraphError::InvariantViolation(_))
        ));

        record.nodes[0].id = NodeId(u64::MAX - 1);
        let rebuilt = FeatureGraph::from_record(record).unwrap();
        assert!(rebuilt.contains_node(NodeId(u64::MAX - 1)));
    }
}
