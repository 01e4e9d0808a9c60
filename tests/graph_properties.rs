/// Behavioural tests for FeatureGraph: fixed scenarios plus generated graphs.

use feature_graph::api::dto::GraphRecord;
use feature_graph::domain::{
    EdgeKind, FeatureGraph, GraphError, LineMap, NodeId, NodeKind, SyntaxKey,
};
use proptest::prelude::*;

const TEXT: &str = "int a;\nint b = a;\nreturn b;\n";

fn empty_graph() -> FeatureGraph {
    FeatureGraph::new("Sample.java", LineMap::new(TEXT))
}

#[test]
fn root_and_pruning_keep_the_root() {
    let mut g = empty_graph();
    let r = g.create_node_detached(NodeKind::AstRoot, "", 0, 27).id;
    let c = g.create_node_detached(NodeKind::AstElement, "VariableDecl", 0, 6).id;
    assert_eq!((r, c), (NodeId(0), NodeId(1)));
    g.add_edge(r, c, EdgeKind::AstChild).unwrap();

    assert_eq!(g.root().unwrap().id, r);
    let children: Vec<NodeId> = g
        .successors_of_kind(r, &[EdgeKind::AstChild])
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(children, vec![c]);

    assert_eq!(g.prune_leaf_ast_nodes(), 1);
    let remaining: Vec<NodeId> = g.nodes().map(|n| n.id).collect();
    assert_eq!(remaining, vec![r]);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn identifier_resolution_follows_associated_token() {
    let mut g = empty_graph();
    for _ in 0..2 {
        g.create_node_detached(NodeKind::Token, ";", 5, 6);
    }
    let e = g.create_node_detached(NodeKind::AstElement, "NameExpr", 4, 5).id;
    for _ in 0..2 {
        g.create_node_detached(NodeKind::Token, ";", 5, 6);
    }
    let t1 = g.create_node_detached(NodeKind::IdentifierToken, "a", 4, 5).id;
    let t2 = g.create_node_detached(NodeKind::IdentifierToken, "b", 11, 12).id;
    assert_eq!((e, t1, t2), (NodeId(2), NodeId(5), NodeId(6)));
    g.add_edge(e, t1, EdgeKind::AssociatedToken).unwrap();

    assert_eq!(g.to_identifier_node(e).unwrap().id, t1);
    assert_eq!(g.to_identifier_node(t1).unwrap().id, t1);
    assert_eq!(
        g.to_identifier_node(NodeId(0)).unwrap_err(),
        GraphError::NoIdentifier(NodeId(0))
    );
}

#[test]
fn self_loop_is_listed_once() {
    let mut g = empty_graph();
    let n = g.create_node_detached(NodeKind::IdentifierToken, "a", 4, 5).id;
    g.add_edge(n, n, EdgeKind::ComputedFrom).unwrap();

    let incident = g.edges_incident_to(n).unwrap();
    assert_eq!(incident.len(), 1);
    assert_eq!(incident[0].to_string(), "0 -[COMPUTED_FROM]-> 0");
    assert_eq!(g.successors(n).unwrap().len(), 1);
}

#[test]
fn repeated_key_returns_the_first_node() {
    let mut g = empty_graph();
    let key = SyntaxKey::new(42);
    let first = g.create_node(NodeKind::AstElement, "Stmt", 0, 6, key).id;
    let second = g.create_node(NodeKind::Token, "other", 7, 10, key).clone();
    assert_eq!(second.id, first);
    assert_eq!(second.kind, NodeKind::AstElement);
    assert_eq!(second.contents, "Stmt");
    assert_eq!(g.node_count(), 1);
}

#[test]
fn removed_key_creates_a_fresh_node() {
    let mut g = empty_graph();
    let key = SyntaxKey::new(7);
    let first = g.create_node(NodeKind::AstElement, "Stmt", 0, 6, key).id;
    g.remove_node(first).unwrap();
    let again = g.create_node(NodeKind::AstElement, "Stmt", 0, 6, key).id;
    assert_ne!(again, first);
}

#[test]
fn lines_come_from_the_line_map() {
    let mut g = empty_graph();
    let node = g.create_node_detached(NodeKind::AstElement, "Stmt", 7, 18).clone();
    assert_eq!((node.start_line, node.end_line), (2, 3));
}

#[test]
fn parallel_edges_are_kept() {
    let mut g = empty_graph();
    let a = g.create_node_detached(NodeKind::IdentifierToken, "a", 4, 5).id;
    let b = g.create_node_detached(NodeKind::IdentifierToken, "a", 15, 16).id;
    let first = g.add_edge(b, a, EdgeKind::LastWrite).unwrap();
    let second = g.add_edge(b, a, EdgeKind::LastWrite).unwrap();
    assert_ne!(first, second);
    assert_eq!(g.edges_between(b, a).unwrap().len(), 2);

    let edge = *g.edge(first).unwrap();
    g.remove_edge(&edge).unwrap();
    assert_eq!(g.edges_between(b, a).unwrap().len(), 1);
    g.remove_edge(&edge).unwrap();
    assert_eq!(g.remove_edge(&edge), Err(GraphError::UnknownEdge(edge)));
}

#[test]
fn predecessors_filter_by_edge_kind() {
    let mut g = empty_graph();
    let decl = g.create_node_detached(NodeKind::IdentifierToken, "a", 4, 5).id;
    let read = g.create_node_detached(NodeKind::IdentifierToken, "a", 15, 16).id;
    let stmt = g.create_node_detached(NodeKind::AstElement, "Stmt", 7, 17).id;
    g.add_edge(read, decl, EdgeKind::LastWrite).unwrap();
    g.add_edge(stmt, decl, EdgeKind::AssociatedToken).unwrap();

    let all: Vec<NodeId> = g.predecessors(decl).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(all, vec![read, stmt]);
    let writes: Vec<NodeId> = g
        .predecessors_of_kind(decl, &[EdgeKind::LastWrite])
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(writes, vec![read]);
    assert!(g.predecessors(read).unwrap().is_empty());
    assert_eq!(
        g.predecessors(NodeId(99)).unwrap_err(),
        GraphError::UnknownNode(NodeId(99))
    );
}

#[derive(Debug, Clone)]
struct Plan {
    nodes: Vec<(usize, String, usize, usize)>,
    edges: Vec<(usize, usize, usize)>,
}

fn plan() -> impl Strategy<Value = Plan> {
    let node = (
        0..NodeKind::ALL.len(),
        "[a-zA-Z_]{0,8}",
        0..TEXT.len(),
        0..6usize,
    );
    let edge = (0..64usize, 0..64usize, 0..EdgeKind::ALL.len());
    (
        prop::collection::vec(node, 1..24),
        prop::collection::vec(edge, 0..48),
    )
        .prop_map(|(nodes, edges)| Plan { nodes, edges })
}

fn build(plan: &Plan) -> (FeatureGraph, Vec<NodeId>) {
    let mut g = empty_graph();
    let ids: Vec<NodeId> = plan
        .nodes
        .iter()
        .map(|(kind, contents, start, len)| {
            g.create_node_detached(NodeKind::ALL[*kind], contents.clone(), *start, start + len)
                .id
        })
        .collect();
    for (a, b, kind) in &plan.edges {
        let source = ids[a % ids.len()];
        let dest = ids[b % ids.len()];
        g.add_edge(source, dest, EdgeKind::ALL[*kind]).unwrap();
    }
    (g, ids)
}

proptest! {
    #[test]
    fn ids_increase_in_creation_order(plan in plan()) {
        let (_, ids) = build(&plan);
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn record_round_trip_preserves_graph(plan in plan()) {
        let (g, _) = build(&plan);
        let record = g.to_record();

        let rebuilt = FeatureGraph::from_record(record.clone()).unwrap();
        prop_assert_eq!(rebuilt.to_record(), record.clone());
        prop_assert_eq!(rebuilt.edge_count(), plan.edges.len());

        let json = record.to_json(false).unwrap();
        prop_assert_eq!(GraphRecord::from_json(json.as_bytes()).unwrap(), record.clone());
        let bytes = record.to_bincode().unwrap();
        prop_assert_eq!(GraphRecord::from_bincode(&bytes).unwrap(), record);
    }

    #[test]
    fn removing_a_node_removes_its_edges(plan in plan(), pick in 0..64usize) {
        let (mut g, ids) = build(&plan);
        let victim = ids[pick % ids.len()];
        let untouched = g.edges().filter(|e| !e.touches(victim)).count();

        g.remove_node(victim).unwrap();
        prop_assert!(!g.contains_node(victim));
        prop_assert!(g.nodes().all(|n| n.id != victim));
        prop_assert!(g.edges().all(|e| !e.touches(victim)));
        prop_assert_eq!(g.edge_count(), untouched);
    }

    #[test]
    fn pruning_reaches_a_fixed_point(plan in plan()) {
        let (mut g, _) = build(&plan);
        g.prune_leaf_ast_nodes();
        for node in g.nodes() {
            if node.kind.is_prunable() {
                prop_assert!(!g.successors(node.id).unwrap().is_empty());
            }
        }
        prop_assert_eq!(g.prune_leaf_ast_nodes(), 0);
    }
}
