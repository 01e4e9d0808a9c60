//! Graphviz DOT Exporter
//!
//! Renders a feature graph for viewing. AST depth becomes rank: each
//! breadth-first layer below the root shares a rank, and tokens sit at the
//! far rank. The output is write-only.

use std::collections::HashSet;
use std::io::Write;

use crate::domain::edge::{EdgeKind, FeatureEdge};
use crate::domain::graph::FeatureGraph;
use crate::domain::node::{FeatureNode, NodeId};
use crate::ports::{ExportError, GraphExporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct DotExporter {
    /// Include id, kind and offsets in node labels
    pub verbose: bool,
}

impl DotExporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Convert a graph to DOT text.
    pub fn to_dot(&self, graph: &FeatureGraph) -> Result<String, ExportError> {
        let mut lines = Vec::new();
        let mut rendered = HashSet::new();

        lines.push("digraph {".to_string());
        lines.push(" rankdir=LR;".to_string());

        // AST layers, breadth first from the root
        let mut layer = vec![graph.root()?];
        while !layer.is_empty() {
            self.write_subgraph(&mut lines, &mut rendered, &layer, Some("same"));
            let mut next = Vec::new();
            let mut queued = HashSet::new();
            for node in &layer {
                for child in graph.successors_of_kind(node.id, &[EdgeKind::AstChild])? {
                    if !rendered.contains(&child.id) && queued.insert(child.id) {
                        next.push(child);
                    }
                }
            }
            layer = next;
        }

        self.write_subgraph(&mut lines, &mut rendered, &graph.comments(), None);
        self.write_subgraph(&mut lines, &mut rendered, &graph.symbols(), None);
        self.write_subgraph(&mut lines, &mut rendered, &graph.tokens(), Some("max"));

        let rest: Vec<&FeatureNode> = graph.nodes().filter(|n| !rendered.contains(&n.id)).collect();
        self.write_subgraph(&mut lines, &mut rendered, &rest, None);

        for edge in graph.edges() {
            lines.push(Self::dot_edge(edge));
        }

        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }

    fn write_subgraph(
        &self,
        lines: &mut Vec<String>,
        rendered: &mut HashSet<NodeId>,
        nodes: &[&FeatureNode],
        rank: Option<&str>,
    ) {
        let fresh: Vec<&&FeatureNode> = nodes.iter().filter(|n| !rendered.contains(&n.id)).collect();
        if fresh.is_empty() {
            return;
        }
        lines.push(" subgraph {".to_string());
        if let Some(rank) = rank {
            lines.push(format!("  rank={};", rank));
        }
        for node in fresh {
            rendered.insert(node.id);
            lines.push(self.dot_node(node));
        }
        lines.push(" }".to_string());
    }

    fn dot_node(&self, node: &FeatureNode) -> String {
        let text = Self::escape_label(node.display_text());
        if self.verbose {
            format!(
                "  {} [ label=\"{}:{}\\n{}\\nPos:{} - {}\"];",
                node.id, node.id, node.kind, text, node.start_position, node.end_position
            )
        } else {
            format!("  {} [ label=\"{}\"];", node.id, text)
        }
    }

    fn dot_edge(edge: &FeatureEdge) -> String {
        format!(
            " {} -> {} [ {}];",
            edge.source_id,
            edge.destination_id,
            Self::edge_style(edge.kind)
        )
    }

    /// Port, color and weight hints per edge kind.
    pub fn edge_style(kind: EdgeKind) -> &'static str {
        match kind {
            EdgeKind::NextToken => "headport=n, tailport=s, weight=1000",
            EdgeKind::AstChild => "headport=w, tailport=e",
            EdgeKind::LastWrite => "headport=e, tailport=e, color=red, weight=0",
            EdgeKind::LastUse => "headport=e, tailport=e, color=green, weight=0",
            EdgeKind::ComputedFrom => "headport=e, tailport=e, color=purple, weight=0",
            EdgeKind::LastLexicalUse => "headport=w, tailport=w, color=orange, weight=0",
            EdgeKind::ReturnsTo => "headport=e, tailport=w, color=blue, weight=0",
            EdgeKind::FormalArgName => "headport=w, tailport=w, color=yellow, weight=0",
            EdgeKind::GuardedBy => "headport=e, tailport=w, color=pink, weight=0",
            EdgeKind::GuardedByNegation => "headport=e, tailport=w, color=pink, weight=0, style=dashed",
            // Neutral style
            EdgeKind::AssociatedToken
            | EdgeKind::None
            | EdgeKind::Comment
            | EdgeKind::AssociatedSymbol
            | EdgeKind::HasType
            | EdgeKind::AssignableTo
            | EdgeKind::MethodSignature => "",
        }
    }

    fn escape_label(label: &str) -> String {
        let mut escaped = String::with_capacity(label.len());
        for c in label.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}

impl GraphExporter for DotExporter {
    fn export(&self, graph: &FeatureGraph, out: &mut dyn Write) -> Result<(), ExportError> {
        let dot = self.to_dot(graph)?;
        out.write_all(dot.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "dot"
    }
}
