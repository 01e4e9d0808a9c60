use std::io::Write;

use thiserror::Error;

use crate::domain::error::GraphError;
use crate::domain::graph::FeatureGraph;
use crate::domain::node::NodeId;
use crate::infrastructure::type_table::TypeTable;

pub mod dot_exporter;
pub mod record_exporter;

/// Builds a feature graph from one source file.
///
/// Implementations must be thread-safe so that several files can be
/// extracted in parallel, each into its own graph.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, file_name: &str, source: &str) -> Result<Extraction, ExtractError>;
}

/// Writes a finished graph. Exporters only read the graph.
pub trait GraphExporter: Send + Sync {
    fn export(&self, graph: &FeatureGraph, out: &mut dyn Write) -> Result<(), ExportError>;

    /// File extension for this exporter's output, without the dot.
    fn extension(&self) -> &'static str;
}

/// Type information for the syntax elements behind graph nodes, as supplied
/// by a host compiler or by annotations found during extraction.
pub trait TypeOracle {
    fn type_of(&self, node: NodeId) -> Option<&TypeDescriptor>;

    /// True if a value of `from`'s type can be assigned to `to`'s type.
    /// Unknown types are never assignable.
    fn is_assignable(&self, from: NodeId, to: NodeId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Approximate type name as written in the source
    pub name: String,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Result of extracting one file.
pub struct Extraction {
    pub graph: FeatureGraph,
    pub types: TypeTable,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("lex error: {0}")]
    Lex(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode encoding failed: {0}")]
    Bincode(#[from] bincode::Error),
}
