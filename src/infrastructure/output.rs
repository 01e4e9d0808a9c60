/// File boundary for exporters and stored records.
///
/// Writers own their file handle for the duration of one export and flush it
/// before returning; the graph itself is only read.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use tracing::info;

use crate::api::dto::GraphRecord;
use crate::domain::graph::FeatureGraph;
use crate::ports::{ExportError, GraphExporter};

/// Export `graph` into a new file at `path`.
pub fn export_to_path(
    exporter: &dyn GraphExporter,
    graph: &FeatureGraph,
    path: &Path,
) -> std::result::Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    exporter.export(graph, &mut writer)?;
    writer.flush()?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "wrote graph"
    );
    Ok(())
}

/// Load a stored record. `.json` files are read as JSON, anything else as bincode.
pub fn load_record(path: &Path) -> Result<GraphRecord> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if len == 0 {
        anyhow::bail!("{} is empty", path.display());
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map {}", path.display()))?;

    let is_json = path.extension().map_or(false, |ext| ext == "json");
    let record = if is_json {
        GraphRecord::from_json(&mmap).context("Invalid JSON graph record")?
    } else {
        GraphRecord::from_bincode(&mmap).context("Invalid bincode graph record")?
    };
    Ok(record)
}
