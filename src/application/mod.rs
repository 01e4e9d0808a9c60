use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::graph::FeatureGraph;
use crate::infrastructure::output::{export_to_path, load_record};
use crate::ports::{FeatureExtractor, GraphExporter};

/// Extracts one source file and writes its graph.
pub struct ExtractUsecase<'a> {
    pub extractor: &'a dyn FeatureExtractor,
    pub exporter: &'a dyn GraphExporter,
}

impl<'a> ExtractUsecase<'a> {
    pub fn run(&self, file_name: &str, source: &str, out_path: &Path) -> Result<FeatureGraph> {
        let extraction = self
            .extractor
            .extract(file_name, source)
            .with_context(|| format!("Failed to extract {}", file_name))?;
        export_to_path(self.exporter, &extraction.graph, out_path)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        Ok(extraction.graph)
    }

    /// Read `input` and write `<stem>.<ext>` into `out_dir`.
    pub fn run_file(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let source = fs::read_to_string(input)
            .with_context(|| format!("Cannot read input file {}", input.display()))?;
        let out_path = output_path(input, out_dir, self.exporter.extension());
        let graph = self.run(&input.to_string_lossy(), &source, &out_path)?;
        info!(
            input = %input.display(),
            nodes = graph.node_count(),
            "extraction done"
        );
        Ok(out_path)
    }
}

/// Re-encodes a stored graph record.
pub struct ConvertUsecase<'a> {
    pub exporter: &'a dyn GraphExporter,
}

impl<'a> ConvertUsecase<'a> {
    pub fn run(&self, record_path: &Path, out_path: &Path) -> Result<FeatureGraph> {
        let record = load_record(record_path)?;
        let graph = FeatureGraph::from_record(record)
            .with_context(|| format!("Inconsistent graph in {}", record_path.display()))?;
        export_to_path(self.exporter, &graph, out_path)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        Ok(graph)
    }
}

pub fn output_path(input: &Path, out_dir: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string());
    out_dir.join(format!("{}.{}", stem, extension))
}
