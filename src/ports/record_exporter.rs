// Structured exporters: write the graph's record as JSON or bincode.

use std::io::Write;

use crate::domain::graph::FeatureGraph;
use crate::ports::{ExportError, GraphExporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl GraphExporter for JsonExporter {
    fn export(&self, graph: &FeatureGraph, out: &mut dyn Write) -> Result<(), ExportError> {
        let record = graph.to_record();
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &record)?;
        } else {
            serde_json::to_writer(&mut *out, &record)?;
        }
        out.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeExporter;

impl GraphExporter for BincodeExporter {
    fn export(&self, graph: &FeatureGraph, out: &mut dyn Write) -> Result<(), ExportError> {
        bincode::serialize_into(&mut *out, &graph.to_record())?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "bin"
    }
}
