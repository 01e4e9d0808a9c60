// Infrastructure implementations for feature-graph.

pub mod concurrency;
pub mod config;
pub mod output;
pub mod rust_extractor;
pub mod type_table;
