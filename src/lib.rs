// Library entry point for feature-graph.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
