pub mod alloc;
pub mod config;
pub mod error;
pub mod indicator;
pub mod ingest;
pub mod model;
pub mod profiler;
pub mod report;
pub mod strategy;
