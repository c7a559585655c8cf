//! Bucket robot telemetry logs (`Timestamp,Name,Value` CSV exports) into
//! scheduler generations and emit per-generation tables or scatter plots.

pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod pipeline;
pub mod render;

pub type Result<T> = anyhow::Result<T>;
