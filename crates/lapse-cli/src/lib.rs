//! Orchestration for the `lapse` binary: configuration, the fetch → confirm →
//! reconcile sequence, and the reports printed around it.

pub mod config;
pub mod confirm;
pub mod logging;
pub mod orchestrator;
pub mod report;

pub use config::LapseConfig;
pub use orchestrator::{Orchestrator, RunReport};
