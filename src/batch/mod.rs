//! Batch reduction of detector-image collections.

pub mod report;
pub mod runner;
pub mod writer;

pub use report::{BatchRecord, BatchReport, ItemStage, ItemState};
pub use runner::{BatchRunner, NamedRequest, RunnerConfig};
pub use writer::{ResultWriter, WriteError};
