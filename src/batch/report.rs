//! Batch run reporting.

use crate::data::IntegrationResult;

/// Processing stage of one (image, request) work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    /// Not yet picked up (only seen in cancelled items).
    Pending,
    /// Per-image geometry update.
    GeometryUpdated,
    /// Integration through the dispatcher.
    Integrated,
    /// Hand-off to the result writer.
    Written,
}

impl ItemStage {
    pub fn name(&self) -> &'static str {
        match self {
            ItemStage::Pending => "pending",
            ItemStage::GeometryUpdated => "geometry_updated",
            ItemStage::Integrated => "integrated",
            ItemStage::Written => "written",
        }
    }
}

/// Terminal state of one work item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    /// Result produced and handed to the writer.
    Written,
    /// Result produced; no writer configured.
    Integrated,
    /// The item failed at `stage`.
    Failed { stage: ItemStage, reason: String },
}

impl ItemState {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, ItemState::Written | ItemState::Integrated)
    }
}

/// One output record, keyed by (image id, request name).
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub image_id: String,
    pub request_name: String,
    /// Present when integration succeeded, even if writing then failed.
    pub result: Option<IntegrationResult>,
    pub state: ItemState,
}

/// Outcome of a whole batch run. Every image is attempted; failures are
/// recorded per item, never silently dropped.
#[derive(Debug)]
pub struct BatchReport {
    /// Records ordered by image id, request order preserved within an image.
    pub records: Vec<BatchRecord>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Build a report, ordering records by image identity so batch output
    /// is deterministic regardless of worker completion order.
    pub fn from_records(mut records: Vec<BatchRecord>) -> Self {
        records.sort_by(|a, b| a.image_id.cmp(&b.image_id));
        let succeeded = records.iter().filter(|r| r.state.is_success()).count();
        let failed = records.len() - succeeded;
        Self {
            records,
            succeeded,
            failed,
        }
    }

    /// Total number of (image, request) items attempted.
    #[inline]
    pub fn total(&self) -> usize {
        self.records.len()
    }
}
