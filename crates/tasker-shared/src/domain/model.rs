use crate::domain::assignment::Assignment;
use crate::domain::processor::Processor;
use crate::domain::step::Step;
use crate::ids::StepId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// In-cache snapshot of a flow's step graph, per-step assignments, and
/// per-step processor binding (§3, §4.3 "C3").
///
/// Built once by the Scheduler at flow start (§4.4), treated as
/// immutable by every C5/C6 invocation thereafter, and expired by TTL
/// once the flow has no live branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationCacheModel {
    pub step_entities: HashMap<StepId, Step>,
    pub assignments: HashMap<StepId, Vec<Assignment>>,
    pub processors: HashMap<StepId, Processor>,
    /// Unix millis timestamp this snapshot was built.
    pub built_at: i64,
    pub version: u32,
    /// Set by an out-of-band cancellation command; read by C5/C6
    /// immediately before fan-out (§5 "Cancellation", §9
    /// "Cancellation tombstone"). In-flight edges are unaffected; only
    /// *new* fan-outs are suppressed.
    #[serde(default)]
    pub cancelled: bool,
}

impl OrchestrationCacheModel {
    pub fn step(&self, step_id: &StepId) -> Option<&Step> {
        self.step_entities.get(step_id)
    }

    pub fn assignments_for(&self, step_id: &StepId) -> &[Assignment] {
        self.assignments
            .get(step_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn processor_for(&self, step_id: &StepId) -> Option<&Processor> {
        self.processors.get(step_id)
    }
}
