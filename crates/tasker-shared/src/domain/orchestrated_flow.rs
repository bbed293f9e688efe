use crate::ids::{AssignmentId, OrchestratedFlowId, WorkflowId};
use serde::{Deserialize, Serialize};

/// `{id, workflowId, assignmentIds, schedule?}` (§3) — a concrete,
/// schedulable instance pinning a workflow to a set of assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratedFlow {
    pub id: OrchestratedFlowId,
    pub workflow_id: WorkflowId,
    pub assignment_ids: Vec<AssignmentId>,
    pub schedule: Option<Schedule>,
}

/// A Quartz-like periodic trigger admitted by the Scheduler (§4.4b).
/// An in-memory job store is sufficient; no persistence is required
/// across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Standard 5-field cron expression, evaluated in UTC.
    pub cron_expression: String,
}
