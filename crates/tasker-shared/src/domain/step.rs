use crate::domain::entry_condition::EntryCondition;
use crate::ids::{ProcessorId, StepId};
use serde::{Deserialize, Serialize};

/// `{id, processorId, nextStepIds, entryCondition}` — a node in the
/// workflow graph (§3).
///
/// An empty `next_step_ids` marks a terminal branch (§4.5 step 4). The
/// graph is not required to be acyclic (§9 "Cyclic entity references");
/// the engine relies on entry-condition evaluation plus plugin
/// idempotency rather than cycle detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub processor_id: ProcessorId,
    pub next_step_ids: Vec<StepId>,
    pub entry_condition: EntryCondition,
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        self.next_step_ids.is_empty()
    }
}
