use crate::ids::{StepId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `{id, version, name, stepIds}` (§3). Steps referenced must exist;
/// referential integrity of the step set is enforced by the external
/// entity managers (§1, §6), not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub version: u32,
    pub name: String,
    pub step_ids: Vec<StepId>,
}

impl Workflow {
    /// Entry steps: those never named in any other step's `nextStepIds`
    /// (§4.4 step 2). Requires the caller's full step set to resolve
    /// `nextStepIds` membership.
    pub fn entry_steps<'a>(
        &'a self,
        next_step_ids_by_step: impl Iterator<Item = &'a Vec<StepId>>,
    ) -> Vec<StepId> {
        let referenced: HashSet<StepId> = next_step_ids_by_step.flatten().copied().collect();
        self.step_ids
            .iter()
            .copied()
            .filter(|id| !referenced.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_steps_excludes_anything_referenced_as_a_successor() {
        let a = StepId::new();
        let b = StepId::new();
        let c = StepId::new();
        let workflow = Workflow {
            id: WorkflowId::new(),
            version: 1,
            name: "linear".into(),
            step_ids: vec![a, b, c],
        };
        let next_ids = vec![vec![b], vec![c], vec![]];
        let mut entries = workflow.entry_steps(next_ids.iter());
        entries.sort();
        assert_eq!(entries, vec![a]);
    }
}
