use crate::domain::plugin::Plugin;
use crate::ids::{AddressId, AssignmentId, DeliveryId, StepId};
use serde::{Deserialize, Serialize};

/// A polymorphic binding attached to a specific [`crate::domain::Step`]
/// (§3, §9 "Polymorphic assignments").
///
/// Represented as a tagged union over the three concrete shapes with a
/// `type` discriminator in the wire encoding, exactly as §9 prescribes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum AssignmentKind {
    Address { entity_ids: Vec<AddressId> },
    Delivery { entity_ids: Vec<DeliveryId> },
    Plugin { entity_ids: Vec<DeliveryId>, plugin: Plugin },
}

/// `{id, version, name, Assignment variant}` bound to a `stepId` and a
/// set of target entity ids (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub step_id: StepId,
    pub kind: AssignmentKind,
}
