//! 128-bit opaque identifiers used throughout the domain model.
//!
//! `spec.md` §3 states "All IDs are 128-bit opaque identifiers" without
//! prescribing a wire format; we use `uuid::Uuid` since it's what the
//! corpus already reaches for everywhere an opaque 128-bit id is needed.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

opaque_id!(SchemaId, "Identifies a `Schema` entity.");
opaque_id!(AddressId, "Identifies an `Address` entity.");
opaque_id!(DeliveryId, "Identifies a `Delivery` entity.");
opaque_id!(ProcessorId, "Identifies a `Processor` entity.");
opaque_id!(AssignmentId, "Identifies an `Assignment` entity.");
opaque_id!(StepId, "Identifies a `Step` node in a workflow graph.");
opaque_id!(WorkflowId, "Identifies a `Workflow` entity.");
opaque_id!(OrchestratedFlowId, "Identifies an `OrchestratedFlow` entity.");
opaque_id!(
    CorrelationId,
    "End-to-end correlation id, propagated over HTTP, the bus, and the cache."
);
opaque_id!(
    ExecutionId,
    "Identifies one traversal of the graph from a single flow start."
);

/// A fan-out publish identifier.
///
/// `PublishId::sentinel()` is the `∅` sentinel used for the very first
/// command emitted by the Scheduler (§4.4 step 2); every subsequent
/// fan-out mints a fresh [`PublishId::new`] (§4.5 step 5.3), so a
/// redelivered terminal event produces new downstream commands instead of
/// colliding on cache keys (§8 invariant 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishId(pub Uuid);

impl PublishId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The `publishId=∅` sentinel used by entry-step commands (§4.4 step 2).
    pub fn sentinel() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_sentinel(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for PublishId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
