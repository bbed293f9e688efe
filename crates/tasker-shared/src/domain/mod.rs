//! Domain model (§3): the entities, value types, and the in-cache
//! orchestration snapshot the engine reads and writes.

pub mod address;
pub mod assignment;
pub mod delivery;
pub mod entry_condition;
pub mod frame;
pub mod model;
pub mod orchestrated_flow;
pub mod plugin;
pub mod processor;
pub mod schema;
pub mod step;
pub mod workflow;

pub use address::Address;
pub use assignment::{Assignment, AssignmentKind};
pub use delivery::Delivery;
pub use entry_condition::{ActivityStatus, EntryCondition};
pub use frame::ExecutionFrame;
pub use model::OrchestrationCacheModel;
pub use orchestrated_flow::{OrchestratedFlow, Schedule};
pub use plugin::Plugin;
pub use processor::{Processor, ProcessorKey};
pub use schema::Schema;
pub use step::Step;
pub use workflow::Workflow;
