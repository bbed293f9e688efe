//! Typed HTTP client for the Tasker entity manager APIs (§6) and the
//! orchestrator's own HTTP surface, used by `tasker-ctl` and by
//! integration tests that need to drive the (out-of-scope, contract-only)
//! entity managers.

pub mod entities;
pub mod error;
pub mod manager;
pub mod orchestrator;
pub mod pagination;

pub use entities::{
    AddressClient, AssignmentClient, DeliveryClient, OrchestratedFlowClient, ProcessorClient,
    SchemaClient, StepClient, TaskerEntityClients, WorkflowClient,
};
pub use error::{ClientError, ClientResult};
pub use manager::ManagerClient;
pub use orchestrator::OrchestratorClient;
pub use pagination::{Page, PageRequest};
