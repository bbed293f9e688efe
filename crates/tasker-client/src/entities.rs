//! Typed per-entity wrappers over [`ManagerClient`] (§3, §6).
//!
//! Each of the eight entities gets a thin newtype so call sites read
//! `clients.schemas().get(id)` instead of threading an entity-name
//! string literal through every call.

use tasker_shared::config::ManagerUrlsConfig;
use tasker_shared::domain::{
    Address, Assignment, Delivery, OrchestratedFlow, Processor, Schema, Step, Workflow,
};
use tasker_shared::ids::{
    AddressId, AssignmentId, DeliveryId, OrchestratedFlowId, ProcessorId, SchemaId, StepId,
    WorkflowId,
};

use crate::error::{ClientError, ClientResult};
use crate::manager::ManagerClient;
use crate::pagination::{Page, PageRequest};

macro_rules! entity_client {
    ($client_ty:ident, $entity_name:literal, $entity_ty:ty, $id_ty:ty) => {
        #[derive(Debug, Clone)]
        pub struct $client_ty(ManagerClient);

        impl $client_ty {
            fn new(http: reqwest::Client, base_url: String) -> Self {
                Self(ManagerClient::new(http, base_url, $entity_name))
            }

            pub async fn get(&self, id: $id_ty) -> ClientResult<$entity_ty> {
                self.0.get(&id.to_string()).await
            }

            pub async fn get_paged(&self, request: PageRequest) -> ClientResult<Page<$entity_ty>> {
                self.0.get_paged(request).await
            }

            pub async fn create(&self, entity: &$entity_ty) -> ClientResult<$entity_ty> {
                self.0.create(entity).await
            }

            pub async fn update(&self, id: $id_ty, entity: &$entity_ty) -> ClientResult<$entity_ty> {
                self.0.update(&id.to_string(), entity).await
            }

            pub async fn delete(&self, id: $id_ty) -> ClientResult<()> {
                self.0.delete(&id.to_string()).await
            }

            pub async fn exists(&self, ref_field: &str, id: $id_ty) -> ClientResult<bool> {
                self.0.exists(ref_field, &id.to_string()).await
            }
        }
    };
}

entity_client!(SchemaClient, "schema", Schema, SchemaId);
entity_client!(AddressClient, "address", Address, AddressId);
entity_client!(DeliveryClient, "delivery", Delivery, DeliveryId);
entity_client!(ProcessorClient, "processor", Processor, ProcessorId);
entity_client!(StepClient, "step", Step, StepId);
entity_client!(WorkflowClient, "workflow", Workflow, WorkflowId);
entity_client!(
    OrchestratedFlowClient,
    "orchestrated-flow",
    OrchestratedFlow,
    OrchestratedFlowId
);
entity_client!(AssignmentClient, "assignment", Assignment, AssignmentId);

impl ProcessorClient {
    /// `GET /api/processor/composite/{version}/{name}` (§3 "Composite
    /// key = `(version,name)`").
    pub async fn get_by_composite_key(&self, version: u32, name: &str) -> ClientResult<Processor> {
        self.0.get_composite(&format!("{version}/{name}")).await
    }
}

impl AddressClient {
    /// `GET /api/address/composite/{connectionString}` (§3 "Composite
    /// key = `connectionString`").
    pub async fn get_by_connection_string(&self, connection_string: &str) -> ClientResult<Address> {
        self.0.get_composite(connection_string).await
    }
}

/// Holds one [`ManagerClient`]-backed wrapper per entity type, each
/// bound to its own `ManagerUrls.<Entity>` base URL (§6, §13).
#[derive(Debug, Clone)]
pub struct TaskerEntityClients {
    http: reqwest::Client,
    manager_urls: ManagerUrlsConfig,
}

impl TaskerEntityClients {
    pub fn new(manager_urls: ManagerUrlsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            manager_urls,
        }
    }

    fn base_url(&self, entity: &str) -> ClientResult<String> {
        self.manager_urls
            .url_for(entity)
            .map(str::to_string)
            .ok_or_else(|| ClientError::NoManagerUrl(entity.to_string()))
    }

    pub fn schemas(&self) -> ClientResult<SchemaClient> {
        Ok(SchemaClient::new(self.http.clone(), self.base_url("Schema")?))
    }

    pub fn addresses(&self) -> ClientResult<AddressClient> {
        Ok(AddressClient::new(self.http.clone(), self.base_url("Address")?))
    }

    pub fn deliveries(&self) -> ClientResult<DeliveryClient> {
        Ok(DeliveryClient::new(self.http.clone(), self.base_url("Delivery")?))
    }

    pub fn processors(&self) -> ClientResult<ProcessorClient> {
        Ok(ProcessorClient::new(self.http.clone(), self.base_url("Processor")?))
    }

    pub fn steps(&self) -> ClientResult<StepClient> {
        Ok(StepClient::new(self.http.clone(), self.base_url("Step")?))
    }

    pub fn workflows(&self) -> ClientResult<WorkflowClient> {
        Ok(WorkflowClient::new(self.http.clone(), self.base_url("Workflow")?))
    }

    pub fn orchestrated_flows(&self) -> ClientResult<OrchestratedFlowClient> {
        Ok(OrchestratedFlowClient::new(
            self.http.clone(),
            self.base_url("OrchestratedFlow")?,
        ))
    }

    pub fn assignments(&self) -> ClientResult<AssignmentClient> {
        Ok(AssignmentClient::new(self.http.clone(), self.base_url("Assignment")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_manager_url_surfaces_a_clear_error() {
        let clients = TaskerEntityClients::new(ManagerUrlsConfig::default());
        let err = clients.schemas().unwrap_err();
        assert!(matches!(err, ClientError::NoManagerUrl(entity) if entity == "Schema"));
    }
}
