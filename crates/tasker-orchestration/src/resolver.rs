//! HTTP-backed [`FlowResolver`] (§4.4 step 1, §6 entity managers).
//!
//! The `Schema`/`Address`/`Delivery`/`Processor`/`Step`/`Workflow`/
//! `OrchestratedFlow`/`Assignment` CRUD managers are out of scope
//! (§1); this resolver only joins their read endpoints into the
//! [`ResolvedFlow`] shape C4 needs, using `ManagerUrls.<Entity>`
//! (§6, §13) for each base URL.

use std::collections::HashMap;

use serde::Deserialize;
use tasker_shared::config::ManagerUrlsConfig;
use tasker_shared::domain::{Assignment, OrchestratedFlow, Processor, Step};
use tasker_shared::errors::TaskerError;
use tasker_shared::ids::OrchestratedFlowId;

use crate::model::FlowDefinition;
use crate::scheduler::{FlowResolver, ResolvedFlow};

#[derive(Debug)]
pub struct HttpFlowResolver {
    client: reqwest::Client,
    manager_urls: ManagerUrlsConfig,
}

impl HttpFlowResolver {
    pub fn new(manager_urls: ManagerUrlsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            manager_urls,
        }
    }

    fn url_for(&self, entity: &str, path: &str) -> Result<String, TaskerError> {
        let base = self.manager_urls.url_for(entity).ok_or_else(|| {
            TaskerError::ValidationFailure(format!("no ManagerUrls.{entity} configured"))
        })?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        entity: &str,
        path: &str,
    ) -> Result<T, TaskerError> {
        let url = self.url_for(entity, path)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| TaskerError::ValidationFailure(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TaskerError::NotFound(format!("{entity} at {url}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| TaskerError::ValidationFailure(err.to_string()))
    }
}

#[async_trait::async_trait]
impl FlowResolver for HttpFlowResolver {
    async fn resolve(
        &self,
        orchestrated_flow_id: OrchestratedFlowId,
    ) -> Result<ResolvedFlow, TaskerError> {
        let flow: OrchestratedFlow = self
            .get_json("OrchestratedFlow", &orchestrated_flow_id.to_string())
            .await?;
        let steps: Vec<Step> = self
            .get_json("Step", &format!("by-workflow/{}", flow.workflow_id))
            .await?;
        let assignments_flat: Vec<Assignment> = self
            .get_json("Assignment", &format!("by-ids/{:?}", flow.assignment_ids))
            .await?;
        let mut assignments: HashMap<_, Vec<Assignment>> = HashMap::new();
        for assignment in assignments_flat {
            assignments.entry(assignment.step_id).or_default().push(assignment);
        }

        let mut processors = HashMap::new();
        for step in &steps {
            if !processors.contains_key(&step.id) {
                let processor: Processor = self
                    .get_json("Processor", &step.processor_id.to_string())
                    .await?;
                processors.insert(step.id, processor);
            }
        }

        Ok(ResolvedFlow {
            workflow_id: flow.workflow_id,
            flow,
            definition: FlowDefinition {
                steps,
                assignments,
                processors,
            },
        })
    }
}
