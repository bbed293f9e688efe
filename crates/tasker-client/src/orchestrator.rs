//! Thin client over the orchestrator's own HTTP surface (§4.4 trigger
//! c's start API, plus the out-of-band cancel trigger of §5 and the C8
//! health readout `tasker-ctl` needs for an operator-facing "is this
//! processor healthy" check).
//!
//! This is distinct from [`crate::entities`], which talks to the
//! (out-of-scope) entity managers — this module talks to the
//! orchestration engine itself.

use serde::Serialize;
use tasker_shared::ids::{CorrelationId, ExecutionId, OrchestratedFlowId};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct StartRequest {
    correlation_id: Option<CorrelationId>,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `POST /flows/{id}/start`, returning the fresh `executionId`
    /// the Scheduler minted (§4.4 step 2).
    pub async fn start_flow(
        &self,
        flow_id: OrchestratedFlowId,
        correlation_id: Option<CorrelationId>,
    ) -> ClientResult<ExecutionId> {
        let response = self
            .http
            .post(format!(
                "{}/flows/{flow_id}/start",
                self.base_url.trim_end_matches('/')
            ))
            .json(&StartRequest { correlation_id })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            body.trim()
                .parse()
                .map_err(|_| ClientError::Unexpected { status: status.as_u16(), body })
        } else {
            Err(ClientError::from_status(status, body))
        }
    }

    /// `GET /processors/{version}/{name}/health` (§6, §9
    /// "Health-gated admission" — best-effort, a processor observed
    /// healthy here may go unhealthy moments later).
    pub async fn processor_health(&self, version: u32, name: &str) -> ClientResult<bool> {
        let response = self
            .http
            .get(format!(
                "{}/processors/{version}/{name}/health",
                self.base_url.trim_end_matches('/')
            ))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            serde_json::from_str::<bool>(&body).map_err(ClientError::from)
        } else {
            Err(ClientError::from_status(status, body))
        }
    }
}
