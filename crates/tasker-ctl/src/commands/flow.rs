//! `tasker-ctl start` — trigger an `OrchestratedFlow` (§4.4 trigger c).

use tasker_client::{ClientResult, OrchestratorClient};
use tasker_shared::ids::{CorrelationId, OrchestratedFlowId};

use crate::output;

pub(crate) async fn handle_start(
    client: &OrchestratorClient,
    flow_id: OrchestratedFlowId,
    correlation_id: Option<CorrelationId>,
) -> ClientResult<()> {
    output::dim(format!("Starting flow {flow_id}..."));
    let execution_id = client.start_flow(flow_id, correlation_id).await?;
    output::success(format!("started execution {execution_id}"));
    Ok(())
}
