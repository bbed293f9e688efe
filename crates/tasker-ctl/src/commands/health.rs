//! `tasker-ctl health` — check a processor's heartbeat (§6, §9
//! "Health-gated admission").

use tasker_client::{ClientResult, OrchestratorClient};

use crate::output;

pub(crate) async fn handle_health(
    client: &OrchestratorClient,
    version: u32,
    name: &str,
) -> ClientResult<()> {
    let healthy = client.processor_health(version, name).await?;
    output::status_icon(healthy, format!("processor {name}@v{version}"));
    Ok(())
}
