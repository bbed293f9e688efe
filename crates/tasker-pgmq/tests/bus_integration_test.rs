//! Integration tests against a live Postgres instance. Skipped (not
//! failed) when no database URL is configured, matching the corpus's
//! existing pattern for `tasker-pgmq`'s own integration suite.

use serial_test::serial;
use sqlx::PgPool;
use tasker_pgmq::PgmqBus;
use tasker_shared::bus::{BusGateway, ExecuteActivityCommand};
use tasker_shared::domain::ActivityStatus;
use tasker_shared::ids::*;

fn database_url() -> Option<String> {
    std::env::var("PGMQ_DATABASE_URL")
        .ok()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|s| !s.is_empty())
}

async fn connect() -> Option<PgPool> {
    let url = database_url()?;
    PgPool::connect(&url).await.ok()
}

fn command() -> ExecuteActivityCommand {
    ExecuteActivityCommand {
        processor_id: ProcessorId::new(),
        orchestrated_flow_id: OrchestratedFlowId::new(),
        workflow_id: WorkflowId::new(),
        correlation_id: CorrelationId::new(),
        step_id: StepId::new(),
        execution_id: ExecutionId::new(),
        publish_id: PublishId::new(),
        entities: vec![],
    }
}

#[tokio::test]
#[serial]
async fn publish_then_consume_round_trips_a_command() {
    let Some(pool) = connect().await else {
        eprintln!("skipping: no PGMQ_DATABASE_URL/DATABASE_URL configured");
        return;
    };
    let bus = PgmqBus::new(pool).await.expect("construct bus");
    let queue = format!("test_commands_{}", uuid::Uuid::new_v4().simple());
    let cmd = command();

    bus.publish_command(&queue, cmd.clone()).await.unwrap();
    let received = bus.consume_commands(&queue, 10).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].payload.step_id, cmd.step_id);
    assert!(!received[0].is_redelivery);

    bus.ack(&queue, &received[0].receipt).await.unwrap();
    let drained = bus.consume_commands(&queue, 10).await.unwrap();
    assert!(drained.is_empty());
}

#[tokio::test]
#[serial]
async fn nack_makes_message_immediately_redeliverable() {
    let Some(pool) = connect().await else {
        eprintln!("skipping: no PGMQ_DATABASE_URL/DATABASE_URL configured");
        return;
    };
    let bus = PgmqBus::new(pool).await.expect("construct bus");
    let queue = format!("test_commands_{}", uuid::Uuid::new_v4().simple());
    bus.publish_command(&queue, command()).await.unwrap();

    let first = bus.consume_commands(&queue, 10).await.unwrap();
    assert_eq!(first.len(), 1);
    bus.nack(&queue, &first[0].receipt).await.unwrap();

    let second = bus.consume_commands(&queue, 10).await.unwrap();
    assert_eq!(second.len(), 1);
    assert!(second[0].is_redelivery);
}

#[tokio::test]
#[serial]
async fn terminal_events_round_trip_through_the_shared_envelope() {
    let Some(pool) = connect().await else {
        eprintln!("skipping: no PGMQ_DATABASE_URL/DATABASE_URL configured");
        return;
    };
    let bus = PgmqBus::new(pool).await.expect("construct bus");
    let queue = format!("test_events_{}", uuid::Uuid::new_v4().simple());

    let frame = tasker_shared::domain::ExecutionFrame {
        orchestrated_flow_id: OrchestratedFlowId::new(),
        workflow_id: WorkflowId::new(),
        correlation_id: CorrelationId::new(),
        step_id: StepId::new(),
        processor_id: ProcessorId::new(),
        publish_id: PublishId::new(),
        execution_id: ExecutionId::new(),
    };
    bus.publish_executed(
        &queue,
        tasker_shared::bus::ActivityExecutedEvent {
            frame,
            status: ActivityStatus::Completed,
            duration_ms: 5,
            result_data_size: 0,
            entities_processed: 1,
        },
    )
    .await
    .unwrap();

    let received = bus.consume_terminal_events(&queue, 10).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].payload.status(), ActivityStatus::Completed);
}
