//! The six end-to-end scenarios of §8, driven against the in-memory
//! Cache and Bus Gateway backends.

use std::collections::HashMap;
use std::sync::Arc;

use tasker_orchestration::{Consumer, FlowDefinition, ModelStore};
use tasker_shared::bus::{ActivityExecutedEvent, ActivityFailedEvent, InMemoryBus, TerminalEvent};
use tasker_shared::cache::InMemoryCache;
use tasker_shared::config::{OrchestrationDataCacheConfig, ProcessorActivityDataCacheConfig};
use tasker_shared::domain::{ActivityStatus, EntryCondition, ExecutionFrame, Step};
use tasker_shared::ids::{
    CorrelationId, ExecutionId, OrchestratedFlowId, ProcessorId, PublishId, StepId, WorkflowId,
};

fn harness() -> (Consumer, Arc<InMemoryBus>, Arc<InMemoryCache>, ModelStore) {
    let bus = Arc::new(InMemoryBus::new());
    let cache = Arc::new(InMemoryCache::new());
    let model_store = ModelStore::new(cache.clone(), OrchestrationDataCacheConfig::default());
    let consumer = Consumer::new(
        bus.clone(),
        cache.clone(),
        OrchestrationDataCacheConfig::default(),
        ProcessorActivityDataCacheConfig::default(),
    );
    (consumer, bus, cache, model_store)
}

fn frame_for(flow: OrchestratedFlowId, execution: ExecutionId, step: StepId) -> ExecutionFrame {
    ExecutionFrame {
        orchestrated_flow_id: flow,
        workflow_id: WorkflowId::new(),
        correlation_id: CorrelationId::new(),
        step_id: step,
        processor_id: ProcessorId::new(),
        publish_id: PublishId::sentinel(),
        execution_id: execution,
    }
}

fn step(id: StepId, next: Vec<StepId>, entry_condition: EntryCondition) -> Step {
    Step {
        id,
        processor_id: ProcessorId::new(),
        next_step_ids: next,
        entry_condition,
    }
}

/// Scenario 1: linear flow A -> B -> C, all `PreviousCompleted`.
#[tokio::test]
async fn scenario_linear_flow_success() {
    let (consumer, bus, cache, model_store) = harness();
    let flow = OrchestratedFlowId::new();
    let execution = ExecutionId::new();

    let a = StepId::new();
    let b = StepId::new();
    let c = StepId::new();
    let steps = vec![
        step(a, vec![b], EntryCondition::Always),
        step(b, vec![c], EntryCondition::PreviousCompleted),
        step(c, vec![], EntryCondition::PreviousCompleted),
    ];
    model_store
        .build_and_store(
            flow,
            FlowDefinition {
                steps,
                assignments: HashMap::new(),
                processors: HashMap::new(),
            },
        )
        .await
        .unwrap();

    let frame_a = frame_for(flow, execution, a);
    cache
        .set(
            "processor-activity",
            &tasker_shared::cache::ActivityDataKey {
                processor_id: frame_a.processor_id,
                orchestrated_flow_id: flow,
                correlation_id: frame_a.correlation_id,
                execution_id: execution,
                step_id: a,
                publish_id: PublishId::sentinel(),
            }
            .to_string(),
            b"payload".to_vec(),
            None,
        )
        .await
        .unwrap();

    consumer
        .process_terminal_event(&TerminalEvent::Executed(ActivityExecutedEvent {
            frame: frame_a,
            status: ActivityStatus::Completed,
            duration_ms: 1,
            result_data_size: 7,
            entities_processed: 0,
        }))
        .await
        .unwrap();
    assert_eq!(bus.published_command_count(), 1);
    let published_b = bus.last_published_command().unwrap();
    assert_eq!(published_b.step_id, b);
    let publish_id_b = published_b.publish_id;

    let frame_b = published_b.frame();
    consumer
        .process_terminal_event(&TerminalEvent::Executed(ActivityExecutedEvent {
            frame: frame_b,
            status: ActivityStatus::Completed,
            duration_ms: 1,
            result_data_size: 7,
            entities_processed: 0,
        }))
        .await
        .unwrap();
    let published_c = bus.last_published_command().unwrap();
    assert_eq!(published_c.step_id, c);
    let publish_id_c = published_c.publish_id;

    let frame_c = published_c.frame();
    consumer
        .process_terminal_event(&TerminalEvent::Executed(ActivityExecutedEvent {
            frame: frame_c,
            status: ActivityStatus::Completed,
            duration_ms: 1,
            result_data_size: 7,
            entities_processed: 0,
        }))
        .await
        .unwrap();

    assert_ne!(PublishId::sentinel(), publish_id_b);
    assert_ne!(publish_id_b, publish_id_c);
    assert!(cache.get_all_entries("processor-activity").await.unwrap().is_empty());
}

/// Scenario 2: conditional fan-out on failure, A -> {B, C}.
#[tokio::test]
async fn scenario_conditional_fanout_on_failure() {
    let (consumer, bus, _cache, model_store) = harness();
    let flow = OrchestratedFlowId::new();
    let execution = ExecutionId::new();

    let a = StepId::new();
    let b = StepId::new();
    let c = StepId::new();
    model_store
        .build_and_store(
            flow,
            FlowDefinition {
                steps: vec![
                    step(a, vec![b, c], EntryCondition::Always),
                    step(b, vec![], EntryCondition::PreviousCompleted),
                    step(c, vec![], EntryCondition::PreviousFailed),
                ],
                assignments: HashMap::new(),
                processors: HashMap::new(),
            },
        )
        .await
        .unwrap();

    let frame_a = frame_for(flow, execution, a);
    consumer
        .process_terminal_event(&TerminalEvent::Failed(ActivityFailedEvent {
            frame: frame_a,
            duration_ms: 1,
            error_message: "boom".into(),
            exception_type: None,
            stack_trace: None,
            is_validation_failure: false,
        }))
        .await
        .unwrap();

    assert_eq!(bus.published_command_count(), 1);
    assert_eq!(bus.last_published_command().unwrap().step_id, c);
}

/// Scenario 3: fan-out with `Always`/`Never`/`PreviousCompleted`.
#[tokio::test]
async fn scenario_always_never_mix() {
    let (consumer, bus, _cache, model_store) = harness();
    let flow = OrchestratedFlowId::new();
    let execution = ExecutionId::new();

    let a = StepId::new();
    let b = StepId::new();
    let c = StepId::new();
    let d = StepId::new();
    model_store
        .build_and_store(
            flow,
            FlowDefinition {
                steps: vec![
                    step(a, vec![b, c, d], EntryCondition::Always),
                    step(b, vec![], EntryCondition::Always),
                    step(c, vec![], EntryCondition::Never),
                    step(d, vec![], EntryCondition::PreviousCompleted),
                ],
                assignments: HashMap::new(),
                processors: HashMap::new(),
            },
        )
        .await
        .unwrap();

    consumer
        .process_terminal_event(&TerminalEvent::Executed(ActivityExecutedEvent {
            frame: frame_for(flow, execution, a),
            status: ActivityStatus::Completed,
            duration_ms: 1,
            result_data_size: 0,
            entities_processed: 0,
        }))
        .await
        .unwrap();

    let steps_published: Vec<StepId> = bus
        .all_published_commands()
        .into_iter()
        .map(|cmd| cmd.step_id)
        .collect();
    assert_eq!(steps_published.len(), 2);
    assert!(steps_published.contains(&b));
    assert!(steps_published.contains(&d));
    assert!(!steps_published.contains(&c));
}

/// Scenario 4: terminal failure branch A -> B, B has no successors.
#[tokio::test]
async fn scenario_terminal_failure_branch() {
    let (consumer, bus, cache, model_store) = harness();
    let flow = OrchestratedFlowId::new();
    let execution = ExecutionId::new();

    let a = StepId::new();
    let b = StepId::new();
    model_store
        .build_and_store(
            flow,
            FlowDefinition {
                steps: vec![
                    step(a, vec![b], EntryCondition::Always),
                    step(b, vec![], EntryCondition::PreviousFailed),
                ],
                assignments: HashMap::new(),
                processors: HashMap::new(),
            },
        )
        .await
        .unwrap();

    consumer
        .process_terminal_event(&TerminalEvent::Failed(ActivityFailedEvent {
            frame: frame_for(flow, execution, a),
            duration_ms: 1,
            error_message: "boom".into(),
            exception_type: None,
            stack_trace: None,
            is_validation_failure: false,
        }))
        .await
        .unwrap();

    let published_b = bus.last_published_command().unwrap();
    assert_eq!(published_b.step_id, b);

    consumer
        .process_terminal_event(&TerminalEvent::Failed(ActivityFailedEvent {
            frame: published_b.frame(),
            duration_ms: 1,
            error_message: "boom again".into(),
            exception_type: None,
            stack_trace: None,
            is_validation_failure: false,
        }))
        .await
        .unwrap();

    assert_eq!(bus.published_command_count(), 1, "no further commands beyond Exec(B)");
    assert!(cache.get_all_entries("processor-activity").await.unwrap().is_empty());
}

/// Scenario 5: redelivered completion produces two downstream commands
/// with distinct publish ids; the second cleanup is a no-op.
#[tokio::test]
async fn scenario_redelivered_completion_is_idempotent_on_downstream_ids() {
    let (consumer, bus, _cache, model_store) = harness();
    let flow = OrchestratedFlowId::new();
    let execution = ExecutionId::new();

    let a = StepId::new();
    let b = StepId::new();
    model_store
        .build_and_store(
            flow,
            FlowDefinition {
                steps: vec![
                    step(a, vec![b], EntryCondition::Always),
                    step(b, vec![], EntryCondition::PreviousCompleted),
                ],
                assignments: HashMap::new(),
                processors: HashMap::new(),
            },
        )
        .await
        .unwrap();

    let frame_a = frame_for(flow, execution, a);
    let event = TerminalEvent::Executed(ActivityExecutedEvent {
        frame: frame_a,
        status: ActivityStatus::Completed,
        duration_ms: 1,
        result_data_size: 0,
        entities_processed: 0,
    });

    consumer.process_terminal_event(&event).await.unwrap();
    consumer.process_terminal_event(&event).await.unwrap();

    assert_eq!(bus.published_command_count(), 2);
}
