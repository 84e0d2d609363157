//! Tests de integración (task completo: run, export, rebuild, resume)

use serde_json::{json, Value};
use task_core::{StepStatus, Task, TaskRegistry, TaskStepGroup};

use task_adapters::dispatch::build_task;
use task_adapters::steps::{CounterStep, EchoStep};

#[tokio::test]
async fn run_export_rebuild_rollback() {
    // Task mixto: un step suelto y un grupo de dos contadores.
    let echo = EchoStep::new("demo");
    let group = TaskStepGroup::new(vec![CounterStep::new(2), CounterStep::new(3)]);
    let task = Task::new("provision", vec![echo.clone().into(), group.into()]);

    task.start().await.expect("run ok");
    assert!(task.is_ready());
    assert_eq!(echo.cached_result(), Some(json!({"data": "demo world!"})));

    // Export → rebuild por key, identidad preservada.
    let exported = task.snapshot();
    let rebuilt = build_task(&exported).expect("rebuild ok");
    assert_eq!(rebuilt.uuid(), task.uuid());
    assert_eq!(rebuilt.task_type(), "provision");
    assert!(rebuilt.is_ready(), "rebuilt task keeps completed statuses");

    // La compensación del task reconstruido revierte los payloads.
    rebuilt.rollback(false).await.expect("rollback ok");
    let reverted = serde_json::to_value(rebuilt.snapshot()).unwrap();
    let steps = reverted.get("steps").and_then(Value::as_array).expect("steps");
    assert_eq!(steps[0], json!({"key": "echo", "status": "init", "value": "demo", "roll": 0}));
    assert_eq!(
        steps[1],
        json!({
            "type": "group",
            "steps": [
                {"key": "counter", "status": "init", "amount": 2, "count": 0},
                {"key": "counter", "status": "init", "amount": 3, "count": 0}
            ]
        })
    );
}

#[tokio::test]
async fn crashed_running_step_resumes_without_redoing_work() {
    // Simula un proceso que murió después de aplicar el efecto: el step
    // quedó serializado en running con roll ya subido.
    let crashed: task_core::TaskSnapshot = serde_json::from_value(json!({
        "type": "provision",
        "uuid": "6f2a7a6e-8f65-4a58-9a67-5f7e1f1df6fb",
        "steps": [
            {"key": "echo", "status": "success", "value": "demo", "roll": 1},
            {"key": "echo", "status": "running", "value": "demo", "roll": 1},
            {"key": "echo", "status": "init", "value": "demo", "roll": 0}
        ]
    }))
    .unwrap();

    let task = build_task(&crashed).expect("rebuild ok");
    assert!(!task.is_ready());

    task.start().await.expect("resume ok");
    assert!(task.is_ready());

    // El step interrumpido pasó directo a success sin re-ejecutar (roll
    // sigue en 1); el tercero corrió normalmente.
    let steps: Vec<Value> = task
        .snapshot()
        .steps
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    assert_eq!(steps[1], json!({"key": "echo", "status": "success", "value": "demo", "roll": 1}));
    assert_eq!(steps[2], json!({"key": "echo", "status": "success", "value": "demo", "roll": 1}));
}

#[tokio::test]
async fn registry_runs_and_rolls_back_added_tasks() {
    let registry = TaskRegistry::new();
    let echo = EchoStep::new("demo");
    let task = Task::new("provision", vec![echo.clone().into()]);

    let uuid = registry.add_task(task);
    let data = echo.wait().await.expect("auto-started step completes");
    assert_eq!(data, Some(json!({"data": "demo world!"})));

    registry.rollback(uuid).await.expect("rollback ok");
    assert_eq!(echo.status(), StepStatus::Init);

    let exported = serde_json::to_value(registry.snapshot()).unwrap();
    assert_eq!(
        exported,
        json!([{
            "type": "provision",
            "uuid": uuid,
            "steps": [{"key": "echo", "status": "init", "value": "demo", "roll": 0}]
        }])
    );
}

#[tokio::test]
async fn failed_echo_reports_single_action_error() {
    let task = Task::new("provision", vec![EchoStep::new("error").into()]);
    let err = task.start().await.expect_err("run must fail");
    assert_eq!(err.to_string(), "Task run error");
    let messages: Vec<String> =
        err.errors().unwrap().iter().map(|d| d.error.to_string()).collect();
    assert_eq!(messages, ["action error"]);

    let err = task.rollback(false).await.expect_err("rollback must fail");
    assert_eq!(err.to_string(), "Task rollback error");
    let messages: Vec<String> =
        err.errors().unwrap().iter().map(|d| d.error.to_string()).collect();
    assert_eq!(messages, ["TaskStep not in success state"]);
}
