use serde_json::{json, to_string_pretty, Value};
use task_adapters::dispatch::build_task;
use task_adapters::steps::{CounterStep, EchoStep};
use task_core::{StepStatus, Task, TaskRegistry, TaskStepGroup};
use tracing_subscriber::EnvFilter;

/// Demo del ciclo completo: run → export → rebuild → rollback.
async fn run_lifecycle_demo() {
    // Task mixto: un step suelto y un grupo de dos contadores.
    let echo = EchoStep::new("demo");
    let group = TaskStepGroup::new(vec![CounterStep::new(2), CounterStep::new(3)]);
    let task = Task::new("provision", vec![echo.clone().into(), group.into()]);

    // Punto único de suscripción: el task re-emite lo de todos sus steps.
    task.on_step_status(Box::new(|step| {
        println!("[status] {} -> {}", step.key(), step.status());
    }));
    task.on_step_action(Box::new(|step, data| {
        println!("[action] {} produced {}", step.key(), data);
    }));

    task.start().await.expect("run ok");
    assert!(task.is_ready(), "todos los steps deben quedar hechos");
    println!("Resultado cacheado: {:?}", echo.cached_result());

    let exported = task.to_json();
    println!("Export:\n{}", to_string_pretty(&exported).unwrap_or_default());

    // Reconstrucción por key (contrato del colaborador externo) y
    // compensación en orden inverso.
    let rebuilt = build_task(&task.snapshot()).expect("rebuild ok");
    rebuilt.rollback(false).await.expect("rollback ok");
    let reverted = rebuilt.to_json();
    let statuses: Vec<&str> = reverted["steps"]
        .as_array()
        .map(|steps| {
            steps
                .iter()
                .flat_map(|entry| match entry.get("steps").and_then(Value::as_array) {
                    Some(members) => members.iter().collect::<Vec<_>>(),
                    None => vec![entry],
                })
                .filter_map(|step| step.get("status").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    assert!(statuses.iter().all(|s| *s == "init"), "rollback debe devolver todo a init");
    println!("!Validación lifecycle: OK (run, export, rebuild y rollback)");
}

/// Demo del registro: alta con auto-arranque y rollback delegado.
async fn run_registry_demo() {
    let registry = TaskRegistry::new();
    let echo = EchoStep::new("demo");
    let task = Task::new("provision", vec![echo.clone().into()]);

    let uuid = registry.add_task(task);
    let data = echo.wait().await.expect("step completes");
    assert_eq!(data, Some(json!({"data": "demo world!"})));

    registry.rollback(uuid).await.expect("rollback ok");
    assert_eq!(echo.status(), StepStatus::Init);
    println!("!Validación registry: OK (auto-start, wait y rollback por uuid)");
}

#[tokio::main]
async fn main() {
    // Cargar variables de entorno desde .env si existe (antes de leer RUST_LOG)
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- Iniciando demo lifecycle ---");
    run_lifecycle_demo().await;
    println!("--- Iniciando demo registry ---");
    run_registry_demo().await;
}
