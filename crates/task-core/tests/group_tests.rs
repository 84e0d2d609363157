//! Grupos: agregación de status, ejecución en lote y compensación inversa.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use task_core::{
    EntrySnapshot, StepError, StepHandler, StepOptions, StepPayload, StepStatus, Task, TaskStep,
    TaskStepGroup,
};

struct MemberHandler {
    key: &'static str,
    fail_action: bool,
    fail_cancel: bool,
    partial_cancel: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MemberHandler {
    fn ok(key: &'static str, calls: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            key,
            fail_action: false,
            fail_cancel: false,
            partial_cancel: false,
            calls: calls.clone(),
        }
    }
}

#[async_trait]
impl StepHandler for MemberHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn options(&self) -> StepOptions {
        StepOptions::new().support_rollback(true)
    }

    async fn execute(&self, _payload: &mut StepPayload) -> Result<Value, StepError> {
        self.calls.lock().push(format!("action:{}", self.key));
        if self.fail_action {
            return Err(StepError::handler(format!("action error {}", self.key)));
        }
        Ok(json!({"member": self.key}))
    }

    async fn compensate(&self, _payload: &mut StepPayload) -> Result<bool, StepError> {
        self.calls.lock().push(format!("cancel:{}", self.key));
        if self.fail_cancel {
            return Err(StepError::handler(format!("cancel error {}", self.key)));
        }
        Ok(!self.partial_cancel)
    }
}

fn member(handler: MemberHandler) -> Arc<TaskStep> {
    TaskStep::new(handler, StepPayload::new())
}

#[test]
fn group_status_is_max_ordinal() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let a = member(MemberHandler::ok("a", &calls));
    let b = member(MemberHandler::ok("b", &calls));
    let group = TaskStepGroup::new(vec![a.clone(), b.clone()]);

    assert_eq!(group.status(), StepStatus::Init);
    b.set_status(StepStatus::Running);
    assert_eq!(group.status(), StepStatus::Running);
    a.set_status(StepStatus::Failure);
    // failure domina aunque el otro miembro siga en marcha.
    assert_eq!(group.status(), StepStatus::Failure);
}

#[test]
fn group_status_write_broadcasts() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let a = member(MemberHandler::ok("a", &calls));
    let b = member(MemberHandler::ok("b", &calls));
    let group = TaskStepGroup::new(vec![a.clone(), b.clone()]);

    group.set_status(StepStatus::Pending);
    assert_eq!(a.status(), StepStatus::Pending);
    assert_eq!(b.status(), StepStatus::Pending);
}

#[tokio::test]
async fn group_action_runs_in_order_and_aborts() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let a = member(MemberHandler::ok("a", &calls));
    let b = member(MemberHandler { fail_action: true, ..MemberHandler::ok("b", &calls) });
    let c = member(MemberHandler::ok("c", &calls));
    let group = TaskStepGroup::new(vec![a, b, c.clone()]);

    group.set_status(StepStatus::Pending);
    let err = group.action().await.expect_err("member failure propagates");
    assert_eq!(err.to_string(), "action error b");
    // El fallo aborta los miembros restantes del grupo.
    assert_eq!(calls.lock().as_slice(), ["action:a", "action:b"]);
    assert_eq!(c.status(), StepStatus::Pending);
}

#[tokio::test]
async fn group_action_collects_results_in_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let group = TaskStepGroup::new(vec![
        member(MemberHandler::ok("a", &calls)),
        member(MemberHandler::ok("b", &calls)),
    ]);
    group.set_status(StepStatus::Pending);

    let results = group.action().await.expect("group action ok");
    assert_eq!(
        results,
        vec![Some(json!({"member": "a"})), Some(json!({"member": "b"}))]
    );
    assert_eq!(group.status(), StepStatus::Success);
}

#[tokio::test]
async fn group_cancel_is_reverse_and_best_effort_on_false() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let group = TaskStepGroup::new(vec![
        member(MemberHandler::ok("a", &calls)),
        member(MemberHandler { partial_cancel: true, ..MemberHandler::ok("b", &calls) }),
        member(MemberHandler::ok("c", &calls)),
    ]);
    group.set_status(StepStatus::Pending);
    group.action().await.expect("group action ok");
    calls.lock().clear();

    // Un false parcial no detiene al resto; el resultado agregado lo
    // refleja.
    let complete = group.cancel().await.expect("group cancel ok");
    assert!(!complete);
    assert_eq!(calls.lock().as_slice(), ["cancel:c", "cancel:b", "cancel:a"]);
    assert_eq!(group.status(), StepStatus::Init);
}

#[tokio::test]
async fn group_cancel_propagates_thrown_errors() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let a = member(MemberHandler::ok("a", &calls));
    let b = member(MemberHandler { fail_cancel: true, ..MemberHandler::ok("b", &calls) });
    let group = TaskStepGroup::new(vec![a.clone(), b]);
    group.set_status(StepStatus::Pending);
    group.action().await.expect("group action ok");
    calls.lock().clear();

    // El error lanzado corta el lote del grupo: atraparlo es tarea de la
    // capa de task.
    let err = group.cancel().await.expect_err("thrown cancel propagates");
    assert_eq!(err.to_string(), "cancel error b");
    assert_eq!(calls.lock().as_slice(), ["cancel:b"]);
    assert_eq!(a.status(), StepStatus::Success);
}

#[tokio::test]
async fn task_flattens_groups_for_execution_and_rollback() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let solo = member(MemberHandler::ok("solo", &calls));
    let g1 = member(MemberHandler::ok("g1", &calls));
    let g2 = member(MemberHandler::ok("g2", &calls));
    let group = TaskStepGroup::new(vec![g1.clone(), g2.clone()]);
    let task = Task::new("grouped", vec![solo.clone().into(), group.into()]);

    task.start().await.expect("run ok");
    assert_eq!(calls.lock().as_slice(), ["action:solo", "action:g1", "action:g2"]);
    assert!(task.is_ready());

    // El snapshot conserva la posición del grupo aunque la ejecución lo
    // aplane.
    let snapshot = task.snapshot();
    assert_eq!(snapshot.steps.len(), 2);
    assert!(matches!(snapshot.steps[0], EntrySnapshot::Step(_)));
    match &snapshot.steps[1] {
        EntrySnapshot::Group(g) => assert_eq!(g.steps.len(), 2),
        other => panic!("expected group snapshot, got {other:?}"),
    }

    calls.lock().clear();
    task.rollback(false).await.expect("rollback ok");
    // Inverso aplanado: los miembros del grupo primero, en reversa.
    assert_eq!(calls.lock().as_slice(), ["cancel:g2", "cancel:g1", "cancel:solo"]);
    assert_eq!(solo.status(), StepStatus::Init);
}

#[tokio::test]
async fn task_rollback_records_each_group_member_failure() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let g1 = member(MemberHandler { fail_cancel: true, ..MemberHandler::ok("g1", &calls) });
    let g2 = member(MemberHandler::ok("g2", &calls));
    let group = TaskStepGroup::new(vec![g1.clone(), g2.clone()]);
    let task = Task::new("grouped", vec![group.into()]);

    task.start().await.expect("run ok");
    calls.lock().clear();

    // A nivel de task cada miembro se intenta y registra por separado: el
    // fallo de g1 no salta a g2 (ya compensado) ni corta la pasada.
    let err = task.rollback(false).await.expect_err("rollback must fail");
    let messages: Vec<String> =
        err.errors().unwrap().iter().map(|d| d.error.to_string()).collect();
    assert_eq!(messages, ["cancel error g1"]);
    assert_eq!(calls.lock().as_slice(), ["cancel:g2", "cancel:g1"]);
    assert_eq!(g2.status(), StepStatus::Init);
    assert_eq!(g1.status(), StepStatus::Failure);
}
