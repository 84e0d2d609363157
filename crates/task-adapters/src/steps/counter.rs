//! CounterStep
//!
//! Paso acumulador sin emisión de datos: suma `amount` a `count` y la
//! compensación lo resta. Declara `continue_on_failure` para que un task lo
//! pueda mezclar con steps que abortan la pasada.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use task_core::{
    PreValidation, StepError, StepHandler, StepOptions, StepPayload, StepStatus, TaskStep,
};

/// Vista tipada del payload (si faltan campos, usa defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CounterState {
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    count: i64,
}

impl CounterState {
    fn read(payload: &StepPayload) -> Self {
        serde_json::from_value(Value::Object(payload.clone())).unwrap_or_default()
    }

    fn write(&self, payload: &mut StepPayload) {
        payload.insert("amount".into(), json!(self.amount));
        payload.insert("count".into(), json!(self.count));
    }
}

pub struct CounterStep;

impl CounterStep {
    pub const KEY: &'static str = "counter";

    pub fn new(amount: i64) -> std::sync::Arc<TaskStep> {
        let mut payload = StepPayload::new();
        CounterState { amount, count: 0 }.write(&mut payload);
        TaskStep::new(CounterStep, payload)
    }
}

#[async_trait]
impl StepHandler for CounterStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &str {
        "CounterStep"
    }

    fn options(&self) -> StepOptions {
        StepOptions::new().support_rollback(true).continue_on_failure(true)
    }

    async fn pre_validate(
        &self,
        status: StepStatus,
        payload: &mut StepPayload,
    ) -> Result<PreValidation, StepError> {
        if status == StepStatus::Running && CounterState::read(payload).count > 0 {
            return Ok(PreValidation::AlreadyComplete);
        }
        Ok(PreValidation::Resume)
    }

    async fn execute(&self, payload: &mut StepPayload) -> Result<Value, StepError> {
        let mut state = CounterState::read(payload);
        state.count += state.amount;
        state.write(payload);
        Ok(json!({"count": state.count}))
    }

    async fn compensate(&self, payload: &mut StepPayload) -> Result<bool, StepError> {
        let mut state = CounterState::read(payload);
        state.count -= state.amount;
        state.write(payload);
        Ok(true)
    }
}
