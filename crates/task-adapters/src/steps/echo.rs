//! EchoStep
//!
//! - Paso de demostración con payload `{value, roll}`: la acción marca el
//!   efecto subiendo `roll` y produce `{"data": "<value> world!"}`.
//! - `value == "error"` hace fallar la acción; `value == "cancel_error"`,
//!   la compensación. Útil para ejercitar las dos políticas de fallo.
//! - La pre-validación detecta el efecto ya aplicado (`roll > 0`) cuando el
//!   step reaparece en `running` tras un reinicio.

use async_trait::async_trait;
use serde_json::{json, Value};

use task_core::{
    PreValidation, StepError, StepHandler, StepOptions, StepPayload, StepStatus, TaskStep,
};

pub struct EchoStep;

impl EchoStep {
    pub const KEY: &'static str = "echo";

    /// Step nuevo con el payload inicial `{value, roll: 0}`.
    pub fn new(value: impl Into<String>) -> std::sync::Arc<TaskStep> {
        let mut payload = StepPayload::new();
        payload.insert("value".into(), json!(value.into()));
        payload.insert("roll".into(), json!(0));
        TaskStep::new(EchoStep, payload)
    }
}

fn roll(payload: &StepPayload) -> i64 {
    payload.get("roll").and_then(Value::as_i64).unwrap_or(0)
}

fn value(payload: &StepPayload) -> String {
    payload.get("value").and_then(Value::as_str).unwrap_or_default().to_string()
}

#[async_trait]
impl StepHandler for EchoStep {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &str {
        "EchoStep"
    }

    fn options(&self) -> StepOptions {
        StepOptions::new().support_rollback(true).emit_data(true)
    }

    async fn pre_validate(
        &self,
        status: StepStatus,
        payload: &mut StepPayload,
    ) -> Result<PreValidation, StepError> {
        // Reaparecer en running con el efecto aplicado significa que el
        // proceso murió después de actuar: no repetir.
        if status == StepStatus::Running && roll(payload) > 0 {
            return Ok(PreValidation::AlreadyComplete);
        }
        Ok(PreValidation::Resume)
    }

    async fn execute(&self, payload: &mut StepPayload) -> Result<Value, StepError> {
        let value = value(payload);
        if value == "error" {
            return Err(StepError::handler("action error"));
        }
        payload.insert("roll".into(), json!(roll(payload) + 1));
        Ok(json!({"data": format!("{value} world!")}))
    }

    async fn compensate(&self, payload: &mut StepPayload) -> Result<bool, StepError> {
        if value(payload) == "cancel_error" {
            return Err(StepError::handler("cancel error"));
        }
        payload.insert("roll".into(), json!(roll(payload) - 1));
        Ok(true)
    }
}
