//! Grupos de steps.
//!
//! Un `TaskStepGroup` es un paquete ordenado y fijo de steps que ocupa una
//! sola posición en la lista de un task, pero que se expande a sus miembros
//! para ejecución, escucha y serialización. No tiene status propio ni key:
//! su status de lectura es el máximo ordinal entre sus miembros.

use serde_json::Value;
use std::sync::Arc;

use super::{StepStatus, TaskStep};
use crate::errors::StepError;
use crate::task::snapshot::GroupSnapshot;

pub struct TaskStepGroup {
    steps: Vec<Arc<TaskStep>>,
}

impl TaskStepGroup {
    pub fn new(steps: Vec<Arc<TaskStep>>) -> Self {
        Self { steps }
    }

    /// Miembros en orden declarado.
    pub fn steps(&self) -> &[Arc<TaskStep>] {
        &self.steps
    }

    /// Status agregado: máximo ordinal entre los miembros ("estado más
    /// avanzado/severo observado"). Útil sólo como detección gruesa de
    /// progreso o fallo, no como estado de ciclo de vida.
    pub fn status(&self) -> StepStatus {
        self.steps
            .iter()
            .map(|s| s.status())
            .max()
            .unwrap_or(StepStatus::Init)
    }

    /// Difunde el mismo status a todos los miembros, sincrónicamente.
    pub fn set_status(&self, status: StepStatus) {
        for step in &self.steps {
            step.set_status(status);
        }
    }

    /// Ejecuta los miembros estrictamente en orden, esperando cada uno
    /// antes de arrancar el siguiente. Un fallo se propaga de inmediato y
    /// aborta los miembros restantes; la política continue-on-failure sólo
    /// existe a nivel de task.
    pub async fn action(&self) -> Result<Vec<Option<Value>>, StepError> {
        let mut results = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            results.push(step.action().await?);
        }
        Ok(results)
    }

    /// Compensa los miembros en orden inverso. Un resultado `false` se
    /// registra pero no detiene a los restantes (compensación best-effort
    /// del grupo completo); un error lanzado sí se propaga de inmediato y
    /// atraparlo es responsabilidad de la capa de task.
    pub async fn cancel(&self) -> Result<bool, StepError> {
        let mut complete = true;
        for step in self.steps.iter().rev() {
            complete &= step.cancel().await?;
        }
        Ok(complete)
    }

    /// Forma serializada `{type: "group", steps: [...]}`.
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot::new(self.steps.iter().map(|s| s.snapshot()).collect())
    }
}

impl std::fmt::Debug for TaskStepGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStepGroup")
            .field("steps", &self.steps.len())
            .field("status", &self.status())
            .finish()
    }
}
