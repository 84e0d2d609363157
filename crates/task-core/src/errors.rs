//! Errores del motor de tareas.
//!
//! Dos familias, alineadas con el contrato observable:
//! - `StepError`: violaciones locales de estado y fallos del handler de
//!   dominio. Siempre sincrónicos a la llamada ofensora.
//! - `TaskError`: precondiciones a nivel de task y los errores agregados
//!   que emiten `start()` y `rollback()` tras completar su pasada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error local de un step. `Handler` transporta el mensaje del fallo de
/// dominio; el resto son violaciones del contrato de la API.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepError {
    #[error("TaskStep not in pending state")] NotPending,
    #[error("TaskStep not in success state")] NotSuccess,
    #[error("TaskStep does not support rollback")] RollbackUnsupported,
    #[error("{0}")] Handler(String),
}

impl StepError {
    /// Construye un fallo de handler a partir de cualquier mensaje.
    pub fn handler(msg: impl Into<String>) -> Self {
        StepError::Handler(msg.into())
    }
}

/// Registro fechado de un fallo ocurrido durante una pasada de `start()` o
/// `rollback()`. El orden de la lista es el orden de aparición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedError {
    pub date: DateTime<Utc>,
    pub error: StepError,
}

impl DatedError {
    pub fn now(error: StepError) -> Self {
        Self { date: Utc::now(), error }
    }
}

/// Error a nivel de task.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskError {
    /// Agregado de la pasada forward (abort-early). Sólo se emite una vez
    /// detenida la pasada completa.
    #[error("Task run error")]
    Run(Vec<DatedError>),
    /// Agregado de la pasada de compensación (run-to-completion).
    #[error("Task rollback error")]
    Rollback(Vec<DatedError>),
    /// Precondición de rollback: ningún step del task lo soporta.
    #[error("not all task steps support rollback")]
    RollbackUnsupported,
    /// El registry no conoce el identificador pedido.
    #[error("task {0} not found")]
    NotFound(Uuid),
    /// Fallo directo de un step (p. ej. en `run_next`), sin agregación.
    #[error(transparent)]
    Step(#[from] StepError),
}

impl TaskError {
    /// Lista de errores fechados si la variante es agregada.
    pub fn errors(&self) -> Option<&[DatedError]> {
        match self {
            TaskError::Run(list) | TaskError::Rollback(list) => Some(list),
            _ => None,
        }
    }
}
