//! Opciones declaradas por cada tipo concreto de step.

use serde::{Deserialize, Serialize};

/// Opciones inmutables de un step, declaradas por su handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOptions {
    /// Si la pasada forward del task continúa con el siguiente step tras un
    /// fallo de éste (el step fallido no se reintenta).
    pub continue_on_failure: bool,
    /// Habilita `cancel()`; sin esto la compensación falla localmente.
    pub support_rollback: bool,
    /// Emite la notificación de datos de acción al completar el handler.
    pub emit_data: bool,
}

impl StepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn continue_on_failure(mut self, value: bool) -> Self {
        self.continue_on_failure = value;
        self
    }

    pub fn support_rollback(mut self, value: bool) -> Self {
        self.support_rollback = value;
        self
    }

    pub fn emit_data(mut self, value: bool) -> Self {
        self.emit_data = value;
        self
    }
}
