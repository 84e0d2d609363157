//! Interfaz de capacidad que implementa cada tipo concreto de step.
//!
//! El motor es polimórfico sobre este trait y nunca inspecciona la
//! identidad concreta del step salvo a través de `key()`, que existe sólo
//! para el despacho al reconstruir desde un snapshot.

use async_trait::async_trait;
use serde_json::Value;

use super::{StepOptions, StepStatus};
use crate::errors::StepError;

/// Payload de dominio de un step: un mapa JSON propiedad exclusiva del
/// step, mutado únicamente dentro de los handlers.
pub type StepPayload = serde_json::Map<String, Value>;

/// Veredicto del hook de pre-validación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreValidation {
    /// Ejecutar (o re-ejecutar) el handler de acción.
    Resume,
    /// El efecto externo ya se completó; no volver a ejecutarlo.
    AlreadyComplete,
}

/// Comportamiento enchufable de un step.
///
/// `execute` y `compensate` pueden suspender por IO externo arbitrario; el
/// motor espera a que cada uno termine antes de tocar el siguiente step.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Discriminador estable del tipo de step (despacho de snapshots).
    fn key(&self) -> &'static str;

    /// Nombre amigable (por defecto usa el key).
    fn name(&self) -> &str {
        self.key()
    }

    /// Opciones declaradas, inmutables durante la vida del step.
    fn options(&self) -> StepOptions {
        StepOptions::default()
    }

    /// Decide si el efecto del step ya se completó antes de pedir que corra
    /// de nuevo. Tras un reinicio del proceso, un step encontrado en
    /// `running` consulta aquí su payload/estado externo; si reporta
    /// `AlreadyComplete` el motor no re-ejecuta el efecto.
    async fn pre_validate(
        &self,
        status: StepStatus,
        payload: &mut StepPayload,
    ) -> Result<PreValidation, StepError> {
        let _ = (status, payload);
        Ok(PreValidation::Resume)
    }

    /// Ejecuta la acción de dominio y devuelve su resultado.
    async fn execute(&self, payload: &mut StepPayload) -> Result<Value, StepError>;

    /// Compensa una acción ya completada. Devuelve si la compensación fue
    /// total (`true`) o parcial (`false`).
    async fn compensate(&self, payload: &mut StepPayload) -> Result<bool, StepError>;
}
