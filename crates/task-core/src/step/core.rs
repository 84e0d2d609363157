//! Máquina de estados de un TaskStep.
//!
//! El step es la unidad atómica de trabajo: posee su status, su payload de
//! dominio, el último resultado cacheado y la celda de espera. El
//! comportamiento concreto llega por un `StepHandler` enchufable; aquí vive
//! sólo la mecánica de transición.
//!
//! Invariantes:
//! - `action()` sólo corre con status `pending` (o `running`, la vía de
//!   entrada de un step restaurado tras un crash a mitad de ejecución);
//!   cualquier otro status falla con `StepError::NotPending` sin
//!   transicionar.
//! - `cancel()` sólo corre con status `success` y `support_rollback`.
//! - La celda de espera se resuelve/rechaza a lo sumo una vez; una
//!   compensación posterior no la limpia.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::handler::{PreValidation, StepHandler, StepPayload};
use super::wait::{Wait, WaitCell};
use super::{StepOptions, StepStatus};
use crate::errors::StepError;
use crate::event::{ActionListener, Listeners, StatusListener};
use crate::task::snapshot::StepSnapshot;

struct StepProps {
    status: StepStatus,
    payload: StepPayload,
    data: Option<Value>,
}

pub struct TaskStep {
    handler: Box<dyn StepHandler>,
    props: RwLock<StepProps>,
    wait_cell: Arc<WaitCell>,
    listeners: Listeners,
}

impl TaskStep {
    /// Crea un step nuevo en `init`.
    pub fn new(handler: impl StepHandler + 'static, payload: StepPayload) -> Arc<Self> {
        Self::restore(handler, payload, StepStatus::Init)
    }

    /// Reconstruye un step desde estado persistido, conservando el status
    /// con el que quedó (el payload restaurado es un valor propio del step,
    /// nunca un alias del dato persistido).
    pub fn restore(
        handler: impl StepHandler + 'static,
        payload: StepPayload,
        status: StepStatus,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            props: RwLock::new(StepProps { status, payload, data: None }),
            wait_cell: WaitCell::new(),
            listeners: Listeners::new(),
        })
    }

    pub fn key(&self) -> &'static str {
        self.handler.key()
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn options(&self) -> StepOptions {
        self.handler.options()
    }

    pub fn status(&self) -> StepStatus {
        self.props.read().status
    }

    /// Escribe el status y notifica sincrónicamente a los listeners, con el
    /// estado post-escritura ya legible desde el propio step.
    pub fn set_status(&self, status: StepStatus) {
        self.props.write().status = status;
        debug!(step = self.key(), status = %status, "step status");
        self.listeners.emit_status(self);
    }

    /// Copia del payload de dominio actual.
    pub fn payload(&self) -> StepPayload {
        self.props.read().payload.clone()
    }

    /// Último resultado exitoso, si la acción corrió en este proceso.
    pub fn cached_result(&self) -> Option<Value> {
        self.props.read().data.clone()
    }

    pub fn is_done(&self) -> bool {
        self.status().is_done()
    }

    /// Future de resolución única ligado al desenlace de la acción. Si el
    /// step ya se completó, el future queda listo de inmediato; esperas
    /// posteriores observan el mismo desenlace sin re-ejecutar nada.
    pub fn wait(&self) -> Wait {
        Wait::new(self.wait_cell.clone())
    }

    /// Registra un listener de cambios de status.
    pub fn on_status(&self, listener: StatusListener) {
        self.listeners.on_status(listener);
    }

    /// Registra un listener de datos de acción (sólo steps con `emit_data`).
    pub fn on_action(&self, listener: ActionListener) {
        self.listeners.on_action(listener);
    }

    /// Ejecuta la acción del step.
    ///
    /// Secuencia: pre-validación (puede declarar el efecto ya completado,
    /// en cuyo caso no se re-ejecuta ni se emite dato nuevo), luego el
    /// handler de dominio. Todo fallo transiciona a `failure` y rechaza la
    /// celda de espera antes de propagarse.
    ///
    /// El hook de pre-validación recibe el status de entrada: `pending` en
    /// una corrida normal, `running` cuando el step fue restaurado así tras
    /// un crash y debe decidir si su efecto externo ya se completó.
    pub async fn action(&self) -> Result<Option<Value>, StepError> {
        let entry_status = self.status();
        if !entry_status.is_runnable() {
            return Err(StepError::NotPending);
        }

        let mut payload = self.payload();
        match self.handler.pre_validate(entry_status, &mut payload).await {
            Ok(PreValidation::AlreadyComplete) => {
                let data = {
                    let mut props = self.props.write();
                    props.payload = payload;
                    props.data.clone()
                };
                self.set_status(StepStatus::Success);
                self.wait_cell.resolve(data.clone());
                return Ok(data);
            }
            Ok(PreValidation::Resume) => {
                self.props.write().payload = payload;
            }
            Err(err) => {
                self.props.write().payload = payload;
                self.set_status(StepStatus::Failure);
                self.wait_cell.reject(err.clone());
                return Err(err);
            }
        }

        self.set_status(StepStatus::Running);
        let mut payload = self.payload();
        match self.handler.execute(&mut payload).await {
            Ok(data) => {
                {
                    let mut props = self.props.write();
                    props.payload = payload;
                    props.data = Some(data.clone());
                }
                if self.options().emit_data {
                    self.listeners.emit_action(self, &data);
                }
                self.set_status(StepStatus::Success);
                self.wait_cell.resolve(Some(data.clone()));
                Ok(Some(data))
            }
            Err(err) => {
                self.props.write().payload = payload;
                self.set_status(StepStatus::Failure);
                self.wait_cell.reject(err.clone());
                Err(err)
            }
        }
    }

    /// Compensa una acción completada.
    ///
    /// Con handler exitoso el step vuelve a `init` (elegible para correr de
    /// nuevo) y devuelve si la compensación fue total. Si el handler falla
    /// el step queda en `failure` y el error se propaga.
    pub async fn cancel(&self) -> Result<bool, StepError> {
        if self.status() != StepStatus::Success {
            return Err(StepError::NotSuccess);
        }
        if !self.options().support_rollback {
            return Err(StepError::RollbackUnsupported);
        }

        self.set_status(StepStatus::Rollback);
        let mut payload = self.payload();
        match self.handler.compensate(&mut payload).await {
            Ok(done) => {
                self.props.write().payload = payload;
                self.set_status(StepStatus::Init);
                Ok(done)
            }
            Err(err) => {
                self.props.write().payload = payload;
                self.set_status(StepStatus::Failure);
                Err(err)
            }
        }
    }

    /// Forma serializada `{key, status, ...payload}`.
    pub fn snapshot(&self) -> StepSnapshot {
        let props = self.props.read();
        StepSnapshot {
            key: self.handler.key().to_string(),
            status: props.status,
            payload: props.payload.clone(),
        }
    }
}

impl std::fmt::Debug for TaskStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStep")
            .field("key", &self.key())
            .field("status", &self.status())
            .finish()
    }
}
