//! Notificaciones de steps y tasks.
//!
//! Contrato observable del motor: un listener de status recibe el step con
//! su estado post-transición ya legible; un listener de acción recibe el
//! step y el dato producido (sólo si el step declara `emit_data`). El
//! despacho es sincrónico, en orden de registro, dentro de la propia
//! transición.

use parking_lot::Mutex;
use serde_json::Value;

use crate::step::TaskStep;

/// Listener de cambios de status.
pub type StatusListener = Box<dyn Fn(&TaskStep) + Send + Sync>;

/// Listener de datos de acción.
pub type ActionListener = Box<dyn Fn(&TaskStep, &Value) + Send + Sync>;

/// Listas de listeners compartidas por `TaskStep` (emisión propia) y por
/// `Task` (re-emisión etiquetada con el step de origen).
#[derive(Default)]
pub(crate) struct Listeners {
    status: Mutex<Vec<StatusListener>>,
    action: Mutex<Vec<ActionListener>>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_status(&self, listener: StatusListener) {
        self.status.lock().push(listener);
    }

    pub(crate) fn on_action(&self, listener: ActionListener) {
        self.action.lock().push(listener);
    }

    pub(crate) fn emit_status(&self, step: &TaskStep) {
        let listeners = self.status.lock();
        for listener in listeners.iter() {
            listener(step);
        }
    }

    pub(crate) fn emit_action(&self, step: &TaskStep, data: &Value) {
        let listeners = self.action.lock();
        for listener in listeners.iter() {
            listener(step, data);
        }
    }
}
