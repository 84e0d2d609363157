//! Celda de resultado de resolución única y su future `Wait`.
//!
//! Tres estados: sin resolver (con la lista de wakers pendientes), resuelta
//! con el resultado cacheado, o rechazada con el error del step. La primera
//! escritura gana; las siguientes se ignoran. Una vez registrada, la
//! resolución queda disponible para cualquier `wait()` posterior, aunque el
//! step vuelva luego a `init` por una compensación.

use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::errors::StepError;

enum CellState {
    Unset { wakers: Vec<Waker> },
    Resolved(Option<Value>),
    Rejected(StepError),
}

pub(crate) struct WaitCell {
    state: Mutex<CellState>,
}

impl WaitCell {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self { state: Mutex::new(CellState::Unset { wakers: Vec::new() }) })
    }

    /// Registra el resultado exitoso. No-op si la celda ya se resolvió o
    /// rechazó (resolución única).
    pub(crate) fn resolve(&self, value: Option<Value>) {
        self.settle(CellState::Resolved(value));
    }

    /// Registra el rechazo. No-op si la celda ya quedó resuelta.
    pub(crate) fn reject(&self, error: StepError) {
        self.settle(CellState::Rejected(error));
    }

    fn settle(&self, next: CellState) {
        let mut state = self.state.lock();
        if let CellState::Unset { wakers } = &mut *state {
            let pending = std::mem::take(wakers);
            *state = next;
            drop(state);
            for waker in pending {
                waker.wake();
            }
        }
    }
}

/// Future devuelto por `TaskStep::wait()`.
///
/// Se resuelve con el resultado cacheado de la acción completada (`None` si
/// el step se completó sin producir datos en este proceso) o se rechaza con
/// el error que la hizo fallar. Nunca re-observa re-ejecuciones futuras.
pub struct Wait {
    cell: Arc<WaitCell>,
}

impl Wait {
    pub(crate) fn new(cell: Arc<WaitCell>) -> Self {
        Self { cell }
    }
}

impl Future for Wait {
    type Output = Result<Option<Value>, StepError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.cell.state.lock();
        match &mut *state {
            CellState::Unset { wakers } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            CellState::Resolved(value) => Poll::Ready(Ok(value.clone())),
            CellState::Rejected(error) => Poll::Ready(Err(error.clone())),
        }
    }
}
