//! Reconstrucción por despacho de `key`.
//!
//! El motor no expone deserializador genérico: dado un snapshot, el
//! colaborador externo decide qué tipo concreto instanciar a partir del
//! discriminador de cada step. Aquí vive ese despacho para los steps de
//! este crate.

use std::sync::Arc;
use thiserror::Error;

use task_core::{EntrySnapshot, StepSnapshot, Task, TaskEntry, TaskSnapshot, TaskStep, TaskStepGroup};

use crate::steps::{CounterStep, EchoStep};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown step key: {0}")]
    UnknownStepKey(String),
}

/// Reconstruye un step desde su snapshot, conservando status y payload.
pub fn build_step(snapshot: &StepSnapshot) -> Result<Arc<TaskStep>, DispatchError> {
    match snapshot.key.as_str() {
        EchoStep::KEY => Ok(TaskStep::restore(EchoStep, snapshot.payload.clone(), snapshot.status)),
        CounterStep::KEY => {
            Ok(TaskStep::restore(CounterStep, snapshot.payload.clone(), snapshot.status))
        }
        other => Err(DispatchError::UnknownStepKey(other.to_string())),
    }
}

/// Reconstruye un task completo (steps sueltos y grupos) con su identidad
/// preservada, listo para que el llamador decida si necesita `start()`.
pub fn build_task(snapshot: &TaskSnapshot) -> Result<Arc<Task>, DispatchError> {
    let mut entries: Vec<TaskEntry> = Vec::with_capacity(snapshot.steps.len());
    for entry in &snapshot.steps {
        match entry {
            EntrySnapshot::Step(step) => entries.push(build_step(step)?.into()),
            EntrySnapshot::Group(group) => {
                let members = group
                    .steps
                    .iter()
                    .map(build_step)
                    .collect::<Result<Vec<_>, _>>()?;
                entries.push(TaskStepGroup::new(members).into());
            }
        }
    }
    Ok(Task::with_uuid(snapshot.task_type.clone(), snapshot.uuid, entries))
}
