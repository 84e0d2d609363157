//! Formas serializadas del contrato externo.
//!
//! Es el formato que un registry o una capa de almacenamiento consume y
//! produce. El motor no expone deserializador genérico: reconstruir un step
//! a partir de su `key` es responsabilidad del colaborador externo.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::{StepPayload, StepStatus};

/// `{key, status, ...payload}`: los campos de dominio van aplanados al
/// mismo nivel que `key` y `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub key: String,
    pub status: StepStatus,
    #[serde(flatten)]
    pub payload: StepPayload,
}

/// `{type: "group", steps: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSnapshot {
    #[serde(rename = "type")]
    pub tag: String,
    pub steps: Vec<StepSnapshot>,
}

impl GroupSnapshot {
    pub const TAG: &'static str = "group";

    pub fn new(steps: Vec<StepSnapshot>) -> Self {
        Self { tag: Self::TAG.to_string(), steps }
    }
}

/// Una posición de la lista de un task: step suelto o grupo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySnapshot {
    Group(GroupSnapshot),
    Step(StepSnapshot),
}

/// `{type, uuid, steps}`: la forma persistible completa de un task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(rename = "type")]
    pub task_type: String,
    pub uuid: Uuid,
    pub steps: Vec<EntrySnapshot>,
}
