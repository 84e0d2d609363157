//! Registro de tasks por identificador.
//!
//! Mapa fino + delegación: guarda tasks por `uuid`, dispara el arranque
//! automático de los que aún no están listos y exporta la forma serializada
//! de todos. El orden de inserción se preserva en el export.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::TaskError;
use crate::task::{Task, TaskSnapshot};

#[derive(Default)]
pub struct TaskRegistry {
    tasks: RwLock<IndexMap<Uuid, Arc<Task>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reemplaza el contenido del registro por los tasks dados (p. ej. al
    /// rehidratar desde almacenamiento). No dispara arranques.
    pub fn import(&self, tasks: Vec<Arc<Task>>) {
        let mut map = self.tasks.write();
        map.clear();
        for task in tasks {
            map.insert(task.uuid(), task);
        }
    }

    /// Guarda un task y, si no está listo (`is_ready() == false`), lanza su
    /// `start()` en segundo plano. El error agregado, si lo hay, queda
    /// observable vía los status de los steps; aquí sólo se registra.
    pub fn add_task(&self, task: Arc<Task>) -> Uuid {
        let uuid = task.uuid();
        self.tasks.write().insert(uuid, task.clone());
        if !task.is_ready() {
            tokio::spawn(async move {
                if let Err(err) = task.start().await {
                    warn!(task = %uuid, error = %err, "auto-start failed");
                }
            });
        }
        uuid
    }

    pub fn get(&self, uuid: Uuid) -> Option<Arc<Task>> {
        self.tasks.read().get(&uuid).cloned()
    }

    /// Delegación de rollback; falla con `NotFound` para ids desconocidos.
    pub async fn rollback(&self, uuid: Uuid) -> Result<(), TaskError> {
        let task = self.get(uuid).ok_or(TaskError::NotFound(uuid))?;
        task.rollback(false).await
    }

    /// Forma serializada de todos los tasks, en orden de inserción.
    pub fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.tasks.read().values().map(|t| t.snapshot()).collect()
    }
}
