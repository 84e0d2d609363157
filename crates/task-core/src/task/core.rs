//! Orquestación de un task.
//!
//! Un `Task` posee una lista ordenada de steps y grupos, fija desde la
//! construcción. Dondequiera que actúa sobre "sus steps" (ejecutar,
//! escuchar, compensar, serializar por miembro) los grupos se expanden en
//! su lugar: el task opera siempre sobre la lista aplanada.
//!
//! Las dos pasadas tienen políticas de fallo deliberadamente asimétricas:
//! la forward aborta en el primer fallo sin `continue_on_failure`; la de
//! rollback siempre intenta todos los steps y recién al final agrega lo
//! recolectado.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::snapshot::{EntrySnapshot, TaskSnapshot};
use crate::errors::{DatedError, TaskError};
use crate::event::{ActionListener, Listeners, StatusListener};
use crate::step::{StepStatus, TaskStep, TaskStepGroup};

/// Una posición de la lista del task.
pub enum TaskEntry {
    Step(Arc<TaskStep>),
    Group(TaskStepGroup),
}

impl TaskEntry {
    /// Vista aplanada de la posición: el step suelto o los miembros del
    /// grupo en orden declarado.
    pub fn steps(&self) -> &[Arc<TaskStep>] {
        match self {
            TaskEntry::Step(step) => std::slice::from_ref(step),
            TaskEntry::Group(group) => group.steps(),
        }
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        match self {
            TaskEntry::Step(step) => EntrySnapshot::Step(step.snapshot()),
            TaskEntry::Group(group) => EntrySnapshot::Group(group.snapshot()),
        }
    }
}

impl From<Arc<TaskStep>> for TaskEntry {
    fn from(step: Arc<TaskStep>) -> Self {
        TaskEntry::Step(step)
    }
}

impl From<TaskStepGroup> for TaskEntry {
    fn from(group: TaskStepGroup) -> Self {
        TaskEntry::Group(group)
    }
}

/// Resultado de `run_next`: el step ejecutado y su dato.
pub struct StepOutcome {
    pub step: Arc<TaskStep>,
    pub data: Option<Value>,
}

pub struct Task {
    task_type: String,
    uuid: Uuid,
    entries: Vec<TaskEntry>,
    hub: Arc<Listeners>,
}

impl Task {
    /// Crea un task nuevo; genera su identidad.
    pub fn new(task_type: impl Into<String>, entries: Vec<TaskEntry>) -> Arc<Self> {
        Self::with_uuid(task_type, Uuid::new_v4(), entries)
    }

    /// Reconstruye un task con identidad preservada (los steps los rearma
    /// el llamador despachando por `key`).
    pub fn with_uuid(task_type: impl Into<String>, uuid: Uuid, entries: Vec<TaskEntry>) -> Arc<Self> {
        let task = Arc::new(Self {
            task_type: task_type.into(),
            uuid,
            entries,
            hub: Arc::new(Listeners::new()),
        });
        // Suscripción única en construcción: el task re-emite las
        // notificaciones de cada step aplanado. La lista de steps es fija,
        // no se re-establece después.
        for step in task.steps() {
            let hub = task.hub.clone();
            step.on_status(Box::new(move |s| hub.emit_status(s)));
            let hub = task.hub.clone();
            step.on_action(Box::new(move |s, d| hub.emit_action(s, d)));
        }
        task
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Posiciones declaradas (steps y grupos, sin aplanar).
    pub fn entries(&self) -> &[TaskEntry] {
        &self.entries
    }

    /// Lista aplanada en orden de ejecución.
    pub fn steps(&self) -> impl DoubleEndedIterator<Item = &Arc<TaskStep>> {
        self.entries.iter().flat_map(TaskEntry::steps)
    }

    /// Punto único de suscripción a los cambios de status de todos los
    /// steps del task, etiquetados con el step de origen.
    pub fn on_step_status(&self, listener: StatusListener) {
        self.hub.on_status(listener);
    }

    /// Ídem para los datos de acción (steps con `emit_data`).
    pub fn on_step_action(&self, listener: ActionListener) {
        self.hub.on_action(listener);
    }

    /// Corre el task hacia adelante.
    ///
    /// Promueve a `pending` sólo los steps en `init` (los que un proceso
    /// anterior dejó en `pending`/`running` no se resetean) y luego ejecuta,
    /// en orden declarado, cada step seleccionado como `pending`/`running`.
    /// Esa reselección es la que permite retomar un step que quedó a
    /// medias: su pre-validación decide si rehace el trabajo.
    pub async fn start(&self) -> Result<(), TaskError> {
        for step in self.steps() {
            if step.status() == StepStatus::Init {
                step.set_status(StepStatus::Pending);
            }
        }

        let selected: Vec<Arc<TaskStep>> = self
            .steps()
            .filter(|s| s.status().is_runnable())
            .cloned()
            .collect();

        let mut errors: Vec<DatedError> = Vec::new();
        for step in selected {
            if let Err(err) = step.action().await {
                errors.push(DatedError::now(err));
                if !step.options().continue_on_failure {
                    break;
                }
            }
        }

        if errors.is_empty() {
            info!(task = %self.uuid, "task run complete");
            Ok(())
        } else {
            warn!(task = %self.uuid, failures = errors.len(), "task run failed");
            Err(TaskError::Run(errors))
        }
    }

    /// Avanza un solo step: promueve el primer step aún en `init`, lo
    /// ejecuta y devuelve su resultado. `None` si no queda ninguno.
    pub async fn run_next(&self) -> Result<Option<StepOutcome>, TaskError> {
        let step = match self.steps().find(|s| s.status() == StepStatus::Init) {
            Some(step) => step.clone(),
            None => return Ok(None),
        };
        step.set_status(StepStatus::Pending);
        let data = step.action().await?;
        Ok(Some(StepOutcome { step, data }))
    }

    /// Compensa el task en orden inverso al declarado.
    ///
    /// Salvo `force`, exige que al menos un step aplanado declare soporte
    /// de rollback; si ninguno lo hace falla sin tocar ningún step. Cada
    /// fallo se registra pero no detiene la pasada: el rollback siempre
    /// intenta todos los steps.
    pub async fn rollback(&self, force: bool) -> Result<(), TaskError> {
        if !force && !self.steps().any(|s| s.options().support_rollback) {
            return Err(TaskError::RollbackUnsupported);
        }

        let reversed: Vec<Arc<TaskStep>> = self.steps().rev().cloned().collect();
        let mut errors: Vec<DatedError> = Vec::new();
        for step in reversed {
            if let Err(err) = step.cancel().await {
                errors.push(DatedError::now(err));
            }
        }

        if errors.is_empty() {
            info!(task = %self.uuid, "task rollback complete");
            Ok(())
        } else {
            warn!(task = %self.uuid, failures = errors.len(), "task rollback failed");
            Err(TaskError::Rollback(errors))
        }
    }

    /// `true` si todos los steps aplanados están hechos (`success` o
    /// `failure`). Un task reconstruido con esto en `true` no necesita
    /// `start()`.
    pub fn is_ready(&self) -> bool {
        self.steps().all(|s| s.is_done())
    }

    /// Forma persistible `{type, uuid, steps}`.
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_type: self.task_type.clone(),
            uuid: self.uuid,
            steps: self.entries.iter().map(TaskEntry::snapshot).collect(),
        }
    }

    /// Snapshot como `serde_json::Value`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.snapshot()).expect("serialize task snapshot")
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("type", &self.task_type)
            .field("uuid", &self.uuid)
            .field("entries", &self.entries.len())
            .finish()
    }
}
