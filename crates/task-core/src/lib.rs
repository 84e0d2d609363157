//! task-core: motor secuencial de tasks con compensación
//!
//! Un task es una lista ordenada de steps (o grupos de steps) que corren de
//! a uno, cada step con su propia máquina de estados
//! (init → pending → running → success/failure), rollback compensatorio en
//! orden inverso y un contrato de resume que no re-ejecuta efectos ya
//! completados.

pub mod errors;
pub mod event;
pub mod registry;
pub mod step;
pub mod task;

pub use errors::{DatedError, StepError, TaskError};
pub use event::{ActionListener, StatusListener};
pub use registry::TaskRegistry;
pub use step::{
    PreValidation, StepHandler, StepOptions, StepPayload, StepStatus, TaskStep, TaskStepGroup, Wait,
};
pub use task::{EntrySnapshot, GroupSnapshot, StepOutcome, StepSnapshot, Task, TaskEntry, TaskSnapshot};
