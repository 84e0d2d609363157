//! Task: lista ordenada de steps/grupos ejecutada secuencialmente, con
//! compensación en orden inverso y re-emisión de eventos de sus steps.

pub mod core;
pub mod snapshot;

pub use self::core::{StepOutcome, Task, TaskEntry};
pub use snapshot::{EntrySnapshot, GroupSnapshot, StepSnapshot, TaskSnapshot};
