//! Definiciones relacionadas a TaskSteps.
//!
//! Un step es la unidad atómica de trabajo de un task: lleva su propia
//! máquina de estados, un payload de dominio opaco al motor y un handler
//! enchufable. Este módulo define:
//! - `StepHandler`: interfaz de capacidad que implementa cada step concreto.
//! - `TaskStep`: la máquina de estados genérica.
//! - `TaskStepGroup`: paquete ordenado tratado como una posición del task.
//! - `Wait`: future de resolución única ligado al desenlace de la acción.

pub mod core;
pub mod group;
pub mod handler;
mod options;
mod status;
pub mod wait;

pub use self::core::TaskStep;
pub use group::TaskStepGroup;
pub use handler::{PreValidation, StepHandler, StepPayload};
pub use options::StepOptions;
pub use status::StepStatus;
pub use wait::Wait;
