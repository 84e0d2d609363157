//! TaskFlow Rust Library
//!
//! Este crate actúa como la fachada del workspace:
//! - Re-exporta `task_core` (motor de tasks secuenciales con compensación).
//! - Re-exporta `task_adapters` (steps concretos y despacho por key).
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub use task_adapters as adapters;
pub use task_core as core;

pub use task_core::{
    DatedError, PreValidation, StepError, StepHandler, StepOptions, StepPayload, StepStatus, Task,
    TaskEntry, TaskError, TaskRegistry, TaskStep, TaskStepGroup,
};
