//! task-adapters: steps concretos y reconstrucción por key
//!
//! Este crate provee implementaciones de `StepHandler` listas para usar y
//! el despacho por `key` que rearma steps y tasks desde su forma
//! serializada (contrato de reconstrucción del motor).

pub mod dispatch;
pub mod steps;

pub use dispatch::{build_step, build_task, DispatchError};
pub use steps::{CounterStep, EchoStep};
