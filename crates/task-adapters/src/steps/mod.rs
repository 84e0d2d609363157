//! Implementaciones concretas de steps.

pub mod counter;
pub mod echo;

pub use counter::CounterStep;
pub use echo::EchoStep;
