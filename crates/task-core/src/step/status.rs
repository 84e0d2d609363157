//! Estado de un TaskStep en tiempo de ejecución.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estados posibles de un step.
///
/// El orden de los discriminantes (`init(0) < pending(1) < running(2) <
/// rollback(3) < success(4) < failure(5)`) existe únicamente para la
/// agregación por máximo que hace `TaskStepGroup`: refleja "estado más
/// avanzado/severo observado", no un orden lineal del ciclo de vida
/// (`success` puede volver a `init` vía rollback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Recién creado o restaurado tras una compensación exitosa.
    Init,
    /// Promovido por el task; único estado desde el que corre `action()`.
    Pending,
    /// Handler de dominio en ejecución.
    Running,
    /// Compensación en curso.
    Rollback,
    /// Acción completada; elegible para `cancel()`.
    Success,
    /// Acción o compensación fallida.
    Failure,
}

impl StepStatus {
    /// "Hecho" a efectos de `Task::is_ready()`. No es terminal: `success`
    /// puede transicionar a `rollback` y de vuelta a `init`.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Estados que `Task::start()` selecciona para ejecutar.
    pub fn is_runnable(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Init
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Rollback => write!(f, "rollback"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Self::Init),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "rollback" => Ok(Self::Rollback),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            _ => Err(format!("Invalid step status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_states() {
        assert!(StepStatus::Success.is_done());
        assert!(StepStatus::Failure.is_done());
        assert!(!StepStatus::Init.is_done());
        assert!(!StepStatus::Pending.is_done());
        assert!(!StepStatus::Running.is_done());
        assert!(!StepStatus::Rollback.is_done());
    }

    #[test]
    fn aggregation_order() {
        // Orden por máximo usado por los grupos: failure domina todo.
        assert!(StepStatus::Failure > StepStatus::Success);
        assert!(StepStatus::Success > StepStatus::Rollback);
        assert!(StepStatus::Rollback > StepStatus::Running);
        assert!(StepStatus::Running > StepStatus::Pending);
        assert!(StepStatus::Pending > StepStatus::Init);
    }

    #[test]
    fn string_conversion() {
        assert_eq!(StepStatus::Rollback.to_string(), "rollback");
        assert_eq!("success".parse::<StepStatus>().unwrap(), StepStatus::Success);
        assert!("done".parse::<StepStatus>().is_err());
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&StepStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let parsed: StepStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, StepStatus::Pending);
    }
}
