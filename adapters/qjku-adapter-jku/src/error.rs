//! Error types for the JKU adapter.

use qjku_hal::HalError;
use qjku_ir::{IrError, QubitId};
use thiserror::Error;

pub type JkuResult<T> = Result<T, JkuError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JkuError {
    /// A non-measurement instruction touched a qubit that was already measured.
    #[error("Qubit {qubit} was used after being measured, which the JKU simulator does not support")]
    MeasurementOrder { qubit: QubitId },

    #[error("Operation '{name}' is not supported by the JKU simulator")]
    UnsupportedOperation { name: String },

    #[error(
        "Gate '{name}' takes {expected_params} parameter(s) on {expected_qubits} qubit(s), got {params} on {qubits}"
    )]
    GateArity {
        name: String,
        expected_params: usize,
        expected_qubits: usize,
        params: usize,
        qubits: usize,
    },

    #[error("Parameter '{param}' of '{name}' has no concrete value")]
    UnboundParameter { name: String, param: String },

    #[error("Snapshot index {value} is not a non-negative integer")]
    InvalidSnapshotIndex { value: f64 },

    /// The engine could not be started or exited abnormally.
    #[error("JKU simulator invocation failed: {message}")]
    EngineInvocation { message: String, diagnostics: String },

    #[error("Malformed simulator output: {0}")]
    MalformedOutput(String),

    #[error("Simulator executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Invalid run configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl JkuError {
    /// Whether the error is caused by the circuit rather than the engine.
    pub fn is_circuit_error(&self) -> bool {
        matches!(
            self,
            JkuError::MeasurementOrder { .. }
                | JkuError::UnsupportedOperation { .. }
                | JkuError::GateArity { .. }
                | JkuError::UnboundParameter { .. }
                | JkuError::InvalidSnapshotIndex { .. }
                | JkuError::Ir(_)
        )
    }
}

impl From<JkuError> for HalError {
    fn from(e: JkuError) -> Self {
        if e.is_circuit_error() {
            return HalError::InvalidCircuit(e.to_string());
        }
        match e {
            JkuError::EngineInvocation {
                message,
                diagnostics,
            } => {
                if diagnostics.is_empty() {
                    HalError::JobFailed(message)
                } else {
                    HalError::JobFailed(format!("{message}: {}", diagnostics.trim()))
                }
            }
            JkuError::ExecutableNotFound(path) => HalError::BackendUnavailable(path),
            JkuError::Config(msg) => HalError::Configuration(msg),
            other => HalError::Backend(other.to_string()),
        }
    }
}
