//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_op_context(.op))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit{}", format_op_context(.op))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_op_context(.op))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// A measurement must pair exactly one qubit with one classical bit.
    #[error("Measurement needs one qubit and one classical bit, got {qubits} and {clbits}")]
    MeasureOperands {
        /// Number of qubits supplied.
        qubits: usize,
        /// Number of classical bits supplied.
        clbits: usize,
    },

    /// A register with this name already exists.
    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),
}

#[allow(clippy::ref_option)]
fn format_op_context(op: &Option<String>) -> String {
    match op {
        Some(name) => format!(" (op: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_formatting() {
        let err = IrError::QubitNotFound {
            qubit: QubitId(4),
            op: Some("cx".into()),
        };
        assert_eq!(err.to_string(), "Qubit q4 not found in circuit (op: cx)");

        let err = IrError::ClbitNotFound {
            clbit: ClbitId(2),
            op: None,
        };
        assert_eq!(err.to_string(), "Classical bit c2 not found in circuit");
    }
}
