//! Circuit instructions combining operations with operands.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId};

/// A named gate application with its parameters.
///
/// The name is kept as written. Lowering decides whether the simulator's gate
/// library knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Gate name, e.g. `"cx"` or `"u3"`.
    pub name: String,
    /// Gate parameters in declaration order.
    pub params: Vec<ParameterExpression>,
}

impl Gate {
    /// Create a gate without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: vec![],
        }
    }

    /// Create a parameterized gate.
    pub fn with_params(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ParameterExpression>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }
}

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A unitary gate.
    Gate(Gate),
    /// Measurement of one qubit into one classical bit.
    Measure,
    /// Simulator snapshot of the quantum state, tagged by the first parameter.
    Snapshot {
        /// Snapshot parameters; the first one is the snapshot index.
        params: Vec<ParameterExpression>,
    },
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on (for measure).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: Gate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a snapshot instruction.
    pub fn snapshot(
        params: impl IntoIterator<Item = ParameterExpression>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        Self {
            kind: InstructionKind::Snapshot {
                params: params.into_iter().collect(),
            },
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a snapshot.
    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, InstructionKind::Snapshot { .. })
    }

    /// Check if this is a gate.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Operation name as it appears in QASM.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => &g.name,
            InstructionKind::Measure => "measure",
            InstructionKind::Snapshot { .. } => "snapshot",
        }
    }

    /// Parameters of the operation (empty for measurements).
    pub fn params(&self) -> &[ParameterExpression] {
        match &self.kind {
            InstructionKind::Gate(g) => &g.params,
            InstructionKind::Measure => &[],
            InstructionKind::Snapshot { params } => params,
        }
    }

    /// Number of qubits this instruction operates on.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}
