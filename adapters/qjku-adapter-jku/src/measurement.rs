//! Static measurement resolution.
//!
//! The simulator samples every shot from the final state, so a circuit can
//! only be reproduced when each measured qubit is left alone after its
//! measurement. Resolution walks the circuit once, records where each qubit's
//! outcome lands, and rejects circuits that break that rule.

use std::collections::BTreeMap;

use qjku_ir::{ClbitId, Instruction, InstructionKind, QubitId, RegisterLayout};
use tracing::debug;

use crate::error::{JkuError, JkuResult};

/// Qubit to classical bit destinations, one entry per measured qubit.
pub type MeasurementMap = BTreeMap<QubitId, ClbitId>;

/// Everything the decoder needs to turn engine keys into classical strings.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementPlan {
    pub mapping: MeasurementMap,
    pub layout: RegisterLayout,
    pub num_qubits: usize,
    pub num_clbits: usize,
}

impl MeasurementPlan {
    /// `(name, size)` of each classical register.
    pub fn creg_sizes(&self) -> Vec<(String, usize)> {
        self.layout.creg_sizes()
    }

    /// Highest measured qubit index, if any qubit is measured.
    pub fn max_measured_qubit(&self) -> Option<QubitId> {
        self.mapping.keys().next_back().copied()
    }
}

/// Build the measurement plan for a circuit.
///
/// A qubit measured twice keeps its latest destination. Any gate acting on a
/// qubit that has already been measured fails with
/// [`JkuError::MeasurementOrder`]; snapshots are exempt since they do not
/// change the state.
pub fn resolve(
    instructions: &[Instruction],
    layout: &RegisterLayout,
    num_qubits: usize,
) -> JkuResult<MeasurementPlan> {
    let mut mapping = MeasurementMap::new();

    for inst in instructions {
        match &inst.kind {
            InstructionKind::Measure => {
                if let (Some(&qubit), Some(&clbit)) = (inst.qubits.first(), inst.clbits.first()) {
                    if let Some(previous) = mapping.insert(qubit, clbit) {
                        debug!("{} re-measured, {} replaced by {}", qubit, previous, clbit);
                    }
                }
            }
            InstructionKind::Snapshot { .. } => {}
            InstructionKind::Gate(_) => {
                if let Some(&qubit) = inst.qubits.iter().find(|q| mapping.contains_key(*q)) {
                    return Err(JkuError::MeasurementOrder { qubit });
                }
            }
        }
    }

    Ok(MeasurementPlan {
        mapping,
        layout: layout.clone(),
        num_qubits,
        num_clbits: layout.total_bits(),
    })
}
