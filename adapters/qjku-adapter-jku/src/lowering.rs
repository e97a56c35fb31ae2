//! Lowering circuits into the simulator's OpenQASM 2.0 dialect.
//!
//! Registers are flattened to `q[..]` and `c[..]`; those names exist only in
//! the lowered text. A snapshot over every qubit is appended after the last
//! instruction so the final statevector can always be read back.

use qjku_ir::{Instruction, InstructionKind, ParameterExpression, QubitId};
use tracing::debug;

use crate::error::{JkuError, JkuResult};
use crate::library::{self, QELIB1_FILE};

/// A program ready to hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredProgram {
    /// Newline-terminated program text.
    pub text: String,
    /// Index of the trailing snapshot; the decoder reads the final state from it.
    pub max_snapshot_index: u64,
}

/// Lower an instruction sequence.
///
/// The classical register is sized `max(num_qubits, num_clbits)`. The trailing
/// snapshot gets index `max_seen + 1`, or `0` when the circuit has no
/// snapshots of its own.
pub fn lower(
    instructions: &[Instruction],
    num_qubits: usize,
    num_clbits: usize,
) -> JkuResult<LoweredProgram> {
    let mut lowerer = Lowerer::new(num_qubits);
    lowerer.emit_program(instructions, num_clbits)
}

struct Lowerer {
    output: String,
    num_qubits: usize,
    max_seen: Option<u64>,
}

impl Lowerer {
    fn new(num_qubits: usize) -> Self {
        Self {
            output: String::new(),
            num_qubits,
            max_seen: None,
        }
    }

    fn emit_program(
        &mut self,
        instructions: &[Instruction],
        num_clbits: usize,
    ) -> JkuResult<LoweredProgram> {
        self.writeln("OPENQASM 2.0;");
        self.writeln(&format!("include \"{QELIB1_FILE}\";"));
        self.writeln(&format!("qreg q[{}];", self.num_qubits));
        self.writeln(&format!("creg c[{}];", self.num_qubits.max(num_clbits)));

        for inst in instructions {
            self.emit_instruction(inst)?;
        }

        let max_snapshot_index = match self.max_seen {
            None => 0,
            #[allow(clippy::cast_precision_loss)]
            Some(m) => m
                .checked_add(1)
                .ok_or(JkuError::InvalidSnapshotIndex { value: m as f64 })?,
        };
        let all = self.all_qubits();
        self.emit_op("snapshot", &[max_snapshot_index.to_string()], &all);

        debug!(
            "Lowered {} instructions on {} qubits, final snapshot {}",
            instructions.len(),
            self.num_qubits,
            max_snapshot_index
        );

        Ok(LoweredProgram {
            text: std::mem::take(&mut self.output),
            max_snapshot_index,
        })
    }

    fn emit_instruction(&mut self, inst: &Instruction) -> JkuResult<()> {
        match &inst.kind {
            InstructionKind::Measure => {
                let (Some(qubit), Some(clbit)) = (inst.qubits.first(), inst.clbits.first()) else {
                    return Err(JkuError::UnsupportedOperation {
                        name: "measure".into(),
                    });
                };
                self.writeln(&format!("measure q[{}] -> c[{}];", qubit.0, clbit.0));
            }
            InstructionKind::Snapshot { params } => {
                let indices = params
                    .iter()
                    .map(snapshot_index)
                    .collect::<JkuResult<Vec<_>>>()?;
                if let Some(&highest) = indices.iter().max() {
                    self.max_seen = Some(self.max_seen.map_or(highest, |m| m.max(highest)));
                }
                let params: Vec<String> = indices.iter().map(u64::to_string).collect();
                // A snapshot without operands covers the whole register.
                let qubits = if inst.qubits.is_empty() {
                    self.all_qubits()
                } else {
                    inst.qubits.clone()
                };
                self.emit_op("snapshot", &params, &qubits);
            }
            InstructionKind::Gate(gate) => {
                let Some(spec) = library::lookup(&gate.name) else {
                    return Err(JkuError::UnsupportedOperation {
                        name: gate.name.clone(),
                    });
                };
                if spec.num_params != gate.params.len() || spec.num_qubits != inst.qubits.len() {
                    return Err(JkuError::GateArity {
                        name: gate.name.clone(),
                        expected_params: spec.num_params,
                        expected_qubits: spec.num_qubits,
                        params: gate.params.len(),
                        qubits: inst.qubits.len(),
                    });
                }
                let params = gate
                    .params
                    .iter()
                    .map(|p| format_param(&gate.name, p))
                    .collect::<JkuResult<Vec<_>>>()?;
                self.emit_op(&gate.name, &params, &inst.qubits);
            }
        }
        Ok(())
    }

    /// Emit `name(p, ..) q[a], q[b];`.
    fn emit_op(&mut self, name: &str, params: &[String], qubits: &[QubitId]) {
        let mut line = name.to_string();
        if !params.is_empty() {
            line.push('(');
            line.push_str(&params.join(", "));
            line.push(')');
        }
        if !qubits.is_empty() {
            let operands: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q.0)).collect();
            line.push(' ');
            line.push_str(&operands.join(", "));
        }
        line.push(';');
        self.writeln(&line);
    }

    fn all_qubits(&self) -> Vec<QubitId> {
        (0..self.num_qubits as u32).map(QubitId).collect()
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn format_param(gate: &str, param: &ParameterExpression) -> JkuResult<String> {
    match param.as_f64() {
        Some(value) if value.is_finite() => Ok(format!("{value}")),
        _ => Err(JkuError::UnboundParameter {
            name: gate.to_string(),
            param: param.to_string(),
        }),
    }
}

/// Snapshot parameters are indices; fractional values are rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn snapshot_index(param: &ParameterExpression) -> JkuResult<u64> {
    let Some(value) = param.as_f64() else {
        return Err(JkuError::UnboundParameter {
            name: "snapshot".into(),
            param: param.to_string(),
        });
    };
    let rounded = value.round();
    // `u64::MAX as f64` is 2^64, one past the largest index.
    if !rounded.is_finite() || rounded < 0.0 || rounded >= u64::MAX as f64 {
        return Err(JkuError::InvalidSnapshotIndex { value });
    }
    Ok(rounded as u64)
}
