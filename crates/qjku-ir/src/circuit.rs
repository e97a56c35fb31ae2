//! High-level circuit builder API.

use crate::error::{IrError, IrResult};
use crate::instruction::{Gate, Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};
use crate::register::RegisterLayout;

/// A quantum circuit.
///
/// Qubits and classical bits are allocated register by register, so their
/// global ids follow register declaration order. Instructions are kept in
/// program order.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with one quantum register `q` and one classical
    /// register `c`.
    ///
    /// A register of size zero is not declared.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for i in 0..num_qubits {
            circuit.qubits.push(Qubit::new(QubitId(i), "q", i));
        }
        for i in 0..num_clbits {
            circuit.clbits.push(Clbit::new(ClbitId(i), "c", i));
        }
        circuit
    }

    /// Add a quantum register and return the ids of its qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.qubits.iter().any(|q| q.register == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.qubits.len() as u32;
        let ids: Vec<_> = (start..start + size).map(QubitId).collect();
        for (i, id) in ids.iter().enumerate() {
            self.qubits.push(Qubit::new(*id, &name, i as u32));
        }
        Ok(ids)
    }

    /// Add a classical register and return the ids of its bits.
    ///
    /// The register occupies the next block of global classical bit indices.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.clbits.iter().any(|c| c.register == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.clbits.len() as u32;
        let ids: Vec<_> = (start..start + size).map(ClbitId).collect();
        for (i, id) in ids.iter().enumerate() {
            self.clbits.push(Clbit::new(*id, &name, i as u32));
        }
        Ok(ids)
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let op = Some(instruction.name().to_string());

        for (i, q) in instruction.qubits.iter().enumerate() {
            if q.index() >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    op: op.clone(),
                });
            }
            // Snapshots may list a qubit more than once; gates may not.
            if !instruction.is_snapshot() && instruction.qubits[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    op: op.clone(),
                });
            }
        }

        for c in &instruction.clbits {
            if c.index() >= self.clbits.len() {
                return Err(IrError::ClbitNotFound {
                    clbit: *c,
                    op: op.clone(),
                });
            }
        }

        if let InstructionKind::Measure = instruction.kind {
            if instruction.qubits.len() != 1 || instruction.clbits.len() != 1 {
                return Err(IrError::MeasureOperands {
                    qubits: instruction.qubits.len(),
                    clbits: instruction.clbits.len(),
                });
            }
        }

        Ok(())
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply an arbitrary named gate.
    pub fn gate(
        &mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = ParameterExpression>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(Gate::with_params(name, params), qubits))
    }

    fn fixed(&mut self, name: &str, qubits: &[QubitId]) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(Gate::new(name), qubits.iter().copied()))
    }

    /// Apply the identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("id", &[qubit])
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("h", &[qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("x", &[qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("y", &[qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("z", &[qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("s", &[qubit])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("sdg", &[qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("t", &[qubit])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.fixed("tdg", &[qubit])
    }

    /// Apply Rx rotation gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("rx", [theta.into()], [qubit])
    }

    /// Apply Ry rotation gate.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("ry", [theta.into()], [qubit])
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        phi: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("rz", [phi.into()], [qubit])
    }

    /// Apply the idle gate `u0` for `gamma` time units.
    pub fn u0(
        &mut self,
        gamma: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("u0", [gamma.into()], [qubit])
    }

    /// Apply the phase gate `u1`.
    pub fn u1(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("u1", [lambda.into()], [qubit])
    }

    /// Apply `u2(phi, lambda)`.
    pub fn u2(
        &mut self,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("u2", [phi.into(), lambda.into()], [qubit])
    }

    /// Apply `u3(theta, phi, lambda)`.
    pub fn u3(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("u3", [theta.into(), phi.into(), lambda.into()], [qubit])
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.fixed("cx", &[control, target])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.fixed("cy", &[control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.fixed("cz", &[control, target])
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.fixed("ch", &[control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.fixed("swap", &[q1, q2])
    }

    /// Apply controlled-Rz gate.
    pub fn crz(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("crz", [lambda.into()], [control, target])
    }

    /// Apply controlled-phase gate.
    pub fn cu1(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("cu1", [lambda.into()], [control, target])
    }

    /// Apply controlled-U3 gate.
    pub fn cu3(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate(
            "cu3",
            [theta.into(), phi.into(), lambda.into()],
            [control, target],
        )
    }

    /// Apply the ZZ interaction `rzz(theta)`.
    pub fn rzz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate("rzz", [theta.into()], [q1, q2])
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.fixed("ccx", &[c1, c2, target])
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.fixed("cswap", &[control, q1, q2])
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// Missing classical bits are added to a register named `meas`.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let missing = self.qubits.len().saturating_sub(self.clbits.len());
        if missing > 0 {
            self.add_creg("meas", missing as u32)?;
        }
        for i in 0..self.qubits.len() as u32 {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Take a simulator snapshot tagged with `index`.
    pub fn snapshot(
        &mut self,
        index: impl Into<ParameterExpression>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::snapshot([index.into()], qubits))
    }

    /// Take a snapshot over every qubit.
    pub fn snapshot_all(&mut self, index: impl Into<ParameterExpression>) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.snapshot(index, qubits)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Qubit labels in global order.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Classical bit labels in global order.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Ordered classical registers.
    pub fn classical_layout(&self) -> RegisterLayout {
        RegisterLayout::from_labels(&self.clbits)
    }

    /// `(name, size)` of each classical register in declaration order.
    pub fn creg_sizes(&self) -> Vec<(String, usize)> {
        self.classical_layout().creg_sizes()
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    // =========================================================================
    // Common circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }
}
