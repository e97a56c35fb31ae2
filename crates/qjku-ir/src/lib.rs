//! QJKU Circuit Representation
//!
//! This crate holds the host-side view of a quantum circuit before it is
//! lowered into the JKU simulator's QASM dialect: indexed qubits and classical
//! bits grouped into named registers, and a flat, program-ordered list of
//! instructions.
//!
//! # Core Components
//!
//! - **Bits**: [`QubitId`], [`ClbitId`] and their register-labelled forms
//!   [`Qubit`], [`Clbit`]
//! - **Registers**: [`ClassicalRegister`] and [`RegisterLayout`], the ordered
//!   register list that decides how result bitstrings are split
//! - **Parameters**: [`ParameterExpression`] for gate angles
//! - **Instructions**: [`Instruction`] over the closed set
//!   [`InstructionKind::Gate`], [`InstructionKind::Measure`],
//!   [`InstructionKind::Snapshot`]
//! - **Circuit**: [`Circuit`] builder
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qjku_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit
//!     .h(QubitId(0))?
//!     .cx(QubitId(0), QubitId(1))?
//!     .measure(QubitId(0), ClbitId(0))?
//!     .measure(QubitId(1), ClbitId(1))?;
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.instructions().len(), 4);
//! assert_eq!(circuit.creg_sizes(), vec![("c".to_string(), 2)]);
//! # Ok::<(), qjku_ir::IrError>(())
//! ```
//!
//! Gate names are not checked here. Whether the simulator understands an
//! operation is decided when the circuit is lowered.

pub mod circuit;
pub mod error;
pub mod instruction;
pub mod parameter;
pub mod qubit;
pub mod register;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use instruction::{Gate, Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
pub use register::{ClassicalRegister, RegisterLayout};
