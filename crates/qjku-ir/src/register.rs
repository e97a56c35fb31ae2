//! Classical register layout.
//!
//! Result bitstrings are split at register boundaries, so the ordered list of
//! classical registers is carried alongside the measurement mapping all the way
//! to result decoding.

use serde::{Deserialize, Serialize};

use crate::qubit::Clbit;

/// A named classical register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    /// Register name.
    pub name: String,
    /// Number of bits.
    pub size: usize,
}

impl ClassicalRegister {
    /// Create a register description.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Ordered classical registers of a circuit.
///
/// The concatenation of the registers, in order, is the global classical bit
/// order: register 0 owns the lowest bit indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterLayout {
    registers: Vec<ClassicalRegister>,
}

impl RegisterLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layout from explicit registers.
    pub fn from_registers(registers: impl IntoIterator<Item = ClassicalRegister>) -> Self {
        Self {
            registers: registers.into_iter().collect(),
        }
    }

    /// Derive the layout from classical bit labels.
    ///
    /// Consecutive labels with the same register name form one register, whose
    /// size is the largest index seen plus one.
    pub fn from_labels(labels: &[Clbit]) -> Self {
        let mut registers: Vec<ClassicalRegister> = Vec::new();
        for label in labels {
            let size = label.index as usize + 1;
            match registers.last_mut() {
                Some(last) if last.name == label.register => {
                    last.size = last.size.max(size);
                }
                _ => registers.push(ClassicalRegister::new(&label.register, size)),
            }
        }
        Self { registers }
    }

    /// The registers in declaration order.
    pub fn registers(&self) -> &[ClassicalRegister] {
        &self.registers
    }

    /// Register sizes in declaration order.
    pub fn sizes(&self) -> Vec<usize> {
        self.registers.iter().map(|r| r.size).collect()
    }

    /// `(name, size)` pairs in declaration order.
    pub fn creg_sizes(&self) -> Vec<(String, usize)> {
        self.registers
            .iter()
            .map(|r| (r.name.clone(), r.size))
            .collect()
    }

    /// Starting global bit index of every register.
    pub fn offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.registers
            .iter()
            .map(|r| {
                let start = offset;
                offset += r.size;
                start
            })
            .collect()
    }

    /// Total number of classical bits covered by the layout.
    pub fn total_bits(&self) -> usize {
        self.registers.iter().map(|r| r.size).sum()
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Whether the layout has no registers.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
