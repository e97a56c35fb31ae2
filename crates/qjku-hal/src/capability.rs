//! Backend capabilities.

use serde::{Deserialize, Serialize};

/// What a backend can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags such as `"statevector"` or `"snapshot"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for a fully connected simulator.
    pub fn simulator(name: impl Into<String>, num_qubits: u32, gate_set: GateSet) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set,
            max_shots: 100_000,
            is_simulator: true,
            features: vec!["statevector".into()],
        }
    }

    /// Set the shot limit.
    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Add a capability flag.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Check for a capability flag.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gates a backend accepts, bucketed by qubit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
    /// Native gates (execute without decomposition on this backend).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub native: Vec<String>,
}

impl GateSet {
    /// Build a gate set from `(name, num_qubits)` pairs.
    ///
    /// Gates acting on more than three qubits are ignored.
    pub fn from_arities<'a>(gates: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let mut set = Self::default();
        for (name, arity) in gates {
            let bucket = match arity {
                1 => &mut set.single_qubit,
                2 => &mut set.two_qubit,
                3 => &mut set.three_qubit,
                _ => continue,
            };
            bucket.push(name.to_string());
        }
        set
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native (executes without decomposition).
    ///
    /// If the `native` list is empty, all supported gates are considered
    /// native. This is the usual case for simulators.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }

    /// Total number of supported gates.
    pub fn len(&self) -> usize {
        self.single_qubit.len() + self.two_qubit.len() + self.three_qubit.len()
    }

    /// Whether no gates are supported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_set_from_arities() {
        let set = GateSet::from_arities([("h", 1), ("cx", 2), ("ccx", 3), ("big", 4)]);
        assert!(set.contains("h"));
        assert!(set.contains("cx"));
        assert!(set.contains("ccx"));
        assert!(!set.contains("big"));
        assert_eq!(set.len(), 3);
        assert!(set.is_native("cx"));
    }

    #[test]
    fn test_capabilities_simulator() {
        let caps = Capabilities::simulator("qasm_simulator", 30, GateSet::from_arities([("x", 1)]))
            .with_feature("snapshot");
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 30);
        assert_eq!(caps.max_shots, 100_000);
        assert!(caps.has_feature("statevector"));
        assert!(caps.has_feature("snapshot"));
        assert!(caps.gate_set.contains("x"));
    }
}
