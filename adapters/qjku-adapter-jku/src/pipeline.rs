//! The translate, run and decode cycle for one circuit.

use std::time::Instant;

use qjku_ir::Circuit;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::{OutputField, RunConfig};
use crate::decode::{self, DecodedResult};
use crate::engine::{Engine, EngineParams};
use crate::error::JkuResult;
use crate::lowering;
use crate::measurement;

/// Circuit metadata echoed back with each result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentHeader {
    pub name: String,
    /// Number of classical bits.
    pub memory_slots: usize,
    /// `(name, size)` per classical register, in declaration order.
    pub creg_sizes: Vec<(String, usize)>,
}

/// Decoded result of one circuit plus run bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    pub header: ExperimentHeader,
    pub seed: u32,
    pub shots: u32,
    /// Wall-clock seconds spent lowering, running and decoding.
    pub time_taken: f64,
    pub data: DecodedResult,
}

/// Run one circuit through the engine.
///
/// Measurement resolution and lowering both happen before the engine is
/// started, so an invalid circuit never reaches it.
#[instrument(skip(circuit, config, engine), fields(circuit = circuit.name()))]
pub fn translate_run_decode(
    circuit: &Circuit,
    config: &RunConfig,
    engine: &dyn Engine,
) -> JkuResult<ExperimentResult> {
    config.validate()?;
    let start = Instant::now();

    let layout = circuit.classical_layout();
    let plan = measurement::resolve(circuit.instructions(), &layout, circuit.num_qubits())?;
    let program = lowering::lower(
        circuit.instructions(),
        circuit.num_qubits(),
        circuit.num_clbits(),
    )?;

    let params = EngineParams {
        seed: config.resolve_seed(),
        shots: config.shots,
        display_probabilities: config.wants(OutputField::Probabilities)
            || config.wants(OutputField::ProbabilitiesKet),
    };
    debug!(
        "Running {} qubits, {} shots, seed {}",
        circuit.num_qubits(),
        params.shots,
        params.seed
    );

    let raw = engine.execute(&program.text, &params)?;
    let data = decode::decode(&raw, &plan, program.max_snapshot_index, &config.data)?;

    let time_taken = start.elapsed().as_secs_f64();
    debug!("Circuit finished in {:.3}s", time_taken);

    Ok(ExperimentResult {
        header: ExperimentHeader {
            name: circuit.name().to_string(),
            memory_slots: plan.num_clbits,
            creg_sizes: plan.creg_sizes(),
        },
        seed: params.seed,
        shots: params.shots,
        time_taken,
        data,
    })
}

/// Run several circuits with the same settings.
///
/// Every circuit gets its own result; a failure is reported in place and the
/// remaining circuits still run.
pub fn run_batch(
    circuits: &[Circuit],
    config: &RunConfig,
    engine: &dyn Engine,
) -> Vec<JkuResult<ExperimentResult>> {
    circuits
        .iter()
        .map(|circuit| {
            let result = translate_run_decode(circuit, config, engine);
            if let Err(e) = &result {
                warn!("Circuit '{}' failed: {}", circuit.name(), e);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::JkuError;
    use qjku_ir::{ClbitId, QubitId};

    /// Records every call and answers with a canned document.
    struct RecordingEngine {
        reply: String,
        calls: Mutex<Vec<(String, EngineParams)>>,
    }

    impl RecordingEngine {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Engine for RecordingEngine {
        fn execute(&self, program: &str, params: &EngineParams) -> JkuResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), *params));
            Ok(self.reply.clone())
        }
    }

    const ONE_QUBIT_REPLY: &str = r#"{"counts": {"1": 8}, "snapshots": {"0": {"statevector": ["0+0i", "1+0i"]}}}"#;

    #[test]
    fn test_header_and_params() {
        let engine = RecordingEngine::new(ONE_QUBIT_REPLY);
        let mut circuit = Circuit::with_size("flip", 1, 1);
        circuit
            .x(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        let config = RunConfig::default().with_shots(8).with_seed(99);
        let result = translate_run_decode(&circuit, &config, &engine).unwrap();

        assert_eq!(result.header.name, "flip");
        assert_eq!(result.header.memory_slots, 1);
        assert_eq!(result.header.creg_sizes, vec![("c".to_string(), 1)]);
        assert_eq!(result.seed, 99);
        assert_eq!(result.shots, 8);
        assert_eq!(result.data.counts.get("1"), 8);
        assert!(result.time_taken >= 0.0);

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("x q[0];\n"));
        assert_eq!(
            calls[0].1,
            EngineParams {
                seed: 99,
                shots: 8,
                display_probabilities: false,
            }
        );
    }

    #[test]
    fn test_probabilities_requested_on_command_line() {
        let engine = RecordingEngine::new(ONE_QUBIT_REPLY);
        let circuit = Circuit::with_size("idle", 1, 0);
        let config = RunConfig::default()
            .with_seed(1)
            .with_field(OutputField::ProbabilitiesKet);
        translate_run_decode(&circuit, &config, &engine).unwrap();
        assert!(engine.calls.lock().unwrap()[0].1.display_probabilities);
    }

    #[test]
    fn test_invalid_circuit_never_reaches_engine() {
        let engine = RecordingEngine::new(ONE_QUBIT_REPLY);
        let mut circuit = Circuit::with_size("reuse", 1, 1);
        circuit
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .x(QubitId(0))
            .unwrap();

        let err = translate_run_decode(&circuit, &RunConfig::default(), &engine).unwrap_err();
        assert!(matches!(err, JkuError::MeasurementOrder { qubit } if qubit == QubitId(0)));
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_shots_rejected_before_run() {
        let engine = RecordingEngine::new(ONE_QUBIT_REPLY);
        let circuit = Circuit::with_size("idle", 1, 0);
        let config = RunConfig::default().with_shots(0);
        assert!(matches!(
            translate_run_decode(&circuit, &config, &engine),
            Err(JkuError::Config(_))
        ));
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wide_circuit_with_empty_reply() {
        let engine = RecordingEngine::new("{}");
        let circuit = Circuit::with_size("wide", 64, 0);
        let config = RunConfig::default().with_seed(4);
        assert!(matches!(
            translate_run_decode(&circuit, &config, &engine),
            Err(JkuError::MalformedOutput(_))
        ));
        assert_eq!(engine.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_batch_failures_are_isolated() {
        let engine = RecordingEngine::new(ONE_QUBIT_REPLY);

        let mut good = Circuit::with_size("good", 1, 1);
        good.x(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let mut bad = Circuit::with_size("bad", 1, 0);
        bad.gate("reset", [], [QubitId(0)]).unwrap();

        let config = RunConfig::default().with_shots(8).with_seed(3);
        let results = run_batch(&[good.clone(), bad, good], &config, &engine);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(JkuError::UnsupportedOperation { name }) if name == "reset"
        ));
        assert!(results[2].is_ok());
        assert_eq!(engine.calls.lock().unwrap().len(), 2);
    }
}
