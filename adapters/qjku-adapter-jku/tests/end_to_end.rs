//! End-to-end tests of the lower, run and decode cycle.
//!
//! Most tests use a stub engine that replays a canned document. The
//! `process_engine` tests drive a shell script standing in for the simulator,
//! and `real_simulator` runs only when `JKU_SIMULATOR_PATH` points at a build
//! of the real engine.

use std::sync::Arc;

use qjku_adapter_jku::{
    Backend, Engine, EngineParams, JkuBackend, JkuError, JkuResult, RunConfig, lower,
    translate_run_decode,
};
use qjku_hal::JobStatus;
use qjku_ir::{Circuit, ClbitId, QubitId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct StubEngine(String);

impl Engine for StubEngine {
    fn execute(&self, _program: &str, _params: &EngineParams) -> JkuResult<String> {
        Ok(self.0.clone())
    }
}

const BELL_OUTPUT: &str = r#"{
    "counts": {"00": 500, "11": 500},
    "snapshots": {
        "0": {"statevector": ["0.707107+0i", "0+0i", "0+0i", "0.707107+0i"]}
    }
}"#;

fn bell_circuit() -> Circuit {
    let mut circuit = Circuit::with_size("bell", 2, 2);
    circuit
        .h(QubitId(0))
        .unwrap()
        .cx(QubitId(0), QubitId(1))
        .unwrap()
        .measure(QubitId(0), ClbitId(0))
        .unwrap()
        .measure(QubitId(1), ClbitId(1))
        .unwrap();
    circuit
}

// ---------------------------------------------------------------------------
// Stub engine
// ---------------------------------------------------------------------------

#[test]
fn bell_end_to_end() {
    let engine = StubEngine(BELL_OUTPUT.to_string());
    let config = RunConfig::default().with_shots(1000).with_seed(1);
    let result = translate_run_decode(&bell_circuit(), &config, &engine).unwrap();

    let counts = result.data.counts;
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.get("00"), 500);
    assert_eq!(counts.get("11"), 500);
    assert_eq!(counts.total_shots(), 1000);

    let sv = result.data.statevector;
    assert_eq!(sv.len(), 4);
    assert!((sv[0].norm() - sv[3].norm()).abs() < 1e-9);
    assert!(sv[0].norm() > 0.7);
    assert!(sv[1].norm() < 1e-12);
    assert!(sv[2].norm() < 1e-12);
}

#[test]
fn measured_qubit_reuse_is_rejected() {
    let engine = StubEngine(BELL_OUTPUT.to_string());
    let config = RunConfig::default().with_seed(1);

    let mut reused = Circuit::with_size("reused", 1, 1);
    reused
        .measure(QubitId(0), ClbitId(0))
        .unwrap()
        .x(QubitId(0))
        .unwrap();
    let err = translate_run_decode(&reused, &config, &engine).unwrap_err();
    assert!(matches!(err, JkuError::MeasurementOrder { qubit } if qubit == QubitId(0)));

    let mut ordered = Circuit::with_size("ordered", 1, 1);
    ordered
        .x(QubitId(0))
        .unwrap()
        .measure(QubitId(0), ClbitId(0))
        .unwrap();
    let engine = StubEngine(
        r#"{"counts": {"1": 4}, "snapshots": {"0": {"statevector": ["0+0i", "1+0i"]}}}"#.into(),
    );
    let result = translate_run_decode(&ordered, &config, &engine).unwrap();
    assert_eq!(result.data.counts.get("1"), 4);
}

#[test]
fn final_snapshot_index_follows_existing_ones() {
    let mut circuit = Circuit::with_size("snaps", 2, 0);
    circuit
        .snapshot(0, [QubitId(0)])
        .unwrap()
        .snapshot(1, [QubitId(1)])
        .unwrap()
        .snapshot(2, [QubitId(0), QubitId(1)])
        .unwrap();
    let program = lower(circuit.instructions(), 2, 0).unwrap();
    assert_eq!(program.max_snapshot_index, 3);
    assert!(program.text.ends_with("snapshot(3) q[0], q[1];\n"));

    let plain = Circuit::with_size("plain", 2, 0);
    let program = lower(plain.instructions(), 2, 0).unwrap();
    assert_eq!(program.max_snapshot_index, 0);
}

#[test]
fn snapshots_of_the_source_circuit_are_returned() {
    let mut circuit = Circuit::with_size("snaps", 1, 0);
    circuit
        .snapshot_all(0)
        .unwrap()
        .x(QubitId(0))
        .unwrap();
    let engine = StubEngine(
        r#"{"snapshots": {
            "0": {"statevector": ["1+0i", "0+0i"]},
            "1": {"statevector": ["0+0i", "1+0i"]}
        }}"#
        .into(),
    );
    let result =
        translate_run_decode(&circuit, &RunConfig::default().with_seed(2), &engine).unwrap();

    assert!(result.data.counts.is_empty());
    assert_eq!(result.data.snapshots.len(), 2);
    assert_eq!(result.data.statevector[1].re, 1.0);
    let first = result.data.snapshots["0"].statevector.as_ref().unwrap();
    assert_eq!(first[0].re, 1.0);
}

#[tokio::test]
async fn backend_runs_through_wait() {
    let backend = JkuBackend::with_engine(Arc::new(StubEngine(BELL_OUTPUT.to_string())));
    let job_id = backend.submit(&bell_circuit(), 1000).await.unwrap();
    assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);

    let result = backend.wait(&job_id).await.unwrap();
    assert_eq!(result.counts.get("00") + result.counts.get("11"), 1000);
    assert_eq!(result.metadata["header"]["name"], "bell");
}

// ---------------------------------------------------------------------------
// Process engine
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod process_engine {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use qjku_adapter_jku::{EngineConfig, ProcessEngine};

    use super::*;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake_simulator.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn runs_script_with_program_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("seen.qasm");
        // The script echoes back the library check and the program it was fed.
        let script = write_script(
            dir.path(),
            &format!(
                "test -f qelib1.inc || exit 3\ncat > {}\necho \"$@\" >> {}\n\
                 echo 'Simulation finished'\n\
                 echo '{{\"counts\": {{\"00\": 3, \"11\": 5}}, \"snapshots\": {{\"0\": {{\"statevector\": [\"0.7+0i\", \"0+0i\", \"0+0i\", \"0.7+0i\"]}}}}}}'",
                log.display(),
                log.display()
            ),
        );

        let engine = ProcessEngine::new(EngineConfig::new(&script).with_silent(true)).unwrap();
        let config = RunConfig::default().with_shots(8).with_seed(42);
        let result = translate_run_decode(&bell_circuit(), &config, &engine).unwrap();

        assert_eq!(result.data.counts.get("00"), 3);
        assert_eq!(result.data.counts.get("11"), 5);

        let seen = fs::read_to_string(&log).unwrap();
        assert!(seen.starts_with("OPENQASM 2.0;\n"));
        assert!(seen.contains("cx q[0], q[1];"));
        assert!(seen.contains("--simulate_qasm --seed=42 --shots=8 --display_statevector"));
    }

    fn params() -> EngineParams {
        EngineParams {
            seed: 1,
            shots: 1,
            display_probabilities: false,
        }
    }

    /// Directory the script ran in, as it recorded it.
    fn recorded_workdir(log: &Path) -> PathBuf {
        PathBuf::from(fs::read_to_string(log).unwrap().trim())
    }

    #[test]
    fn scratch_directory_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("cwd.txt");
        let script = write_script(
            dir.path(),
            &format!(
                "pwd > {}\ncat > /dev/null\n\
                 echo '{{\"snapshots\": {{\"0\": {{\"statevector\": [\"1+0i\", \"0+0i\"]}}}}}}'",
                log.display()
            ),
        );

        let engine = ProcessEngine::new(EngineConfig::new(&script).with_silent(true)).unwrap();
        let output = engine.execute("OPENQASM 2.0;\n", &params()).unwrap();
        assert!(output.contains("statevector"));

        let workdir = recorded_workdir(&log);
        assert!(
            workdir
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("qjku-")
        );
        assert!(!workdir.exists(), "{} was left behind", workdir.display());
    }

    #[test]
    fn scratch_directory_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("cwd.txt");
        let script = write_script(
            dir.path(),
            &format!("pwd > {}\ncat > /dev/null\nexit 2", log.display()),
        );

        let engine = ProcessEngine::new(EngineConfig::new(&script).with_silent(true)).unwrap();
        let err = engine.execute("OPENQASM 2.0;\n", &params()).unwrap_err();
        assert!(matches!(err, JkuError::EngineInvocation { .. }));

        let workdir = recorded_workdir(&log);
        assert!(!workdir.as_os_str().is_empty());
        assert!(!workdir.exists(), "{} was left behind", workdir.display());
    }

    #[test]
    fn failing_script_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "cat > /dev/null\necho 'bad gate' >&2\nexit 2");

        let engine = ProcessEngine::new(EngineConfig::new(&script).with_silent(true)).unwrap();
        let err = engine.execute("OPENQASM 2.0;\n", &params()).unwrap_err();
        assert!(matches!(
            err,
            JkuError::EngineInvocation { diagnostics, .. } if diagnostics.contains("bad gate")
        ));
    }
}

// ---------------------------------------------------------------------------
// Real simulator
// ---------------------------------------------------------------------------

#[test]
fn real_simulator() {
    let Ok(path) = std::env::var("JKU_SIMULATOR_PATH") else {
        eprintln!("JKU_SIMULATOR_PATH not set, skipping real simulator test");
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let engine =
        qjku_adapter_jku::ProcessEngine::new(qjku_adapter_jku::EngineConfig::new(path)).unwrap();
    let config = RunConfig::default().with_shots(1000).with_seed(7);
    let result = translate_run_decode(&bell_circuit(), &config, &engine).unwrap();

    let counts = result.data.counts;
    assert_eq!(counts.get("00") + counts.get("11"), 1000);
    assert_eq!(result.data.statevector.len(), 4);
}
