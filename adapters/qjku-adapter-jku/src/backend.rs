//! JKU simulator backend implementation.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use qjku_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use qjku_ir::Circuit;

use crate::config::{EngineConfig, OutputField, RunConfig};
use crate::engine::{Engine, ProcessEngine};
use crate::library;
use crate::lowering;
use crate::measurement;
use crate::pipeline::{self, ExperimentResult};

/// Name the backend is registered under.
pub const BACKEND_NAME: &str = "qasm_simulator";

/// Largest circuit accepted by default.
pub const DEFAULT_MAX_QUBITS: u32 = 30;

/// Cached job entry.
struct JkuJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// The JKU decision-diagram simulator behind the [`Backend`] interface.
///
/// Jobs run to completion inside [`Backend::submit`] on a blocking worker, so
/// `status()` only ever reports terminal states.
///
/// # Example
///
/// ```ignore
/// use qjku_adapter_jku::JkuBackend;
/// use qjku_hal::Backend;
/// use qjku_ir::Circuit;
///
/// let backend = JkuBackend::new("/opt/jku/simulator")?;
/// let job_id = backend.submit(&Circuit::bell()?, 1000).await?;
/// let result = backend.wait(&job_id).await?;
/// println!("{:?}", result.counts.sorted());
/// ```
pub struct JkuBackend {
    name: String,
    capabilities: Capabilities,
    engine: Arc<dyn Engine>,
    run_config: RunConfig,
    jobs: Arc<Mutex<FxHashMap<String, JkuJob>>>,
}

impl JkuBackend {
    /// Create a backend driving the simulator executable at `executable`.
    pub fn new(executable: impl Into<PathBuf>) -> HalResult<Self> {
        let engine = ProcessEngine::new(EngineConfig::new(executable))?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Create a backend around any [`Engine`].
    pub fn with_engine(engine: Arc<dyn Engine>) -> Self {
        Self {
            name: BACKEND_NAME.to_string(),
            capabilities: default_capabilities(DEFAULT_MAX_QUBITS),
            engine,
            run_config: RunConfig::default(),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Limit the number of qubits accepted.
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits;
        self
    }

    /// Default seed and output fields for every job. The shot count always
    /// comes from `submit`.
    pub fn with_run_config(mut self, config: RunConfig) -> Self {
        self.run_config = config;
        self
    }

    /// Full pipeline result of a finished job, including snapshots.
    pub fn experiment(&self, job_id: &JobId) -> HalResult<serde_json::Value> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.as_ref())
            .map(|r| r.metadata.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    fn store(&self, job: Job, result: Option<ExecutionResult>) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.insert(job.id.0.clone(), JkuJob { job, result });
    }

    fn check_size(&self, circuit: &Circuit) -> Option<String> {
        let max = self.capabilities.num_qubits as usize;
        (circuit.num_qubits() > max).then(|| {
            format!(
                "Circuit has {} qubits but {} supports max {}",
                circuit.num_qubits(),
                self.name,
                max
            )
        })
    }
}

fn default_capabilities(num_qubits: u32) -> Capabilities {
    Capabilities::simulator(BACKEND_NAME, num_qubits, library::gate_set()).with_feature("snapshot")
}

fn to_execution_result(experiment: ExperimentResult) -> HalResult<ExecutionResult> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let time_ms = (experiment.time_taken * 1000.0).round() as u64;
    let metadata = serde_json::to_value(&experiment)?;
    let ExperimentResult { shots, data, .. } = experiment;
    Ok(ExecutionResult::new(data.counts, shots)
        .with_statevector(data.statevector)
        .with_execution_time(time_ms)
        .with_metadata(metadata))
}

#[async_trait]
impl Backend for JkuBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();

        if let Some(reason) = self.check_size(circuit) {
            reasons.push(reason);
        }
        if let Err(e) = measurement::resolve(
            circuit.instructions(),
            &circuit.classical_layout(),
            circuit.num_qubits(),
        ) {
            reasons.push(e.to_string());
        }
        if let Err(e) = lowering::lower(
            circuit.instructions(),
            circuit.num_qubits(),
            circuit.num_clbits(),
        ) {
            reasons.push(e.to_string());
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if let Some(reason) = self.check_size(circuit) {
            return Err(HalError::CircuitTooLarge(reason));
        }
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, {} accepts 1..={}",
                self.name, self.capabilities.max_shots
            )));
        }

        let seed = self.run_config.resolve_seed();
        let config = self.run_config.clone().with_shots(shots).with_seed(seed);
        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots)
            .with_backend(self.name.clone())
            .with_seed(seed)
            .with_status(JobStatus::Running);
        self.store(job.clone(), None);
        debug!("Submitted job {} ({} shots, seed {})", job_id, shots, seed);

        let engine = Arc::clone(&self.engine);
        let owned = circuit.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            pipeline::translate_run_decode(&owned, &config, engine.as_ref())
        })
        .await
        .map_err(|e| HalError::Backend(format!("simulator worker failed: {e}")))
        .and_then(|run| run.map_err(HalError::from))
        .and_then(to_execution_result);

        match outcome {
            Ok(result) => {
                self.store(job.with_status(JobStatus::Completed), Some(result));
                info!("Job {} completed", job_id);
                Ok(job_id)
            }
            Err(e) => {
                warn!("Job {} failed: {}", job_id, e);
                self.store(job.with_status(JobStatus::Failed(e.to_string())), None);
                Err(e)
            }
        }
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = jobs.get(&job_id.0) else {
            return Err(HalError::JobNotFound(job_id.0.clone()));
        };
        match (&entry.job.status, &entry.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (JobStatus::Failed(msg), _) => Err(HalError::JobFailed(msg.clone())),
            (JobStatus::Cancelled, _) => Err(HalError::JobCancelled),
            (status, _) => Err(HalError::Backend(format!(
                "Job {job_id} has no result yet ({status})"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = jobs.get_mut(&job_id.0) else {
            return Err(HalError::JobNotFound(job_id.0.clone()));
        };
        if entry.job.status.is_terminal() {
            debug!("Job {} already finished ({})", job_id, entry.job.status);
        } else {
            entry.job = entry.job.clone().with_status(JobStatus::Cancelled);
        }
        Ok(())
    }
}

impl BackendFactory for JkuBackend {
    /// Build a backend from configuration.
    ///
    /// Recognised `extra` keys: `executable` (required), `silent`,
    /// `max_qubits`, `seed` and `data`.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let executable = config
            .extra
            .get("executable")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                HalError::Configuration("'executable' must name the JKU simulator binary".into())
            })?;
        let silent = config
            .extra
            .get("silent")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let max_qubits = match config.extra.get("max_qubits").and_then(serde_json::Value::as_u64) {
            Some(v) => u32::try_from(v)
                .map_err(|_| HalError::Configuration(format!("max_qubits {v} is out of range")))?,
            None => DEFAULT_MAX_QUBITS,
        };

        let mut run_config = RunConfig::default();
        if let Some(v) = config.extra.get("seed").and_then(serde_json::Value::as_u64) {
            let seed = u32::try_from(v)
                .map_err(|_| HalError::Configuration(format!("seed {v} does not fit in 32 bits")))?;
            run_config = run_config.with_seed(seed);
        }
        if let Some(data) = config.extra.get("data") {
            let fields: Vec<OutputField> = serde_json::from_value(data.clone())?;
            for field in fields {
                run_config = run_config.with_field(field);
            }
        }

        let engine = ProcessEngine::new(EngineConfig::new(executable).with_silent(silent))?;
        let mut backend = Self::with_engine(Arc::new(engine))
            .with_max_qubits(max_qubits)
            .with_run_config(run_config);
        backend.name = config.name;
        Ok(backend)
    }
}
