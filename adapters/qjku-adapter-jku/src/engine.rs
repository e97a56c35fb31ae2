//! Invoking the simulator executable.
//!
//! The lowered program is piped to the engine on stdin. Each run gets its own
//! scratch directory holding `qelib1.inc`, which the engine resolves relative
//! to its working directory; the directory is removed when the run ends.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{JkuError, JkuResult};
use crate::library::{QELIB1, QELIB1_FILE};

/// Banner logged before every run unless the engine is configured silent.
pub const RUN_MESSAGE: &str = "DD-based simulator by JKU Linz, Austria
Developer: Alwin Zulehner, Robert Wille
For more information, please visit http://iic.jku.at/eda/research/quantum_simulation";

/// Per-run engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub seed: u32,
    pub shots: u32,
    pub display_probabilities: bool,
}

/// Something that can run a lowered program and return its raw output.
pub trait Engine: Send + Sync {
    fn execute(&self, program: &str, params: &EngineParams) -> JkuResult<String>;
}

/// The simulator as an external process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    executable: PathBuf,
    silent: bool,
}

impl ProcessEngine {
    /// Create an engine for the configured executable.
    ///
    /// Fails with [`JkuError::ExecutableNotFound`] unless the path names an
    /// existing file.
    pub fn new(config: EngineConfig) -> JkuResult<Self> {
        let not_found = || JkuError::ExecutableNotFound(config.executable.display().to_string());
        let executable = fs::canonicalize(&config.executable).map_err(|_| not_found())?;
        if !executable.is_file() {
            return Err(not_found());
        }
        debug!("Using JKU simulator at {}", executable.display());
        Ok(Self {
            executable,
            silent: config.silent,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn command(&self, params: &EngineParams, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--simulate_qasm")
            .arg(format!("--seed={}", params.seed))
            .arg(format!("--shots={}", params.shots))
            .arg("--display_statevector");
        if params.display_probabilities {
            cmd.arg("--display_probabilities");
        }
        cmd.current_dir(workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Engine for ProcessEngine {
    #[instrument(skip(self, program), fields(seed = params.seed, shots = params.shots))]
    fn execute(&self, program: &str, params: &EngineParams) -> JkuResult<String> {
        if !self.silent {
            info!("{}", RUN_MESSAGE);
        }

        let workdir = tempfile::Builder::new().prefix("qjku-").tempdir()?;
        fs::write(workdir.path().join(QELIB1_FILE), QELIB1)?;

        let mut child = self
            .command(params, workdir.path())
            .spawn()
            .map_err(|e| JkuError::EngineInvocation {
                message: format!("failed to start {}: {e}", self.executable.display()),
                diagnostics: String::new(),
            })?;

        // The engine may fill stdout before it has read the whole program.
        let writer = child.stdin.take().map(|mut stdin| {
            let program = program.to_owned();
            std::thread::spawn(move || stdin.write_all(program.as_bytes()))
        });

        let output = child.wait_with_output()?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Engine closed stdin early: {}", e),
                Err(_) => warn!("stdin writer thread panicked"),
            }
        }

        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(JkuError::EngineInvocation {
                message: format!("{} exited with {}", self.executable.display(), output.status),
                diagnostics,
            });
        }
        if !diagnostics.trim().is_empty() {
            debug!("Simulator stderr: {}", diagnostics.trim());
        }

        String::from_utf8(output.stdout)
            .map_err(|e| JkuError::MalformedOutput(format!("simulator output is not UTF-8: {e}")))
    }
}
