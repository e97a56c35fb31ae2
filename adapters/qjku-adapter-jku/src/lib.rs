//! Bridge to the JKU decision-diagram quantum simulator.
//!
//! A circuit goes through four stages on its way to a result:
//!
//! ```text
//!   Circuit ──→ resolve() ──→ lower() ──→ Engine::execute() ──→ decode()
//!             (measurement)  (OpenQASM 2.0)   (simulator)      (counts, statevector)
//! ```
//!
//! - [`measurement`] records where each measured qubit's outcome lands and
//!   rejects circuits that touch a qubit after measuring it
//! - [`lowering`] writes the program text, appending a snapshot of the final
//!   state
//! - [`engine`] runs the simulator executable with the program on stdin
//! - [`decode`] turns the engine's JSON into register-grouped counts and
//!   host-ordered statevectors
//!
//! [`pipeline::translate_run_decode`] chains the stages for one circuit, and
//! [`JkuBackend`] exposes them through the [`Backend`] job interface.
//!
//! # Example
//!
//! ```ignore
//! use qjku_adapter_jku::{EngineConfig, ProcessEngine, RunConfig, translate_run_decode};
//! use qjku_ir::Circuit;
//!
//! let engine = ProcessEngine::new(EngineConfig::new("/opt/jku/simulator"))?;
//! let config = RunConfig::default().with_shots(1000).with_seed(7);
//! let result = translate_run_decode(&Circuit::bell()?, &config, &engine)?;
//!
//! for (bits, count) in result.data.counts.sorted() {
//!     println!("{bits}: {count}");
//! }
//! ```

pub mod backend;
pub mod bits;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod library;
pub mod lowering;
pub mod measurement;
pub mod pipeline;
pub mod provider;

pub use backend::{BACKEND_NAME, JkuBackend};
pub use config::{EngineConfig, OutputField, RunConfig};
pub use decode::{DecodedResult, SnapshotData, decode};
pub use engine::{Engine, EngineParams, ProcessEngine, RUN_MESSAGE};
pub use error::{JkuError, JkuResult};
pub use lowering::{LoweredProgram, lower};
pub use measurement::{MeasurementMap, MeasurementPlan, resolve};
pub use pipeline::{ExperimentHeader, ExperimentResult, run_batch, translate_run_decode};

// Re-export key HAL types for convenience.
pub use qjku_hal::backend::{Backend, BackendConfig, BackendFactory};
