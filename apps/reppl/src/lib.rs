//! # reppl
//!
//! Library half of the reppl binary: everything that touches the
//! filesystem, the environment or the execution engine.
//!
//! - `cli` - clap command tree and dispatch
//! - `config` - layered configuration (flags, environment, `reppl.toml`)
//! - `store` - formula, pin and project file I/O
//! - `executor` - the `Executor` seam and the sub-process engine adapter
//! - `eval` - the evaluation orchestrator

pub mod cli;
pub mod config;
pub mod eval;
pub mod executor;
pub mod store;
