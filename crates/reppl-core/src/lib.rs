//! # reppl-core
//!
//! The deterministic memoization core for reppl - THE MEMO.
//!
//! Given a formula (inputs, an action, expected outputs), this crate derives
//! a canonical content-addressed identity for it, decides whether a previous
//! execution already produced its results, and keeps a project's tag → result
//! index and run record archive consistent as tags change.
//!
//! ## Pipeline
//!
//! ```text
//! Formula ──pin──▶ pinned Formula ──hash──▶ formula HID ──memo?──▶ skip
//!                                                     └──miss──▶ engine ──▶ RunRecord
//! RunRecord ──stamp formula HID, hash──▶ record_result ──sweep──▶ Project
//! ```
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Has NO async, NO process spawning, NO file I/O
//! - Uses `BTreeMap` everywhere, so every encoding is deterministic
//! - Never swallows an integrity or encoding failure

// =============================================================================
// MODULES
// =============================================================================

pub mod eval;
pub mod formats;
pub mod hash;
pub mod pin;
pub mod primitives;
pub mod project;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Action, Formula, Input, Output, ReleaseRecord, ReppError, RunRecord, RunResult, Ware,
};

// =============================================================================
// RE-EXPORTS: Memo Engine
// =============================================================================

pub use eval::{ExitStatus, Plan, parse_env_assignment};
pub use hash::{canonical_hash, formula_hid, run_record_hid};
pub use pin::Pinner;
pub use project::Project;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    formula_from_bytes, pin_from_bytes, pin_to_bytes, project_from_bytes, project_to_bytes,
    run_record_from_bytes, run_record_to_bytes,
};
