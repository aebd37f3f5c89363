//! # Core Type Definitions
//!
//! This module contains all core types for reppl:
//! - Content references (`Ware`)
//! - Computation descriptions (`Formula`, `Input`, `Action`, `Output`)
//! - Execution results (`RunRecord`, `RunResult`)
//! - Project bindings (`ReleaseRecord`)
//! - Error types (`ReppError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use `BTreeMap` for every keyed collection, so serialized key order is
//!   lexicographic and independent of construction order
//! - Serialize fields in declaration order
//! - Carry no timestamps, addresses or other ambient state

use crate::primitives::EXIT_CODE_KEY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// WARE
// =============================================================================

/// An immutable reference to a piece of content.
///
/// `kind` names the storage/transport scheme (for example `tar`), `hash` is
/// the content digest in that scheme. Two wares are equal iff both match.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Ware {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub hash: String,
}

impl Ware {
    /// Create a new ware.
    #[must_use]
    pub fn new(kind: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            hash: hash.into(),
        }
    }
}

impl std::fmt::Display for Ware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.hash)
    }
}

// =============================================================================
// FORMULA
// =============================================================================

/// A named input of a formula.
///
/// Before pinning an input may carry only a symbolic `tag`; pinning fills in
/// `hash` (and `kind`, if unset) from the project's binding for that tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warehouses: Vec<String>,
}

impl Input {
    /// The ware this input currently refers to.
    #[must_use]
    pub fn ware(&self) -> Ware {
        Ware::new(self.kind.clone(), self.hash.clone())
    }
}

/// The computation to perform. Opaque to the core beyond being hashable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cwd: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mounts: BTreeMap<String, String>,
}

/// A named output of a formula.
///
/// Tagged outputs are bound in the project after a successful evaluation and
/// their `warehouses` are registered as known locations for the produced ware.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Output {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warehouses: Vec<String>,
}

/// A computation description: inputs, an action, and expected outputs.
///
/// Mutable while being assembled and pinned; once its identity has been
/// computed it must not change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Formula {
    #[serde(default)]
    pub inputs: BTreeMap<String, Input>,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub outputs: BTreeMap<String, Output>,
}

impl Formula {
    /// Set (or override) a variable in the action environment.
    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.action.env.insert(name.into(), value.into());
    }

    /// Outputs that carry a tag, in name order.
    pub fn tagged_outputs(&self) -> impl Iterator<Item = (&String, &Output)> {
        self.outputs.iter().filter(|(_, output)| !output.tag.is_empty())
    }
}

// =============================================================================
// RUN RECORD
// =============================================================================

/// One named result of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub ware: Ware,
}

impl RunResult {
    /// Create a result carrying the given ware.
    #[must_use]
    pub fn new(ware: Ware) -> Self {
        Self {
            name: String::new(),
            ware,
        }
    }
}

/// The result of one execution, as reported by the engine.
///
/// The engine fills `results`; the core stamps `formula_hid` and then `hid`
/// (in that order) before archiving it. Any other field the engine reports
/// (`UID`, `when`, `failure`, ...) is kept verbatim in `extra`, archived and
/// covered by the record's identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "HID", default)]
    pub hid: String,
    #[serde(rename = "formulaHID", default)]
    pub formula_hid: String,
    #[serde(default)]
    pub results: BTreeMap<String, RunResult>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RunRecord {
    /// The exit status reported under the reserved result name, if any.
    #[must_use]
    pub fn exit_code(&self) -> Option<&str> {
        self.results
            .get(EXIT_CODE_KEY)
            .map(|result| result.ware.hash.as_str())
    }
}

// =============================================================================
// RELEASE RECORD
// =============================================================================

/// A project-level binding of a tag to a ware.
///
/// `run_record_hid` is empty when the binding was declared by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(rename = "Ware")]
    pub ware: Ware,
    #[serde(rename = "RunRecordHID", default)]
    pub run_record_hid: String,
}

impl ReleaseRecord {
    /// A fiat binding with no backing run record.
    #[must_use]
    pub fn manual(ware: Ware) -> Self {
        Self {
            ware,
            run_record_hid: String::new(),
        }
    }

    /// A binding derived from an archived run record.
    #[must_use]
    pub fn derived(ware: Ware, run_record_hid: impl Into<String>) -> Self {
        Self {
            ware,
            run_record_hid: run_record_hid.into(),
        }
    }

    /// Whether this binding was declared by hand.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.run_record_hid.is_empty()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in reppl.
///
/// - No silent failures
/// - Resolution misses are not errors; lookups return `Option`
/// - Every variant here aborts the current invocation
#[derive(Debug, Error)]
pub enum ReppError {
    /// Missing or malformed command-line input.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A formula, pin or project file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// Structured text could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value could not be encoded for hashing or persistence.
    #[error("Encode error: {0}")]
    Encode(String),

    /// A tag points at a run record that is not in the archive.
    #[error("db integrity violation: dangling runrecord -- release {tag:?} points to {run_record:?}")]
    IntegrityViolation { tag: String, run_record: String },

    /// A run record lacks the result an output tag asks for.
    #[error("run record {run_record:?} has no result named {output:?}")]
    MissingResult { output: String, run_record: String },

    /// The execution engine could not be launched or answered garbage.
    #[error("Engine error: {0}")]
    Engine(String),
}

// =============================================================================
// TESTS
// =============================================================================
