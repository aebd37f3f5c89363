//! # Formula, Pin and Run Record Formats
//!
//! - Formula source files are YAML (JSON documents are valid YAML and decode
//!   the same way).
//! - Pin files are compact JSON, newline-terminated. A pin file is exactly
//!   what the engine is handed.
//! - Run records arrive from the engine as JSON.
//!
//! Decoding is schema-bound: wrong-typed fields are fatal. Unknown fields are
//! ignored in formulas and pins, and kept as received in run records.

use crate::primitives::{MAX_FORMULA_SIZE, MAX_RUN_RECORD_SIZE};
use crate::{Formula, ReppError, RunRecord};

fn check_size(what: &str, len: usize, max: usize) -> Result<(), ReppError> {
    if len > max {
        return Err(ReppError::Decode(format!(
            "{} size {} bytes exceeds maximum allowed {} bytes",
            what, len, max
        )));
    }
    Ok(())
}

/// Decode a formula source file.
pub fn formula_from_bytes(bytes: &[u8]) -> Result<Formula, ReppError> {
    check_size("formula", bytes.len(), MAX_FORMULA_SIZE)?;
    serde_yaml::from_slice(bytes)
        .map_err(|e| ReppError::Decode(format!("could not parse formula: {}", e)))
}

/// Encode a pinned formula as pin file contents.
pub fn pin_to_bytes(formula: &Formula) -> Result<Vec<u8>, ReppError> {
    let mut bytes = serde_json::to_vec(formula)
        .map_err(|e| ReppError::Encode(format!("could not write pin file: {}", e)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode pin file contents.
pub fn pin_from_bytes(bytes: &[u8]) -> Result<Formula, ReppError> {
    check_size("pin file", bytes.len(), MAX_FORMULA_SIZE)?;
    serde_json::from_slice(bytes)
        .map_err(|e| ReppError::Decode(format!("could not parse pin file: {}", e)))
}

/// Decode the run record an engine printed.
pub fn run_record_from_bytes(bytes: &[u8]) -> Result<RunRecord, ReppError> {
    check_size("run record", bytes.len(), MAX_RUN_RECORD_SIZE)?;
    serde_json::from_slice(bytes)
        .map_err(|e| ReppError::Decode(format!("error reading run record: {}", e)))
}

/// Encode a run record the way an engine prints it.
pub fn run_record_to_bytes(record: &RunRecord) -> Result<Vec<u8>, ReppError> {
    let mut bytes = serde_json::to_vec(record)
        .map_err(|e| ReppError::Encode(format!("could not encode run record: {}", e)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
