//! # Project File Format
//!
//! Compact JSON serialization of a `Project`, newline-terminated.
//!
//! ## Validation
//!
//! Decoding checks, in order:
//! - the payload size limit (`MAX_PROJECT_SIZE`), before any parsing
//! - the schema (required fields and types; unknown fields are ignored)
//! - the store invariants (`Project::verify`)

use crate::primitives::MAX_PROJECT_SIZE;
use crate::{Project, ReppError};

/// Serialize a project to bytes.
///
/// This is a pure transformation - no file I/O.
pub fn project_to_bytes(project: &Project) -> Result<Vec<u8>, ReppError> {
    let mut bytes = serde_json::to_vec(project)
        .map_err(|e| ReppError::Encode(format!("could not encode project: {}", e)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deserialize a project from bytes.
///
/// This is a pure transformation - no file I/O.
pub fn project_from_bytes(bytes: &[u8]) -> Result<Project, ReppError> {
    if bytes.len() > MAX_PROJECT_SIZE {
        return Err(ReppError::Decode(format!(
            "project file size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PROJECT_SIZE
        )));
    }

    let project: Project = serde_json::from_slice(bytes)
        .map_err(|e| ReppError::Decode(format!("error reading project file: {}", e)))?;
    project.verify()?;
    Ok(project)
}

// =============================================================================
// TESTS
// =============================================================================
