//! # Fixed Primitives
//!
//! Hardcoded names and limits shared by the core and the binary.
//!
//! These are part of the on-disk and engine contracts; changing any of them
//! changes how existing project files and engines are interpreted.

/// Reserved result name under which the engine reports the action's exit status.
///
/// The status travels as the `hash` of the result's ware.
pub const EXIT_CODE_KEY: &str = "$exitcode";

/// The only exit status that counts as a successful evaluation.
pub const EXIT_CODE_SUCCESS: &str = "0";

/// Default project file name, relative to the working directory.
pub const PROJECT_FILE_NAME: &str = ".reppl";

/// Suffix appended to a formula file name to form its pin file name.
pub const PIN_FILE_SUFFIX: &str = ".pin";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a formula source file (4 MB).
///
/// Checked before parsing to prevent memory exhaustion.
pub const MAX_FORMULA_SIZE: usize = 4 * 1024 * 1024;

/// Maximum size of a run record stream from the engine (16 MB).
pub const MAX_RUN_RECORD_SIZE: usize = 16 * 1024 * 1024;

/// Maximum size of a project file (256 MB).
pub const MAX_PROJECT_SIZE: usize = 256 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_key_is_reserved_name() {
        assert!(EXIT_CODE_KEY.starts_with('$'));
    }

    #[test]
    fn limits_are_ordered() {
        assert!(MAX_FORMULA_SIZE < MAX_RUN_RECORD_SIZE);
        assert!(MAX_RUN_RECORD_SIZE < MAX_PROJECT_SIZE);
    }
}
