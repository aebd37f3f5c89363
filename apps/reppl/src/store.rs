//! # File I/O
//!
//! Reads and writes the formula, pin and project files. Encoding lives in
//! `reppl_core::formats`; this module only moves bytes.
//!
//! The project file is replaced atomically: the new image is written to a
//! temporary file in the same directory and renamed over the old one, so a
//! crash mid-save never leaves a half-written project behind.
//!
//! No locking is done here. Two reppl processes saving the same project file
//! concurrently will lose one of the updates.

use reppl_core::primitives::PIN_FILE_SUFFIX;
use reppl_core::{
    Formula, Project, ReppError, formula_from_bytes, pin_to_bytes, project_from_bytes,
    project_to_bytes,
};
use std::io::Write;
use std::path::{Path, PathBuf};

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>, ReppError> {
    std::fs::read(path)
        .map_err(|e| ReppError::Io(format!("Could not open {} at {:?}: {}", what, path, e)))
}

/// The pin file that belongs to a formula file: `<formula-file>.pin`.
#[must_use]
pub fn pin_path(formula_path: &Path) -> PathBuf {
    let mut name = formula_path.as_os_str().to_owned();
    name.push(PIN_FILE_SUFFIX);
    PathBuf::from(name)
}

/// Load and decode a formula source file.
pub fn load_formula(path: &Path) -> Result<Formula, ReppError> {
    formula_from_bytes(&read_file(path, "formula file")?)
}

/// Write a pinned formula to its pin file.
pub fn write_pin(formula: &Formula, path: &Path) -> Result<(), ReppError> {
    let bytes = pin_to_bytes(formula)?;
    std::fs::write(path, bytes)
        .map_err(|e| ReppError::Io(format!("Could not write pin file {:?}: {}", path, e)))
}

/// Load a project file. A missing file is an error; run `reppl init` first.
pub fn load_project(path: &Path) -> Result<Project, ReppError> {
    project_from_bytes(&read_file(path, "project file")?)
}

/// Atomically replace the project file with `project`.
pub fn save_project(project: &Project, path: &Path) -> Result<(), ReppError> {
    let bytes = project_to_bytes(project)?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let io_err = |e: std::io::Error| {
        ReppError::Io(format!("Could not write project file {:?}: {}", path, e))
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(&bytes).map_err(io_err)?;
    staged.as_file().sync_all().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "project saved");
    Ok(())
}

/// Create an empty project file.
pub fn init_project(path: &Path, force: bool) -> Result<(), ReppError> {
    if path.exists() && !force {
        return Err(ReppError::Usage(format!(
            "Project file {:?} already exists. Use --force to overwrite.",
            path
        )));
    }
    save_project(&Project::new(), path)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reppl_core::Ware;

    #[test]
    fn pin_path_appends_suffix() {
        assert_eq!(
            pin_path(Path::new("dir/build.frm")),
            PathBuf::from("dir/build.frm.pin")
        );
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".reppl");
        let mut project = Project::new();
        project.bind_manual("base", Ware::new("tar", "h")).expect("bind");

        save_project(&project, &path).expect("save");
        let loaded = load_project(&path).expect("load");

        assert_eq!(loaded, project);
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn missing_project_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = load_project(&dir.path().join("absent"));
        assert!(matches!(result, Err(ReppError::Io(_))));
    }

    #[test]
    fn init_refuses_to_clobber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".reppl");

        init_project(&path, false).expect("first init");
        assert!(matches!(
            init_project(&path, false),
            Err(ReppError::Usage(_))
        ));
        init_project(&path, true).expect("forced init");
        assert_eq!(load_project(&path).expect("load"), Project::new());
    }

    #[test]
    fn pin_file_written_next_to_formula() {
        let dir = tempfile::tempdir().expect("tempdir");
        let formula_path = dir.path().join("f.yaml");
        let pin = pin_path(&formula_path);

        write_pin(&Formula::default(), &pin).expect("write");

        let text = std::fs::read_to_string(&pin).expect("read");
        assert!(text.starts_with('{'));
        assert!(text.ends_with("}\n"));
    }
}
