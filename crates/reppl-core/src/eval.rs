//! # Evaluation Steps
//!
//! The deterministic halves of an evaluation, with the engine call left to
//! the caller:
//!
//! ```text
//! Plan::new      pin the formula, compute its identity
//! Plan::memoized consult the memo index
//!    ... caller writes the pin file and runs the engine ...
//! ExitStatus::of classify the run record
//! Plan::record   stamp identities, bind tagged outputs, register warehouses
//! ```
//!
//! Nothing here touches the filesystem or the engine.

use crate::hash::{formula_hid, run_record_hid};
use crate::pin::Pinner;
use crate::primitives::EXIT_CODE_SUCCESS;
use crate::{Formula, Project, ReppError, RunRecord};

/// Parse a `NAME=VALUE` environment override.
///
/// Only the first `=` splits; the value may itself contain `=`.
pub fn parse_env_assignment(item: &str) -> Result<(String, String), ReppError> {
    match item.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(ReppError::Usage(format!(
            "Invalid environment variable '{}' must be of format 'NAME=VALUE'",
            item
        ))),
    }
}

/// A formula that has been pinned and identified, ready to be checked
/// against the memo index and, if needed, executed.
#[derive(Debug, Clone)]
pub struct Plan {
    pinned: Formula,
    formula_hid: String,
}

impl Plan {
    /// Pin `formula` against `project` and compute its identity.
    pub fn new(project: &Project, formula: Formula) -> Result<Self, ReppError> {
        let pinned = Pinner::pin(project, formula);
        let formula_hid = formula_hid(&pinned)?;
        Ok(Self {
            pinned,
            formula_hid,
        })
    }

    /// The pinned formula. This is what the engine must run.
    #[must_use]
    pub fn pinned(&self) -> &Formula {
        &self.pinned
    }

    /// The pinned formula's identity.
    #[must_use]
    pub fn formula_hid(&self) -> &str {
        &self.formula_hid
    }

    /// The run record already on record for this formula, if any.
    #[must_use]
    pub fn memoized<'p>(&self, project: &'p Project) -> Option<&'p str> {
        project.memo(&self.formula_hid)
    }

    /// Fold a successful run record into `project`.
    ///
    /// Stamps the formula identity into the record, then the record's own
    /// identity (which therefore covers the formula identity), binds every
    /// tagged output, and registers each tagged output's destination
    /// warehouses for the produced ware. Returns the stamped record.
    pub fn record(
        &self,
        project: &mut Project,
        mut record: RunRecord,
    ) -> Result<RunRecord, ReppError> {
        record.formula_hid.clone_from(&self.formula_hid);
        record.hid = run_record_hid(&record)?;

        for (name, output) in self.pinned.tagged_outputs() {
            project.record_result(output.tag.clone(), name, &record)?;
        }

        for (name, output) in self.pinned.tagged_outputs() {
            if let Some(result) = record.results.get(name) {
                project.append_warehouses(&result.ware, &output.warehouses);
            }
        }

        Ok(record)
    }
}

/// How the evaluated action ended, according to its run record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// The reserved exit code result is exactly `"0"`.
    Success,
    /// Anything else, including a missing exit code.
    Failed(String),
}

impl ExitStatus {
    /// Classify a run record.
    #[must_use]
    pub fn of(record: &RunRecord) -> Self {
        match record.exit_code() {
            Some(EXIT_CODE_SUCCESS) => Self::Success,
            Some(code) => Self::Failed(code.to_string()),
            None => Self::Failed(String::new()),
        }
    }

    /// The exit code as reported, `"0"` on success.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Success => EXIT_CODE_SUCCESS,
            Self::Failed(code) => code,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

// =============================================================================
// TESTS
// =============================================================================
