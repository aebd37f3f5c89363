//! # Project Store
//!
//! The durable project state:
//! - `tags`: symbolic name → `ReleaseRecord` (the only root set)
//! - `run_records`: run record identity → `RunRecord` (the archive)
//! - `memos`: formula identity → run record identity (the memo index)
//! - `warehouses`: ware → known retrieval locations
//!
//! ## Invariants
//!
//! After every mutation through this type:
//! - every non-manual tag references a run record present in the archive
//! - the archive holds exactly the run records reachable from `tags`
//! - `memos` has exactly one entry per archived run record, keyed by its
//!   formula identity
//!
//! These are restored by a mark-and-sweep pass after each change to `tags`.
//! The warehouse registry is not swept; locations accumulate for the life of
//! the project.

use crate::{ReleaseRecord, ReppError, RunRecord, Ware};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The persistent root of a reppl project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "Tags", default)]
    tags: BTreeMap<String, ReleaseRecord>,
    #[serde(rename = "RunRecords", default)]
    run_records: BTreeMap<String, RunRecord>,
    #[serde(rename = "Memos", default)]
    memos: BTreeMap<String, String>,
    /// type → hash → locations
    #[serde(rename = "Warehouses", default)]
    warehouses: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Project {
    /// Create an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// All tag bindings.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, ReleaseRecord> {
        &self.tags
    }

    /// The run record archive.
    #[must_use]
    pub fn run_records(&self) -> &BTreeMap<String, RunRecord> {
        &self.run_records
    }

    /// The memo index.
    #[must_use]
    pub fn memos(&self) -> &BTreeMap<String, String> {
        &self.memos
    }

    /// The run record identity memoized for a formula identity, if any.
    #[must_use]
    pub fn memo(&self, formula_hid: &str) -> Option<&str> {
        self.memos.get(formula_hid).map(String::as_str)
    }

    /// The ware bound to `tag`, if any.
    #[must_use]
    pub fn lookup_by_tag(&self, tag: &str) -> Option<&Ware> {
        self.tags.get(tag).map(|release| &release.ware)
    }

    /// Every location ever registered for `ware`, if any.
    #[must_use]
    pub fn lookup_warehouses(&self, ware: &Ware) -> Option<&[String]> {
        self.warehouses
            .get(&ware.kind)
            .and_then(|by_hash| by_hash.get(&ware.hash))
            .filter(|locations| !locations.is_empty())
            .map(Vec::as_slice)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Bind `tag` to `ware` by hand, replacing any previous binding.
    pub fn bind_manual(&mut self, tag: impl Into<String>, ware: Ware) -> Result<(), ReppError> {
        let had_previous = self
            .tags
            .insert(tag.into(), ReleaseRecord::manual(ware))
            .is_some();
        if had_previous {
            self.sweep()?;
        }
        Ok(())
    }

    /// Remove the binding for `tag`. Returns whether a binding existed.
    pub fn remove_tag(&mut self, tag: &str) -> Result<bool, ReppError> {
        if self.tags.remove(tag).is_none() {
            return Ok(false);
        }
        self.sweep()?;
        Ok(true)
    }

    /// Bind `tag` to the ware produced under `output_name` in `record`, and
    /// archive `record` as the binding's backing run record.
    ///
    /// `record.hid` must already be stamped.
    pub fn record_result(
        &mut self,
        tag: impl Into<String>,
        output_name: &str,
        record: &RunRecord,
    ) -> Result<(), ReppError> {
        let ware = record
            .results
            .get(output_name)
            .map(|result| result.ware.clone())
            .ok_or_else(|| ReppError::MissingResult {
                output: output_name.to_string(),
                run_record: record.hid.clone(),
            })?;

        self.tags
            .insert(tag.into(), ReleaseRecord::derived(ware, record.hid.clone()));
        self.run_records.insert(record.hid.clone(), record.clone());
        self.memos
            .insert(record.formula_hid.clone(), record.hid.clone());
        self.sweep()
    }

    /// Register more known locations for `ware`.
    ///
    /// Locations accumulate across calls; one already known is not repeated.
    pub fn append_warehouses(&mut self, ware: &Ware, locations: &[String]) {
        if locations.is_empty() {
            return;
        }
        let known = self
            .warehouses
            .entry(ware.kind.clone())
            .or_default()
            .entry(ware.hash.clone())
            .or_default();
        for location in locations {
            if !known.contains(location) {
                known.push(location.clone());
            }
        }
    }

    // =========================================================================
    // MARK AND SWEEP
    // =========================================================================

    /// Restore the store invariants after `tags` changed.
    ///
    /// Mark: collect the run record identities referenced by `tags`, failing
    /// on any that the archive does not hold. Sweep: rebuild the archive from
    /// the marked identities only, then rebuild `memos` from the new archive.
    /// Nothing is replaced until the mark pass has succeeded.
    fn sweep(&mut self) -> Result<(), ReppError> {
        let mut marked = BTreeSet::new();
        for (tag, release) in &self.tags {
            if release.is_manual() {
                continue;
            }
            if !self.run_records.contains_key(&release.run_record_hid) {
                return Err(ReppError::IntegrityViolation {
                    tag: tag.clone(),
                    run_record: release.run_record_hid.clone(),
                });
            }
            marked.insert(release.run_record_hid.as_str());
        }

        let run_records: BTreeMap<String, RunRecord> = marked
            .into_iter()
            .filter_map(|hid| {
                self.run_records
                    .get(hid)
                    .map(|record| (hid.to_string(), record.clone()))
            })
            .collect();

        let memos = run_records
            .iter()
            .map(|(hid, record)| (record.formula_hid.clone(), hid.clone()))
            .collect();

        self.run_records = run_records;
        self.memos = memos;
        Ok(())
    }

    /// Check the store invariants without changing anything.
    ///
    /// Used after loading a project from disk, where the file may have been
    /// edited or truncated outside of reppl.
    pub fn verify(&self) -> Result<(), ReppError> {
        let mut clone = self.clone();
        clone.sweep()?;
        if clone.run_records.len() != self.run_records.len() || clone.memos != self.memos {
            return Err(ReppError::Decode(format!(
                "project holds {} run records and {} memos but {} are reachable from tags",
                self.run_records.len(),
                self.memos.len(),
                clone.run_records.len()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
