//! # Formula Pinner
//!
//! Rewrites symbolic input references into concrete wares before hashing.
//!
//! For each input with a tag bound in the project, the input's `hash` is
//! replaced by the bound ware's hash; its `kind` is filled in only when the
//! formula left it empty. Unbound tags are left alone: the formula may carry
//! a literal hash already, and if it does not, that is for the engine to
//! reject, not the pinner.
//!
//! After resolution every input gains the warehouses the project knows for
//! its ware. Locations already listed are not repeated, which makes pinning
//! idempotent.

use crate::{Formula, Project};

/// Resolves formula inputs against a project.
pub struct Pinner;

impl Pinner {
    /// Pin `formula` against `project`.
    #[must_use]
    pub fn pin(project: &Project, mut formula: Formula) -> Formula {
        for input in formula.inputs.values_mut() {
            if input.tag.is_empty() {
                continue;
            }
            if let Some(ware) = project.lookup_by_tag(&input.tag) {
                input.hash.clone_from(&ware.hash);
                if input.kind.is_empty() {
                    input.kind.clone_from(&ware.kind);
                }
            }
        }

        for input in formula.inputs.values_mut() {
            let Some(known) = project.lookup_warehouses(&input.ware()) else {
                continue;
            };
            for location in known {
                if !input.warehouses.contains(location) {
                    input.warehouses.push(location.clone());
                }
            }
        }

        formula
    }

    /// Names of inputs that still carry no hash after pinning.
    ///
    /// These reach the engine unconstrained; callers may want to warn.
    pub fn unresolved(formula: &Formula) -> impl Iterator<Item = &str> {
        formula
            .inputs
            .iter()
            .filter(|(_, input)| input.hash.is_empty())
            .map(|(name, _)| name.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================
