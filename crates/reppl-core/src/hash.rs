//! # Canonical Hasher
//!
//! Deterministic identities for formulas and run records.
//!
//! A value is encoded as compact JSON and the bytes are streamed straight
//! into a SHA-384 digest; the digest is rendered as URL-safe base64.
//!
//! Determinism rests on the types, not on the encoder: every struct field is
//! serialized in declaration order and every map is a `BTreeMap`, so two
//! structurally equal values always produce the same byte stream.
//!
//! An encoding failure is an error, never a fallback: a silently wrong
//! identity would break memoization and run record deduplication.

use crate::{Formula, ReppError, RunRecord};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::Serialize;
use sha2::{Digest, Sha384};
use std::io;

/// Feeds everything written into it to the digest.
struct DigestWriter<D: Digest>(D);

impl<D: Digest> io::Write for DigestWriter<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compute the canonical identity string of any serializable value.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, ReppError> {
    let mut writer = DigestWriter(Sha384::new());
    serde_json::to_writer(&mut writer, value)
        .map_err(|e| ReppError::Encode(format!("could not hash value: {}", e)))?;
    Ok(URL_SAFE.encode(writer.0.finalize()))
}

/// Identity of a (pinned) formula.
pub fn formula_hid(formula: &Formula) -> Result<String, ReppError> {
    canonical_hash(formula)
}

/// Identity of a run record.
///
/// Computed over the record with its own `hid` blanked, so the identity is a
/// function of the formula identity and the results alone. The caller must
/// stamp `formula_hid` before calling this.
pub fn run_record_hid(record: &RunRecord) -> Result<String, ReppError> {
    if record.hid.is_empty() {
        return canonical_hash(record);
    }
    let unstamped = RunRecord {
        hid: String::new(),
        ..record.clone()
    };
    canonical_hash(&unstamped)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Input, RunResult, Ware};
    use std::collections::BTreeMap;

    fn sample_formula() -> Formula {
        let mut formula = Formula::default();
        formula.inputs.insert(
            "/".into(),
            Input {
                kind: "tar".into(),
                hash: "abc".into(),
                ..Input::default()
            },
        );
        formula.action.command = vec!["make".into(), "all".into()];
        formula
    }

    #[test]
    fn identity_is_stable() {
        let a = formula_hid(&sample_formula()).expect("hash");
        let b = formula_hid(&sample_formula()).expect("hash");
        assert_eq!(a, b);
    }

    #[test]
    fn identity_is_sha384_sized() {
        // 48 digest bytes encode to 64 base64 characters with no padding.
        let id = formula_hid(&sample_formula()).expect("hash");
        assert_eq!(id.len(), 64);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn map_insertion_order_does_not_matter() {
        let mut forward = BTreeMap::new();
        forward.insert("a", 1);
        forward.insert("b", 2);
        let mut backward = BTreeMap::new();
        backward.insert("b", 2);
        backward.insert("a", 1);

        assert_eq!(
            canonical_hash(&forward).expect("hash"),
            canonical_hash(&backward).expect("hash")
        );
    }

    #[test]
    fn env_change_changes_identity() {
        let base = sample_formula();
        let mut changed = sample_formula();
        changed.set_env("CC", "clang");

        assert_ne!(
            formula_hid(&base).expect("hash"),
            formula_hid(&changed).expect("hash")
        );
    }

    #[test]
    fn run_record_identity_ignores_own_hid() {
        let mut record = RunRecord {
            formula_hid: "f1".into(),
            ..RunRecord::default()
        };
        record
            .results
            .insert("out".into(), RunResult::new(Ware::new("tar", "h1")));

        let blank = run_record_hid(&record).expect("hash");
        record.hid = "something-else".into();
        let stamped = run_record_hid(&record).expect("hash");

        assert_eq!(blank, stamped);
    }

    #[test]
    fn run_record_identity_depends_on_formula_hid() {
        let a = RunRecord {
            formula_hid: "f1".into(),
            ..RunRecord::default()
        };
        let b = RunRecord {
            formula_hid: "f2".into(),
            ..RunRecord::default()
        };
        assert_ne!(
            run_record_hid(&a).expect("hash"),
            run_record_hid(&b).expect("hash")
        );
    }

    #[test]
    fn run_record_identity_covers_engine_fields() {
        let mut first = RunRecord {
            formula_hid: "f1".into(),
            ..RunRecord::default()
        };
        first.extra.insert("UID".into(), "u-1".into());
        let mut second = first.clone();
        second.extra.insert("UID".into(), "u-2".into());

        assert_ne!(
            run_record_hid(&first).expect("hash"),
            run_record_hid(&second).expect("hash")
        );
    }

    #[test]
    fn nested_engine_field_order_does_not_matter() {
        let a: RunRecord =
            serde_json::from_str(r#"{"failure":{"code":1,"msg":"x"},"results":{}}"#).expect("decode");
        let b: RunRecord =
            serde_json::from_str(r#"{"results":{},"failure":{"msg":"x","code":1}}"#).expect("decode");

        assert_eq!(
            run_record_hid(&a).expect("hash"),
            run_record_hid(&b).expect("hash")
        );
    }

    #[test]
    fn non_string_map_keys_are_an_error() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "x");
        assert!(matches!(canonical_hash(&bad), Err(ReppError::Encode(_))));
    }
}
