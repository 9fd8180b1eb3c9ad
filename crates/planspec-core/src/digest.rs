//! Canonical JSON and definition digests.
//!
//! The canonical form is compact JSON with object keys in sorted order
//! (`serde_json::Value` keeps its maps ordered) and array order preserved.
//! The model holds no floating point values, so no number normalization
//! is needed.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::Plan;

/// Compact canonical JSON for any serializable value.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// SHA-256 hex digest of a plan's canonical JSON.
///
/// Structurally equal plans always share a digest; any change to the tree,
/// including task order, produces a different one.
pub fn definition_digest(plan: &Plan) -> Result<String> {
    let canonical = canonical_json(plan)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
