//! Manifest document validation against the bundled JSON Schema.

use serde_json::Value;

use crate::error::{ManifestError, ManifestIssue};

/// JSON Schema every manifest document must satisfy.
pub const MANIFEST_SCHEMA: &str = include_str!("manifest.schema.json");

/// Validate a manifest document before it is deserialized.
///
/// # Errors
///
/// Returns `ManifestError::Invalid` listing every violation with its JSON Pointer.
pub fn validate_document(document: &Value) -> Result<(), ManifestError> {
    let schema: Value = serde_json::from_str(MANIFEST_SCHEMA)
        .map_err(|source| ManifestError::InvalidJson { source })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ManifestError::Invalid {
        issues: vec![ManifestIssue {
            path: String::new(),
            message: e.to_string(),
        }],
    })?;

    let issues: Vec<ManifestIssue> = validator
        .iter_errors(document)
        .map(|e| ManifestIssue {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(issues = issues.len(), "manifest failed validation");
        Err(ManifestError::Invalid { issues })
    }
}
