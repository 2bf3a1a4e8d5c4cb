//! Error types for type derivation, SDL rendering and manifest loading.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Category;

/// Errors raised while deriving declarations. None of them is recoverable mid-walk.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generating types of category \"{category}\" is not supported; supported categories are \"InputType\" and \"ObjectType\"")]
    UnsupportedCategory { category: Category },

    #[error("failed to determine the type of the {kind} node assigned to key \"{key}\"")]
    UnclassifiableNode { key: String, kind: &'static str },

    #[error("nested object assigned to key \"{key}\" is not registered; register nested objects before the type that contains them")]
    UnregisteredComposite { key: String },

    #[error("enum assigned to key \"{key}\" is not registered; register it before the type that contains it")]
    UnregisteredEnum { key: String },

    #[error("union assigned to key \"{key}\" is not registered; register it before the type that contains it")]
    UnregisteredUnion { key: String },

    #[error("union branch {index} is not an object schema")]
    NonCompositeUnionBranch { index: usize },

    #[error("union branch {index} has no registered object type")]
    UnregisteredUnionBranch { index: usize },

    #[error("schema registered as enum \"{name}\" is not an enum")]
    NotAnEnum { name: String },

    #[error("schema registered as union \"{name}\" is not a union")]
    NotAUnion { name: String },
}

/// Errors raised while rendering recorded declarations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("type name \"{name}\" is declared more than once")]
    DuplicateTypeName { name: String },

    #[error("field \"{field}\" of \"{owner}\" references an enum that was never declared")]
    UnregisteredEnum { owner: String, field: String },

    #[error("field \"{field}\" of \"{owner}\" references a type that was never declared")]
    UndeclaredType { owner: String, field: String },

    #[error("type \"{name}\" has no fields")]
    EmptyType { name: String },

    #[error("default of field \"{field}\" of \"{owner}\" matches no value of its enum")]
    UnknownEnumDefault { owner: String, field: String },
}

/// Errors while loading and applying a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Document errors (exit code 1)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest is invalid with {} issue(s)", issues.len())]
    Invalid { issues: Vec<ManifestIssue> },

    #[error("unknown definition \"{name}\" referenced at {path}")]
    UnknownReference { name: String, path: String },

    #[error("definition \"{name}\" references itself")]
    CyclicReference { name: String },

    #[error("invalid node at {path}: {message}")]
    InvalidNode { path: String, message: String },

    #[error("replacement for \"{field}\" in \"{owner}\" does not match any member")]
    UnknownField { owner: String, field: String },

    // Registration errors (exit code 2)
    #[error("registering \"{name}\": {source}")]
    Generate {
        name: String,
        #[source]
        source: GenerateError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Single manifest issue with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ManifestIssue {
    /// JSON Pointer (RFC 6901) to the offending value.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ManifestError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ManifestError::FileNotFound { .. } | ManifestError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ManifestError::NetworkError { .. } => 3,
            ManifestError::Generate { .. } | ManifestError::Render(_) => 2,
            _ => 1,
        }
    }
}
