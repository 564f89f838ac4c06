// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for polycodec.
//!
//! Errors come in three flavours:
//! - [`Error`] - fatal host errors (malformed JSON, population failures),
//!   returned to the caller
//! - [`DecodeFailure`] - non-fatal dispatch failures; the public decode
//!   entry points turn these into `None` and report them through logging
//!   and the diagnostics channel
//! - [`RegistryError`] - conflicting registrations

use super::TypeKey;

/// Reasons a polymorphic object could not be turned into an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    /// The object has no (or a null) discriminator field
    #[error("object for root '{root}' has no discriminator field '{field}'")]
    MissingDiscriminator {
        /// Root type being decoded
        root: TypeKey,
        /// Expected discriminator field
        field: String,
    },

    /// The discriminator field holds an array or an object
    #[error("discriminator field '{field}' for root '{root}' holds {kind}, expected a scalar")]
    InvalidDiscriminator {
        /// Root type being decoded
        root: TypeKey,
        /// Discriminator field
        field: String,
        /// JSON kind found in the field
        kind: &'static str,
    },

    /// No variant of the root is registered for the discriminator value
    #[error("no subtype of '{root}' registered for {field} = '{value}'")]
    UnknownDiscriminator {
        /// Root type being decoded
        root: TypeKey,
        /// Discriminator field
        field: String,
        /// Stringified value read from the object
        value: String,
    },

    /// The resolved type cannot be constructed (e.g. a bare trait object)
    #[error("type '{type_key}' is not constructible")]
    NotConstructible {
        /// Type that was asked for
        type_key: TypeKey,
    },

    /// The constructor panicked or produced the wrong type
    #[error("failed to construct '{type_key}': {reason}")]
    ConstructionFailed {
        /// Type being constructed
        type_key: TypeKey,
        /// Panic message or mismatch description
        reason: String,
    },
}

impl DecodeFailure {
    /// Create a missing-discriminator failure.
    pub fn missing_discriminator(root: TypeKey, field: impl Into<String>) -> Self {
        DecodeFailure::MissingDiscriminator {
            root,
            field: field.into(),
        }
    }

    /// Create an unknown-discriminator failure.
    pub fn unknown_discriminator(
        root: TypeKey,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        DecodeFailure::UnknownDiscriminator {
            root,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a construction failure.
    pub fn construction(type_key: TypeKey, reason: impl Into<String>) -> Self {
        DecodeFailure::ConstructionFailed {
            type_key,
            reason: reason.into(),
        }
    }

    /// Type the failure is about: the root for dispatch failures, the
    /// concrete type for construction failures.
    pub fn type_key(&self) -> TypeKey {
        match self {
            DecodeFailure::MissingDiscriminator { root, .. }
            | DecodeFailure::InvalidDiscriminator { root, .. }
            | DecodeFailure::UnknownDiscriminator { root, .. } => *root,
            DecodeFailure::NotConstructible { type_key }
            | DecodeFailure::ConstructionFailed { type_key, .. } => *type_key,
        }
    }

    /// Check if the failure happened while picking the concrete type.
    pub fn is_dispatch(&self) -> bool {
        matches!(
            self,
            DecodeFailure::MissingDiscriminator { .. }
                | DecodeFailure::InvalidDiscriminator { .. }
                | DecodeFailure::UnknownDiscriminator { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DecodeFailure::MissingDiscriminator { root, field } => {
                vec![("root", root.to_string()), ("field", field.clone())]
            }
            DecodeFailure::InvalidDiscriminator { root, field, kind } => vec![
                ("root", root.to_string()),
                ("field", field.clone()),
                ("kind", kind.to_string()),
            ],
            DecodeFailure::UnknownDiscriminator { root, field, value } => vec![
                ("root", root.to_string()),
                ("field", field.clone()),
                ("value", value.clone()),
            ],
            DecodeFailure::NotConstructible { type_key } => vec![("type", type_key.to_string())],
            DecodeFailure::ConstructionFailed { type_key, reason } => {
                vec![("type", type_key.to_string()), ("reason", reason.clone())]
            }
        }
    }
}

/// Conflicts detected while building a type registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A root was registered without a discriminator field
    #[error("root '{root}' has an empty discriminator field")]
    EmptyDiscriminatorField {
        /// Offending root
        root: TypeKey,
    },

    /// A root was registered twice with different discriminator fields
    #[error("root '{root}' is keyed by '{existing}', cannot re-register it with '{requested}'")]
    ConflictingRoot {
        /// Offending root
        root: TypeKey,
        /// Field already registered
        existing: String,
        /// Field of the rejected registration
        requested: String,
    },

    /// Two variants of the same root share a discriminator value
    #[error("discriminator '{value}' of root '{root}' is claimed by both '{existing}' and '{duplicate}'")]
    DuplicateDiscriminator {
        /// Root both variants serve
        root: TypeKey,
        /// Shared value (string form)
        value: String,
        /// Variant registered first
        existing: TypeKey,
        /// Rejected variant
        duplicate: TypeKey,
    },
}

/// Fatal errors returned by the decode entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed JSON or a serde error outside of population
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A handled type was asked to decode something other than an object
    #[error("expected a JSON object for '{type_key}', found {found}")]
    NotAnObject {
        /// Type being decoded
        type_key: TypeKey,
        /// JSON kind found instead
        found: &'static str,
    },

    /// The materialized object nests deeper than the reader allows
    #[error("JSON nesting depth {depth} exceeds the maximum of {limit}")]
    DepthExceeded {
        /// Configured maximum depth
        limit: usize,
        /// Depth of the offending document
        depth: usize,
    },

    /// The host failed to populate a created instance
    #[error("failed to populate '{type_key}': {source}")]
    Populate {
        /// Type being populated
        type_key: TypeKey,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Registry construction failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for polycodec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Name of the JSON kind of `value`, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape {}
    struct Square;

    #[test]
    fn test_missing_discriminator() {
        let err = DecodeFailure::missing_discriminator(TypeKey::of::<dyn Shape>(), "Name");
        assert!(err.is_dispatch());
        assert!(err.type_key().is::<dyn Shape>());
        assert!(err.to_string().contains("no discriminator field 'Name'"));
    }

    #[test]
    fn test_unknown_discriminator() {
        let err =
            DecodeFailure::unknown_discriminator(TypeKey::of::<dyn Shape>(), "Name", "Triangle");
        assert!(matches!(err, DecodeFailure::UnknownDiscriminator { .. }));
        assert!(err.to_string().ends_with("registered for Name = 'Triangle'"));
    }

    #[test]
    fn test_construction_failed() {
        let err = DecodeFailure::construction(TypeKey::of::<Square>(), "boom");
        assert!(!err.is_dispatch());
        assert!(err.type_key().is::<Square>());
        assert!(err.to_string().ends_with(": boom"));
    }

    #[test]
    fn test_log_fields_unknown_discriminator() {
        let err =
            DecodeFailure::unknown_discriminator(TypeKey::of::<dyn Shape>(), "Name", "Triangle");
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].0, "root");
        assert_eq!(fields[1], ("field", "Name".to_string()));
        assert_eq!(fields[2], ("value", "Triangle".to_string()));
    }

    #[test]
    fn test_log_fields_construction() {
        let err = DecodeFailure::construction(TypeKey::of::<Square>(), "boom");
        let fields = err.log_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "type");
        assert_eq!(fields[1], ("reason", "boom".to_string()));
    }

    #[test]
    fn test_log_fields_not_constructible() {
        let err = DecodeFailure::NotConstructible {
            type_key: TypeKey::of::<dyn Shape>(),
        };
        let fields = err.log_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "type");
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateDiscriminator {
            root: TypeKey::of::<dyn Shape>(),
            value: "square".to_string(),
            existing: TypeKey::of::<Square>(),
            duplicate: TypeKey::of::<String>(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("discriminator 'square'"));
        assert!(msg.contains("Square"));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&serde_json::json!([1])), "an array");
        assert_eq!(json_kind(&serde_json::json!(null)), "null");
        assert_eq!(json_kind(&serde_json::json!({})), "an object");
    }
}
