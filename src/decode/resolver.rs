// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Discriminator resolver.
//!
//! Picks the concrete type for a requested root by reading the root's
//! discriminator field from the parsed object and matching its string form
//! against the registered variants, ignoring case on both the field name
//! and the value.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{eq_ignore_case, error::json_kind, DecodeFailure, TypeKey};
use crate::registry::TypeRegistry;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requested type is not a root; decode it as asked
    Requested,
    /// The discriminator selected this concrete type
    Variant(TypeKey),
}

impl Resolution {
    /// Type to instantiate for a request of `requested`.
    pub fn target(self, requested: TypeKey) -> TypeKey {
        match self {
            Resolution::Requested => requested,
            Resolution::Variant(key) => key,
        }
    }
}

/// Resolve the concrete type to instantiate for `requested`.
///
/// # Errors
///
/// Returns a [`DecodeFailure`] when `requested` is a root but the object
/// lacks a usable discriminator, or no variant matches its value.
pub fn resolve(
    registry: &TypeRegistry,
    requested: TypeKey,
    object: &Map<String, Value>,
) -> Result<Resolution, DecodeFailure> {
    let Some(spec) = registry.root_spec(requested) else {
        return Ok(Resolution::Requested);
    };
    let field = spec.discriminator_field();
    debug!("Create subtype of {} [field={}]", requested, field);

    let value = match lookup_field(object, field) {
        None | Some(Value::Null) => {
            return Err(DecodeFailure::missing_discriminator(requested, field));
        }
        Some(value) => value,
    };

    let text = discriminator_text(value).ok_or_else(|| DecodeFailure::InvalidDiscriminator {
        root: requested,
        field: field.to_string(),
        kind: json_kind(value),
    })?;
    debug!("Create subtype of {} [value={}]", requested, text);

    match registry.find_variant(requested, &text) {
        Some(variant) => {
            debug!("Resolved subtype {}", variant);
            Ok(Resolution::Variant(variant))
        }
        None => Err(DecodeFailure::unknown_discriminator(
            requested,
            field,
            text.into_owned(),
        )),
    }
}

/// Look up a member by name, preferring an exact match and falling back to
/// a case-insensitive one.
pub fn lookup_field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| eq_ignore_case(key, name))
            .map(|(_, value)| value)
    })
}

/// String form of a scalar discriminator value; `None` for null and
/// containers.
pub fn discriminator_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
