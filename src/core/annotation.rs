// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Declarative dispatch metadata.
//!
//! A root type is described by a [`RootSpec`] naming the JSON field that
//! selects the concrete type. Each concrete type carries one or more
//! [`VariantSpec`]s tying it to a root and a discriminator value. The
//! metadata lives next to the registration call rather than on the type
//! itself.

use std::borrow::Cow;
use std::fmt;

use super::TypeKey;

/// Dispatch metadata for a root type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSpec {
    discriminator_field: Cow<'static, str>,
}

impl RootSpec {
    /// Create a root spec keyed by `discriminator_field`.
    pub fn new(discriminator_field: impl Into<Cow<'static, str>>) -> Self {
        Self {
            discriminator_field: discriminator_field.into(),
        }
    }

    /// Name of the JSON property whose value selects the concrete type.
    pub fn discriminator_field(&self) -> &str {
        &self.discriminator_field
    }

    /// An empty field name makes dispatch impossible.
    pub fn is_dispatchable(&self) -> bool {
        !self.discriminator_field.trim().is_empty()
    }
}

/// Discriminator value declared for a variant.
///
/// Values are matched by their string form, so `Int(1)` matches both the
/// JSON number `1` and the JSON string `"1"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorValue {
    /// Text tag
    Str(Cow<'static, str>),
    /// Signed integer tag
    Int(i64),
    /// Unsigned integer tag
    UInt(u64),
    /// Boolean tag
    Bool(bool),
    /// Single character tag
    Char(char),
}

impl DiscriminatorValue {
    /// Wrap any displayable value (typically a fieldless enum) as a tag.
    pub fn display(value: impl fmt::Display) -> Self {
        DiscriminatorValue::Str(Cow::Owned(value.to_string()))
    }

    /// String form used for matching.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            DiscriminatorValue::Str(s) => Cow::Borrowed(s.as_ref()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for DiscriminatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscriminatorValue::Str(s) => f.write_str(s),
            DiscriminatorValue::Int(i) => write!(f, "{i}"),
            DiscriminatorValue::UInt(u) => write!(f, "{u}"),
            DiscriminatorValue::Bool(b) => write!(f, "{b}"),
            DiscriminatorValue::Char(c) => write!(f, "{c}"),
        }
    }
}

impl From<&'static str> for DiscriminatorValue {
    fn from(value: &'static str) -> Self {
        DiscriminatorValue::Str(Cow::Borrowed(value))
    }
}

impl From<String> for DiscriminatorValue {
    fn from(value: String) -> Self {
        DiscriminatorValue::Str(Cow::Owned(value))
    }
}

impl From<i32> for DiscriminatorValue {
    fn from(value: i32) -> Self {
        DiscriminatorValue::Int(value.into())
    }
}

impl From<i64> for DiscriminatorValue {
    fn from(value: i64) -> Self {
        DiscriminatorValue::Int(value)
    }
}

impl From<u32> for DiscriminatorValue {
    fn from(value: u32) -> Self {
        DiscriminatorValue::UInt(value.into())
    }
}

impl From<u64> for DiscriminatorValue {
    fn from(value: u64) -> Self {
        DiscriminatorValue::UInt(value)
    }
}

impl From<bool> for DiscriminatorValue {
    fn from(value: bool) -> Self {
        DiscriminatorValue::Bool(value)
    }
}

impl From<char> for DiscriminatorValue {
    fn from(value: char) -> Self {
        DiscriminatorValue::Char(value)
    }
}

/// Dispatch metadata for a concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    /// Root this variant serves
    pub root: TypeKey,
    /// Value of the root's discriminator field selecting this variant
    pub value: DiscriminatorValue,
}

impl VariantSpec {
    /// Create a variant spec for root `R`.
    pub fn of<R: ?Sized + 'static>(value: impl Into<DiscriminatorValue>) -> Self {
        Self {
            root: TypeKey::of::<R>(),
            value: value.into(),
        }
    }
}
