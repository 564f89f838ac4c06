// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout polycodec.
//!
//! This module provides the foundational types for the library:
//! - [`TypeKey`] - Identity of a type taking part in dispatch
//! - [`RootSpec`] / [`VariantSpec`] - Declarative dispatch metadata
//! - [`Error`], [`DecodeFailure`], [`RegistryError`] - Error handling

pub mod annotation;
pub mod error;

pub use annotation::{DiscriminatorValue, RootSpec, VariantSpec};
pub use error::{DecodeFailure, Error, RegistryError, Result};

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a Rust type taking part in polymorphic dispatch.
///
/// Works for sized types as well as trait objects, so a root can be
/// `dyn Shape` while its variants are plain structs. Equality and hashing
/// only consider the [`TypeId`]; the name is kept for logging.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by the compiler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check if this key identifies `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Case-insensitive string equality.
///
/// ASCII input is compared byte-wise; anything else falls back to
/// comparing the lowercase expansion of every character.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-folded form of a string, consistent with [`eq_ignore_case`].
pub(crate) fn fold_case(s: &str) -> String {
    if s.is_ascii() {
        s.to_ascii_lowercase()
    } else {
        s.chars().flat_map(char::to_lowercase).collect()
    }
}
