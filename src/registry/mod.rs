// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry for discriminator-driven dispatch.
//!
//! The registry maps every registered concrete type to the variant
//! metadata declared for it, records the discriminator field of each root,
//! and keeps the constructors needed to instantiate variants. It is
//! read-only once built and safe to share between threads.
//!
//! # Example
//!
//! ```
//! use polycodec::registry::TypeRegistry;
//! use polycodec::RootSpec;
//! use serde::{Deserialize, Serialize};
//!
//! trait Shape: polycodec::Encode {}
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Square {
//!     side: u32,
//! }
//!
//! impl Shape for Square {}
//!
//! let registry = TypeRegistry::builder()
//!     .root::<dyn Shape>(RootSpec::new("kind"))
//!     .variant::<dyn Shape, Square>("square", |v| v)
//!     .build()
//!     .unwrap();
//! assert_eq!(registry.len(), 1);
//! ```

pub mod builder;
pub mod global;

pub use builder::RegistryBuilder;
pub use global::{global_registry, Registration};

use std::any::Any;
use std::collections::HashMap;

use crate::core::{fold_case, RootSpec, TypeKey, VariantSpec};
use crate::decode::factory::{Binding, Constructor};

/// A registered concrete type and the variant metadata declared for it.
pub struct TypeEntry {
    key: TypeKey,
    annotations: Vec<VariantSpec>,
    constructor: Box<dyn Any + Send + Sync>,
}

impl TypeEntry {
    /// Key of the concrete type.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Variant metadata, in registration order.
    pub fn annotations(&self) -> &[VariantSpec] {
        &self.annotations
    }
}

impl std::fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeEntry")
            .field("key", &self.key)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Read-only index of roots and variants.
///
/// Build one with [`TypeRegistry::builder`], or use the process-wide
/// [`global_registry`] fed by [`register_root!`](crate::register_root) and
/// [`register_variant!`](crate::register_variant).
#[derive(Default)]
pub struct TypeRegistry {
    roots: HashMap<TypeKey, RootSpec>,
    types: HashMap<TypeKey, TypeEntry>,
    /// Types in registration order
    order: Vec<TypeKey>,
    /// Root -> case-folded discriminator text -> concrete type
    index: HashMap<TypeKey, HashMap<String, TypeKey>>,
    /// (root, concrete type) -> `Binding<R>`
    bindings: HashMap<(TypeKey, TypeKey), Box<dyn Any + Send + Sync>>,
}

impl TypeRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static TypeRegistry {
        global_registry()
    }

    /// Discriminator metadata of a root, if `key` is a root.
    pub fn root_spec(&self, key: TypeKey) -> Option<&RootSpec> {
        self.roots.get(&key)
    }

    /// Variant metadata declared for a concrete type.
    pub fn annotations(&self, key: TypeKey) -> Option<&[VariantSpec]> {
        self.types.get(&key).map(TypeEntry::annotations)
    }

    /// Check if `key` takes part in dispatch, either as a root or as a variant.
    pub fn can_handle(&self, key: TypeKey) -> bool {
        self.roots.contains_key(&key) || self.types.contains_key(&key)
    }

    /// Find the variant of `root` whose discriminator matches `text`,
    /// ignoring case.
    pub fn find_variant(&self, root: TypeKey, text: &str) -> Option<TypeKey> {
        self.index.get(&root)?.get(&fold_case(text)).copied()
    }

    /// Variants registered for `root`, with the value selecting each one.
    pub fn variants_of(&self, root: TypeKey) -> Vec<(TypeKey, &VariantSpec)> {
        self.entries()
            .flat_map(|entry| {
                entry
                    .annotations
                    .iter()
                    .filter(move |spec| spec.root == root)
                    .map(move |spec| (entry.key, spec))
            })
            .collect()
    }

    /// Registered roots.
    pub fn roots(&self) -> impl Iterator<Item = (TypeKey, &RootSpec)> {
        self.roots.iter().map(|(key, spec)| (*key, spec))
    }

    /// Registered concrete types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.order.iter().copied()
    }

    /// Registered concrete types with their metadata, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.order.iter().filter_map(|key| self.types.get(key))
    }

    /// Number of registered concrete types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no concrete type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn binding<R: ?Sized + 'static>(&self, ty: TypeKey) -> Option<&Binding<R>> {
        self.bindings
            .get(&(TypeKey::of::<R>(), ty))
            .and_then(|erased| erased.downcast_ref::<Binding<R>>())
    }

    pub(crate) fn constructor<T: 'static>(&self) -> Option<&Constructor<T>> {
        self.types
            .get(&TypeKey::of::<T>())
            .and_then(|entry| entry.constructor.downcast_ref::<Constructor<T>>())
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("roots", &self.roots)
            .field("types", &self.order)
            .finish()
    }
}
