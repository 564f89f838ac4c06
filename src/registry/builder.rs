// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Registry construction.
//!
//! [`RegistryBuilder`] collects root and variant registrations and checks
//! them when the registry is assembled. Two variants of one root may not
//! share a discriminator value (compared case-insensitively), and a root
//! may only be keyed by one field.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, error, warn};

use super::{TypeEntry, TypeRegistry};
use crate::core::{
    fold_case, DiscriminatorValue, RegistryError, RootSpec, TypeKey, VariantSpec,
};
use crate::decode::factory::{Binding, Constructor, Variant};

struct PendingRoot {
    source: &'static str,
    key: TypeKey,
    spec: RootSpec,
}

struct PendingVariant {
    source: &'static str,
    key: TypeKey,
    spec: VariantSpec,
    constructor: Box<dyn Any + Send + Sync>,
    binding: Box<dyn Any + Send + Sync>,
}

/// Collects registrations for a [`TypeRegistry`].
pub struct RegistryBuilder {
    source: &'static str,
    roots: Vec<PendingRoot>,
    variants: Vec<PendingVariant>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::for_source("")
    }

    /// Create a builder whose registrations are attributed to `source`
    /// (typically a module path).
    pub fn for_source(source: &'static str) -> Self {
        Self {
            source,
            roots: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Register `R` as a root dispatched on `spec`'s discriminator field.
    pub fn root<R: ?Sized + 'static>(mut self, spec: RootSpec) -> Self {
        self.add_root::<R>(spec);
        self
    }

    /// Register `T` as the variant of `R` selected by `value`.
    ///
    /// Instances are created with `T::default()`. `upcast` turns the
    /// concrete box into the root box, usually `|v| v`.
    pub fn variant<R, T>(
        mut self,
        value: impl Into<DiscriminatorValue>,
        upcast: fn(Box<T>) -> Box<R>,
    ) -> Self
    where
        R: ?Sized + 'static,
        T: Variant + Default,
    {
        self.add_variant_with::<R, T>(value, T::default, upcast);
        self
    }

    /// Register `T` as the variant of `R` selected by `value`, created with
    /// an explicit zero-argument constructor.
    pub fn variant_with<R, T>(
        mut self,
        value: impl Into<DiscriminatorValue>,
        ctor: fn() -> T,
        upcast: fn(Box<T>) -> Box<R>,
    ) -> Self
    where
        R: ?Sized + 'static,
        T: Variant,
    {
        self.add_variant_with::<R, T>(value, ctor, upcast);
        self
    }

    /// In-place form of [`root`](Self::root).
    pub fn add_root<R: ?Sized + 'static>(&mut self, spec: RootSpec) -> &mut Self {
        self.roots.push(PendingRoot {
            source: self.source,
            key: TypeKey::of::<R>(),
            spec,
        });
        self
    }

    /// In-place form of [`variant`](Self::variant).
    pub fn add_variant<R, T>(
        &mut self,
        value: impl Into<DiscriminatorValue>,
        upcast: fn(Box<T>) -> Box<R>,
    ) -> &mut Self
    where
        R: ?Sized + 'static,
        T: Variant + Default,
    {
        self.add_variant_with::<R, T>(value, T::default, upcast)
    }

    /// In-place form of [`variant_with`](Self::variant_with).
    pub fn add_variant_with<R, T>(
        &mut self,
        value: impl Into<DiscriminatorValue>,
        ctor: fn() -> T,
        upcast: fn(Box<T>) -> Box<R>,
    ) -> &mut Self
    where
        R: ?Sized + 'static,
        T: Variant,
    {
        self.variants.push(PendingVariant {
            source: self.source,
            key: TypeKey::of::<T>(),
            spec: VariantSpec::of::<R>(value),
            constructor: Box::new(Constructor::new(ctor)),
            binding: Box::new(Binding::<R>::new::<T>(ctor, upcast)),
        });
        self
    }

    /// Append the registrations of another builder.
    pub fn merge(&mut self, other: RegistryBuilder) -> &mut Self {
        self.roots.extend(other.roots);
        self.variants.extend(other.variants);
        self
    }

    /// Number of pending registrations (roots and variants).
    pub fn pending(&self) -> usize {
        self.roots.len() + self.variants.len()
    }

    /// Assemble the registry, rejecting any conflicting registration.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] encountered.
    pub fn build(self) -> Result<TypeRegistry, RegistryError> {
        self.assemble(true)
    }

    /// Assemble the registry, logging and dropping conflicting
    /// registrations instead of failing.
    ///
    /// Registrations are first ordered by source and type name so the
    /// surviving entry of a conflict does not depend on registration order.
    pub fn build_lenient(mut self) -> TypeRegistry {
        self.roots
            .sort_by(|a, b| (a.source, a.key.name()).cmp(&(b.source, b.key.name())));
        self.variants
            .sort_by(|a, b| (a.source, a.key.name()).cmp(&(b.source, b.key.name())));
        // Lenient assembly reports conflicts through the log only
        self.assemble(false).unwrap_or_default()
    }

    fn assemble(self, strict: bool) -> Result<TypeRegistry, RegistryError> {
        let mut registry = TypeRegistry::default();

        for root in self.roots {
            if let Err(err) = add_root(&mut registry, root) {
                if strict {
                    return Err(err);
                }
                error!("Dropping root registration: {}", err);
            }
        }

        for variant in self.variants {
            if let Err(err) = add_variant(&mut registry, variant) {
                if strict {
                    return Err(err);
                }
                error!("Dropping variant registration: {}", err);
            }
        }

        for entry in registry.entries() {
            debug!("Cached type {}", entry.key);
            for spec in &entry.annotations {
                if !registry.roots.contains_key(&spec.root) {
                    warn!(
                        "Type {} is a variant of {}, which is not registered as a root",
                        entry.key, spec.root
                    );
                }
            }
        }

        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn add_root(registry: &mut TypeRegistry, root: PendingRoot) -> Result<(), RegistryError> {
    if !root.spec.is_dispatchable() {
        return Err(RegistryError::EmptyDiscriminatorField { root: root.key });
    }

    match registry.roots.entry(root.key) {
        Entry::Occupied(existing) => {
            if existing.get() != &root.spec {
                return Err(RegistryError::ConflictingRoot {
                    root: root.key,
                    existing: existing.get().discriminator_field().to_string(),
                    requested: root.spec.discriminator_field().to_string(),
                });
            }
        }
        Entry::Vacant(slot) => {
            slot.insert(root.spec);
        }
    }
    Ok(())
}

fn add_variant(registry: &mut TypeRegistry, variant: PendingVariant) -> Result<(), RegistryError> {
    let root = variant.spec.root;
    let folded = fold_case(&variant.spec.value.as_text());

    let index: &mut HashMap<String, TypeKey> = registry.index.entry(root).or_default();
    match index.entry(folded) {
        Entry::Occupied(existing) => {
            return Err(RegistryError::DuplicateDiscriminator {
                root,
                value: variant.spec.value.to_string(),
                existing: *existing.get(),
                duplicate: variant.key,
            });
        }
        Entry::Vacant(slot) => {
            slot.insert(variant.key);
        }
    }

    registry
        .bindings
        .entry((root, variant.key))
        .or_insert(variant.binding);

    match registry.types.entry(variant.key) {
        Entry::Occupied(mut entry) => entry.get_mut().annotations.push(variant.spec),
        Entry::Vacant(slot) => {
            registry.order.push(variant.key);
            slot.insert(TypeEntry {
                key: variant.key,
                annotations: vec![variant.spec],
                constructor: variant.constructor,
            });
        }
    }
    Ok(())
}
