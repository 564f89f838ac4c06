// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Process-wide registry fed by declarative registrations.
//!
//! Every [`register_root!`](crate::register_root) and
//! [`register_variant!`](crate::register_variant) invocation submits a
//! [`Registration`] to an `inventory` collection. The first call to
//! [`global_registry`] runs all of them (in parallel, each into its own
//! builder fragment), merges the fragments and freezes the result. The
//! registry is never rebuilt afterwards.

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::debug;

use super::{RegistryBuilder, TypeRegistry};

/// A declarative registration contributing to the global registry.
pub struct Registration {
    source: &'static str,
    register: fn(&mut RegistryBuilder),
}

impl Registration {
    /// Create a registration. `source` is usually `module_path!()`.
    pub const fn new(source: &'static str, register: fn(&mut RegistryBuilder)) -> Self {
        Self { source, register }
    }

    /// Where this registration was declared.
    pub fn source(&self) -> &'static str {
        self.source
    }

    fn fragment(&self) -> RegistryBuilder {
        let mut builder = RegistryBuilder::for_source(self.source);
        (self.register)(&mut builder);
        builder
    }
}

inventory::collect!(Registration);

/// Global type registry.
static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

fn scan_registrations() -> TypeRegistry {
    let mut registrations: Vec<&'static Registration> =
        inventory::iter::<Registration>.into_iter().collect();
    registrations.sort_by_key(|registration| registration.source);

    let fragments: Vec<RegistryBuilder> = registrations
        .par_iter()
        .map(|registration| registration.fragment())
        .collect();

    let mut builder = RegistryBuilder::new();
    for fragment in fragments {
        builder.merge(fragment);
    }

    debug!(
        "Scanning {} registrations ({} entries) into the global registry",
        registrations.len(),
        builder.pending()
    );
    builder.build_lenient()
}

/// Get the global type registry, building it on first use.
///
/// Concurrent first calls block until a single build completes; every
/// caller observes the same registry.
///
/// # Example
///
/// ```
/// # use polycodec::registry::global_registry;
/// let registry = global_registry();
/// assert!(std::ptr::eq(registry, global_registry()));
/// ```
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(scan_registrations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RootSpec, TypeKey};
    use serde::{Deserialize, Serialize};

    trait Gadget: crate::Encode {}

    #[derive(Default, Serialize, Deserialize)]
    struct Widget {
        size: u8,
    }

    impl Gadget for Widget {}

    fn register_gadgets(builder: &mut RegistryBuilder) {
        builder
            .add_root::<dyn Gadget>(RootSpec::new("gadget"))
            .add_variant::<dyn Gadget, Widget>("widget", |v| v);
    }

    inventory::submit! {
        Registration::new(module_path!(), register_gadgets)
    }

    #[test]
    fn test_registration_fragment() {
        let registration = Registration::new("gadgets", register_gadgets);
        assert_eq!(registration.source(), "gadgets");
        assert_eq!(registration.fragment().pending(), 2);
    }

    #[test]
    fn test_global_registry_sees_submissions() {
        let registry = global_registry();
        assert_eq!(
            registry.find_variant(TypeKey::of::<dyn Gadget>(), "WIDGET"),
            Some(TypeKey::of::<Widget>())
        );
    }

    #[test]
    fn test_global_registry_built_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| global_registry() as *const TypeRegistry as usize))
            .collect();

        let first = global_registry() as *const TypeRegistry as usize;
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    }
}
