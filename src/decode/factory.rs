// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Instance factory.
//!
//! Creates the empty instance that population later fills in. A contract
//! hook ([`ContractResolver`]) may supply its own creator for a type and
//! takes precedence over the constructor given at registration. Panicking
//! constructors are contained and reported as
//! [`DecodeFailure::ConstructionFailed`].

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::{DecodeFailure, Result, TypeKey};
use crate::decode::reader::ObjectReader;

/// Bound shared by every concrete variant type.
///
/// Variants need not be `Send`, so a root trait without a `Send` bound can
/// be used for fields of its own variants.
pub trait Variant: Serialize + DeserializeOwned + 'static {}

impl<T> Variant for T where T: Serialize + DeserializeOwned + 'static {}

/// Creator supplied by a contract hook. Must return a boxed value of the
/// type it was requested for.
pub type Creator = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Host hook supplying custom object creation per type.
pub trait ContractResolver: Send + Sync {
    /// Creator for `type_key`, or `None` to fall back to the registered
    /// constructor.
    fn default_creator(&self, type_key: TypeKey) -> Option<Creator>;
}

/// Map-backed [`ContractResolver`].
///
/// # Example
///
/// ```
/// use polycodec::decode::{ContractResolver, Contracts};
/// use polycodec::TypeKey;
///
/// let contracts = Contracts::new().with(|| String::from("pooled"));
/// assert!(contracts.default_creator(TypeKey::of::<String>()).is_some());
/// ```
#[derive(Clone, Default)]
pub struct Contracts {
    creators: HashMap<TypeKey, Creator>,
}

impl Contracts {
    /// Create an empty contract set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a creator for `T`.
    pub fn with<T, F>(mut self, create: F) -> Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.insert(create);
        self
    }

    /// Add a creator for `T`, replacing any previous one.
    pub fn insert<T, F>(&mut self, create: F) -> &mut Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let creator: Creator = Arc::new(move || Box::new(create()) as Box<dyn Any + Send>);
        self.creators.insert(TypeKey::of::<T>(), creator);
        self
    }

    /// Number of types with a custom creator.
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Check if no creator is configured.
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl ContractResolver for Contracts {
    fn default_creator(&self, type_key: TypeKey) -> Option<Creator> {
        self.creators.get(&type_key).cloned()
    }
}

/// Create a value of `T`, preferring the contract hook over `ctor`.
pub(crate) fn instantiate<T: Variant>(
    ctor: fn() -> T,
    contracts: Option<&dyn ContractResolver>,
) -> std::result::Result<T, DecodeFailure> {
    let type_key = TypeKey::of::<T>();

    if let Some(creator) = contracts.and_then(|c| c.default_creator(type_key)) {
        debug!("Creating {} through its contract", type_key);
        let product = guarded(type_key, || creator())?;
        return product.downcast::<T>().map(|value| *value).map_err(|_| {
            DecodeFailure::construction(type_key, "contract creator produced a different type")
        });
    }

    debug!("Creating {}", type_key);
    guarded(type_key, ctor)
}

fn guarded<V>(type_key: TypeKey, create: impl FnOnce() -> V) -> std::result::Result<V, DecodeFailure> {
    panic::catch_unwind(AssertUnwindSafe(create))
        .map_err(|payload| DecodeFailure::construction(type_key, panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "constructor panicked".to_string()
    }
}

// =============================================================================
// Registry recipes
// =============================================================================

/// Registered zero-argument constructor of a concrete type.
pub(crate) struct Constructor<T> {
    ctor: fn() -> T,
}

impl<T: Variant> Constructor<T> {
    pub(crate) fn new(ctor: fn() -> T) -> Self {
        Self { ctor }
    }

    /// Create an instance to be decoded as `T` itself.
    pub(crate) fn create(
        &self,
        contracts: Option<&dyn ContractResolver>,
    ) -> std::result::Result<Box<dyn Instance<T>>, DecodeFailure> {
        let value = instantiate(self.ctor, contracts)?;
        Ok(Box::new(Slot {
            value,
            upcast: identity::<T>,
        }))
    }
}

fn identity<T>(value: Box<T>) -> Box<T> {
    value
}

type CreateFn<R> = dyn Fn(Option<&dyn ContractResolver>) -> std::result::Result<Box<dyn Instance<R>>, DecodeFailure>
    + Send
    + Sync;

/// Recipe creating one concrete variant, seen through its root `R`.
pub(crate) struct Binding<R: ?Sized> {
    type_key: TypeKey,
    create: Box<CreateFn<R>>,
}

impl<R: ?Sized + 'static> Binding<R> {
    pub(crate) fn new<T: Variant>(ctor: fn() -> T, upcast: fn(Box<T>) -> Box<R>) -> Self {
        Self {
            type_key: TypeKey::of::<T>(),
            create: Box::new(move |contracts| {
                let value = instantiate(ctor, contracts)?;
                Ok(Box::new(Slot { value, upcast }) as Box<dyn Instance<R>>)
            }),
        }
    }

    pub(crate) fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub(crate) fn create(
        &self,
        contracts: Option<&dyn ContractResolver>,
    ) -> std::result::Result<Box<dyn Instance<R>>, DecodeFailure> {
        (self.create)(contracts)
    }
}

/// A freshly created instance awaiting population.
pub(crate) trait Instance<R: ?Sized> {
    fn type_key(&self) -> TypeKey;

    fn populate(&mut self, reader: &ObjectReader) -> Result<()>;

    fn into_root(self: Box<Self>) -> Box<R>;
}

struct Slot<T, R: ?Sized> {
    value: T,
    upcast: fn(Box<T>) -> Box<R>,
}

impl<T: Variant, R: ?Sized> Instance<R> for Slot<T, R> {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn populate(&mut self, reader: &ObjectReader) -> Result<()> {
        self.value = reader.populate(&self.value)?;
        Ok(())
    }

    fn into_root(self: Box<Self>) -> Box<R> {
        (self.upcast)(Box::new(self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Fragile;

    fn fragile() -> Fragile {
        panic!("no fragile instances today")
    }

    #[test]
    fn test_instantiate_with_constructor() {
        let value = instantiate(Counter::default, None).unwrap();
        assert_eq!(value, Counter { count: 0 });
    }

    #[test]
    fn test_contract_takes_precedence() {
        let contracts = Contracts::new().with(|| Counter { count: 7 });
        let value = instantiate(Counter::default, Some(&contracts)).unwrap();
        assert_eq!(value.count, 7);
    }

    #[test]
    fn test_contract_for_other_type_ignored() {
        let contracts = Contracts::new().with(|| Fragile);
        let value = instantiate(Counter::default, Some(&contracts)).unwrap();
        assert_eq!(value.count, 0);
    }

    #[test]
    fn test_constructor_panic_contained() {
        let failure = instantiate(fragile, None).unwrap_err();
        match failure {
            DecodeFailure::ConstructionFailed { type_key, reason } => {
                assert!(type_key.is::<Fragile>());
                assert_eq!(reason, "no fragile instances today");
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn test_contract_type_mismatch() {
        struct Mismatched;

        impl ContractResolver for Mismatched {
            fn default_creator(&self, _type_key: TypeKey) -> Option<Creator> {
                Some(Arc::new(|| Box::new(42u8) as Box<dyn Any + Send>))
            }
        }

        let failure = instantiate(Counter::default, Some(&Mismatched)).unwrap_err();
        assert!(matches!(failure, DecodeFailure::ConstructionFailed { .. }));
    }

    #[test]
    fn test_contracts_len() {
        let mut contracts = Contracts::new();
        assert!(contracts.is_empty());
        contracts.insert(Counter::default).insert(|| Fragile);
        assert_eq!(contracts.len(), 2);
    }

    #[test]
    fn test_binding_creates_instance() {
        let binding = Binding::<Counter>::new::<Counter>(|| Counter { count: 3 }, identity);
        assert!(binding.type_key().is::<Counter>());

        let instance = binding.create(None).unwrap();
        assert!(instance.type_key().is::<Counter>());
        assert_eq!(*instance.into_root(), Counter { count: 3 });
    }
}
