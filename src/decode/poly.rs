// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Serde integration for polymorphic fields.
//!
//! [`Poly<R>`] holds an optional boxed root. Deserializing it dispatches
//! through [`Decoder::current`], so documents containing polymorphic fields
//! can be read with plain `serde_json` calls or with
//! [`Decoder::from_str`] to pick a specific decoder. Serializing it writes
//! the concrete instance as-is; the discriminator is expected to be one of
//! its own fields.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value;

use crate::decode::decoder::Decoder;

/// Object-safe serialization, implemented for every [`Serialize`] type.
///
/// Use it as a supertrait of polymorphic roots so that boxed roots can be
/// written back out.
pub trait Encode {
    /// Serialize `self` to a JSON value.
    fn encode(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize> Encode for T {
    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A nullable polymorphic value of root `R`.
///
/// `null`, an unknown discriminator and a missing discriminator all
/// deserialize to an empty `Poly`; malformed input is a deserialization
/// error.
pub struct Poly<R: ?Sized>(Option<Box<R>>);

impl<R: ?Sized> Poly<R> {
    /// Wrap a boxed value.
    pub fn new(value: Box<R>) -> Self {
        Self(Some(value))
    }

    /// An empty value.
    pub fn null() -> Self {
        Self(None)
    }

    /// Borrow the value, if any.
    pub fn get(&self) -> Option<&R> {
        self.0.as_deref()
    }

    /// Mutably borrow the value, if any.
    pub fn get_mut(&mut self) -> Option<&mut R> {
        self.0.as_deref_mut()
    }

    /// Check if the value is empty.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Unwrap into the boxed value.
    pub fn into_inner(self) -> Option<Box<R>> {
        self.0
    }

    /// Take the value, leaving the `Poly` empty.
    pub fn take(&mut self) -> Option<Box<R>> {
        self.0.take()
    }
}

impl<R: ?Sized> Default for Poly<R> {
    fn default() -> Self {
        Self::null()
    }
}

impl<R: ?Sized> From<Box<R>> for Poly<R> {
    fn from(value: Box<R>) -> Self {
        Self::new(value)
    }
}

impl<R: ?Sized> From<Option<Box<R>>> for Poly<R> {
    fn from(value: Option<Box<R>>) -> Self {
        Self(value)
    }
}

impl<R: ?Sized> Deref for Poly<R> {
    type Target = Option<Box<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<R: ?Sized> DerefMut for Poly<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<R: ?Sized + fmt::Debug> fmt::Debug for Poly<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => f.debug_tuple("Poly").field(&value).finish(),
            None => f.write_str("Poly(null)"),
        }
    }
}

impl<'de, R: ?Sized + 'static> Deserialize<'de> for Poly<R> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Decoder::current()
            .decode_value::<R>(value)
            .map(Poly)
            .map_err(de::Error::custom)
    }
}

impl<R: ?Sized + Encode> Serialize for Poly<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(value) => Encode::encode(&**value)
                .map_err(S::Error::custom)?
                .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RootSpec;
    use crate::registry::TypeRegistry;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    trait Pet: Encode + fmt::Debug {
        fn sound(&self) -> String;
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Dog {
        species: String,
        name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Cat {
        species: String,
        lives: u8,
    }

    impl Pet for Dog {
        fn sound(&self) -> String {
            format!("{} says woof", self.name)
        }
    }

    impl Pet for Cat {
        fn sound(&self) -> String {
            format!("meow x{}", self.lives)
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Household {
        pets: Vec<Poly<dyn Pet>>,
        #[serde(default)]
        favourite: Poly<dyn Pet>,
    }

    fn decoder() -> Decoder {
        let registry = TypeRegistry::builder()
            .root::<dyn Pet>(RootSpec::new("species"))
            .variant::<dyn Pet, Dog>("dog", |v| v)
            .variant::<dyn Pet, Cat>("cat", |v| v)
            .build()
            .unwrap();
        Decoder::with_registry(Arc::new(registry))
    }

    #[test]
    fn test_nested_fields_dispatch() {
        let household: Household = decoder()
            .from_value(json!({
                "pets": [
                    {"species": "dog", "name": "rex"},
                    {"species": "cat", "lives": 9},
                    null,
                    {"species": "parrot"}
                ],
                "favourite": {"species": "Cat", "lives": 3}
            }))
            .unwrap();

        assert_eq!(household.pets.len(), 4);
        assert_eq!(household.pets[0].get().unwrap().sound(), "rex says woof");
        assert_eq!(household.pets[1].get().unwrap().sound(), "meow x9");
        assert!(household.pets[2].is_null());
        assert!(household.pets[3].is_null());
        assert_eq!(household.favourite.get().unwrap().sound(), "meow x3");
    }

    #[test]
    fn test_serialize_writes_concrete_fields() {
        let household = Household {
            pets: vec![
                Poly::<dyn Pet>::new(Box::new(Dog {
                    species: "dog".to_string(),
                    name: "rex".to_string(),
                })),
                Poly::null(),
            ],
            favourite: Poly::default(),
        };

        let value = serde_json::to_value(&household).unwrap();
        assert_eq!(
            value,
            json!({
                "pets": [{"species": "dog", "name": "rex"}, null],
                "favourite": null
            })
        );
    }

    #[test]
    fn test_malformed_element_is_an_error() {
        let result: crate::core::Result<Household> =
            decoder().from_value(json!({"pets": [42]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors() {
        let boxed: Box<dyn Pet> = Box::new(Cat::default());
        let mut poly = Poly::from(boxed);
        assert!(!poly.is_null());
        assert!(poly.get_mut().is_some());
        assert!(poly.take().is_some());
        assert!(poly.is_null());
        assert!(poly.into_inner().is_none());
    }
}
