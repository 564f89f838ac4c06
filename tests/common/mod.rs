// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common fixtures for integration tests.
//!
//! The fixture hierarchy is a root keyed by its `Name` member, with one
//! variant per kind of payload, registered both in the global registry and
//! in an explicit one.

#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use polycodec::{register_root, register_variant, Decoder, Encode, Poly, RootSpec, TypeRegistry};
use serde::{Deserialize, Serialize};

// ============================================================================
// Fixture Types
// ============================================================================

/// Root of the fixture hierarchy.
pub trait DynamicItem: Encode + Debug {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Variant selected by `"NumberValue"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NumberItem {
    pub name: String,
    pub number_value: i32,
}

/// Variant selected by `"StringValue"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StringItem {
    pub name: String,
    pub string_value: String,
}

/// Variant selected by `"DictionaryValue"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DictionaryItem {
    pub name: String,
    pub properties: HashMap<String, String>,
}

macro_rules! impl_dynamic_item {
    ($($ty:ty),+) => {
        $(
            impl DynamicItem for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )+
    };
}

impl_dynamic_item!(NumberItem, StringItem, DictionaryItem);

register_root!(dyn DynamicItem, field = "Name");
register_variant!(NumberItem => dyn DynamicItem, value = "NumberValue");
register_variant!(StringItem => dyn DynamicItem, value = "StringValue");
register_variant!(DictionaryItem => dyn DynamicItem, value = "DictionaryValue");

/// Document holding two lists of polymorphic items.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemCollection {
    #[serde(default)]
    pub items: Vec<Poly<dyn DynamicItem>>,
    #[serde(default)]
    pub other_items: Vec<Poly<dyn DynamicItem>>,
}

// ============================================================================
// Builders
// ============================================================================

/// Build an explicit registry equivalent to the global registrations.
pub fn fixture_registry() -> TypeRegistry {
    TypeRegistry::builder()
        .root::<dyn DynamicItem>(RootSpec::new("Name"))
        .variant::<dyn DynamicItem, NumberItem>("NumberValue", |v| v)
        .variant::<dyn DynamicItem, StringItem>("StringValue", |v| v)
        .variant::<dyn DynamicItem, DictionaryItem>("DictionaryValue", |v| v)
        .build()
        .expect("fixture registry is consistent")
}

/// Decoder over [`fixture_registry`].
pub fn fixture_decoder() -> Decoder {
    Decoder::with_registry(Arc::new(fixture_registry()))
}

pub fn number(value: i32) -> NumberItem {
    NumberItem {
        name: "NumberValue".to_string(),
        number_value: value,
    }
}

pub fn string(value: &str) -> StringItem {
    StringItem {
        name: "StringValue".to_string(),
        string_value: value.to_string(),
    }
}

pub fn dictionary(entries: &[(&str, &str)]) -> DictionaryItem {
    DictionaryItem {
        name: "DictionaryValue".to_string(),
        properties: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// Wrap a concrete item as a polymorphic value.
pub fn poly<T: DynamicItem + 'static>(item: T) -> Poly<dyn DynamicItem> {
    let boxed: Box<dyn DynamicItem> = Box::new(item);
    Poly::from(boxed)
}

/// Borrow a decoded item as its concrete type.
pub fn downcast<T: 'static>(item: &Poly<dyn DynamicItem>) -> Option<&T> {
    item.get()?.as_any().downcast_ref::<T>()
}

/// Find the first item whose `Name` equals `name`.
pub fn find_by_name<'a>(
    items: &'a [Poly<dyn DynamicItem>],
    name: &str,
) -> Option<&'a dyn DynamicItem> {
    items
        .iter()
        .filter_map(|item| item.get())
        .find(|item| item.name() == name)
}
