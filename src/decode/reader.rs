// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reader configuration and the secondary reader used for population.
//!
//! Once the discriminator has been inspected, the already materialized
//! object is handed to an [`ObjectReader`] carrying a copy of the outer
//! reader settings, so population never re-reads the input.

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::{eq_ignore_case, Error, Result, TypeKey};

/// Default maximum nesting depth of a decoded document.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Reader configuration propagated to every secondary reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    max_depth: Option<usize>,
    support_multiple_content: bool,
    case_insensitive_properties: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            support_multiple_content: false,
            case_insensitive_properties: true,
        }
    }
}

impl ReaderSettings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth; `None` disables the check.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Accept several top-level documents in one input.
    pub fn with_multiple_content(mut self, enabled: bool) -> Self {
        self.support_multiple_content = enabled;
        self
    }

    /// Match incoming member names to instance fields ignoring case.
    pub fn with_case_insensitive_properties(mut self, enabled: bool) -> Self {
        self.case_insensitive_properties = enabled;
        self
    }

    /// Maximum nesting depth, if limited.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether several top-level documents are accepted.
    pub fn support_multiple_content(&self) -> bool {
        self.support_multiple_content
    }

    /// Whether member names are matched ignoring case.
    pub fn case_insensitive_properties(&self) -> bool {
        self.case_insensitive_properties
    }

    fn check_object_depth(&self, object: &Map<String, Value>) -> Result<()> {
        let Some(limit) = self.max_depth else {
            return Ok(());
        };
        let depth = 1 + object.values().map(nesting_depth).max().unwrap_or(0);
        if depth > limit {
            return Err(Error::DepthExceeded { limit, depth });
        }
        Ok(())
    }
}

/// Nesting depth of a JSON value: scalars are 0, containers add one level.
pub fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(members) => 1 + members.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Secondary reader over an already parsed object.
#[derive(Debug, Clone)]
pub struct ObjectReader {
    settings: ReaderSettings,
    object: Map<String, Value>,
}

impl ObjectReader {
    /// Create a reader over `object`, copying the settings of the reader it
    /// was read from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DepthExceeded`] if the object is nested deeper than
    /// the settings allow.
    pub fn new(settings: &ReaderSettings, object: Map<String, Value>) -> Result<Self> {
        settings.check_object_depth(&object)?;
        Ok(Self {
            settings: settings.clone(),
            object,
        })
    }

    /// Settings carried over from the outer reader.
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// The object being read.
    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Populate an existing instance from the object.
    ///
    /// Members present in the object overwrite the matching fields of
    /// `target`; fields absent from the object keep their current values.
    /// Ignoring case, a member matches a serialized field of `target` or,
    /// failing that, any field `T` declares.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Populate`] if `target` cannot be round-tripped
    /// through JSON or the merged object does not fit its type.
    pub fn populate<T>(&self, target: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let type_key = TypeKey::of::<T>();
        let populate_err = |source| Error::Populate { type_key, source };

        let merged = match serde_json::to_value(target).map_err(populate_err)? {
            Value::Object(mut fields) => {
                self.overlay(&mut fields, declared_fields::<T>());
                Value::Object(fields)
            }
            // Not a struct-like value: nothing to preserve
            _ => Value::Object(self.object.clone()),
        };

        serde_json::from_value(merged).map_err(populate_err)
    }

    fn overlay(&self, fields: &mut Map<String, Value>, declared: &[&str]) {
        for (name, value) in &self.object {
            if fields.contains_key(name) || !self.settings.case_insensitive_properties {
                fields.insert(name.clone(), value.clone());
                continue;
            }

            // Skipped or absent fields only show up in the declared list
            let target = fields
                .keys()
                .map(String::as_str)
                .chain(declared.iter().copied())
                .find(|field| eq_ignore_case(field, name))
                .map_or_else(|| name.clone(), str::to_string);
            fields.insert(target, value.clone());
        }
    }
}

/// Field names `T` accepts when deserialized from a struct, or an empty
/// list for anything that is not a plain struct.
fn declared_fields<T: DeserializeOwned>() -> &'static [&'static str] {
    let mut fields: &'static [&'static str] = &[];
    // Always fails once the names are captured
    let _ = T::deserialize(FieldNameCollector {
        fields: &mut fields,
    });
    fields
}

/// Deserializer that records the field list passed to `deserialize_struct`
/// and rejects everything else.
struct FieldNameCollector<'a> {
    fields: &'a mut &'static [&'static str],
}

impl<'de> Deserializer<'de> for FieldNameCollector<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(
        self,
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> std::result::Result<V::Value, Self::Error> {
        *self.fields = fields;
        Err(de::Error::custom("field names collected"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
