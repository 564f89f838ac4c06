// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode coordinator.
//!
//! Each decode call runs the same sequence: detect `null`, make sure the
//! registry is built, materialize the object, resolve the concrete type,
//! create an instance and populate it from the materialized object.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use polycodec::decode::Decoder;
//! use polycodec::registry::TypeRegistry;
//! use polycodec::RootSpec;
//! use serde::{Deserialize, Serialize};
//!
//! trait Shape: polycodec::Encode {
//!     fn area(&self) -> u32;
//! }
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Square {
//!     side: u32,
//! }
//!
//! impl Shape for Square {
//!     fn area(&self) -> u32 {
//!         self.side * self.side
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TypeRegistry::builder()
//!     .root::<dyn Shape>(RootSpec::new("kind"))
//!     .variant::<dyn Shape, Square>("square", |v| v)
//!     .build()?;
//! let decoder = Decoder::with_registry(Arc::new(registry));
//!
//! let shape = decoder.decode_str::<dyn Shape>(r#"{"kind": "square", "side": 3}"#)?;
//! assert_eq!(shape.map(|s| s.area()), Some(9));
//!
//! let unknown = decoder.decode_str::<dyn Shape>(r#"{"kind": "blob"}"#)?;
//! assert!(unknown.is_none());
//! # Ok(())
//! # }
//! ```

use std::cell::RefCell;
use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::{error::json_kind, DecodeFailure, Error, Result, TypeKey};
use crate::decode::diagnostics::{self, DiagnosticSink};
use crate::decode::factory::{ContractResolver, Instance, Variant};
use crate::decode::reader::{ObjectReader, ReaderSettings};
use crate::decode::resolver::{self, Resolution};
use crate::registry::{global_registry, TypeRegistry};

/// Outcome of decoding one polymorphic value.
#[derive(Debug)]
pub enum Decoded<T> {
    /// An instance was created and populated
    Value(T),
    /// The input was `null`
    Null,
    /// The object could not be turned into an instance
    Failed(DecodeFailure),
}

impl<T> Decoded<T> {
    /// Convert to `Option`, dropping the failure reason.
    pub fn into_option(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Null | Decoded::Failed(_) => None,
        }
    }

    /// Failure reason, if decoding failed.
    pub fn failure(&self) -> Option<&DecodeFailure> {
        match self {
            Decoded::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Check if decoding failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Decoded::Failed(_))
    }

    /// Map the decoded value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Value(value) => Decoded::Value(f(value)),
            Decoded::Null => Decoded::Null,
            Decoded::Failed(failure) => Decoded::Failed(failure),
        }
    }
}

#[derive(Clone)]
enum RegistryHandle {
    Global,
    Shared(Arc<TypeRegistry>),
}

/// Polymorphic JSON decoder.
///
/// Cheap to clone. By default it uses the [global registry](global_registry),
/// which is built the first time a decode call needs it.
#[derive(Clone)]
pub struct Decoder {
    registry: RegistryHandle,
    settings: ReaderSettings,
    contracts: Option<Arc<dyn ContractResolver>>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

thread_local! {
    /// Decoders installed by `Decoder::scope`, innermost last.
    static CURRENT: RefCell<Vec<Decoder>> = const { RefCell::new(Vec::new()) };
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

impl Decoder {
    /// Create a decoder over the global registry.
    pub fn new() -> Self {
        Self {
            registry: RegistryHandle::Global,
            settings: ReaderSettings::default(),
            contracts: None,
            diagnostics: None,
        }
    }

    /// Create a decoder over an explicit registry.
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry: RegistryHandle::Shared(registry),
            ..Self::new()
        }
    }

    /// Use `settings` for every reader this decoder creates.
    pub fn with_settings(mut self, settings: ReaderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Consult `contracts` before the registered constructors.
    pub fn with_contracts(mut self, contracts: impl ContractResolver + 'static) -> Self {
        self.contracts = Some(Arc::new(contracts));
        self
    }

    /// Report non-fatal failures to `sink` in addition to the log.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// The decoder installed on this thread by [`scope`](Self::scope), or a
    /// default decoder over the global registry.
    pub fn current() -> Self {
        CURRENT
            .with(|stack| stack.borrow().last().cloned())
            .unwrap_or_default()
    }

    /// Run `f` with this decoder installed as the thread's current decoder,
    /// so [`Poly`](crate::Poly) fields deserialized inside `f` dispatch
    /// through it.
    pub fn scope<O>(&self, f: impl FnOnce() -> O) -> O {
        CURRENT.with(|stack| stack.borrow_mut().push(self.clone()));
        let _guard = ScopeGuard;
        f()
    }

    /// Registry used for dispatch, built on first use.
    pub fn registry(&self) -> &TypeRegistry {
        match &self.registry {
            RegistryHandle::Global => global_registry(),
            RegistryHandle::Shared(registry) => registry,
        }
    }

    /// Reader settings.
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    /// Check if `T` is handled by polymorphic dispatch, i.e. registered as a
    /// root or a variant. Other types bypass the decoder entirely.
    pub fn can_handle<T: ?Sized + 'static>(&self) -> bool {
        self.registry().can_handle(TypeKey::of::<T>())
    }

    // =========================================================================
    // Polymorphic roots
    // =========================================================================

    /// Decode `value` as root `R`, reporting why decoding failed.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for malformed input or population failures.
    /// Dispatch and construction failures are returned as
    /// [`Decoded::Failed`].
    pub fn try_decode_value<R: ?Sized + 'static>(&self, value: Value) -> Result<Decoded<Box<R>>> {
        self.run::<R>(value, |registry, contracts| {
            let requested = TypeKey::of::<R>();
            registry
                .binding::<R>(requested)
                .map(|binding| binding.create(contracts))
        })
    }

    /// Decode `value` as root `R`.
    ///
    /// `null` input and unresolvable objects both yield `None`; the latter
    /// are logged and sent to the diagnostics sink.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for malformed input or population failures.
    pub fn decode_value<R: ?Sized + 'static>(&self, value: Value) -> Result<Option<Box<R>>> {
        let decoded = self.try_decode_value::<R>(value)?;
        Ok(self.settle(decoded))
    }

    /// Parse and decode a JSON string as root `R`.
    pub fn decode_str<R: ?Sized + 'static>(&self, json: &str) -> Result<Option<Box<R>>> {
        let value: Value = serde_json::from_str(json)?;
        self.decode_value::<R>(value)
    }

    /// Parse and decode JSON bytes as root `R`.
    pub fn decode_slice<R: ?Sized + 'static>(&self, json: &[u8]) -> Result<Option<Box<R>>> {
        let value: Value = serde_json::from_slice(json)?;
        self.decode_value::<R>(value)
    }

    /// Parse and decode JSON from a reader as root `R`.
    pub fn decode_reader<R: ?Sized + 'static, Rd: Read>(&self, reader: Rd) -> Result<Option<Box<R>>> {
        let value: Value = serde_json::from_reader(reader)?;
        self.decode_value::<R>(value)
    }

    /// Decode every top-level document in `json` as root `R`.
    ///
    /// Without [`support_multiple_content`](ReaderSettings::support_multiple_content)
    /// the input must hold exactly one document.
    pub fn decode_stream<R: ?Sized + 'static>(&self, json: &str) -> Result<Vec<Option<Box<R>>>> {
        if !self.settings.support_multiple_content() {
            return Ok(vec![self.decode_str::<R>(json)?]);
        }

        serde_json::Deserializer::from_str(json)
            .into_iter::<Value>()
            .map(|document| self.decode_value::<R>(document?))
            .collect()
    }

    // =========================================================================
    // Concrete types
    // =========================================================================

    /// Decode `value` as the concrete type `T`, reporting why decoding
    /// failed.
    ///
    /// Types the registry does not handle are deserialized directly.
    pub fn try_decode_as<T: Variant>(&self, value: Value) -> Result<Decoded<T>> {
        if !self.can_handle::<T>() {
            return Ok(Decoded::Value(self.from_value(value)?));
        }

        let decoded = self.run::<T>(value, |registry, contracts| {
            registry
                .constructor::<T>()
                .map(|constructor| constructor.create(contracts))
        })?;
        Ok(decoded.map(|boxed| *boxed))
    }

    /// Decode `value` as the concrete type `T`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for malformed input or population failures.
    pub fn decode_as<T: Variant>(&self, value: Value) -> Result<Option<T>> {
        let decoded = self.try_decode_as::<T>(value)?;
        Ok(self.settle(decoded))
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Deserialize an arbitrary document with this decoder as the current
    /// decoder for nested [`Poly`](crate::Poly) fields.
    pub fn from_str<T: DeserializeOwned>(&self, json: &str) -> Result<T> {
        self.scope(|| serde_json::from_str(json)).map_err(Error::from)
    }

    /// Deserialize an arbitrary JSON value with this decoder as the current
    /// decoder for nested [`Poly`](crate::Poly) fields.
    pub fn from_value<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        self.scope(|| serde_json::from_value(value)).map_err(Error::from)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn run<R: ?Sized + 'static>(
        &self,
        value: Value,
        create_requested: impl FnOnce(
            &TypeRegistry,
            Option<&dyn ContractResolver>,
        ) -> Option<std::result::Result<Box<dyn Instance<R>>, DecodeFailure>>,
    ) -> Result<Decoded<Box<R>>> {
        let requested = TypeKey::of::<R>();

        let object = match value {
            Value::Null => return Ok(Decoded::Null),
            Value::Object(object) => object,
            other => {
                return Err(Error::NotAnObject {
                    type_key: requested,
                    found: json_kind(&other),
                })
            }
        };

        let reader = ObjectReader::new(&self.settings, object)?;
        let registry = self.registry();
        let contracts = self.contracts.as_deref();

        let resolution = match resolver::resolve(registry, requested, reader.object()) {
            Ok(resolution) => resolution,
            Err(failure) => return Ok(Decoded::Failed(failure)),
        };

        let created = match resolution {
            Resolution::Requested => {
                debug!("Create type {}", requested);
                create_requested(registry, contracts)
            }
            Resolution::Variant(variant) => registry.binding::<R>(variant).map(|binding| {
                debug!("Create resolved subtype {}", binding.type_key());
                binding.create(contracts)
            }),
        };

        let mut instance = match created {
            Some(Ok(instance)) => instance,
            Some(Err(failure)) => return Ok(Decoded::Failed(failure)),
            None => {
                return Ok(Decoded::Failed(DecodeFailure::NotConstructible {
                    type_key: resolution.target(requested),
                }))
            }
        };

        debug!("Populating {}", instance.type_key());
        // Nested `Poly` fields dispatch through this decoder
        self.scope(|| instance.populate(&reader))?;
        Ok(Decoded::Value(instance.into_root()))
    }

    fn settle<T>(&self, decoded: Decoded<T>) -> Option<T> {
        match decoded {
            Decoded::Value(value) => Some(value),
            Decoded::Null => None,
            Decoded::Failed(failure) => {
                diagnostics::report(&failure, self.diagnostics.as_deref());
                None
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = match &self.registry {
            RegistryHandle::Global => "global",
            RegistryHandle::Shared(_) => "shared",
        };
        f.debug_struct("Decoder")
            .field("registry", &registry)
            .field("settings", &self.settings)
            .field("contracts", &self.contracts.is_some())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}
