// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Polycodec
//!
//! Discriminator-driven polymorphic JSON decoding on top of `serde_json`.
//!
//! A *root* is an abstract type (usually a trait object such as
//! `dyn Shape`) that names a discriminator field. Each concrete *variant*
//! declares the discriminator value selecting it. When a root is requested,
//! the decoder reads the discriminator from the parsed object, picks the
//! variant, creates an empty instance and populates it from the same
//! object.
//!
//! ## Architecture
//!
//! - `core/` - Type identity, dispatch metadata and errors
//! - `registry/` - Type registry, its builder and the global registry
//! - `decode/` - Resolver, instance factory, decoder and serde integration
//!
//! ## Example: Explicit registry
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//!
//! use polycodec::{Decoder, Poly, RootSpec, TypeRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! trait Animal: polycodec::Encode {
//!     fn legs(&self) -> u8;
//! }
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Bird {
//!     kind: String,
//! }
//!
//! impl Animal for Bird {
//!     fn legs(&self) -> u8 {
//!         2
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Zoo {
//!     animals: Vec<Poly<dyn Animal>>,
//! }
//!
//! let registry = TypeRegistry::builder()
//!     .root::<dyn Animal>(RootSpec::new("kind"))
//!     .variant::<dyn Animal, Bird>("bird", |v| v)
//!     .build()?;
//! let decoder = Decoder::with_registry(Arc::new(registry));
//!
//! let zoo: Zoo = decoder.from_str(r#"{"animals": [{"kind": "BIRD"}, {"kind": "yeti"}]}"#)?;
//! assert_eq!(zoo.animals[0].get().map(|a| a.legs()), Some(2));
//! assert!(zoo.animals[1].is_null());
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Global registry
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use polycodec::{register_root, register_variant, Decoder};
//! use serde::{Deserialize, Serialize};
//!
//! trait Command: polycodec::Encode {}
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Stop {
//!     op: String,
//! }
//!
//! impl Command for Stop {}
//!
//! register_root!(dyn Command, field = "op");
//! register_variant!(Stop => dyn Command, value = "stop");
//!
//! let command = Decoder::new().decode_str::<dyn Command>(r#"{"op": "stop"}"#)?;
//! assert!(command.is_some());
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use crate::core::{
    DecodeFailure, DiscriminatorValue, Error, RegistryError, Result, RootSpec, TypeKey, VariantSpec,
};

// Type registry
pub mod registry;

pub use registry::{global_registry, RegistryBuilder, TypeRegistry};

// Decoding
pub mod decode;

pub use decode::{
    ContractResolver, Contracts, Decoded, Decoder, DiagnosticSink, Encode, FailureLog, Poly,
    ReaderSettings,
};

// Registration macros
mod macros;

#[doc(hidden)]
pub use inventory;
