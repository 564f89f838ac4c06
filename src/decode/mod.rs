// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Polymorphic decoding.
//!
//! - [`decoder`] - Decode coordinator and the thread's current decoder
//! - [`resolver`] - Discriminator lookup
//! - [`factory`] - Instance creation and contract hooks
//! - [`reader`] - Reader settings and population
//! - [`poly`] - Serde integration for polymorphic fields
//! - [`diagnostics`] - Reporting of non-fatal failures

pub mod decoder;
pub mod diagnostics;
pub mod factory;
pub mod poly;
pub mod reader;
pub mod resolver;

pub use decoder::{Decoded, Decoder};
pub use diagnostics::{DiagnosticSink, FailureLog};
pub use factory::{ContractResolver, Contracts, Creator, Variant};
pub use poly::{Encode, Poly};
pub use reader::{ObjectReader, ReaderSettings, DEFAULT_MAX_DEPTH};
pub use resolver::{resolve, Resolution};
