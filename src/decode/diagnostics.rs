// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Diagnostics channel for non-fatal decode failures.
//!
//! Failed polymorphic objects decode to `None`. Every such failure is
//! logged and, when a [`DiagnosticSink`] is configured on the decoder,
//! recorded there as well so callers can tell a legitimate `null` from an
//! unresolvable object.

use std::sync::{Mutex, PoisonError};

use tracing::{error, warn};

use crate::core::DecodeFailure;

/// Receiver of decode failures.
pub trait DiagnosticSink: Send + Sync {
    /// Record one failure.
    fn record(&self, failure: &DecodeFailure);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&DecodeFailure) + Send + Sync,
{
    fn record(&self, failure: &DecodeFailure) {
        self(failure)
    }
}

/// Sink that keeps every failure in memory.
#[derive(Debug, Default)]
pub struct FailureLog {
    failures: Mutex<Vec<DecodeFailure>>,
}

impl FailureLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded failures.
    pub fn failures(&self) -> Vec<DecodeFailure> {
        self.lock().clone()
    }

    /// Remove and return the recorded failures.
    pub fn take(&self) -> Vec<DecodeFailure> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DecodeFailure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for FailureLog {
    fn record(&self, failure: &DecodeFailure) {
        self.lock().push(failure.clone());
    }
}

/// Log a failure and forward it to `sink`.
pub(crate) fn report(failure: &DecodeFailure, sink: Option<&dyn DiagnosticSink>) {
    let fields = failure.log_fields();
    match failure {
        DecodeFailure::ConstructionFailed { type_key, reason } => {
            error!(
                fields = ?fields,
                "Error while trying to create type {}: {}", type_key, reason
            );
        }
        DecodeFailure::UnknownDiscriminator { root, value, .. } => {
            warn!(fields = ?fields, "No subtype of {} found for '{}'", root, value);
        }
        other => {
            warn!(fields = ?fields, "Cannot decode {}: {}", other.type_key(), other);
        }
    }

    if let Some(sink) = sink {
        sink.record(failure);
    }
}
