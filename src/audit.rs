//! Audit records for secret access.
//!
//! This module provides:
//! - `AuditRecord`: one immutable entry per secret access attempt
//! - `AuditSink`: the append-only destination records are written to
//! - `TracingAuditSink`, `JsonLinesAuditSink`, `MemoryAuditSink`: sink implementations
//!
//! Records are safe by construction: they carry the actor, path, action,
//! outcome and origin of an attempt and have no field that could hold a
//! secret value.

mod clock;
mod event;
mod sink;
mod trail;

pub(crate) use clock::AuditClock;
pub use event::{AuditOutcome, AuditRecord, SecretAction};
pub use sink::{AuditSink, JsonLinesAuditSink, TracingAuditSink};
pub use trail::MemoryAuditSink;
