//! Ordering source for audit records.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use super::AuditRecord;

/// Issues audit records with gap-free sequence numbers and non-decreasing
/// timestamps.
///
/// The wall clock can step backwards (NTP, VM migration); the issued
/// timestamp is clamped to the last one handed out so the stream never goes
/// back in time.
#[derive(Debug, Default)]
pub(crate) struct AuditClock {
    state: Mutex<ClockState>,
}

#[derive(Debug, Default)]
struct ClockState {
    sequence: u64,
    last: Option<DateTime<Utc>>,
}

impl AuditClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds the next record and passes it to `deliver` while the clock is
    /// held, so delivery order matches sequence order.
    pub(crate) fn issue<R>(
        &self,
        build: impl FnOnce(u64, DateTime<Utc>) -> AuditRecord,
        deliver: impl FnOnce(&AuditRecord) -> R,
    ) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Utc::now();
        let timestamp = match state.last {
            Some(last) if last > now => last,
            _ => now,
        };
        state.sequence += 1;
        state.last = Some(timestamp);

        let record = build(state.sequence, timestamp);
        deliver(&record)
    }
}
