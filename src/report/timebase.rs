//! Mapping relative log time onto calendar time.
//!
//! Maestro prints wall-clock time of day without a date, so the log alone
//! can only give offsets. The calendar position comes either from an
//! external anchor (the session start reported by the device cloud) or,
//! lacking one, from the assumption that the test finished just now.

/// Resolved mapping from relative milliseconds to epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    /// Epoch ms at which relative `first_ms` happened.
    origin_ms: i64,
    first_ms: Option<u64>,
}

/// Lossless for any time of day; saturates on absurd inputs.
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl TimeBase {
    /// Pick the time base for a log.
    ///
    /// With both an anchor and a first timestamp, the first event lands
    /// exactly on the anchor. Otherwise the log's observed duration
    /// (`last - first`, never negative) is back-dated from `now_ms`.
    #[must_use]
    pub fn resolve(
        first_ms: Option<u64>,
        last_ms: Option<u64>,
        anchor_epoch_ms: Option<i64>,
        now_ms: i64,
    ) -> Self {
        let origin_ms = match (anchor_epoch_ms, first_ms) {
            (Some(anchor), Some(_)) => anchor,
            _ => {
                let duration = match (first_ms, last_ms) {
                    (Some(first), Some(last)) => last.saturating_sub(first),
                    _ => 0,
                };
                now_ms.saturating_sub(to_i64(duration))
            }
        };

        tracing::debug!(
            origin_ms,
            first_ms = ?first_ms,
            last_ms = ?last_ms,
            anchored = anchor_epoch_ms.is_some() && first_ms.is_some(),
            "Resolved time base"
        );

        Self {
            origin_ms,
            first_ms,
        }
    }

    /// Epoch ms of the first event (or of the fallback origin).
    #[must_use]
    pub const fn origin_ms(&self) -> i64 {
        self.origin_ms
    }

    /// Shift a relative timestamp to epoch ms.
    ///
    /// Values before `first_ms` clamp to the origin; a missing value maps
    /// to the origin itself.
    #[must_use]
    pub fn shift(&self, value: Option<u64>) -> i64 {
        match (value, self.first_ms) {
            (None, _) => self.origin_ms,
            (Some(value), Some(first)) => self
                .origin_ms
                .saturating_add(to_i64(value.saturating_sub(first))),
            (Some(value), None) => self.origin_ms.saturating_add(to_i64(value)),
        }
    }
}
