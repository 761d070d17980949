#![forbid(unsafe_code)]

//! Wall clock shown in the console header.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// `HH:MM:SS` clock pinned to one UTC offset.
///
/// The local offset can only be detected reliably before other threads
/// start, so [`Clock::detect_local`] should run early in `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: UtcOffset,
}

impl Default for Clock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock {
    /// Clock in UTC.
    #[must_use]
    pub const fn utc() -> Self {
        Self {
            offset: UtcOffset::UTC,
        }
    }

    /// Clock at a fixed offset.
    #[must_use]
    pub const fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Clock in the system's local offset, or UTC when it cannot be found.
    #[must_use]
    pub fn detect_local() -> Self {
        match UtcOffset::current_local_offset() {
            Ok(offset) => Self { offset },
            Err(error) => {
                tracing::debug!(%error, "local offset unavailable, clock shows UTC");
                Self::utc()
            }
        }
    }

    /// Current time as `HH:MM:SS`.
    #[must_use]
    pub fn now(&self) -> String {
        format_hms(OffsetDateTime::now_utc().to_offset(self.offset))
    }
}

/// Format a timestamp as `HH:MM:SS`.
#[must_use]
pub fn format_hms(at: OffsetDateTime) -> String {
    at.format(CLOCK_FORMAT)
        .unwrap_or_else(|_| String::from("--:--:--"))
}
