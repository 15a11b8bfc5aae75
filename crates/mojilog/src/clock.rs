//! Projection of record timestamps to the local time zone.

use std::sync::LazyLock;

use time::{OffsetDateTime, UtcOffset};

// Determined once: the local offset can only be queried reliably while the process is
// single-threaded, and renderers run on any thread.
static LOCAL_OFFSET: LazyLock<UtcOffset> =
    LazyLock::new(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC));

/// Primes the local offset. Called by the global initializers.
pub(crate) fn init() {
    LazyLock::force(&LOCAL_OFFSET);
}

/// Converts `time` to the local offset, or UTC if the local offset is unknown.
pub(crate) fn local(time: OffsetDateTime) -> OffsetDateTime {
    time.checked_to_offset(*LOCAL_OFFSET).unwrap_or(time)
}
