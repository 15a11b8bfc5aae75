//! Attribute keys that are never rendered.
//!
//! These fields are typically attached once per process (service identity, build metadata,
//! metric plumbing) and only add noise to every line. Both renderers consult
//! [`should_skip`] before emitting an attribute, so the visible fields are the same regardless
//! of output format.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

pub(crate) const SERVICE: &str = "service";
pub(crate) const VERSION: &str = "version";
pub(crate) const ENVIRONMENT: &str = "environment";
pub(crate) const PID: &str = "pid";
pub(crate) const METRIC_NAME: &str = "metric_name";
pub(crate) const METRIC_VALUE: &str = "metric_value";

const SKIPPED: [&str; 6] = [
    SERVICE,
    VERSION,
    ENVIRONMENT,
    PID,
    METRIC_NAME,
    METRIC_VALUE,
];

pub(crate) static SKIPPED_KEYS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| SKIPPED.iter().copied().collect());

/// Returns `true` if an attribute with this key must be left out of rendered output.
///
/// The check is on the bare key: an attribute attached inside a group is still skipped.
///
/// ```
/// assert!(mojilog::should_skip("pid"));
/// assert!(!mojilog::should_skip("port"));
/// ```
pub fn should_skip(key: &str) -> bool {
    SKIPPED_KEYS.contains(key)
}
