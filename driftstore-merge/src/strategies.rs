//! The merge strategy contract and its built-in implementations.

use std::cmp::Ordering;

use driftstore_types::{value, NanoTime, RawState, Version};

/// A per-attribute rule resolving divergent states from two versions.
///
/// `merge` inspects the local (incumbent) and remote (incoming) versions and
/// answers for one attribute: `None` means "keep local, no change"; a raw
/// state means "adopt this remote-derived state", wholesale. A remote
/// version that does not carry the attribute at all keeps local, so an older
/// replica's versions stay mergeable after a schema gains attributes.
///
/// Implementations must be commutative and idempotent in their converged
/// result (see the crate docs). Strategies that need per-attribute state
/// persist it in the raw state via [`MergeStrategy::on_set`] and report
/// [`MergeStrategy::requires_state`].
pub trait MergeStrategy: Send + Sync {
    /// The registry name of this strategy.
    fn name(&self) -> &'static str;

    /// Whether this strategy persists metadata in the raw state.
    fn requires_state(&self) -> bool {
        false
    }

    /// Hook invoked whenever an attribute value is (re)assigned.
    ///
    /// `default_init` is `true` when the assignment is the initialization of
    /// a blank entity from attribute defaults.
    fn on_set(&self, raw: &mut RawState, default_init: bool) {
        let _ = (raw, default_init);
    }

    /// Decides the surviving state for `attr`. `None` keeps local.
    fn merge(&self, attr: &str, local: &Version, remote: &Version) -> Option<RawState>;
}

/// Merges based solely on the versions' whole-object committed timestamps:
/// the most recently written object wins. Ties keep local — strictly
/// greater is required to adopt the remote state.
///
/// This strategy stores no additional state and is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestObject;

impl MergeStrategy for LatestObject {
    fn name(&self) -> &'static str {
        "latest-object"
    }

    fn merge(&self, attr: &str, local: &Version, remote: &Version) -> Option<RawState> {
        let remote_raw = remote.attribute(attr).ok()?;
        if remote.committed() > local.committed() {
            Some(remote_raw.clone())
        } else {
            None
        }
    }
}

/// Merges based solely on per-attribute timestamps: the most recently
/// written attribute wins.
///
/// Persists an `updated` stamp in the raw state on every assignment.
/// Default initialization stamps zero, so a default never beats a real
/// edit. A state with a stamp is preferred over one without; between two
/// stamps, strictly greater adopts remote.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestAttribute;

impl MergeStrategy for LatestAttribute {
    fn name(&self) -> &'static str {
        "latest-attribute"
    }

    fn requires_state(&self) -> bool {
        true
    }

    fn on_set(&self, raw: &mut RawState, default_init: bool) {
        raw.updated = Some(if default_init {
            NanoTime::ZERO
        } else {
            NanoTime::now()
        });
    }

    fn merge(&self, attr: &str, local: &Version, remote: &Version) -> Option<RawState> {
        let remote_raw = remote.attribute(attr).ok()?;
        let remote_updated = remote_raw.updated?;

        let local_updated = local.attribute(attr).ok().and_then(|raw| raw.updated);
        match local_updated {
            // Other side has a stamp, we don't. Take theirs.
            None => Some(remote_raw.clone()),
            Some(local_updated) if remote_updated > local_updated => Some(remote_raw.clone()),
            Some(_) => None,
        }
    }
}

/// Merges based solely on value comparison: the greater value wins.
///
/// Ties and incomparable values keep local. Stores no additional state.
/// Intended for monotonically-increasing counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl MergeStrategy for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    fn merge(&self, attr: &str, local: &Version, remote: &Version) -> Option<RawState> {
        let remote_raw = remote.attribute(attr).ok()?;
        let local_raw = match local.attribute(attr) {
            Ok(raw) => raw,
            Err(_) => return Some(remote_raw.clone()),
        };
        match value::compare(&remote_raw.value, &local_raw.value) {
            Some(Ordering::Greater) => Some(remote_raw.clone()),
            _ => None,
        }
    }
}
