//! Recommended version selection

use super::{CanonicalVersion, PublishedVersion};

/// Newest stable version sharing `current`'s major number.
///
/// Falls back to `current` itself when no stable release exists in that
/// major line.
pub fn select_recommended(
    current: &CanonicalVersion,
    stable: &[CanonicalVersion],
) -> CanonicalVersion {
    stable
        .iter()
        .filter(|v| v.is_stable() && v.major == current.major)
        .max()
        .cloned()
        .unwrap_or_else(|| current.clone())
}

/// Same selection over registry entries, keeping the registry's own spelling.
pub fn newest_in_major<'a>(
    current: &CanonicalVersion,
    published: &'a [PublishedVersion],
) -> Option<&'a PublishedVersion> {
    published
        .iter()
        .filter(|p| p.version.is_stable() && p.version.major == current.major)
        .max_by(|a, b| a.version.cmp(&b.version))
}
