//! Status classification
//!
//! The only place a [`Status`] is decided. Comparison is on canonical
//! versions, so `4.17.20` vs `4.17.21` and `9.5` vs `10.0.0` are judged
//! numerically rather than as text.

use super::CanonicalVersion;
use crate::domain::Status;

/// Classifies a dependency from its current and latest versions.
///
/// - either side unavailable: `Failed`
/// - equal: `UpToDate`
/// - latest has a higher major: `MajorUpdate`
/// - otherwise `Outdated`, including when current is ahead of latest
pub fn classify<E1, E2>(
    current: &Result<CanonicalVersion, E1>,
    latest: &Result<CanonicalVersion, E2>,
) -> Status {
    match (current, latest) {
        (Ok(current), Ok(latest)) => {
            if current == latest {
                Status::UpToDate
            } else if latest.major > current.major {
                Status::MajorUpdate
            } else {
                Status::Outdated
            }
        }
        _ => Status::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LookupFailure;
    use crate::error::InvalidVersion;

    type Current = Result<CanonicalVersion, InvalidVersion>;
    type Latest = Result<CanonicalVersion, LookupFailure>;

    fn ok(s: &str) -> Result<CanonicalVersion, LookupFailure> {
        Ok(s.parse().unwrap())
    }

    fn cur(s: &str) -> Current {
        s.parse()
    }

    #[test]
    fn test_up_to_date() {
        assert_eq!(classify(&cur("1.2.3"), &ok("1.2.3")), Status::UpToDate);
        // Padding makes `1.2` and `1.2.0` the same version
        assert_eq!(classify(&cur("^1.2"), &ok("1.2.0")), Status::UpToDate);
    }

    #[test]
    fn test_outdated() {
        assert_eq!(classify(&cur("^4.17.20"), &ok("4.17.21")), Status::Outdated);
        assert_eq!(classify(&cur("1.0.0-rc.1"), &ok("1.0.0")), Status::Outdated);
    }

    #[test]
    fn test_major_update() {
        assert_eq!(classify(&cur("^9.5"), &ok("10.0.0")), Status::MajorUpdate);
    }

    #[test]
    fn test_current_ahead_of_latest_is_outdated() {
        assert_eq!(classify(&cur("2.5.0"), &ok("2.4.0")), Status::Outdated);
        assert_eq!(classify(&cur("3.0.0"), &ok("2.4.0")), Status::Outdated);
    }

    #[test]
    fn test_failed() {
        let latest_missing: Latest = Err(LookupFailure::NoPublishedVersions);
        assert_eq!(classify(&cur("1.0.0"), &latest_missing), Status::Failed);
        assert_eq!(classify(&cur("dev-main"), &ok("1.0.0")), Status::Failed);
    }
}
