use crate::error::ValidationError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(-rc([0-9]+))?$").expect("valid version regex")
    })
}

/// A release-train version: `vMAJOR.MINOR.PATCH[-rcN]`.
///
/// `rc == 0` is the final release. Field order gives the numeric
/// `(major, minor, patch, rc)` ordering, so `rc10` sorts above `rc9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub rc: u32,
}

/// Components plus whether an explicit `-rcN` suffix was present
struct Components {
    version: ReleaseVersion,
    has_rc_suffix: bool,
}

fn split_components(input: &str) -> Option<Components> {
    let body = input.strip_prefix('v')?;
    let caps = version_regex().captures(body)?;

    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let major = number(1)?;
    let minor = number(2)?;
    let patch = number(3)?;
    let (rc, has_rc_suffix) = match caps.get(5) {
        Some(_) => (number(5)?, true),
        None => (0, false),
    };

    Some(Components {
        version: ReleaseVersion {
            major,
            minor,
            patch,
            rc,
        },
        has_rc_suffix,
    })
}

impl ReleaseVersion {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32, rc: u32) -> Self {
        ReleaseVersion {
            major,
            minor,
            patch,
            rc,
        }
    }

    /// Parse a version a caller asks to publish (e.g. "v2.99.0-rc1").
    ///
    /// An explicit `-rc0` is rejected: it is the marker created when a
    /// release branch is cut, never a publishable target.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let components = split_components(input).ok_or_else(|| ValidationError::InvalidFormat {
            input: input.to_string(),
        })?;

        if components.has_rc_suffix && components.version.rc == 0 {
            return Err(ValidationError::InvalidRelease {
                input: input.to_string(),
            });
        }

        Ok(components.version)
    }

    /// Parse an existing release-candidate tag. Returns `None` for final
    /// releases, `-rc0` markers and anything outside the grammar.
    pub fn parse_rc_tag(tag: &str) -> Option<Self> {
        let components = split_components(tag)?;
        if components.has_rc_suffix && components.version.rc > 0 {
            Some(components.version)
        } else {
            None
        }
    }

    /// True for `-rcN` versions, false for the final release
    pub fn is_release_candidate(&self) -> bool {
        self.rc > 0
    }

    /// The very first candidate of a minor line (`X.Y.0-rc1`)
    pub fn is_first_rc(&self) -> bool {
        self.patch == 0 && self.rc == 1
    }

    /// A minor release rather than a patch release
    pub fn is_minor(&self) -> bool {
        self.patch == 0
    }

    /// Same major, minor and patch, ignoring the rc number
    pub fn same_release(&self, other: &ReleaseVersion) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }

    /// Tag name for this version (e.g. "v1.2.0-rc1")
    pub fn tag(&self) -> String {
        format!("v{}", self)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.rc > 0 {
            write!(f, "-rc{}", self.rc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse_rc() {
        let v = ReleaseVersion::parse("v2.99.0-rc1").unwrap();
        assert_eq!(v, ReleaseVersion::new(2, 99, 0, 1));
        assert!(v.is_first_rc());
        assert!(v.is_release_candidate());
    }

    #[test]
    fn test_version_parse_final() {
        let v = ReleaseVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.rc, 0);
        assert!(!v.is_first_rc());
        assert!(!v.is_release_candidate());
    }

    #[test]
    fn test_first_rc_only_for_patch_zero_rc_one() {
        assert!(ReleaseVersion::parse("v1.2.0-rc1").unwrap().is_first_rc());
        assert!(!ReleaseVersion::parse("v1.2.0-rc2").unwrap().is_first_rc());
        assert!(!ReleaseVersion::parse("v1.2.1-rc1").unwrap().is_first_rc());
        assert!(!ReleaseVersion::parse("v1.2.0").unwrap().is_first_rc());
    }

    #[test]
    fn test_version_parse_invalid() {
        for input in [
            "v1.2",
            "1.2.3",
            "v1.2.3-beta1",
            "v1.2.3-rc",
            "v1.2.3.4",
            "vv1.2.3",
            "V1.2.3",
            "v1.2.3-rc1 ",
            "v1.-2.3",
            "",
            "v",
            "v99999999999.0.0",
            "v1.2.3-rc1-rc2",
            "v١.٢.٣",
        ] {
            let err = ReleaseVersion::parse(input).unwrap_err();
            assert_eq!(err.kind(), "invalid_format", "input {:?}", input);
        }
    }

    #[test]
    fn test_rc0_is_rejected() {
        for input in ["v1.2.3-rc0", "v1.2.0-rc0", "v1.2.0-rc00"] {
            assert_eq!(
                ReleaseVersion::parse(input).unwrap_err(),
                ValidationError::InvalidRelease {
                    input: input.to_string()
                }
            );
        }
    }

    #[test]
    fn test_leading_zeros_are_numeric() {
        let v = ReleaseVersion::parse("v1.02.0-rc03").unwrap();
        assert_eq!(v, ReleaseVersion::new(1, 2, 0, 3));
    }

    #[test]
    fn test_ordering_is_numeric() {
        let rc9 = ReleaseVersion::new(1, 2, 0, 9);
        let rc10 = ReleaseVersion::new(1, 2, 0, 10);
        assert!(rc10 > rc9);
        assert!(ReleaseVersion::new(1, 10, 0, 1) > ReleaseVersion::new(1, 9, 5, 7));
    }

    #[test]
    fn test_parse_rc_tag() {
        assert_eq!(
            ReleaseVersion::parse_rc_tag("v1.2.0-rc2"),
            Some(ReleaseVersion::new(1, 2, 0, 2))
        );
        assert_eq!(ReleaseVersion::parse_rc_tag("v1.2.0-rc0"), None);
        assert_eq!(ReleaseVersion::parse_rc_tag("v1.2.0"), None);
        assert_eq!(ReleaseVersion::parse_rc_tag("v1.2.0-rc2-hotfix"), None);
    }

    #[test]
    fn test_version_display_and_tag() {
        assert_eq!(ReleaseVersion::new(1, 2, 3, 0).to_string(), "1.2.3");
        assert_eq!(ReleaseVersion::new(1, 2, 0, 4).to_string(), "1.2.0-rc4");
        assert_eq!(ReleaseVersion::new(1, 2, 0, 4).tag(), "v1.2.0-rc4");
    }
}
