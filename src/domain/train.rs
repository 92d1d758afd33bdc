use super::version::ReleaseVersion;

/// Identifiers derived from a version for its release train.
///
/// Nothing here is stored independently of the version; every field is a
/// pure function of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTrain {
    pub version: ReleaseVersion,
    /// "MAJOR.MINOR"
    pub major_minor: String,
    /// "vMAJOR.MINOR.x"
    pub release_branch: String,
    /// Tag the release will be published under
    pub tag: String,
}

impl ReleaseTrain {
    pub fn new(version: ReleaseVersion) -> Self {
        let major_minor = format!("{}.{}", version.major, version.minor);
        let release_branch = format!("v{}.x", major_minor);

        ReleaseTrain {
            version,
            major_minor,
            release_branch,
            tag: version.tag(),
        }
    }

    /// Marker content the version file must hold before the first
    /// release candidate of this minor line
    pub fn expected_marker(&self) -> String {
        format!("{}.0-rc0", self.major_minor)
    }

    /// Tag of the preceding release candidate within the same patch.
    /// Only defined from rc2 upwards.
    pub fn previous_rc_tag(&self) -> Option<String> {
        if self.version.rc > 1 {
            Some(format!(
                "v{}.{}-rc{}",
                self.major_minor,
                self.version.patch,
                self.version.rc - 1
            ))
        } else {
            None
        }
    }

    /// Glob matching every release-candidate tag of this patch,
    /// including the `-rc0` marker
    pub fn rc_tag_glob(&self) -> String {
        format!("v{}.{}-rc*", self.major_minor, self.version.patch)
    }

    /// Highest release candidate of this patch among `tags`, with the tag
    /// name it was listed under.
    ///
    /// Tags are compared as parsed versions, so `-rc10` beats `-rc9`.
    /// Markers and unrelated tags that happen to match the glob are ignored.
    pub fn last_rc<'a, I>(&self, tags: I) -> Option<(ReleaseVersion, &'a String)>
    where
        I: IntoIterator<Item = &'a String>,
    {
        tags.into_iter()
            .filter_map(|tag| ReleaseVersion::parse_rc_tag(tag).map(|rc| (rc, tag)))
            .filter(|(candidate, _)| candidate.same_release(&self.version))
            .max_by_key(|(candidate, _)| *candidate)
    }
}
