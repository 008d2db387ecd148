use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Architectures for which Ubuntu publishes kernel debug-symbol packages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Architecture {
    #[value(name = "amd64")]
    Amd64,
    #[value(name = "i386")]
    I386,
    #[value(name = "armhf")]
    Armhf,
    #[value(name = "arm64")]
    Arm64,
    #[value(name = "s390x")]
    S390x,
    #[value(name = "ppc64")]
    Ppc64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::I386 => "i386",
            Architecture::Armhf => "armhf",
            Architecture::Arm64 => "arm64",
            Architecture::S390x => "s390x",
            Architecture::Ppc64 => "ppc64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the listing is scanned for candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Examine every entry and keep all that match.
    #[default]
    ScanAll,
    /// Stop at the first entry that does not contain the version token.
    StopAtFirstMiss,
}

/// A hyperlink target taken from the package listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub href: String,
}

impl ListingEntry {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// Last path segment of the link, without query or fragment.
    ///
    /// This is the name the package is stored under locally and the segment
    /// appended to the index URL when fetching it.
    pub fn file_name(&self) -> &str {
        let path = self.href.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or(path)
    }
}
