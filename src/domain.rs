use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::MirrorError;

/// Every mirrored URL lives below this prefix; listing hrefs are relative to it.
pub const HOST_PREFIX: &str = "https://standards.iso.org";

const ISO_NAME_PATTERN: &str = r"(iso)[^/]*/(\d+)/(-\d+)/([^/]+)";

/// Root listing URL, validated against [`HOST_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootUrl(String);

impl RootUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path below the host, without the separator that follows the prefix.
    pub fn host_relative(&self) -> &str {
        let rest = self.0.strip_prefix(HOST_PREFIX).unwrap_or(&self.0);
        let mut chars = rest.chars();
        chars.next();
        chars.as_str()
    }

    /// Human readable folder name such as `ISO 12345 -2 ED-1`.
    ///
    /// Returns `None` when the URL does not follow the
    /// `iso…/<id>/-<part>/<segment>` shape; callers fall back to the
    /// default storage root.
    pub fn beautify(&self) -> Option<String> {
        beautify_name(self.host_relative())
    }
}

impl fmt::Display for RootUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RootUrl {
    type Err = MirrorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !trimmed.starts_with(HOST_PREFIX) {
            return Err(MirrorError::InvalidInput(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

pub fn beautify_name(path: &str) -> Option<String> {
    let pattern = Regex::new(ISO_NAME_PATTERN).ok()?;
    let captures = pattern.captures(path)?;
    let parts = captures
        .iter()
        .skip(1)
        .map(|group| group.map(|m| m.as_str()))
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(" ").to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
    Unknown(String),
}

impl EntryKind {
    /// Classifies a `data-sort` marker such as `fa-folder` or `fa-file-pdf`.
    pub fn classify(marker: &str) -> Self {
        if marker.contains("folder") {
            EntryKind::Folder
        } else if marker.contains("file") {
            EntryKind::File
        } else {
            EntryKind::Unknown(marker.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub kind: EntryKind,
    pub url: String,
}

impl ListingEntry {
    pub fn from_row(marker: &str, href: &str) -> Self {
        Self {
            kind: EntryKind::classify(marker),
            url: format!("{HOST_PREFIX}{href}"),
        }
    }
}
