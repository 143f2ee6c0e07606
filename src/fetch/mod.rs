//! Pluggable fetch backends for model repositories
//!
//! A repository is addressed either on the local filesystem or over HTTP.
//! The backend is chosen once, when the client is constructed, based on the
//! location variant; call sites only see the [`ModelFetcher`] capability.

mod local;
mod remote;

pub use local::LocalFetcher;
pub use remote::RemoteFetcher;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::convention::EXPANDED_EXTENSION;
use crate::dtmi::Dtmi;
use crate::error::Result;

/// Where a model repository lives. Fixed for the lifetime of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryLocation {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A remote HTTP(S) base URL.
    Remote(String),
}

impl RepositoryLocation {
    /// Classify a repository argument by scheme.
    ///
    /// `http://` and `https://` prefixes select the remote backend; a
    /// `file://` prefix is stripped; anything else is treated as a local
    /// directory path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Remote(value.trim_end_matches('/').to_string())
        } else if let Some(stripped) = value.strip_prefix("file://") {
            Self::Local(PathBuf::from(stripped))
        } else {
            Self::Local(PathBuf::from(value))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// The location as a base string for path joining.
    pub fn base(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => url.clone(),
        }
    }

    /// The local directory, when this is a local location.
    pub fn as_local_dir(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path.as_path()),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base())
    }
}

/// Raw model text plus the path or URL it was fetched from.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The raw definition text.
    pub definition: String,
    /// The path or URL the definition was read from.
    pub path: String,
}

impl FetchResult {
    /// Whether the fetched document is a precomputed dependency closure.
    pub fn expanded(&self) -> bool {
        self.path.ends_with(EXPANDED_EXTENSION)
    }
}

/// Capability to retrieve raw model text for a DTMI from a repository.
pub trait ModelFetcher {
    /// The path or URL the model would be fetched from.
    fn get_path(&self, dtmi: &Dtmi, location: &RepositoryLocation) -> String;

    /// Fetch the model definition. With `try_expanded`, the precomputed
    /// `.expanded.json` sibling is probed first, falling back to the plain
    /// document when it is absent.
    fn fetch(
        &self,
        dtmi: &Dtmi,
        location: &RepositoryLocation,
        try_expanded: bool,
    ) -> Result<FetchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse_schemes() {
        assert_eq!(
            RepositoryLocation::parse("https://repo.example.com/models/"),
            RepositoryLocation::Remote("https://repo.example.com/models".to_string())
        );
        assert_eq!(
            RepositoryLocation::parse("file:///var/models"),
            RepositoryLocation::Local(PathBuf::from("/var/models"))
        );
        assert_eq!(
            RepositoryLocation::parse("/var/models"),
            RepositoryLocation::Local(PathBuf::from("/var/models"))
        );
        assert!(RepositoryLocation::parse("http://localhost:8080").is_remote());
        assert!(!RepositoryLocation::parse("./models").is_remote());
    }

    #[test]
    fn test_fetch_result_expanded_flag() {
        let plain = FetchResult {
            definition: String::new(),
            path: "/repo/dtmi/com/example/thermostat-1.json".to_string(),
        };
        let expanded = FetchResult {
            definition: String::new(),
            path: "/repo/dtmi/com/example/thermostat-1.expanded.json".to_string(),
        };
        assert!(!plain.expanded());
        assert!(expanded.expanded());
    }
}
