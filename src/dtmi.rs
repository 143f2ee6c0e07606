//! DTMI parsing and validation
//!
//! A Digital Twin Model Identifier has the shape
//! `dtmi:<label>(:<label>)*;<version>` where each label starts with a letter,
//! may contain alphanumerics and underscores, and ends alphanumeric. The
//! version is 1 to 9 digits with no leading zero.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};

/// Validation regex for the published DTMI grammar.
static DTMI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^dtmi:[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?(?::[A-Za-z](?:[A-Za-z0-9_]*[A-Za-z0-9])?)*;[1-9][0-9]{0,8}$",
    )
    .unwrap()
});

/// A validated Digital Twin Model Identifier.
///
/// Construction goes through [`Dtmi::new`], so every instance is known to
/// match the DTMI grammar before any I/O is attempted with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dtmi(String);

impl Dtmi {
    /// Validate `value` and wrap it.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !Self::is_valid(&value) {
            return Err(ResolverError::InvalidDtmiFormat(value));
        }
        Ok(Self(value))
    }

    /// Pure syntactic check of the DTMI grammar. No I/O.
    pub fn is_valid(value: &str) -> bool {
        DTMI_REGEX.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier with its trailing `;version` stripped.
    ///
    /// Every id nested inside a model must start with this prefix to be
    /// namespace conformant.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once(';').map_or(self.0.as_str(), |(ns, _)| ns)
    }

    /// The numeric version suffix.
    pub fn version(&self) -> &str {
        self.0.rsplit_once(';').map_or("", |(_, v)| v)
    }
}

impl fmt::Display for Dtmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Dtmi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Dtmi {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
