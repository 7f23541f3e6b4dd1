use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Container format a catalog upload is declared to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    #[default]
    Zip,
    Tar,
}

impl ArchiveKind {
    /// Resolve the kind declared by a caller.
    ///
    /// A missing or blank value means zip. The value is trimmed and matched
    /// case-insensitively.
    pub fn from_declared(declared: Option<&str>) -> Result<Self, CatalogError> {
        match declared.map(str::trim) {
            None | Some("") => Ok(ArchiveKind::Zip),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveKind::Zip),
            "tar" => Ok(ArchiveKind::Tar),
            _ => Err(CatalogError::UnsupportedArchiveType(s.to_string())),
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
