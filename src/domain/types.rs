//! Shared domain enumerations for feed windows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Sort order understood by the remote page listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Updated,
    Created,
    Accessed,
    Linked,
    Views,
    Title,
    UpdatedByMe,
}

impl SortKey {
    /// Query-string spelling expected by the remote.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Updated => "updated",
            SortKey::Created => "created",
            SortKey::Accessed => "accessed",
            SortKey::Linked => "linked",
            SortKey::Views => "views",
            SortKey::Title => "title",
            SortKey::UpdatedByMe => "updatedbyMe",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace('_', "").to_ascii_lowercase();
        match normalized.as_str() {
            "updated" => Ok(SortKey::Updated),
            "created" => Ok(SortKey::Created),
            "accessed" => Ok(SortKey::Accessed),
            "linked" => Ok(SortKey::Linked),
            "views" => Ok(SortKey::Views),
            "title" => Ok(SortKey::Title),
            "updatedbyme" => Ok(SortKey::UpdatedByMe),
            _ => Err(DomainError::validation(format!(
                "unknown sort key `{value}`"
            ))),
        }
    }
}

impl TryFrom<String> for SortKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

/// How much of the remote collection one aggregation pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpan {
    /// Only the first response; used for the "latest notes" listing.
    FirstPage,
    /// Every page from `skip` through the remote's reported total.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_accepts_remote_and_config_spellings() {
        assert_eq!("updatedbyMe".parse::<SortKey>().unwrap(), SortKey::UpdatedByMe);
        assert_eq!("updated_by_me".parse::<SortKey>().unwrap(), SortKey::UpdatedByMe);
        assert_eq!("Views".parse::<SortKey>().unwrap(), SortKey::Views);
        assert!("newest".parse::<SortKey>().is_err());
    }

    #[test]
    fn sort_key_query_value_matches_remote_spelling() {
        assert_eq!(SortKey::UpdatedByMe.as_str(), "updatedbyMe");
        assert_eq!(SortKey::default().to_string(), "updated");
    }
}
