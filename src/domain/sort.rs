//! Sort expressions exchanged between client and server.
//!
//! On the wire a sort is `"<field path> [asc|desc]"`. Request-time parsing is
//! lenient and never fails; anything it cannot understand simply means "no
//! ordering". Default sorts supplied by the application are checked strictly
//! when the interceptor is built.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn from_descending(descending: bool) -> Self {
        if descending { Self::Desc } else { Self::Asc }
    }

    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Desc)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A requested ordering: a dot-separated field path and a direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field_path: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field_path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field_path: field_path.into(),
            direction,
        }
    }

    pub fn asc(field_path: impl Into<String>) -> Self {
        Self::new(field_path, SortDirection::Asc)
    }

    pub fn desc(field_path: impl Into<String>) -> Self {
        Self::new(field_path, SortDirection::Desc)
    }

    pub const fn is_descending(&self) -> bool {
        self.direction.is_descending()
    }

    /// Whether the path traverses a nested record.
    pub fn is_nested(&self) -> bool {
        self.field_path.contains('.')
    }

    /// Parses a request-supplied sort expression.
    ///
    /// Blank input or more than two segments yield `None`. A second segment
    /// containing `desc` in any casing selects descending order; anything else
    /// is ascending.
    pub fn parse(expression: &str) -> Option<Self> {
        let segments: Vec<&str> = expression.split_whitespace().collect();
        match segments.as_slice() {
            [field] => Some(Self::asc(*field)),
            [field, direction] => {
                let descending = direction.to_ascii_lowercase().contains("desc");
                Some(Self::new(*field, SortDirection::from_descending(descending)))
            }
            _ => None,
        }
    }

    /// Parses an application-supplied default sort, rejecting malformed input.
    ///
    /// Unlike [`SortSpec::parse`], the direction segment must be exactly `asc`
    /// or `desc` (any casing).
    pub fn parse_default(expression: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidDefaultSort(expression.to_string());
        let segments: Vec<&str> = expression.split_whitespace().collect();
        match segments.as_slice() {
            [field] => Ok(Self::asc(*field)),
            [field, direction] => match direction.to_ascii_lowercase().as_str() {
                "asc" => Ok(Self::asc(*field)),
                "desc" => Ok(Self::desc(*field)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field_path, self.direction.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment_is_ascending() {
        assert_eq!(SortSpec::parse("userName"), Some(SortSpec::asc("userName")));
    }

    #[test]
    fn second_segment_containing_desc_is_descending() {
        assert_eq!(SortSpec::parse("email DESC"), Some(SortSpec::desc("email")));
        assert_eq!(
            SortSpec::parse("email descending"),
            Some(SortSpec::desc("email"))
        );
        assert_eq!(SortSpec::parse("email up"), Some(SortSpec::asc("email")));
    }

    #[test]
    fn blank_or_three_segments_mean_no_sort() {
        assert_eq!(SortSpec::parse("   "), None);
        assert_eq!(SortSpec::parse("user name desc"), None);
    }

    #[test]
    fn default_sort_requires_explicit_direction_word() {
        assert_eq!(SortSpec::parse_default("id"), Ok(SortSpec::asc("id")));
        assert_eq!(SortSpec::parse_default("id Desc"), Ok(SortSpec::desc("id")));
        assert_eq!(
            SortSpec::parse_default("id down"),
            Err(ConfigError::InvalidDefaultSort("id down".into()))
        );
        assert!(SortSpec::parse_default("a b c").is_err());
        assert!(SortSpec::parse_default("").is_err());
    }

    #[test]
    fn displays_as_wire_expression() {
        assert_eq!(
            SortSpec::desc("favoriteAnimal.name").to_string(),
            "favoriteAnimal.name desc"
        );
    }
}
