//! Label filter model.

use serde::{Deserialize, Serialize};

/// Operator of a label filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Label equals the value.
    Equals,
    /// Label does not equal the value.
    NotEquals,
    /// Label matches the value as a regular expression.
    Regex,
    /// Label does not match the value as a regular expression.
    NotRegex,
    /// Label contains the value as a substring.
    Contains,
    /// Label does not contain the value as a substring.
    NotContains,
}

impl FilterOperator {
    /// Returns the PromQL matcher operator.
    #[must_use]
    pub const fn matcher(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Regex | Self::Contains => "=~",
            Self::NotRegex | Self::NotContains => "!~",
        }
    }

    /// Returns true for the substring operators, which wrap the value in `.*`.
    #[must_use]
    pub const fn is_substring(&self) -> bool {
        matches!(self, Self::Contains | Self::NotContains)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Regex => "regex",
            Self::NotRegex => "not_regex",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
        };
        f.write_str(name)
    }
}

/// A label-matcher constraint applied to a metric query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// The label name.
    pub label: String,
    /// The comparison operator.
    pub operator: FilterOperator,
    /// The value to compare against.
    pub value: String,
}

impl Filter {
    /// Creates a new filter.
    #[must_use]
    pub fn new(label: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates an equality filter.
    #[must_use]
    pub fn equals(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, FilterOperator::Equals, value)
    }

    /// Returns true if the filter has a label to match on.
    ///
    /// Filters being edited in a picker may not have a label yet.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.label.trim().is_empty()
    }
}
