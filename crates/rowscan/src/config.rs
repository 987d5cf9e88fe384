use crate::{
    error::{Result, ScanError},
    naming::to_snake_case,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How a struct member name turns into its default column name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    /// `FooColumn` -> `foo_column`.
    #[default]
    Snake,
    /// Member names are used as-is.
    Verbatim,
}

impl NameCase {
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameCase::Snake => Cow::Owned(to_snake_case(name)),
            NameCase::Verbatim => Cow::Borrowed(name),
        }
    }
}

/// Options that influence how column names are resolved against a shape.
///
/// The config is part of the field-index cache key: the same struct scanned
/// under two configs gets two indexes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Joins an embedded member's prefix and the column name beneath it.
    pub column_separator: String,
    pub name_case: NameCase,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            column_separator: ".".to_string(),
            name_case: NameCase::Snake,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_separator(mut self, separator: impl Into<String>) -> Self {
        self.column_separator = separator.into();
        self
    }

    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = name_case;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.column_separator.is_empty() {
            return Err(ScanError::InvalidConfig(
                "column separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Joins `prefix` and `name` with the configured separator.
    pub(crate) fn join(&self, prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}{}{name}", self.column_separator)
        }
    }
}
