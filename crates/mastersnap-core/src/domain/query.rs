use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::QueryError;

/// Free-text search query sent to the formations endpoint.
///
/// Whitespace is collapsed so that `mécanique   des fluides` and a CLI
/// word list joined with single spaces produce the same query (and the
/// same workbook name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Parse a raw query, trimming and collapsing inner whitespace.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(normalized))
    }

    /// Build a query from separate CLI words.
    pub fn from_words<I, S>(words: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Spaces replaced by underscores, for use in output file names.
    pub fn file_stem(&self) -> String {
        self.0.replace(' ', "_")
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SearchQuery {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SearchQuery {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SearchQuery> for String {
    fn from(value: SearchQuery) -> Self {
        value.0
    }
}
