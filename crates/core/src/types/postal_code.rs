//! Brazilian postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input does not contain exactly eight digits.
    #[error("postal code must have exactly {expected} digits (got {digits})")]
    WrongLength {
        /// Number of digits expected.
        expected: usize,
        /// Number of digits found after stripping separators.
        digits: usize,
    },
}

/// A Brazilian postal code.
///
/// Parsing is lenient about formatting: every non-digit character is
/// stripped first, so `"08790-000"`, `"08790000"` and `" 08.790-000 "` all
/// parse to the same code.
///
/// ## Constraints
///
/// - Exactly 8 digits after stripping non-digit characters
///
/// ## Examples
///
/// ```
/// use pipo_core::PostalCode;
///
/// assert_eq!(PostalCode::parse("08790-000").unwrap().as_str(), "08790000");
/// assert!(PostalCode::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a CEP.
    pub const LENGTH: usize = 8;

    /// Parse a `PostalCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::WrongLength`] if the input does not contain
    /// exactly eight digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.len() != Self::LENGTH {
            return Err(PostalCodeError::WrongLength {
                expected: Self::LENGTH,
                digits: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the eight digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code starts with the given digit prefix.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Formatted as `NNNNN-NNN`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (head, tail) = self.0.split_at(5);
        format!("{head}-{tail}")
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
