//! Postal code (CEP) syntax validation
//!
//! A [`PostalCode`] can only be obtained through [`PostalCode::parse`], so any
//! value of that type is known to be exactly eight ASCII digits.

use crate::error::{CepDistError, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static POSTAL_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("postal code pattern is valid"));

/// Check whether `code` is exactly eight ASCII digits
pub fn is_valid(code: &str) -> bool {
    POSTAL_CODE_PATTERN.is_match(code)
}

/// An eight-digit postal code that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Validate `raw` and wrap it
    pub fn parse(raw: &str) -> Result<Self> {
        if is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CepDistError::validation_with_code(
                ErrorCode::VALIDATION_POSTAL_CODE_FORMAT,
                format!("'{raw}' is not a valid postal code; enter exactly 8 digits"),
                Some("postal_code".to_string()),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional `NNNNN-NNN` rendering
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
