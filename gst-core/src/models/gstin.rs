use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CHECKSUM_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

static GSTIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .expect("GSTIN pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GstinError {
    #[error("GSTIN must be 15 characters, got {0}")]
    Length(usize),

    #[error("GSTIN '{0}' does not match the registration format")]
    Format(String),

    #[error("GSTIN '{gstin}' has check character '{found}', expected '{expected}'")]
    Checksum {
        gstin: String,
        found: char,
        expected: char,
    },
}

/// A validated GST identification number.
///
/// Layout: two-digit state code, ten-character PAN, entity number, the
/// literal `Z`, and a check character computed over the first fourteen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl Gstin {
    /// Parses and validates a GSTIN. Surrounding whitespace is ignored and
    /// letters are upper-cased first.
    pub fn parse(input: &str) -> Result<Self, GstinError> {
        let normalized = input.trim().to_ascii_uppercase();

        let len = normalized.chars().count();
        if len != 15 {
            return Err(GstinError::Length(len));
        }
        if !GSTIN_PATTERN.is_match(&normalized) {
            return Err(GstinError::Format(normalized));
        }

        let bytes = normalized.as_bytes();
        let expected = check_character(&bytes[..14]);
        let found = char::from(bytes[14]);
        if found != expected {
            return Err(GstinError::Checksum {
                gstin: normalized,
                found,
                expected,
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Jurisdiction code of the registered holder.
    pub fn state_code(&self) -> u8 {
        // Format check guarantees two leading ASCII digits.
        let bytes = self.0.as_bytes();
        (bytes[0] - b'0') * 10 + (bytes[1] - b'0')
    }

    /// The holder's PAN embedded at positions 3 to 12.
    pub fn pan(&self) -> &str {
        &self.0[2..12]
    }
}

/// Mod-36 check character: odd positions weigh 1, even positions weigh 2,
/// each product contributes its base-36 quotient plus remainder.
fn check_character(body: &[u8]) -> char {
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = CHECKSUM_ALPHABET
                .iter()
                .position(|&a| a == c)
                .unwrap_or(0) as u32;
            let product = value * if i % 2 == 0 { 1 } else { 2 };
            product / 36 + product % 36
        })
        .sum();
    let index = (36 - sum % 36) % 36;
    char::from(CHECKSUM_ALPHABET[index as usize])
}

impl FromStr for Gstin {
    type Err = GstinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Gstin {
    type Error = GstinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gstin> for String {
    fn from(value: Gstin) -> Self {
        value.0
    }
}

impl fmt::Display for Gstin {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}
