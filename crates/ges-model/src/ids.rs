#![deny(unsafe_code)]

//! National person identifiers (RUT) and procedure codes.
//!
//! Every table that carries an identifier goes through [`Identifier::normalize`]
//! or [`Identifier::parse_combined`] before any join. The check character is
//! always upper-cased so that `12345678-k` and `12345678-K` are the same key.

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A person identifier: numeric body plus check character.
///
/// Equality is exact on both parts, which is the same as comparing the
/// canonical `"{body}-{CHECK}"` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    body: u64,
    check: char,
}

impl Identifier {
    /// Build an identifier from separate body and check-character cells.
    ///
    /// Returns `None` when either part is missing or unparseable.
    pub fn normalize(body: &str, check: &str) -> Option<Self> {
        let body = parse_body(body)?;
        let check = parse_check(check)?;
        Some(Self { body, check })
    }

    /// Parse a combined `"body-check"` value such as `"12.345.678-k"`.
    pub fn parse_combined(raw: &str) -> Option<Self> {
        let (body, check) = raw.trim().rsplit_once('-')?;
        Self::normalize(body, check)
    }

    /// Numeric body of a value that may or may not carry a check character.
    ///
    /// `"12345678-9"`, `"12345678"` and `"12345678.0"` all yield `12345678`.
    pub fn parse_body(raw: &str) -> Option<u64> {
        let trimmed = raw.trim();
        match trimmed.rsplit_once('-') {
            Some((body, _)) => parse_body(body),
            None => parse_body(trimmed),
        }
    }

    pub fn body(&self) -> u64 {
        self.body
    }

    pub fn check(&self) -> char {
        self.check
    }

    /// Canonical `"{body}-{CHECK}"` form used as the lookup key.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }
}

fn parse_body(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let whole = strip_zero_fraction(trimmed);
    let digits: String = whole
        .chars()
        .filter(|ch| *ch != '.' && !ch.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_check(raw: &str) -> Option<char> {
    let trimmed = strip_zero_fraction(raw.trim());
    let mut chars = trimmed.chars();
    let ch = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    (ch.is_ascii_digit() || ch == 'K').then_some(ch)
}

/// Spreadsheet exports render numeric cells as `12345678.0`; thousands
/// groups always have three digits, so only one- or two-digit zero
/// fractions are stripped.
fn strip_zero_fraction(value: &str) -> &str {
    if let Some((whole, fraction)) = value.rsplit_once('.')
        && !whole.is_empty()
        && (1..=2).contains(&fraction.len())
        && fraction.chars().all(|ch| ch == '0')
    {
        return whole;
    }
    value
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}

impl FromStr for Identifier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_combined(s).ok_or_else(|| ModelError::InvalidIdentifier(s.to_string()))
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A procedure code ("trazadora").
///
/// Reference codes have seven digits; upstream data sometimes drops the
/// leading zero, so six-digit codes are padded on construction.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ProcedureCode(String);

impl ProcedureCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidProcedureCode(value));
        }
        Ok(Self(normalize_code(trimmed)))
    }

    /// Build a code from a reference constant; never blank.
    pub fn from_reference(code: &'static str) -> Self {
        Self(normalize_code(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Left-pad exactly-six-digit codes with one zero; anything else is unchanged.
pub fn normalize_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.len() == 6 && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    }
}

impl TryFrom<String> for ProcedureCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProcedureCode> for String {
    fn from(code: ProcedureCode) -> Self {
        code.0
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_lowercase_check() {
        let id = Identifier::normalize("12345678", "k").expect("valid");
        assert_eq!(id.to_string(), "12345678-K");
    }

    #[test]
    fn accepts_spreadsheet_float_cells() {
        let id = Identifier::normalize("12345678.0", "9.0").expect("valid");
        assert_eq!(id.body(), 12_345_678);
        assert_eq!(id.check(), '9');
    }

    #[test]
    fn accepts_thousands_separators() {
        let id = Identifier::parse_combined("12.345.678-5").expect("valid");
        assert_eq!(id.to_string(), "12345678-5");
        assert_eq!(Identifier::parse_body("12.345.000"), Some(12_345_000));
    }

    #[test]
    fn rejects_invalid_parts() {
        assert!(Identifier::normalize("", "K").is_none());
        assert!(Identifier::normalize("12345678", "").is_none());
        assert!(Identifier::normalize("12345678", "X").is_none());
        assert!(Identifier::normalize("12345678", "10").is_none());
        assert!(Identifier::normalize("ABC", "1").is_none());
        assert!(Identifier::parse_combined("12345678").is_none());
    }

    #[test]
    fn body_ignores_check_character() {
        assert_eq!(Identifier::parse_body("12345678-9"), Some(12_345_678));
        assert_eq!(Identifier::parse_body(" 12345678 "), Some(12_345_678));
        assert_eq!(Identifier::parse_body("nan"), None);
    }

    #[test]
    fn six_digit_codes_are_padded() {
        assert_eq!(normalize_code("101113"), "0101113");
        assert_eq!(normalize_code("0101113"), "0101113");
        assert_eq!(normalize_code("3902001"), "3902001");
        assert_eq!(normalize_code("12A456"), "12A456");
        assert_eq!(ProcedureCode::new(" 101110 ").expect("code").as_str(), "0101110");
    }
}
