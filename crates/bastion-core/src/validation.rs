//! Field validation rule tables.
//!
//! Each validated field owns an ordered slice of [`Rule`]s. A table is
//! evaluated front to back and the first failing rule becomes a
//! [`BastionError::Validation`] naming the field.
//!
//! Lengths are counted in characters, not bytes. A *special character*
//! is anything that is not a letter, a digit, `_` or whitespace.

use uuid::Uuid;

use crate::error::{BastionError, BastionResult};

/// A single string constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The value must not be empty.
    Required,
    /// At least `n` characters.
    MinLength(usize),
    /// At most `n` characters.
    MaxLength(usize),
    /// Only letters, digits and the listed extra characters.
    Charset(&'static [char]),
    /// At least `n` decimal digits.
    MinDigits(usize),
    /// At least `n` special characters.
    MinSpecialChars(usize),
}

impl Rule {
    /// Returns a human readable reason when `value` breaks the rule.
    pub fn check(&self, value: &str) -> Option<String> {
        match *self {
            Rule::Required if value.is_empty() => Some("is required".into()),
            Rule::MinLength(n) if value.chars().count() < n => {
                Some(format!("should be at least {n} characters long"))
            }
            Rule::MaxLength(n) if value.chars().count() > n => {
                Some(format!("should be at most {n} characters long"))
            }
            Rule::Charset(extra) => value
                .chars()
                .find(|c| !c.is_alphanumeric() && !extra.contains(c))
                .map(|c| format!("contains invalid character {c:?}")),
            Rule::MinDigits(n) if value.chars().filter(|c| c.is_ascii_digit()).count() < n => {
                Some(format!("should contain at least {n} digits"))
            }
            Rule::MinSpecialChars(n)
                if value.chars().filter(|c| is_special_char(*c)).count() < n =>
            {
                Some(format!("should contain at least {n} special characters"))
            }
            _ => None,
        }
    }
}

/// Letters, digits, `_` and whitespace are ordinary; everything else is special.
pub fn is_special_char(c: char) -> bool {
    !c.is_alphanumeric() && c != '_' && !c.is_whitespace()
}

/// The ordered rules for one named field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }

    pub fn validate(&self, value: &str) -> BastionResult<()> {
        match self.rules.iter().find_map(|rule| rule.check(value)) {
            Some(message) => Err(BastionError::validation(self.field, message)),
            None => Ok(()),
        }
    }
}

/// Rejects the nil UUID.
pub fn require_non_nil(field: &str, id: Uuid) -> BastionResult<()> {
    if id.is_nil() {
        return Err(BastionError::validation(field, "must not be the nil UUID"));
    }
    Ok(())
}
