//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a secret or token for debug output.
///
/// - Inputs shorter than 12 characters are entirely redacted.
/// - Longer inputs keep their first three and last three characters so
///   different tokens can still be told apart in logs.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.chars().count();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            // Slice on char boundaries.
            let head = self.0.char_indices().nth(3).map_or(0, |(i, _)| i);
            let tail = self.0.char_indices().nth(length - 3).map_or(0, |(i, _)| i);
            f.write_str(&self.0[..head])?;
            f.write_str("***")?;
            f.write_str(&self.0[tail..])
        }
    }
}
