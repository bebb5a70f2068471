//! Path templates with `:name` placeholders.
//!
//! A token is a `:` followed by an identifier, so `/todos/:id/done` has the
//! single token `id`. Matching is whole-token: a value for `id` leaves `:idx`
//! alone.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("token pattern is valid"));

/// A parsed path template such as `/todos/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    tokens: Vec<String>,
}

impl PathTemplate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut tokens: Vec<String> = Vec::new();
        for caps in TOKEN.captures_iter(&raw) {
            let name = &caps[1];
            if !tokens.iter().any(|t| t == name) {
                tokens.push(name.to_string());
            }
        }
        Self { raw, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Distinct token names in order of first appearance.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Replace every occurrence of each bound token.
    ///
    /// `values` are `(name, value)` pairs in binding order; for a repeated name
    /// the last pair wins. Tokens without a value are left as they are.
    pub fn substitute(&self, values: &[(&str, String)]) -> String {
        if values.is_empty() {
            return self.raw.clone();
        }
        TOKEN
            .replace_all(&self.raw, |caps: &Captures<'_>| {
                let name = &caps[1];
                values
                    .iter()
                    .rev()
                    .find(|(bound, _)| *bound == name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for PathTemplate {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
