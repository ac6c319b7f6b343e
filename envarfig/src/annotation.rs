//! Annotation parsing for `#[env("...")]` strings.
//!
//! An annotation names the environment variable and optionally carries
//! properties:
//!
//! ```text
//! NAME[,PROPERTY]*
//! PROPERTY := required | required=BOOL | default=VALUE | delimiter='X'
//!           | isstring | isstring=BOOL
//! ```
//!
//! Splitting happens on top-level commas only; commas inside single or
//! double quotes belong to the surrounding token.

use serde::Serialize;

use crate::property::RESOLVERS;

/// Delimiter used for sequences and maps unless the annotation sets one.
pub const DEFAULT_DELIMITER: &str = ",";

/// Parsed form of a field annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Environment variable name.
    ///
    /// May be empty when the annotation starts with a comma; such a
    /// variable is never present in the environment.
    pub name: String,

    /// Text used when the variable is not set. Empty means no default.
    pub default_value: String,

    /// Fail when the variable is not set and there is no default.
    pub required: bool,

    /// Separator for sequence and map values.
    pub delimiter: String,

    /// Take `u8` / `char` sequences from the raw text instead of splitting.
    pub is_string: bool,
}

impl FieldDescriptor {
    /// Create a descriptor with default properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: String::new(),
            required: false,
            delimiter: DEFAULT_DELIMITER.to_string(),
            is_string: false,
        }
    }

    /// Parse an annotation string.
    ///
    /// Never fails: tokens that no resolver recognizes are ignored, and
    /// malformed property values leave the corresponding property at its
    /// default.
    pub fn parse(annotation: &str) -> Self {
        let mut tokens = split_respecting_quotes(annotation).into_iter();
        let mut descriptor = Self::new(tokens.next().unwrap_or_default());

        for token in tokens {
            for resolver in RESOLVERS {
                resolver.try_apply(&token, &mut descriptor);
            }
        }

        descriptor
    }
}

/// Split an annotation on commas that are not inside quotes.
///
/// A quote preceded by a backslash does not open or close a quoted span.
/// Every token is trimmed. A trailing empty token is dropped.
pub fn split_respecting_quotes(annotation: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut part = String::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for c in annotation.chars() {
        if (c == '\'' || c == '"') && prev != Some('\\') {
            match quote {
                Some(open) if open == c => quote = None,
                Some(_) => {}
                None => quote = Some(c),
            }
        }

        if c == ',' && quote.is_none() {
            parts.push(part.trim().to_string());
            part.clear();
        } else {
            part.push(c);
        }
        prev = Some(c);
    }

    if !part.is_empty() {
        parts.push(part.trim().to_string());
    }

    parts
}
