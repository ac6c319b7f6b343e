//! Property resolvers for annotation tokens.
//!
//! Each resolver recognizes one keyword anywhere in a token (case-insensitive)
//! and updates the descriptor. Tokens a resolver does not recognize are left
//! alone, so unknown properties are inert.

use crate::annotation::FieldDescriptor;

/// A rule that applies one annotation property to a descriptor.
pub trait PropertyResolver {
    /// Apply `token` to `descriptor` if it carries this resolver's keyword.
    fn try_apply(&self, token: &str, descriptor: &mut FieldDescriptor);
}

/// All resolvers, offered every property token in this order.
pub(crate) const RESOLVERS: &[&dyn PropertyResolver] =
    &[&Required, &DefaultValue, &Delimiter, &IsString];

/// `required`, `required=BOOL`
///
/// Only a literal `false` turns the flag off; any other value turns it on.
#[derive(Debug, Clone, Copy)]
pub struct Required;

impl PropertyResolver for Required {
    fn try_apply(&self, token: &str, descriptor: &mut FieldDescriptor) {
        if !has_keyword(token, "required") {
            return;
        }
        descriptor.required = match flag_value(token) {
            Some(value) => value != "false",
            None => true,
        };
    }
}

/// `default=VALUE`, `default='VALUE'`, `default="VALUE"`
///
/// The value is lower-cased. A bare `default` is ignored.
#[derive(Debug, Clone, Copy)]
pub struct DefaultValue;

impl PropertyResolver for DefaultValue {
    fn try_apply(&self, token: &str, descriptor: &mut FieldDescriptor) {
        if !has_keyword(token, "default") {
            return;
        }
        let Some(value) = assigned_value(token) else {
            return;
        };
        descriptor.default_value = match unquote(&value) {
            Some(inner) => inner.to_string(),
            None => value,
        };
    }
}

/// `delimiter='X'`, `delimiter="X"`
///
/// Unquoted or otherwise malformed values are ignored and the default
/// delimiter stays in place.
#[derive(Debug, Clone, Copy)]
pub struct Delimiter;

impl PropertyResolver for Delimiter {
    fn try_apply(&self, token: &str, descriptor: &mut FieldDescriptor) {
        if !has_keyword(token, "delimiter") {
            return;
        }
        let Some(value) = assigned_value(token) else {
            return;
        };
        if let Some(inner) = unquote(&value) {
            descriptor.delimiter = inner.to_string();
        }
    }
}

/// `isstring`, `isstring=BOOL`
#[derive(Debug, Clone, Copy)]
pub struct IsString;

impl PropertyResolver for IsString {
    fn try_apply(&self, token: &str, descriptor: &mut FieldDescriptor) {
        if !has_keyword(token, "isstring") {
            return;
        }
        match flag_value(token) {
            Some(value) if value.contains("true") => descriptor.is_string = true,
            Some(value) if value.contains("false") => {}
            _ => descriptor.is_string = true,
        }
    }
}

fn has_keyword(token: &str, keyword: &str) -> bool {
    token.to_lowercase().contains(keyword)
}

/// Text between the first and second `=`, trimmed and lower-cased.
fn flag_value(token: &str) -> Option<String> {
    token
        .split('=')
        .nth(1)
        .map(|value| value.trim().to_lowercase())
}

/// Everything after the first `=`, trimmed and lower-cased.
fn assigned_value(token: &str) -> Option<String> {
    token
        .split_once('=')
        .map(|(_, value)| value.trim().to_lowercase())
}

/// Strip one pair of matching outer quotes and trim the inside.
fn unquote(value: &str) -> Option<&str> {
    let inner = value
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| {
            value
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
        })?;
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(resolver: &dyn PropertyResolver, token: &str) -> FieldDescriptor {
        let mut descriptor = FieldDescriptor::new("NAME");
        resolver.try_apply(token, &mut descriptor);
        descriptor
    }

    #[test]
    fn test_required_bare_and_true() {
        assert!(apply(&Required, "required").required);
        assert!(apply(&Required, "required=true").required);
        assert!(apply(&Required, "REQUIRED = TRUE").required);
    }

    #[test]
    fn test_required_false() {
        assert!(!apply(&Required, "required=false").required);
        assert!(!apply(&Required, "required= False ").required);
    }

    #[test]
    fn test_required_garbage_is_true() {
        assert!(apply(&Required, "required=garbage").required);
        assert!(apply(&Required, "required=").required);
    }

    #[test]
    fn test_required_ignores_other_tokens() {
        assert!(!apply(&Required, "default=x").required);
    }

    #[test]
    fn test_default_quote_forms() {
        assert_eq!(apply(&DefaultValue, "default='x'").default_value, "x");
        assert_eq!(apply(&DefaultValue, "default=\"x\"").default_value, "x");
        assert_eq!(apply(&DefaultValue, "default=x").default_value, "x");
        assert_eq!(apply(&DefaultValue, "default=' x '").default_value, "x");
    }

    #[test]
    fn test_default_is_lowercased() {
        assert_eq!(
            apply(&DefaultValue, "default=LocalHost").default_value,
            "localhost"
        );
    }

    #[test]
    fn test_default_keeps_later_equals() {
        assert_eq!(apply(&DefaultValue, "default=a=b").default_value, "a=b");
    }

    #[test]
    fn test_default_mismatched_quotes_kept() {
        assert_eq!(apply(&DefaultValue, "default='x\"").default_value, "'x\"");
    }

    #[test]
    fn test_default_bare_keyword_ignored() {
        assert_eq!(apply(&DefaultValue, "default").default_value, "");
    }

    #[test]
    fn test_delimiter_quoted() {
        assert_eq!(apply(&Delimiter, "delimiter=';'").delimiter, ";");
        assert_eq!(apply(&Delimiter, "delimiter=\"|\"").delimiter, "|");
        assert_eq!(apply(&Delimiter, "delimiter='::'").delimiter, "::");
    }

    #[test]
    fn test_delimiter_is_lowercased() {
        assert_eq!(apply(&Delimiter, "delimiter='X'").delimiter, "x");
        assert_eq!(apply(&Delimiter, "DELIMITER=\"AND\"").delimiter, "and");
    }

    #[test]
    fn test_delimiter_malformed_ignored() {
        assert_eq!(apply(&Delimiter, "delimiter=;").delimiter, ",");
        assert_eq!(apply(&Delimiter, "delimiter").delimiter, ",");
        assert_eq!(apply(&Delimiter, "delimiter=';\"").delimiter, ",");
        assert_eq!(apply(&Delimiter, "delimiter='").delimiter, ",");
    }

    #[test]
    fn test_isstring_forms() {
        assert!(apply(&IsString, "isstring").is_string);
        assert!(apply(&IsString, "isString=TRUE").is_string);
        assert!(!apply(&IsString, "isstring=false").is_string);
        assert!(apply(&IsString, "isstring=maybe").is_string);
    }

    #[test]
    fn test_resolvers_ignore_unrelated_tokens() {
        let descriptor = apply(&IsString, "required");
        assert!(!descriptor.is_string);
        assert!(!descriptor.required);
    }
}
