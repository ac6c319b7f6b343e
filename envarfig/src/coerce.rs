//! Conversion of environment text into field values
//!
//! Two traits describe what can be bound:
//!
//! - [`Element`]: scalar and opaque types. They can be fields on their own,
//!   sequence elements, map keys and map values.
//! - [`FieldValue`]: every field shape, i.e. all elements plus `Vec<T>`,
//!   `[T; N]`, `HashMap<K, V>` and `BTreeMap<K, V>` over elements.
//!
//! Sequence and map text is split with the field's delimiter; every piece is
//! trimmed and converted with the element rules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use num_complex::Complex;
use serde::Serialize;

use crate::annotation::FieldDescriptor;
use crate::error::BindError;

/// Name reported for map key conversion errors.
pub const MAP_KEY: &str = "map key";

/// Name reported for map value conversion errors.
pub const MAP_VALUE: &str = "map value";

/// A dynamically typed field value.
///
/// Environment text is stored as is; no interpretation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Opaque {
    /// Raw text taken from the environment or the default.
    Text(String),
}

impl Opaque {
    /// The stored text.
    pub fn as_str(&self) -> &str {
        match self {
            Opaque::Text(text) => text,
        }
    }
}

impl Default for Opaque {
    fn default() -> Self {
        Opaque::Text(String::new())
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Opaque {
    fn from(text: &str) -> Self {
        Opaque::Text(text.to_string())
    }
}

/// A scalar or opaque type.
///
/// `name` is the environment variable name, or [`MAP_KEY`] / [`MAP_VALUE`]
/// when converting map entries; it only appears in error messages.
pub trait Element: Sized {
    /// Reject types that cannot be bound at all.
    fn check_shape(_name: &str) -> Result<(), BindError> {
        Ok(())
    }

    /// Convert one trimmed piece of text.
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError>;

    /// Value used when the variable is absent and has no default.
    fn zero(name: &str) -> Result<Self, BindError>;

    /// Build a whole sequence from raw text when `isstring` is set.
    ///
    /// Only byte and code point elements support this.
    fn from_raw_text(_text: &str) -> Option<Vec<Self>> {
        None
    }
}

/// Any bindable field shape.
pub trait FieldValue: Sized {
    /// Reject shapes that cannot be bound, before any text is converted.
    fn check_shape(_name: &str) -> Result<(), BindError> {
        Ok(())
    }

    /// Convert the resolved text of a field.
    fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError>;

    /// Value used when the variable is absent and has no default.
    fn zero(name: &str) -> Result<Self, BindError>;
}

macro_rules! integer_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
                    text.parse::<$ty>()
                        .map_err(|e| BindError::number::<$ty>(name, text, e))
                }

                fn zero(_name: &str) -> Result<Self, BindError> {
                    Ok(0)
                }
            }
        )*
    };
}

integer_element!(i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize);

impl Element for u8 {
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
        text.parse::<u8>()
            .map_err(|e| BindError::number::<u8>(name, text, e))
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(0)
    }

    fn from_raw_text(text: &str) -> Option<Vec<Self>> {
        Some(text.as_bytes().to_vec())
    }
}

const OUT_OF_RANGE: &str = "value out of range";

macro_rules! float_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
                    // Parsed at double precision, then narrowed.
                    let value = text
                        .parse::<f64>()
                        .map_err(|e| BindError::number::<$ty>(name, text, e))?;
                    let narrowed = value as $ty;
                    if value.is_finite() && narrowed.is_infinite() {
                        return Err(BindError::number::<$ty>(name, text, OUT_OF_RANGE));
                    }
                    Ok(narrowed)
                }

                fn zero(_name: &str) -> Result<Self, BindError> {
                    Ok(0.0)
                }
            }
        )*
    };
}

float_element!(f32, f64);

impl Element for bool {
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
        match text.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Ok(true),
            "0" | "f" | "false" => Ok(false),
            _ => Err(BindError::InvalidBool {
                name: name.to_string(),
                value: text.to_string(),
                message: "invalid syntax".to_string(),
            }),
        }
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(false)
    }
}

impl Element for char {
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
        text.parse::<char>().map_err(|e| BindError::InvalidChar {
            name: name.to_string(),
            value: text.to_string(),
            message: e.to_string(),
        })
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok('\0')
    }

    fn from_raw_text(text: &str) -> Option<Vec<Self>> {
        Some(text.chars().collect())
    }
}

impl Element for String {
    fn parse_element(text: &str, _name: &str) -> Result<Self, BindError> {
        Ok(text.to_string())
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(String::new())
    }
}

impl Element for Opaque {
    fn parse_element(text: &str, _name: &str) -> Result<Self, BindError> {
        Ok(Opaque::Text(text.to_string()))
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(Opaque::default())
    }
}

/// Parse `<real>±<imag>i`, `<real>` or `<imag>i`.
///
/// Whitespace anywhere in the literal is ignored and one pair of enclosing
/// parentheses is accepted. The imaginary unit must be `i`, and a sign may
/// not follow another sign.
fn parse_complex(text: &str, name: &str) -> Result<Complex<f64>, BindError> {
    let invalid = |message: String| BindError::InvalidComplex {
        name: name.to_string(),
        value: text.to_string(),
        message,
    };

    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let literal = compact
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(&compact);

    let doubled_sign = ["++", "+-", "-+", "--"]
        .iter()
        .any(|pair| literal.contains(pair));
    if doubled_sign || literal.ends_with(['j', 'J']) {
        return Err(invalid("invalid syntax".to_string()));
    }

    literal
        .parse::<Complex<f64>>()
        .map_err(|e| invalid(e.to_string()))
}

impl Element for Complex<f64> {
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
        parse_complex(text, name)
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(Complex::default())
    }
}

impl Element for Complex<f32> {
    fn parse_element(text: &str, name: &str) -> Result<Self, BindError> {
        let value = parse_complex(text, name)?;
        let narrowed = Complex::new(value.re as f32, value.im as f32);
        if value.is_finite() && !narrowed.is_finite() {
            return Err(BindError::InvalidComplex {
                name: name.to_string(),
                value: text.to_string(),
                message: OUT_OF_RANGE.to_string(),
            });
        }
        Ok(narrowed)
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(Complex::default())
    }
}

macro_rules! element_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError> {
                    <$ty as Element>::parse_element(text, &field.name)
                }

                fn zero(name: &str) -> Result<Self, BindError> {
                    <$ty as Element>::zero(name)
                }
            }
        )*
    };
}

element_field!(
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64, bool, char, String, Opaque,
    Complex<f32>, Complex<f64>,
);

/// Split sequence or map text and trim every piece.
///
/// An empty delimiter splits between characters.
pub(crate) fn split_values<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .map(str::trim)
            .collect();
    }
    text.split(delimiter).map(str::trim).collect()
}

fn parse_sequence<T: Element>(
    tokens: &[&str],
    field: &FieldDescriptor,
) -> Result<Vec<T>, BindError> {
    tokens
        .iter()
        .map(|token| T::parse_element(token, &field.name))
        .collect()
}

impl<T: Element> FieldValue for Vec<T> {
    fn check_shape(name: &str) -> Result<(), BindError> {
        T::check_shape(name)
    }

    fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError> {
        if field.is_string {
            if let Some(raw) = T::from_raw_text(text) {
                return Ok(raw);
            }
        }
        parse_sequence(&split_values(text, &field.delimiter), field)
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(Vec::new())
    }
}

fn into_array<T, const N: usize>(values: Vec<T>, name: &str) -> Result<[T; N], BindError> {
    let actual = values.len();
    values
        .try_into()
        .map_err(|_: Vec<T>| BindError::SequenceLength {
            name: name.to_string(),
            expected: N,
            actual,
        })
}

impl<T: Element, const N: usize> FieldValue for [T; N] {
    fn check_shape(name: &str) -> Result<(), BindError> {
        T::check_shape(name)
    }

    fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError> {
        if field.is_string {
            if let Some(raw) = T::from_raw_text(text) {
                return into_array(raw, &field.name);
            }
        }

        let tokens = split_values(text, &field.delimiter);
        if tokens.len() != N {
            return Err(BindError::SequenceLength {
                name: field.name.clone(),
                expected: N,
                actual: tokens.len(),
            });
        }
        into_array(parse_sequence(&tokens, field)?, &field.name)
    }

    fn zero(name: &str) -> Result<Self, BindError> {
        let values = (0..N)
            .map(|_| T::zero(name))
            .collect::<Result<Vec<T>, _>>()?;
        into_array(values, name)
    }
}

/// Parse `{k1:v1<delim>k2:v2}` into key/value pairs.
///
/// One `{` is removed from the first entry and one `}` from the last.
/// Entries are split on their first `:`.
fn parse_entries<K: Element, V: Element>(
    text: &str,
    field: &FieldDescriptor,
) -> Result<Vec<(K, V)>, BindError> {
    let mut tokens = split_values(text, &field.delimiter);

    if let Some(first) = tokens.first_mut() {
        let token: &str = *first;
        *first = token.strip_prefix('{').unwrap_or(token).trim();
    }
    if let Some(last) = tokens.last_mut() {
        let token: &str = *last;
        *last = token.strip_suffix('}').unwrap_or(token).trim();
    }

    if let [only] = tokens.as_slice() {
        if only.is_empty() {
            return Ok(Vec::new());
        }
    }

    tokens
        .into_iter()
        .map(|entry| {
            let (key, value) =
                entry
                    .split_once(':')
                    .ok_or_else(|| BindError::MalformedMapEntry {
                        name: field.name.clone(),
                        entry: entry.to_string(),
                    })?;
            let key = K::parse_element(key.trim(), MAP_KEY)?;
            let value = V::parse_element(value.trim(), MAP_VALUE)?;
            Ok((key, value))
        })
        .collect()
}

impl<K, V> FieldValue for HashMap<K, V>
where
    K: Element + Eq + Hash,
    V: Element,
{
    fn check_shape(_name: &str) -> Result<(), BindError> {
        K::check_shape(MAP_KEY)?;
        V::check_shape(MAP_VALUE)
    }

    fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError> {
        Ok(parse_entries(text, field)?.into_iter().collect())
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(HashMap::new())
    }
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
    K: Element + Ord,
    V: Element,
{
    fn check_shape(_name: &str) -> Result<(), BindError> {
        K::check_shape(MAP_KEY)?;
        V::check_shape(MAP_VALUE)
    }

    fn coerce(text: &str, field: &FieldDescriptor) -> Result<Self, BindError> {
        Ok(parse_entries(text, field)?.into_iter().collect())
    }

    fn zero(_name: &str) -> Result<Self, BindError> {
        Ok(BTreeMap::new())
    }
}
