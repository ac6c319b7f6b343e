//! Error types for binding environment variables to struct fields

use std::path::PathBuf;

/// Errors that can occur while binding a record from the environment.
///
/// Binding stops at the first failing field, so a single `BindError`
/// always describes exactly one problem:
/// - Field declarations without an annotation
/// - Missing required environment variables
/// - Text that cannot be converted into the field's type
/// - Env file loading failures
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A field was declared without an `#[env("...")]` annotation,
    /// or with an empty one.
    #[error("tag not found for field '{field}'")]
    MissingAnnotation {
        /// Name of the struct field
        field: String,
    },

    /// Required environment variable is not set and has no default.
    #[error("required environment variable {name} not found")]
    RequiredMissing {
        /// Name of the missing environment variable
        name: String,
    },

    /// Integer or floating point conversion failed.
    #[error("failed to convert {name} to {type_name}: parsing {value:?}: {message}")]
    InvalidNumber {
        /// Environment variable name, or `map key` / `map value`
        name: String,
        /// Target type
        type_name: String,
        /// Rejected text
        value: String,
        /// Reason reported by the parser
        message: String,
    },

    /// Boolean conversion failed.
    #[error("error parsing env var {name}: parsing {value:?}: {message}")]
    InvalidBool {
        /// Environment variable name, or `map key` / `map value`
        name: String,
        /// Rejected text
        value: String,
        /// Reason reported by the parser
        message: String,
    },

    /// Complex number conversion failed.
    #[error("failed to convert {name} to complex: parsing {value:?}: {message}")]
    InvalidComplex {
        /// Environment variable name, or `map key` / `map value`
        name: String,
        /// Rejected text
        value: String,
        /// Reason reported by the parser
        message: String,
    },

    /// A `char` element was not exactly one code point.
    #[error("failed to convert {name} to char: parsing {value:?}: {message}")]
    InvalidChar {
        /// Environment variable name, or `map key` / `map value`
        name: String,
        /// Rejected text
        value: String,
        /// Reason reported by the parser
        message: String,
    },

    /// A fixed-length array received the wrong number of values.
    #[error("env var {name} has {actual} values, but array expects {expected}")]
    SequenceLength {
        /// Environment variable name
        name: String,
        /// Length of the array field
        expected: usize,
        /// Number of values found in the text
        actual: usize,
    },

    /// A map entry did not contain a `:` separator.
    #[error("invalid map entry for {name}: {entry}")]
    MalformedMapEntry {
        /// Environment variable name
        name: String,
        /// The offending entry as it appeared after splitting
        entry: String,
    },

    /// The field (or its element, key or value) has a shape that cannot be
    /// bound, such as a nested record.
    #[error("unsupported field type for {name}: {shape}")]
    UnsupportedShape {
        /// Environment variable name
        name: String,
        /// Description of the rejected type
        shape: String,
    },

    /// Loading an env file failed.
    #[error("failed to load env file '{}': {source}", path.display())]
    EnvFile {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying dotenv error
        source: dotenvy::Error,
    },

    /// Explicit env files were given while automatic loading is disabled.
    #[error("env files were given but automatic env file loading is disabled")]
    AutoLoadDisabled,
}

impl BindError {
    /// Create a number conversion error for target type `T`
    pub(crate) fn number<T>(
        name: impl Into<String>,
        value: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidNumber {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create an unsupported shape error for type `T`
    ///
    /// Used by macro-generated code for nested records.
    #[doc(hidden)]
    pub fn unsupported<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            name: name.into(),
            shape: std::any::type_name::<T>().to_string(),
        }
    }

    /// Create a missing required variable error
    pub(crate) fn required(name: impl Into<String>) -> Self {
        Self::RequiredMissing { name: name.into() }
    }
}
