//! Bind environment variables to struct fields
//!
//! `envarfig` fills a flat struct from environment variables. Every field
//! carries a compact annotation naming its variable and optional
//! properties; the annotation is parsed at bind time and the variable's text
//! is converted into the field's type.
//!
//! # Features
//!
//! - **Declarative**: `#[derive(EnvBind)]` with `#[env("NAME,...")]` field annotations
//! - **Rich field shapes**: scalars, complex numbers, `Vec<T>`, `[T; N]`, maps
//! - **Env files**: `.env` files are loaded with `dotenvy` before binding
//! - **Caching**: [`ConfigCache`] memoizes bound records per type
//! - **Precise errors**: every failure names the variable and the rejected text
//!
//! # Example
//!
//! ```rust
//! use envarfig::EnvBind;
//!
//! #[derive(Debug, Default, EnvBind)]
//! struct Config {
//!     #[env("HOST,default=localhost")]
//!     host: String,
//!
//!     #[env("PORT,required")]
//!     port: u16,
//!
//!     #[env("PEERS,delimiter=';'")]
//!     peers: Vec<String>,
//! }
//!
//! # fn main() -> Result<(), envarfig::BindError> {
//! let vars = std::collections::HashMap::from([
//!     ("PORT".to_string(), "8080".to_string()),
//!     ("PEERS".to_string(), "a:1;b:2".to_string()),
//! ]);
//! let mut config = Config::default();
//! envarfig::bind_with(&mut config, &vars)?;
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.peers, vec!["a:1", "b:2"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Annotations
//!
//! ```text
//! NAME[,PROPERTY]*
//! ```
//!
//! | Property | Meaning |
//! |---|---|
//! | `required`, `required=true` | fail if the variable is unset and there is no default |
//! | `default=VALUE`, `default='VALUE'` | text used when the variable is unset (lower-cased) |
//! | `delimiter='X'` | separator for sequences and maps (default `,`) |
//! | `isstring` | `Vec<u8>` / `Vec<char>` take the raw text instead of a list |
//!
//! Commas inside quotes do not split properties. Unknown properties are
//! ignored.
//!
//! # Value Parsing
//!
//! - Strings and [`Opaque`]: verbatim
//! - Integers: base 10, range-checked against the field's width
//! - Floats: parsed as `f64`, then narrowed
//! - Booleans: `1`, `t`, `true`, `0`, `f`, `false` (any case)
//! - Complex: `1+2i`, `(3-4i)`, `2`, `5i`
//! - `Vec<T>` / `[T; N]`: split on the delimiter, pieces trimmed; arrays
//!   require exactly `N` pieces
//! - Maps: `{k1:v1,k2:v2}`, each entry split on its first `:`
//!
//! When a variable is unset, optional and has no default, the field gets
//! its zero value (`0`, `""`, `false`, empty collection).

mod annotation;
mod bind;
mod cache;
mod coerce;
pub mod env_file;
mod error;
mod lookup;
mod property;
mod settings;

pub use annotation::{split_respecting_quotes, FieldDescriptor, DEFAULT_DELIMITER};
pub use bind::{bind, bind_with, Binder, EnvBind};
pub use cache::ConfigCache;
pub use coerce::{Element, FieldValue, Opaque, MAP_KEY, MAP_VALUE};
pub use env_file::{preload, EnvFileLoader};
pub use error::BindError;
pub use lookup::{Lookup, ProcessEnv};
pub use property::{DefaultValue, Delimiter, IsString, PropertyResolver, Required};
pub use settings::Settings;

pub use envarfig_derive::EnvBind;

// Re-export for field types and macro-generated code
pub use num_complex::Complex;
