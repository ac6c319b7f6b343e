//! Binding records from the environment

use tracing::debug;

use crate::annotation::FieldDescriptor;
use crate::coerce::FieldValue;
use crate::env_file;
use crate::error::BindError;
use crate::lookup::{Lookup, ProcessEnv};
use crate::settings::Settings;

/// A record whose fields can be bound from environment variables.
///
/// Usually implemented with `#[derive(EnvBind)]`. A manual implementation
/// calls [`Binder::field`] once per field, in declaration order, and
/// returns the first error:
///
/// ```rust
/// use envarfig::{BindError, Binder, EnvBind};
///
/// #[derive(Default)]
/// struct Config {
///     host: String,
///     port: u16,
/// }
///
/// impl EnvBind for Config {
///     fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
///         binder.field("host", "HOST,default=localhost", &mut self.host)?;
///         binder.field("port", "PORT,default=8080", &mut self.port)?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), BindError> {
/// let vars = std::collections::HashMap::from([("PORT".to_string(), "9090".to_string())]);
/// let mut config = Config::default();
/// envarfig::bind_with(&mut config, &vars)?;
/// assert_eq!(config.host, "localhost");
/// assert_eq!(config.port, 9090);
/// # Ok(())
/// # }
/// ```
pub trait EnvBind {
    /// Bind every field, stopping at the first error.
    fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError>;

    /// Build a record from `Default` and bind it with default [`Settings`]
    ///
    /// Every call binds afresh; nothing is cached.
    ///
    /// # Errors
    ///
    /// - The default `.env` file exists but cannot be parsed
    /// - A field annotation is missing
    /// - A required environment variable is not set
    /// - A value cannot be converted into the field's type
    fn from_env() -> anyhow::Result<Self>
    where
        Self: Sized + Default,
    {
        let mut record = Self::default();
        bind(&mut record, &Settings::default())?;
        Ok(record)
    }
}

/// Resolves and converts single fields against one lookup.
pub struct Binder<'a> {
    lookup: &'a dyn Lookup,
}

impl<'a> Binder<'a> {
    /// Create a binder reading from `lookup`.
    pub fn new(lookup: &'a dyn Lookup) -> Self {
        Self { lookup }
    }

    /// Bind one field.
    ///
    /// `field_name` is only used to report a missing annotation. On error
    /// `slot` is left unchanged.
    pub fn field<T: FieldValue>(
        &self,
        field_name: &str,
        annotation: &str,
        slot: &mut T,
    ) -> Result<(), BindError> {
        Self::check_annotation(field_name, annotation)?;

        let descriptor = FieldDescriptor::parse(annotation);
        T::check_shape(&descriptor.name)?;

        *slot = match self.resolve(&descriptor)? {
            Some(text) => T::coerce(&text, &descriptor)?,
            None => T::zero(&descriptor.name)?,
        };

        debug!(field = field_name, variable = %descriptor.name, "bound field");
        Ok(())
    }

    /// Fail with [`BindError::MissingAnnotation`] if `annotation` is empty.
    ///
    /// The derive runs this for every unannotated field before binding any
    /// field, so a missing annotation is reported ahead of value errors.
    pub fn check_annotation(field_name: &str, annotation: &str) -> Result<(), BindError> {
        if annotation.is_empty() {
            return Err(BindError::MissingAnnotation {
                field: field_name.to_string(),
            });
        }
        Ok(())
    }

    /// Text to convert for a field.
    ///
    /// The environment value wins; otherwise the default is used. `None`
    /// means the variable is absent, optional and has no default. An empty
    /// variable name is never looked up.
    pub fn resolve(&self, descriptor: &FieldDescriptor) -> Result<Option<String>, BindError> {
        let found = match descriptor.name.as_str() {
            "" => None,
            name => self.lookup.lookup(name),
        };

        if let Some(value) = found {
            debug!(variable = %descriptor.name, source = "environment", "resolved variable");
            return Ok(Some(value));
        }

        if descriptor.default_value.is_empty() {
            if descriptor.required {
                return Err(BindError::required(&descriptor.name));
            }
            debug!(variable = %descriptor.name, source = "zero", "resolved variable");
            return Ok(None);
        }

        debug!(variable = %descriptor.name, source = "default", "resolved variable");
        Ok(Some(descriptor.default_value.clone()))
    }
}

/// Bind `record` from `lookup` without loading any env file.
///
/// Fields are processed in declaration order. On error, fields before the
/// failing one keep their new values and the rest are untouched.
pub fn bind_with<T: EnvBind + ?Sized>(record: &mut T, lookup: &dyn Lookup) -> Result<(), BindError> {
    record.bind_fields(&Binder::new(lookup))
}

/// Load env files as configured, then bind `record` from the process
/// environment.
///
/// `settings.cache_config` is ignored here; use
/// [`ConfigCache::bind`](crate::ConfigCache::bind) to reuse bound records.
pub fn bind<T: EnvBind + ?Sized>(record: &mut T, settings: &Settings) -> Result<(), BindError> {
    env_file::preload(settings.auto_load_env, &settings.env_files)?;
    bind_with(record, &ProcessEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct Server {
        host: String,
        port: i32,
        tags: Vec<String>,
    }

    impl EnvBind for Server {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.field("host", "HOST", &mut self.host)?;
            binder.field("port", "PORT", &mut self.port)?;
            binder.field("tags", "TAGS", &mut self.tags)?;
            Ok(())
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bind_from_lookup() {
        let mut server = Server::default();
        bind_with(&mut server, &vars(&[("HOST", "localhost"), ("PORT", "8080")])).unwrap();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 8080);
        assert!(server.tags.is_empty());
    }

    #[test]
    fn test_bind_stops_at_first_error() {
        let mut server = Server {
            tags: vec!["keep".to_string()],
            ..Default::default()
        };
        let result = bind_with(
            &mut server,
            &vars(&[("HOST", "localhost"), ("PORT", "notanumber"), ("TAGS", "a,b")]),
        );

        match result {
            Err(BindError::InvalidNumber { name, value, .. }) => {
                assert_eq!(name, "PORT");
                assert_eq!(value, "notanumber");
            }
            other => panic!("Expected InvalidNumber, got {other:?}"),
        }
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 0);
        assert_eq!(server.tags, vec!["keep"]);
    }

    #[test]
    fn test_missing_annotation() {
        let binder_vars = vars(&[("HOST", "localhost")]);
        let binder = Binder::new(&binder_vars);
        let mut host = String::new();
        match binder.field("host", "", &mut host) {
            Err(BindError::MissingAnnotation { field }) => assert_eq!(field, "host"),
            other => panic!("Expected MissingAnnotation, got {other:?}"),
        }
    }

    #[test]
    fn test_required_without_default() {
        let empty = vars(&[]);
        let binder = Binder::new(&empty);
        let mut host = String::new();
        match binder.field("host", "HOST,required", &mut host) {
            Err(BindError::RequiredMissing { name }) => assert_eq!(name, "HOST"),
            other => panic!("Expected RequiredMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_required_with_default() {
        let empty = vars(&[]);
        let binder = Binder::new(&empty);
        let mut host = String::new();
        binder
            .field("host", "HOST,required,default=localhost", &mut host)
            .unwrap();
        assert_eq!(host, "localhost");
    }

    #[test]
    fn test_environment_beats_default() {
        let env = vars(&[("PORT", "9090")]);
        let binder = Binder::new(&env);
        let mut port = 0u16;
        binder.field("port", "PORT,default=8080", &mut port).unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_empty_environment_value_is_present() {
        let env = vars(&[("PORT", "")]);
        let binder = Binder::new(&env);
        let mut port = 0u16;
        assert!(matches!(
            binder.field("port", "PORT,default=8080", &mut port),
            Err(BindError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_absent_optional_field_gets_zero_value() {
        let empty = vars(&[]);
        let binder = Binder::new(&empty);
        let mut port = 1234i64;
        binder.field("port", "PORT", &mut port).unwrap();
        assert_eq!(port, 0);
    }

    #[test]
    fn test_resolve_precedence() {
        let env = vars(&[("SET", "env")]);
        let binder = Binder::new(&env);

        let set = FieldDescriptor::parse("SET,default=fallback");
        assert_eq!(binder.resolve(&set).unwrap(), Some("env".to_string()));

        let unset = FieldDescriptor::parse("UNSET,default=fallback");
        assert_eq!(binder.resolve(&unset).unwrap(), Some("fallback".to_string()));

        let optional = FieldDescriptor::parse("UNSET");
        assert_eq!(binder.resolve(&optional).unwrap(), None);
    }

    #[test]
    fn test_empty_name_uses_default() {
        let env = vars(&[("", "never")]);
        let binder = Binder::new(&env);
        let mut value = String::new();
        binder.field("value", ",default=fallback", &mut value).unwrap();
        assert_eq!(value, "fallback");
    }
}
