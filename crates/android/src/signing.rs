//! Release signing credential resolution
//!
//! Each of the four signing fields is looked up in two places, in order:
//!
//! 1. an environment variable (`KEY_ALIAS`, `KEY_PASSWORD`, `STORE_PASSWORD`,
//!    `STORE_FILE` by default), used when set and non-empty;
//! 2. a key in `key.properties` (`keyAlias`, `keyPassword`, `storePassword`,
//!    `storeFile`), used whenever the key is present, even with an empty value.
//!
//! A field found in neither place stays unset. That is not an error here:
//! Gradle fails the release packaging step itself if it needs a value that
//! is missing, and debug builds never need one.

use crate::env::EnvSource;
use crate::properties::Properties;
use serde::Serialize;
use signet_core::config::{FieldNames, SigningSettings};
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the four signing credential fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Alias of the key inside the keystore
    KeyAlias,
    /// Password of the key
    KeyPassword,
    /// Password of the keystore
    StorePassword,
    /// Path of the keystore file
    StoreFile,
}

impl Field {
    /// All fields, in resolution order
    pub const ALL: [Field; 4] = [
        Field::KeyAlias,
        Field::KeyPassword,
        Field::StorePassword,
        Field::StoreFile,
    ];

    /// Gradle DSL name of the field
    pub fn name(self) -> &'static str {
        match self {
            Field::KeyAlias => "keyAlias",
            Field::KeyPassword => "keyPassword",
            Field::StorePassword => "storePassword",
            Field::StoreFile => "storeFile",
        }
    }

    /// Whether the value must not be printed
    pub fn is_secret(self) -> bool {
        matches!(self, Field::KeyPassword | Field::StorePassword)
    }

    /// Pick this field's entry out of a name table
    pub fn lookup_name(self, names: &FieldNames) -> &str {
        match self {
            Field::KeyAlias => &names.key_alias,
            Field::KeyPassword => &names.key_password,
            Field::StorePassword => &names.store_password,
            Field::StoreFile => &names.store_file,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A non-empty environment variable
    Environment,
    /// A key in the properties file
    PropertiesFile,
    /// Neither
    Unset,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Environment => "environment",
            Source::PropertiesFile => "properties file",
            Source::Unset => "unset",
        })
    }
}

/// A password that never shows up in `Debug` or `Display` output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plain value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plain value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// The four resolved credential fields, each independently optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    /// `keyAlias`
    pub alias: Option<String>,
    /// `keyPassword`
    pub key_password: Option<Secret>,
    /// `storePassword`
    pub store_password: Option<Secret>,
    /// `storeFile`, exactly as configured
    pub store_file_path: Option<String>,
    sources: [Source; 4],
}

impl SigningCredentials {
    /// Where `field` was resolved from
    pub fn source(&self, field: Field) -> Source {
        self.sources[field.index()]
    }

    /// Plain value of `field`
    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::KeyAlias => self.alias.as_deref(),
            Field::KeyPassword => self.key_password.as_ref().map(Secret::expose),
            Field::StorePassword => self.store_password.as_ref().map(Secret::expose),
            Field::StoreFile => self.store_file_path.as_deref(),
        }
    }

    /// Fields that resolved to nothing
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&field| self.value(field).is_none())
            .collect()
    }

    /// Build the signing config handed to Gradle.
    ///
    /// `module_dir` is the app module directory that a relative `storeFile`
    /// is resolved against.
    pub fn into_signing_config(self, name: impl Into<String>, module_dir: &Path) -> SigningConfig {
        let store_file = materialize_store_file(self.store_file_path.as_deref(), module_dir);

        SigningConfig {
            name: name.into(),
            key_alias: self.alias,
            key_password: self.key_password,
            store_password: self.store_password,
            store_file,
        }
    }
}

/// Turn a store file setting into a path. Empty or missing settings never
/// become a path.
pub fn materialize_store_file(path: Option<&str>, module_dir: &Path) -> Option<PathBuf> {
    let path = Path::new(path.filter(|p| !p.is_empty())?);

    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(module_dir.join(path))
    }
}

/// A named signing configuration, as consumed by the release build type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// Config name, `release` by default
    pub name: String,
    /// Key alias
    pub key_alias: Option<String>,
    /// Key password
    pub key_password: Option<Secret>,
    /// Keystore password
    pub store_password: Option<Secret>,
    /// Keystore path, set only for a non-empty `storeFile`
    pub store_file: Option<PathBuf>,
}

impl SigningConfig {
    /// Report which fields are missing and whether the keystore exists
    pub fn check(&self) -> ReadinessReport {
        let mut missing = Vec::new();
        if self.key_alias.is_none() {
            missing.push(Field::KeyAlias);
        }
        if self.key_password.is_none() {
            missing.push(Field::KeyPassword);
        }
        if self.store_password.is_none() {
            missing.push(Field::StorePassword);
        }
        if self.store_file.is_none() {
            missing.push(Field::StoreFile);
        }

        let store_file_exists = self.store_file.as_deref().is_some_and(Path::is_file);

        ReadinessReport {
            missing,
            store_file: self.store_file.clone(),
            store_file_exists,
        }
    }
}

/// Outcome of [`SigningConfig::check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Fields with no usable value
    pub missing: Vec<Field>,
    /// Keystore path that was checked
    pub store_file: Option<PathBuf>,
    /// Whether that path is an existing file
    pub store_file_exists: bool,
}

impl ReadinessReport {
    /// Whether a release build has everything it needs to sign
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty() && self.store_file_exists
    }
}

/// Resolves [`SigningCredentials`] from an environment and a properties file
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env_names: FieldNames,
    keys: FieldNames,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new(FieldNames::default_env(), FieldNames::default_keys())
    }
}

impl CredentialResolver {
    /// Resolver looking up `env_names` first, then `keys`
    pub fn new(env_names: FieldNames, keys: FieldNames) -> Self {
        Self { env_names, keys }
    }

    /// Use the lookup names from the `[signing]` config section
    pub fn from_settings(settings: &SigningSettings) -> Self {
        Self::new(settings.env.clone(), settings.keys.clone())
    }

    /// Resolve all four fields. Never fails; unset fields are `None`.
    pub fn resolve(&self, env: &impl EnvSource, properties: &Properties) -> SigningCredentials {
        let [alias, key_password, store_password, store_file] =
            Field::ALL.map(|field| self.resolve_field(field, env, properties));

        SigningCredentials {
            sources: [alias.1, key_password.1, store_password.1, store_file.1],
            alias: alias.0,
            key_password: key_password.0.map(Secret::new),
            store_password: store_password.0.map(Secret::new),
            store_file_path: store_file.0,
        }
    }

    fn resolve_field(
        &self,
        field: Field,
        env: &impl EnvSource,
        properties: &Properties,
    ) -> (Option<String>, Source) {
        let var = field.lookup_name(&self.env_names);
        if let Some(value) = env.var(var).filter(|v| !v.is_empty()) {
            tracing::debug!(%field, var, "resolved from environment");
            return (Some(value), Source::Environment);
        }

        let key = field.lookup_name(&self.keys);
        if let Some(value) = properties.get(key) {
            tracing::debug!(%field, key, "resolved from properties file");
            return (Some(value.to_string()), Source::PropertiesFile);
        }

        tracing::debug!(%field, "not configured");
        (None, Source::Unset)
    }
}
