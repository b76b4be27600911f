//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[general]`
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[signing]`
    #[serde(default)]
    pub signing: SigningSettings,
}

/// Project layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Android root project directory (the one holding `gradlew`)
    #[serde(default = "default_android_dir")]
    pub android_dir: String,

    /// Application module, relative to the Android root
    #[serde(default = "default_app_module")]
    pub app_module: String,

    /// Signing properties file, relative to the Android root
    #[serde(default = "default_properties_file")]
    pub properties_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            android_dir: default_android_dir(),
            app_module: default_app_module(),
            properties_file: default_properties_file(),
        }
    }
}

fn default_android_dir() -> String {
    "android".to_string()
}

fn default_app_module() -> String {
    "app".to_string()
}

fn default_properties_file() -> String {
    "key.properties".to_string()
}

/// Signing configuration: names used when looking credentials up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningSettings {
    /// Name of the signing config wired into the release build type
    #[serde(default = "default_config_name")]
    pub config_name: String,

    /// Environment variables consulted first
    #[serde(default = "FieldNames::default_env")]
    pub env: FieldNames,

    /// Keys looked up in the properties file
    #[serde(default = "FieldNames::default_keys")]
    pub keys: FieldNames,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            config_name: default_config_name(),
            env: FieldNames::default_env(),
            keys: FieldNames::default_keys(),
        }
    }
}

fn default_config_name() -> String {
    "release".to_string()
}

/// One name per signing credential field.
///
/// Used both for environment variable names and properties keys. A table
/// given in the config file must name all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    /// Name for the key alias
    pub key_alias: String,
    /// Name for the key password
    pub key_password: String,
    /// Name for the keystore password
    pub store_password: String,
    /// Name for the keystore path
    pub store_file: String,
}

impl FieldNames {
    /// `KEY_ALIAS`, `KEY_PASSWORD`, `STORE_PASSWORD`, `STORE_FILE`
    pub fn default_env() -> Self {
        Self {
            key_alias: "KEY_ALIAS".to_string(),
            key_password: "KEY_PASSWORD".to_string(),
            store_password: "STORE_PASSWORD".to_string(),
            store_file: "STORE_FILE".to_string(),
        }
    }

    /// `keyAlias`, `keyPassword`, `storePassword`, `storeFile`
    pub fn default_keys() -> Self {
        Self {
            key_alias: "keyAlias".to_string(),
            key_password: "keyPassword".to_string(),
            store_password: "storePassword".to_string(),
            store_file: "storeFile".to_string(),
        }
    }
}
