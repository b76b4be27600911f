//! Android project layout
//!
//! Mirrors how Gradle sees a Flutter Android tree: `key.properties` is read
//! from the root project (`rootProject.file(...)`), while `storeFile` is
//! resolved from the app module (`file(...)` inside `app/build.gradle.kts`).

use crate::env::EnvSource;
use crate::properties::Properties;
use crate::signing::{CredentialResolver, SigningCredentials};
use signet_core::config::GeneralConfig;
use signet_core::error::Result;
use std::path::{Path, PathBuf};

/// Paths of an Android root project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidProject {
    root: PathBuf,
    app_module: PathBuf,
    properties_file: PathBuf,
}

impl AndroidProject {
    /// Project at `root` with the conventional `app` module and `key.properties`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            app_module: PathBuf::from("app"),
            properties_file: PathBuf::from("key.properties"),
        }
    }

    /// Layout from the `[general]` config section
    pub fn from_config(general: &GeneralConfig) -> Self {
        Self::new(&general.android_dir)
            .with_app_module(&general.app_module)
            .with_properties_file(&general.properties_file)
    }

    /// Override the app module directory (relative to the root)
    pub fn with_app_module(mut self, module: impl Into<PathBuf>) -> Self {
        self.app_module = module.into();
        self
    }

    /// Override the properties file (relative to the root unless absolute)
    pub fn with_properties_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.properties_file = file.into();
        self
    }

    /// The root project directory, where `gradlew` lives
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The app module directory
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(&self.app_module)
    }

    /// Location of the signing properties file
    pub fn properties_path(&self) -> PathBuf {
        self.root.join(&self.properties_file)
    }

    /// Load the signing properties file, if there is one
    pub fn load_properties(&self) -> Result<Properties> {
        Properties::load_optional(&self.properties_path())
    }

    /// Load the properties file and resolve credentials against `env`
    pub fn resolve_credentials(
        &self,
        resolver: &CredentialResolver,
        env: &impl EnvSource,
    ) -> Result<SigningCredentials> {
        let properties = self.load_properties()?;
        Ok(resolver.resolve(env, &properties))
    }
}
