//! Android release-signing support
//!
//! This crate resolves the credentials used to sign release builds and
//! hands them to Gradle:
//! - Java `.properties` parsing for `key.properties`
//! - Environment lookup behind an injectable source
//! - Layered credential resolution (environment over file)
//! - Android Gradle Plugin injected-signing arguments
//!
//! # Example
//!
//! ```rust,no_run
//! use signet_android::env::ProcessEnv;
//! use signet_android::project::AndroidProject;
//! use signet_android::signing::CredentialResolver;
//!
//! let project = AndroidProject::new("android");
//! let credentials = project.resolve_credentials(&CredentialResolver::default(), &ProcessEnv)?;
//! let config = credentials.into_signing_config("release", &project.app_dir());
//! println!("keystore: {:?}", config.store_file);
//! # Ok::<(), signet_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod env;
pub mod gradle;
pub mod project;
pub mod properties;
pub mod signing;

pub use env::{EnvSource, ProcessEnv};
pub use project::AndroidProject;
pub use properties::Properties;
pub use signing::{CredentialResolver, Field, Secret, SigningConfig, SigningCredentials, Source};
