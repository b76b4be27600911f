//! Gradle build system integration
//!
//! Hands a resolved [`SigningConfig`] to the Android Gradle Plugin through
//! its injected-signing properties, so release builds sign without the
//! credentials ever being written into `build.gradle.kts`.

use crate::signing::SigningConfig;
use signet_core::error::Result;
use signet_core::process::run_command_streaming_in_dir;
use std::fmt;
use std::path::{Path, PathBuf};

/// Keystore path property
pub const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
/// Keystore password property
pub const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
/// Key alias property
pub const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
/// Key password property
pub const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Gradle build type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// Signed with the debug key by the plugin
    Debug,
    /// Signed with the resolved signing config
    Release,
}

impl BuildType {
    /// Task producing an APK, or an AAB when `bundle` is set
    pub fn task(self, bundle: bool) -> &'static str {
        match (self, bundle) {
            (BuildType::Debug, false) => "assembleDebug",
            (BuildType::Debug, true) => "bundleDebug",
            (BuildType::Release, false) => "assembleRelease",
            (BuildType::Release, true) => "bundleRelease",
        }
    }

    /// Only release builds carry a signing config; debug uses the debug key
    pub fn signing_config(self, config: &SigningConfig) -> Option<&SigningConfig> {
        match self {
            BuildType::Debug => None,
            BuildType::Release => Some(config),
        }
    }
}

impl std::str::FromStr for BuildType {
    type Err = signet_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            other => Err(signet_core::Error::validation(format!(
                "Unknown build type: {} (expected debug or release)",
                other
            ))),
        }
    }
}

/// One `-P` property passed to Gradle
#[derive(Clone, PartialEq, Eq)]
pub struct InjectedProperty {
    /// Property name, without the `-P` prefix
    pub key: &'static str,
    /// Raw value
    pub value: String,
    /// Masked when displayed
    pub secret: bool,
}

impl InjectedProperty {
    /// The command-line argument, value included
    pub fn to_arg(&self) -> String {
        format!("-P{}={}", self.key, self.value)
    }

    /// The argument for display; secret values are masked unless `reveal`
    pub fn display_arg(&self, reveal: bool) -> String {
        if self.secret && !reveal {
            format!("-P{}=********", self.key)
        } else {
            self.to_arg()
        }
    }
}

impl fmt::Debug for InjectedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_arg(false))
    }
}

/// Injected signing properties for the fields that are set.
///
/// Unset fields are left out; the plugin reports them when it needs them.
pub fn injected_properties(config: &SigningConfig) -> Vec<InjectedProperty> {
    let mut props = Vec::with_capacity(4);

    if let Some(store_file) = &config.store_file {
        props.push(InjectedProperty {
            key: INJECTED_STORE_FILE,
            value: store_file.display().to_string(),
            secret: false,
        });
    }
    if let Some(password) = &config.store_password {
        props.push(InjectedProperty {
            key: INJECTED_STORE_PASSWORD,
            value: password.expose().to_string(),
            secret: true,
        });
    }
    if let Some(alias) = &config.key_alias {
        props.push(InjectedProperty {
            key: INJECTED_KEY_ALIAS,
            value: alias.clone(),
            secret: false,
        });
    }
    if let Some(password) = &config.key_password {
        props.push(InjectedProperty {
            key: INJECTED_KEY_PASSWORD,
            value: password.expose().to_string(),
            secret: true,
        });
    }

    props
}

/// Injected signing arguments, ready to append to a Gradle invocation
pub fn injected_signing_args(config: &SigningConfig) -> Vec<String> {
    injected_properties(config)
        .iter()
        .map(InjectedProperty::to_arg)
        .collect()
}

/// Full argument list for building `build_type`
pub fn build_args(build_type: BuildType, bundle: bool, config: &SigningConfig) -> Vec<String> {
    let mut args = vec![build_type.task(bundle).to_string()];
    if let Some(signing) = build_type.signing_config(config) {
        args.extend(injected_signing_args(signing));
    }
    args
}

/// Wrapper script inside `project_dir`, as an absolute path.
///
/// Relative program names are looked up against the parent's directory on
/// some platforms, not the child's `current_dir`.
fn gradle_wrapper(project_dir: &Path) -> Result<PathBuf> {
    let script = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
    Ok(std::path::absolute(project_dir)?.join(script))
}

/// Run a build through the Gradle wrapper in `project_dir`, streaming output.
///
/// Returns Gradle's exit code.
pub fn build(
    project_dir: &Path,
    build_type: BuildType,
    bundle: bool,
    config: &SigningConfig,
) -> Result<i32> {
    let args = build_args(build_type, bundle, config);
    tracing::info!(
        dir = %project_dir.display(),
        task = build_type.task(bundle),
        signed = build_type.signing_config(config).is_some(),
        "running gradle"
    );

    run_command_streaming_in_dir(gradle_wrapper(project_dir)?, &args, project_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::Secret;
    use std::path::PathBuf;

    fn release_config() -> SigningConfig {
        SigningConfig {
            name: "release".to_string(),
            key_alias: Some("upload".to_string()),
            key_password: Some(Secret::new("key-pass")),
            store_password: Some(Secret::new("store-pass")),
            store_file: Some(PathBuf::from("/ci/upload.keystore")),
        }
    }

    #[test]
    fn test_injected_args_for_complete_config() {
        let args = injected_signing_args(&release_config());

        assert_eq!(
            args,
            vec![
                "-Pandroid.injected.signing.store.file=/ci/upload.keystore",
                "-Pandroid.injected.signing.store.password=store-pass",
                "-Pandroid.injected.signing.key.alias=upload",
                "-Pandroid.injected.signing.key.password=key-pass",
            ]
        );
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let config = SigningConfig {
            key_password: None,
            store_file: None,
            ..release_config()
        };

        let keys: Vec<_> = injected_properties(&config).iter().map(|p| p.key).collect();
        assert_eq!(keys, vec![INJECTED_STORE_PASSWORD, INJECTED_KEY_ALIAS]);
    }

    #[test]
    fn test_display_masks_secrets() {
        let props = injected_properties(&release_config());
        let shown: Vec<_> = props.iter().map(|p| p.display_arg(false)).collect();

        assert!(shown.iter().all(|arg| !arg.contains("store-pass") && !arg.contains("key-pass")));
        assert!(shown.contains(&"-Pandroid.injected.signing.key.alias=upload".to_string()));
        assert!(format!("{:?}", props).contains("********"));
        assert_eq!(props[1].display_arg(true), props[1].to_arg());
    }

    #[test]
    fn test_build_args_only_sign_release() {
        let config = release_config();

        assert_eq!(build_args(BuildType::Debug, false, &config), vec!["assembleDebug"]);

        let release = build_args(BuildType::Release, true, &config);
        assert_eq!(release[0], "bundleRelease");
        assert_eq!(release.len(), 5);
    }

    #[test]
    fn test_build_type_parse() {
        assert_eq!("Release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!("debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert!("profile".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_gradle_wrapper_is_inside_project() {
        let wrapper = gradle_wrapper(Path::new("android")).unwrap();

        assert!(wrapper.is_absolute());
        assert!(wrapper.parent().unwrap().ends_with("android"));
        assert!(wrapper
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("gradlew"));
    }

    #[test]
    fn test_missing_wrapper_is_command_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = build(dir.path(), BuildType::Debug, false, &release_config()).unwrap_err();
        assert_eq!(err.code, signet_core::ErrorCode::CommandNotFound);
    }
}
