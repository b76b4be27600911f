//! Environment variable lookup
//!
//! Credential resolution never reads the process environment directly; it
//! goes through [`EnvSource`] so callers and tests can supply their own.

use std::collections::HashMap;

/// A source of environment variables
pub trait EnvSource {
    /// Value of `name`, or `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
///
/// Values that are not valid Unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let env: HashMap<String, String> =
            [("KEY_ALIAS".to_string(), "upload".to_string())].into();

        assert_eq!(env.var("KEY_ALIAS").as_deref(), Some("upload"));
        assert_eq!(env.var("STORE_FILE"), None);
        assert_eq!((&env).var("KEY_ALIAS").as_deref(), Some("upload"));
    }

    #[test]
    fn test_process_env_missing_var() {
        assert_eq!(ProcessEnv.var("SIGNET_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
