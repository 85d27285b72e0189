//! Settings
//!
//! Layered, lowest to highest precedence: struct defaults, an optional TOML
//! file (`AUTOEQ_CONFIG`, else `./autoeq.toml`), `AUTOEQ__*` environment
//! variables. Command-line flags are applied on top by the binary.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "autoeq.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the five JSON datasets
    pub data_dir: PathBuf,
    pub port: u16,
    pub open_browser: bool,
    /// Output directory for `autoeq build`
    pub site_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            port: 3002,
            open_browser: true,
            site_dir: PathBuf::from("site"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut builder = ::config::Config::builder();

        let path = resolve_config_path();
        builder = builder.add_source(::config::File::from(path.as_path()).required(false));

        builder = builder.add_source(
            ::config::Environment::with_prefix("AUTOEQ")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::InvalidSetting("port must be between 1 and 65535".into()));
        }
        Ok(())
    }
}

/// `AUTOEQ_CONFIG` when set, otherwise `autoeq.toml` in the working directory
pub fn resolve_config_path() -> PathBuf {
    std::env::var_os("AUTOEQ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Tests below mutate process-wide environment variables
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    struct EnvGuard {
        key: &'static str,
        old: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, val: &str) -> Self {
            let old = std::env::var_os(key);
            std::env::set_var(key, val);
            Self { key, old }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.old.take() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.port, 3002);
        assert!(s.open_browser);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_port_zero_rejected() {
        let s = Settings { port: 0, ..Default::default() };
        assert!(matches!(s.validate(), Err(Error::InvalidSetting(_))));
    }

    #[test]
    fn test_file_then_env() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoeq.toml");
        std::fs::write(&path, "data_dir = \"/srv/autoeq\"\nport = 8080\n").unwrap();

        let _cfg = EnvGuard::set("AUTOEQ_CONFIG", path.to_str().unwrap());
        let s = Settings::load().unwrap();
        assert_eq!(s.data_dir, PathBuf::from("/srv/autoeq"));
        assert_eq!(s.port, 8080);
        assert!(s.open_browser);

        let _port = EnvGuard::set("AUTOEQ__PORT", "9000");
        let _open = EnvGuard::set("AUTOEQ__OPEN_BROWSER", "false");
        let s = Settings::load().unwrap();
        assert_eq!(s.port, 9000);
        assert!(!s.open_browser);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let _cfg = EnvGuard::set("AUTOEQ_CONFIG", dir.path().join("absent.toml").to_str().unwrap());
        let s = Settings::load().unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_resolve_config_path_env() {
        let _lock = env_lock();
        let _cfg = EnvGuard::set("AUTOEQ_CONFIG", "/etc/autoeq.toml");
        assert_eq!(resolve_config_path(), PathBuf::from("/etc/autoeq.toml"));
    }
}
