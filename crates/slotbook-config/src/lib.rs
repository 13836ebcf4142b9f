//! Shared configuration for slotbook.
//!
//! TOML profiles, one per booking endpoint, loaded through figment
//! (defaults, then the config file, then `SLOTBOOK_`-prefixed env vars) and
//! translated into `slotbook_core::BookingConfig`. The CLI layers its
//! `GlobalOpts` flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slotbook_core::{BookingConfig, SlotSchedule};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "SLOTBOOK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named endpoint profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    0
}

/// A named booking endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Endpoint base URL (e.g., "https://script.google.com/macros/s/.../exec").
    pub endpoint: String,

    /// Accepted test type codes. Empty accepts any code.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_types: Vec<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds, `0` disables).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Hour the first slot starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u8>,

    /// Hour by which the last slot ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<u8>,

    /// Slot length in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_minutes: Option<u8>,

    /// Delay before slots are refreshed after a booking, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_delay_ms: Option<u64>,
}

impl Profile {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Opening hours, with unset fields taken from the default schedule.
    pub fn schedule(&self) -> SlotSchedule {
        let base = SlotSchedule::default();
        SlotSchedule {
            start_hour: self.start_hour.unwrap_or(base.start_hour),
            end_hour: self.end_hour.unwrap_or(base.end_hour),
            slot_minutes: self.slot_minutes.unwrap_or(base.slot_minutes),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `SLOTBOOK_CONFIG` if set, otherwise the
/// platform config dir (`$XDG_CONFIG_HOME/slotbook/config.toml` on Linux).
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    ProjectDirs::from("com", "slotbook", "slotbook").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("slotbook");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and env still apply. Nested
/// keys are addressed with a double underscore, e.g.
/// `SLOTBOOK_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SLOTBOOK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse and check an endpoint URL.
pub fn parse_endpoint(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

/// Convert a timeout in seconds to the runtime form; `0` means no timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Build a `BookingConfig` from a profile. No CLI flag overrides.
///
/// `default_timeout` applies when the profile does not set its own.
pub fn profile_to_booking_config(
    profile: &Profile,
    default_timeout: u64,
) -> Result<BookingConfig, ConfigError> {
    let endpoint = parse_endpoint(&profile.endpoint)?;

    let mut config = BookingConfig::new(endpoint);
    config.timeout = timeout_from_secs(profile.timeout.unwrap_or(default_timeout));
    config.ca_cert.clone_from(&profile.ca_cert);
    config.schedule = profile.schedule();
    config.test_types.clone_from(&profile.test_types);
    if let Some(ms) = profile.refresh_delay_ms {
        config.refresh_delay = Duration::from_millis(ms);
    }

    config.validate().map_err(|e| ConfigError::Validation {
        field: "profile".into(),
        reason: e.to_string(),
    })?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "clinic"

[defaults]
output = "json"
timeout = 10

[profiles.clinic]
endpoint = "https://bookings.example.com/exec"
test_types = ["A", "B", "C"]
slot_minutes = 30
refresh_delay_ms = 250
"#;

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("clinic"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");

        let profile = cfg.profile("clinic").unwrap();
        assert_eq!(profile.test_types, vec!["A", "B", "C"]);
        assert_eq!(profile.schedule().slot_minutes, 30);
        assert_eq!(profile.schedule().start_hour, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 0);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("home".into(), Profile::new("https://a.example/exec"));
        cfg.profiles
            .insert("clinic".into(), Profile::new("https://b.example/exec"));

        match cfg.profile("work").unwrap_err() {
            ConfigError::ProfileNotFound { name, available } => {
                assert_eq!(name, "work");
                assert_eq!(available, vec!["clinic", "home"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn save_then_load_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("https://bookings.example.com/exec");
        profile.timeout = Some(0);
        cfg.profiles.insert("default".into(), profile);
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.default]"));
        assert!(!text.contains("ca_cert"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile("default").unwrap().timeout, Some(0));
    }

    #[test]
    fn profile_translates_to_booking_config() {
        let mut profile = Profile::new("https://bookings.example.com/exec");
        profile.refresh_delay_ms = Some(250);
        profile.test_types = vec!["B".into()];

        let config = profile_to_booking_config(&profile, 12).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://bookings.example.com/exec");
        assert_eq!(config.timeout, Some(Duration::from_secs(12)));
        assert_eq!(config.refresh_delay, Duration::from_millis(250));
        assert_eq!(config.test_types, vec!["B"]);

        profile.timeout = Some(0);
        let config = profile_to_booking_config(&profile, 12).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let profile = Profile::new("not a url");
        assert!(matches!(
            profile_to_booking_config(&profile, 30),
            Err(ConfigError::Validation { .. })
        ));

        let profile = Profile::new("ftp://bookings.example.com/exec");
        assert!(profile_to_booking_config(&profile, 30).is_err());

        let mut profile = Profile::new("https://bookings.example.com/exec");
        profile.start_hour = Some(19);
        assert!(profile_to_booking_config(&profile, 30).is_err());
    }
}
