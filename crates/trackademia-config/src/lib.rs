//! Profile configuration for Trackademia.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to [`trackademia_core::ClientConfig`]. The CLI layers
//! its flag overrides on top of these helpers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use trackademia_core::config::{DEFAULT_IDENTITY_URL, DEFAULT_STORE_URL, DEFAULT_UPLOAD_URL};
use trackademia_core::{ClientConfig, MAX_UPLOAD_BYTES, TlsVerification, UploadConfig};

/// Keyring service name shared by every profile.
pub const KEYRING_SERVICE: &str = "trackademia";

/// Env var consulted first for the account password.
pub const PASSWORD_ENV: &str = "TRACKADEMIA_PASSWORD";

/// Env var consulted when a profile has no email.
pub const EMAIL_ENV: &str = "TRACKADEMIA_EMAIL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no {what} configured for profile '{profile}'")]
    NoCredentials { what: &'static str, profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

/// Top-level `config.toml`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named project profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, else the configured default.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

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
    30
}

/// One hosted project plus the account used against it.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub project_id: String,

    /// Web API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Account email used to sign in.
    pub email: Option<String>,

    /// Account password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// Override of the document store endpoint.
    pub store_url: Option<String>,

    /// Override of the identity provider endpoint.
    pub identity_url: Option<String>,

    /// Cover upload settings. Absent disables uploads.
    pub upload: Option<UploadProfile>,

    /// Path to an extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadProfile {
    pub cloud_name: String,
    pub upload_preset: String,

    #[serde(default = "default_folder")]
    pub folder: String,

    pub endpoint: Option<String>,

    /// Image size ceiling in bytes.
    pub max_bytes: Option<usize>,
}

fn default_folder() -> String {
    "trackademia".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "trackademia", "trackademia").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("trackademia");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if present), then `TRACKADEMIA_*` env vars.
///
/// Nested keys use a double underscore:
/// `TRACKADEMIA_PROFILES__SCHOOL__PROJECT_ID=demo`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TRACKADEMIA_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if nothing usable is found.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, item: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Store a secret (`"api-key"` or `"password"`) in the system keyring.
pub fn store_secret(profile_name: &str, item: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}"))?;
    entry.set_password(secret)?;
    Ok(())
}

/// API key: `api_key_env` → keyring → plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(secret) = keyring_secret(profile_name, "api-key") {
        return Ok(secret);
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        what: "API key",
        profile: profile_name.into(),
    })
}

/// Account email: profile → `TRACKADEMIA_EMAIL`.
pub fn resolve_email(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .email
        .clone()
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            what: "email",
            profile: profile_name.into(),
        })
}

/// Account password: `TRACKADEMIA_PASSWORD` → keyring → plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Some(secret) = keyring_secret(profile_name, "password") {
        return Ok(secret);
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        what: "password",
        profile: profile_name.into(),
    })
}

// ── Translation to ClientConfig ─────────────────────────────────────

fn parse_url(field: &str, raw: Option<&str>, default: &str) -> Result<Url, ConfigError> {
    let raw = raw.unwrap_or(default);
    Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build a `ClientConfig` from a profile with no CLI overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    if profile.project_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "project_id".into(),
            reason: "must not be empty".into(),
        });
    }

    let upload = profile
        .upload
        .as_ref()
        .map(|u| {
            Ok::<_, ConfigError>(UploadConfig {
                endpoint: parse_url("upload.endpoint", u.endpoint.as_deref(), DEFAULT_UPLOAD_URL)?,
                cloud_name: u.cloud_name.clone(),
                upload_preset: u.upload_preset.clone(),
                folder: u.folder.clone(),
                max_bytes: u.max_bytes.unwrap_or(MAX_UPLOAD_BYTES),
            })
        })
        .transpose()?;

    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);

    Ok(ClientConfig {
        project_id: profile.project_id.clone(),
        api_key: resolve_api_key(profile, profile_name)?,
        store_url: parse_url("store_url", profile.store_url.as_deref(), DEFAULT_STORE_URL)?,
        identity_url: parse_url(
            "identity_url",
            profile.identity_url.as_deref(),
            DEFAULT_IDENTITY_URL,
        )?,
        upload,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "school"

[defaults]
output = "json"
timeout = 12

[profiles.school]
project_id = "trackademia-demo"
api_key = "plain-key"
email = "ada@example.com"
password = "hunter22"
store_url = "http://127.0.0.1:8080"

[profiles.school.upload]
cloud_name = "demo"
upload_preset = "covers"
max_bytes = 2048
"#;

    // A profile name no keyring holds secrets for.
    const SCRATCH: &str = "trackademia-config-unit-test";

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(cfg.active_profile_name(None), "school");
        assert_eq!(cfg.active_profile_name(Some("other")), "other");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");

        let profile = cfg.profile("school").unwrap();
        assert_eq!(profile.project_id, "trackademia-demo");
        assert_eq!(profile.upload.as_ref().unwrap().folder, "trackademia");
        assert!(matches!(
            cfg.profile("nope").unwrap_err(),
            ConfigError::UnknownProfile { .. }
        ));
    }

    #[test]
    fn profile_translates_to_client_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();
        let profile = cfg.profile("school").unwrap();

        let client = profile_to_client_config(profile, SCRATCH, &cfg.defaults).unwrap();
        assert_eq!(client.project_id, "trackademia-demo");
        assert_eq!(client.api_key.expose_secret(), "plain-key");
        assert_eq!(client.store_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(
            client.identity_url.as_str(),
            "https://identitytoolkit.googleapis.com/"
        );
        assert_eq!(client.timeout, Duration::from_secs(12));
        assert_eq!(client.tls, TlsVerification::SystemDefaults);

        let upload = client.upload.unwrap();
        assert_eq!(upload.endpoint.as_str(), "https://api.cloudinary.com/");
        assert_eq!(upload.max_bytes, 2048);
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let profile = Profile {
            project_id: "demo".into(),
            api_key: Some("k".into()),
            store_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, SCRATCH, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "store_url"));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let profile = Profile {
            project_id: "demo".into(),
            ..Profile::default()
        };
        let err = resolve_api_key(&profile, SCRATCH).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("no API key configured for profile '{SCRATCH}'")
        );
    }

    #[test]
    fn empty_project_is_rejected() {
        let profile = Profile {
            api_key: Some("k".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_client_config(&profile, SCRATCH, &Defaults::default()).unwrap_err(),
            ConfigError::Validation { .. }
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                project_id: "demo".into(),
                email: Some("ada@example.com".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(resolve_email(profile, SCRATCH).unwrap(), "ada@example.com");
    }
}
