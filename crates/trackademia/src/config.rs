//! Flag-aware wrappers over `trackademia_config`.
//!
//! The one place where CLI flags, the profile file, and the credential
//! chain meet to produce a `ClientConfig` and sign-in credentials.

use std::io::IsTerminal;

use secrecy::SecretString;

use trackademia_config::{self as tc, Config, Profile};
use trackademia_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile after flag overrides, plus the name it was found under.
pub struct Resolved {
    pub name: String,
    pub profile: Profile,
    pub client: ClientConfig,
}

/// Active profile name: `--profile`, else the configured default.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Merge the active profile with `--project`, `--api-key`, `--email`
/// and `--timeout`. Without a profile the flags alone must suffice.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = tc::load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.project.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name,
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: tc::config_path().display().to_string(),
            });
        }
    };

    if let Some(ref project) = global.project {
        profile.project_id.clone_from(project);
    }
    if let Some(ref key) = global.api_key {
        profile.api_key = Some(key.clone());
        // An explicit key beats the keyring and env chain.
        profile.api_key_env = None;
    }
    if let Some(ref email) = global.email {
        profile.email = Some(email.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let mut client = tc::profile_to_client_config(&profile, &name, &cfg.defaults)?;
    if let Some(ref key) = global.api_key {
        client.api_key = SecretString::from(key.clone());
    }

    tracing::debug!(profile = %name, project = %client.project_id, "profile resolved");
    Ok(Resolved {
        name,
        profile,
        client,
    })
}

/// Email and password for signing in. Prompts for the password when
/// nothing is configured and stdin is a terminal.
pub fn resolve_login(resolved: &Resolved) -> Result<(String, SecretString), CliError> {
    let email = tc::resolve_email(&resolved.profile, &resolved.name)?;
    let password = match tc::resolve_password(&resolved.profile, &resolved.name) {
        Ok(password) => password,
        Err(err) if std::io::stdin().is_terminal() => {
            tracing::debug!(%err, "no stored password, prompting");
            prompt_password("Password: ")?
        }
        Err(err) => return Err(err.into()),
    };
    Ok((email, password))
}

pub fn prompt_password(label: &str) -> Result<SecretString, CliError> {
    let secret = rpassword::prompt_password(label)?;
    if secret.is_empty() {
        return Err(CliError::validation("password", "value cannot be empty"));
    }
    Ok(SecretString::from(secret))
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
