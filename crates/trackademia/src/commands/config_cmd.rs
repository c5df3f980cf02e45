//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use trackademia_config::{self as tc, Config, Profile, UploadProfile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

fn ask(prompt: &str, default: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.into());
    }
    input.interact_text().map_err(prompt_err)
}

/// Keyring or plaintext. Returns the plaintext to keep in the file, if any.
fn store_choice(profile_name: &str, item: &str, secret: String) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {item}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        tc::store_secret(profile_name, item, &secret)?;
        eprintln!("   ✓ {item} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

/// Copy of the config with secrets masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mask = |s: &Option<String>| s.as_ref().map(|_| "********".to_owned());
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: tc::Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                p.api_key = mask(&p.api_key);
                p.password = mask(&p.password);
                (name.clone(), p)
            })
            .collect(),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = tc::config_path();
            eprintln!("Trackademia configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = tc::load_config_or_default();

            let profile_name = ask("Profile name", Some("default"))?;
            let project_id = ask("Project id", None)?;

            let key = rpassword::prompt_password("Web API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::validation("api_key", "API key cannot be empty"));
            }
            let api_key = store_choice(&profile_name, "api-key", key)?;

            let email = ask("Account email", None)?;
            let password = rpassword::prompt_password("Password (empty to skip): ")
                .map_err(prompt_err)?;
            let password = if password.is_empty() {
                None
            } else {
                store_choice(&profile_name, "password", password)?
            };

            let upload = if Confirm::new()
                .with_prompt("Configure cover image uploads?")
                .default(false)
                .interact()
                .map_err(prompt_err)?
            {
                Some(UploadProfile {
                    cloud_name: ask("Cloud name", None)?,
                    upload_preset: ask("Unsigned upload preset", None)?,
                    folder: ask("Folder", Some("trackademia"))?,
                    endpoint: None,
                    max_bytes: None,
                })
            } else {
                None
            };

            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    project_id,
                    api_key,
                    email: Some(email),
                    password,
                    upload,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            tc::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  New here? trackademia signup --display-name \"<name>\"");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&tc::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                toml_view,
                |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { target } => {
            let cfg = tc::load_config_or_default();
            let profile_name =
                target.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::validation("password", "value cannot be empty"));
            }
            tc::store_secret(&profile_name, "password", &secret)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

fn toml_view(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("{cfg:#?}\n(render failed: {e})"))
}
