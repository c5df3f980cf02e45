//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use bytes::Bytes;
use chrono::NaiveDate;

use trackademia_core::{
    Access, CoreError, Decision, Difficulty, ImageFile, RecordId, Route, Services, Topic,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Sign in with the resolved profile and require `access` from the guard.
pub async fn sign_in(global: &GlobalOpts, access: Access) -> Result<Services, CliError> {
    let resolved = config::resolve(global)?;
    let (email, password) = config::resolve_login(&resolved)?;

    let services = Services::new(&resolved.client)?;
    let admitted = match services.session().sign_in(&email, &password).await {
        Ok(state) => require(state.decide(access)),
        Err(err) => Err(with_profile(err, &resolved.name)),
    };

    if let Err(err) = admitted {
        services.shutdown().await;
        return Err(err);
    }
    Ok(services)
}

/// Attach the profile name to auth failures so the help text is actionable.
pub fn with_profile(err: CoreError, profile_name: &str) -> CliError {
    match CliError::from(err) {
        CliError::AuthFailed { message, .. } => CliError::AuthFailed {
            message,
            profile: profile_name.into(),
        },
        other => other,
    }
}

/// Turn a guard decision into a command-line outcome.
pub fn require(decision: Decision) -> Result<(), CliError> {
    match decision {
        Decision::Admit => Ok(()),
        Decision::Redirect(Route::SignIn) => Err(CliError::NotSignedIn),
        Decision::Redirect(Route::ProfileSetup) => Err(CliError::ProfileIncomplete),
        Decision::Redirect(Route::Dashboard) => Err(CliError::ProfileAlreadyComplete),
        Decision::Loading => Err(CliError::Internal(
            "session did not finish loading".into(),
        )),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

pub fn record_id(raw: &str) -> RecordId {
    RecordId::from(raw.trim())
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::validation("date", format!("expected YYYY-MM-DD, got '{raw}' ({e})")))
}

/// Parse `name::explanation[::difficulty]`.
///
/// Empty parts are passed through; the core drops incomplete topics and
/// rejects a lecture left with none.
pub fn parse_topic(raw: &str) -> Result<Topic, CliError> {
    let mut parts = raw.splitn(3, "::");
    let name = parts.next().unwrap_or_default();
    let explanation = parts.next().ok_or_else(|| {
        CliError::validation("topic", format!("expected \"name::explanation\", got '{raw}'"))
    })?;
    let difficulty = match parts.next().map(str::trim) {
        None | Some("") => Difficulty::default(),
        Some(level) => level.parse().map_err(|_| {
            CliError::validation(
                "topic",
                format!("difficulty must be easy, moderate or difficult, got '{level}'"),
            )
        })?,
    };
    Ok(Topic {
        name: name.into(),
        explanation: explanation.into(),
        difficulty,
    })
}

pub fn parse_topics(raw: &[String]) -> Result<Vec<Topic>, CliError> {
    raw.iter().map(|t| parse_topic(t)).collect()
}

/// MIME type from the file extension. The host only accepts these four.
fn image_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read an image file for upload.
pub fn load_image(path: &Path) -> Result<ImageFile, CliError> {
    let content_type = image_content_type(path).ok_or_else(|| {
        CliError::validation(
            "image",
            format!("{} is not a jpeg, png, gif or webp file", path.display()),
        )
    })?;
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "cover".into(), |n| n.to_string_lossy().into_owned());
    Ok(ImageFile {
        file_name,
        content_type: content_type.into(),
        bytes: Bytes::from(bytes),
    })
}
