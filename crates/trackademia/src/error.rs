//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use trackademia_config::ConfigError;
use trackademia_core::{AuthErrorKind, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(trackademia::connection_failed),
        help("Check your network connection and the endpoints in your profile.")
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(trackademia::auth_failed),
        help(
            "Verify the email and password for profile '{profile}'.\n\
             Run: trackademia config set-password --for {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(trackademia::account_exists),
        help("Sign in instead: trackademia account show --email <email>")
    )]
    AccountExists { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(trackademia::no_credentials),
        help(
            "Configure credentials with: trackademia config init\n\
             Or set TRACKADEMIA_EMAIL / TRACKADEMIA_PASSWORD."
        )
    )]
    NoCredentials { what: String, profile: String },

    // ── Route guard ──────────────────────────────────────────────────

    #[error("You are not signed in")]
    #[diagnostic(
        code(trackademia::not_signed_in),
        help("Create an account with: trackademia signup --email <email>")
    )]
    NotSignedIn,

    #[error("Your profile has no degree yet")]
    #[diagnostic(
        code(trackademia::profile_incomplete),
        help("Run: trackademia account setup-degree \"<degree>\"")
    )]
    ProfileIncomplete,

    #[error("Your degree is already set")]
    #[diagnostic(
        code(trackademia::profile_complete),
        help("Change it with: trackademia account edit --degree \"<degree>\"")
    )]
    ProfileAlreadyComplete,

    // ── Records ──────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(trackademia::not_found),
        help("Run: trackademia {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("You don't have permission to access this {resource_type}")]
    #[diagnostic(code(trackademia::permission_denied))]
    PermissionDenied {
        resource_type: String,
        identifier: String,
    },

    // ── Remote services ──────────────────────────────────────────────

    #[error("Store error: {message}")]
    #[diagnostic(code(trackademia::store))]
    Store { message: String, status: Option<u16> },

    #[error("{message}")]
    #[diagnostic(
        code(trackademia::upload),
        help("Covers must be jpeg, png, gif or webp and within the size limit.")
    )]
    Upload { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(trackademia::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(trackademia::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: trackademia config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(trackademia::no_config),
        help(
            "Create one with: trackademia config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(
        code(trackademia::config),
        help("Review your configuration with: trackademia config show")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(trackademia::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(trackademia::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::NoConfig { .. }
            | Self::NotSignedIn => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } | Self::ProfileIncomplete => exit_code::PERMISSION,
            Self::AccountExists { .. } | Self::ProfileAlreadyComplete => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command(kind: &str) -> &'static str {
    match kind {
        "lecture" => "lectures list <book>",
        "account" => "account show",
        _ => "books list",
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { kind, id } => CliError::NotFound {
                resource_type: kind.into(),
                identifier: id,
                list_command: list_command(kind).into(),
            },

            CoreError::Unauthorized { kind, id } => CliError::PermissionDenied {
                resource_type: kind.into(),
                identifier: id,
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Auth { kind, message } => match kind {
                AuthErrorKind::Network => CliError::ConnectionFailed { message },
                AuthErrorKind::AccountAlreadyExists => CliError::AccountExists { message },
                AuthErrorKind::WeakPassword => CliError::Validation {
                    field: "password".into(),
                    reason: message,
                },
                AuthErrorKind::InvalidCredentials | AuthErrorKind::Provider => {
                    CliError::AuthFailed {
                        message,
                        profile: "current".into(),
                    }
                }
            },

            CoreError::NotSignedIn => CliError::NotSignedIn,

            CoreError::Persistence { message, status } => CliError::Store { message, status },

            CoreError::Upload { message } => CliError::Upload { message },

            CoreError::Config { message } => CliError::Config { message },

            err @ CoreError::Malformed { .. } => CliError::Internal(err.to_string()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(run `trackademia config show`)".into(),
            },
            ConfigError::NoCredentials { what, profile } => CliError::NoCredentials {
                what: what.into(),
                profile,
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_redirects_have_distinct_exit_codes() {
        assert_eq!(CliError::NotSignedIn.exit_code(), exit_code::AUTH);
        assert_eq!(CliError::ProfileIncomplete.exit_code(), exit_code::PERMISSION);
        assert_eq!(CliError::ProfileAlreadyComplete.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn core_errors_map_to_cli_errors() {
        let err = CliError::from(CoreError::NotFound {
            kind: "lecture",
            id: "l1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            err,
            CliError::NotFound { ref list_command, .. } if list_command == "lectures list <book>"
        ));

        let err = CliError::from(CoreError::Auth {
            kind: AuthErrorKind::Network,
            message: "offline".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err = CliError::from(CoreError::Unauthorized {
            kind: "book",
            id: "b1".into(),
        });
        assert_eq!(
            err.to_string(),
            "You don't have permission to access this book"
        );
    }
}
