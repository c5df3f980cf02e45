//! `signup`: create an identity and its profile record.

use std::io::IsTerminal;

use secrecy::ExposeSecret;

use trackademia_config as tc;
use trackademia_core::{Access, Services};

use crate::cli::{GlobalOpts, SignupArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::account::{self, ProfileView};
use super::util;

pub async fn handle(args: SignupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let email = tc::resolve_email(&resolved.profile, &resolved.name)?;
    let password = if std::io::stdin().is_terminal()
        && tc::resolve_password(&resolved.profile, &resolved.name).is_err()
    {
        let first = config::prompt_password("Choose a password: ")?;
        let again = config::prompt_password("Repeat password: ")?;
        if first.expose_secret() != again.expose_secret() {
            return Err(CliError::validation("password", "passwords do not match"));
        }
        first
    } else {
        config::resolve_login(&resolved)?.1
    };

    let services = Services::new(&resolved.client)?;
    let result = services
        .session()
        .sign_up(&email, &password, args.display_name.as_deref())
        .await;
    services.shutdown().await;
    let state = result.map_err(|e| util::with_profile(e, &resolved.name))?;

    let view = ProfileView::from_state(&state).ok_or(CliError::NotSignedIn)?;
    output::print_output(&account::render(&view, global), global.quiet);

    if util::require(state.decide(Access::ProfileComplete)).is_err() {
        output::notice(
            "Next: trackademia account setup-degree \"<degree>\"",
            global.quiet,
        );
    }
    Ok(())
}
