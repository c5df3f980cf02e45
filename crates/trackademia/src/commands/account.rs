//! Account command handlers.

use serde::Serialize;

use trackademia_core::{Access, Account, AccountPatch, Identity, Services, SessionState};

use crate::cli::{AccountArgs, AccountCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// What `account show` prints: the identity merged with its profile record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub degree: Option<String>,
    pub profile_complete: bool,
}

impl ProfileView {
    pub fn new(identity: &Identity, profile: Option<&Account>) -> Self {
        Self {
            id: identity.id.to_string(),
            email: profile.map_or_else(|| identity.email.clone(), |p| p.email.clone()),
            display_name: profile
                .and_then(|p| p.display_name.clone())
                .or_else(|| identity.display_name.clone()),
            degree: profile.and_then(|p| p.degree.clone()),
            profile_complete: profile.is_some_and(Account::has_degree),
        }
    }

    pub fn from_state(state: &SessionState) -> Option<Self> {
        state
            .identity
            .as_ref()
            .map(|identity| Self::new(identity, state.profile.as_deref()))
    }
}

fn detail(view: &ProfileView, color: bool) -> String {
    let dash = || "-".to_owned();
    [
        output::heading(&view.email, color),
        format!("  id:       {}", view.id),
        format!("  name:     {}", view.display_name.clone().unwrap_or_else(dash)),
        format!("  degree:   {}", view.degree.clone().unwrap_or_else(dash)),
    ]
    .join("\n")
}

pub fn render(view: &ProfileView, global: &GlobalOpts) -> String {
    let color = output::should_color(&global.color);
    output::render_single(&global.output, view, |v| detail(v, color), |v| v.id.clone())
}

/// `show` and `edit` only need a signed-in user; degree setup is the
/// profile-setup page and refuses a profile that already has one.
pub fn access_for(cmd: &AccountCommand) -> Access {
    match cmd {
        AccountCommand::Show | AccountCommand::Edit { .. } => Access::SignedIn,
        AccountCommand::SetupDegree { .. } => Access::ProfileSetup,
    }
}

/// Trimmed profile changes for `account edit`. Blank values are rejected.
fn edit_patch(display_name: Option<&str>, degree: Option<&str>) -> Result<AccountPatch, CliError> {
    if display_name.is_none() && degree.is_none() {
        return Err(CliError::validation(
            "account",
            "pass --display-name and/or --degree",
        ));
    }
    let filled = |field: &str, value: Option<&str>, reason: &str| {
        value
            .map(|v| match v.trim() {
                "" => Err(CliError::validation(field, reason)),
                v => Ok(v.to_owned()),
            })
            .transpose()
    };
    Ok(AccountPatch {
        display_name: filled("display_name", display_name, "Please enter your name")?,
        degree: filled("degree", degree, "Please enter your degree")?,
    })
}

pub async fn handle(
    services: &Services,
    args: AccountArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = services.session();
    match args.command {
        AccountCommand::Show => {}

        AccountCommand::SetupDegree { degree } => {
            session.complete_profile(&degree).await?;
            output::notice("✓ Degree saved. You can start tracking books now.", global.quiet);
        }

        AccountCommand::Edit {
            display_name,
            degree,
        } => {
            let patch = edit_patch(display_name.as_deref(), degree.as_deref())?;
            session.update_profile(&patch).await?;
            output::notice("✓ Profile updated", global.quiet);
        }
    }

    let view = ProfileView::from_state(&session.state()).ok_or(CliError::NotSignedIn)?;
    output::print_output(&render(&view, global), global.quiet);
    Ok(())
}
