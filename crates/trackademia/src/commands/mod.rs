//! Command dispatch: bridges CLI args -> core use cases -> output formatting.

pub mod account;
pub mod books;
pub mod config_cmd;
pub mod lectures;
pub mod signup;
pub mod util;

use trackademia_core::Access;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Sign in, consult the route guard, run the command, release the session.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let access = match &cmd {
        Command::Account(args) => account::access_for(&args.command),
        Command::Books(_) | Command::Lectures(_) => Access::ProfileComplete,
        // Handled before dispatch.
        Command::Signup(_) | Command::Config(_) | Command::Completions(_) => {
            return Err(CliError::Internal(
                "command does not need a signed-in session".into(),
            ));
        }
    };

    let services = util::sign_in(global, access).await?;
    let result = match cmd {
        Command::Account(args) => account::handle(&services, args, global).await,
        Command::Books(args) => books::handle(&services, args, global).await,
        Command::Lectures(args) => lectures::handle(&services, args, global).await,
        Command::Signup(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    services.shutdown().await;
    result
}
