// ── Route guard ──
//
// Pure decisions over a session snapshot. The guard never navigates; it
// returns a redirect intent and the caller performs the transition.

use strum::Display;

use crate::identity::Identity;
use crate::model::Account;
use crate::session::SessionState;

/// Where a redirect should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Route {
    #[strum(to_string = "/auth/login")]
    SignIn,
    #[strum(to_string = "/degree-setup")]
    ProfileSetup,
    #[strum(to_string = "/dashboard")]
    Dashboard,
}

/// Outcome of guarding a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Session still resolving; show a neutral placeholder.
    Loading,
    Redirect(Route),
    Admit,
}

/// What a view requires of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sign-in / sign-up pages: only for signed-out visitors.
    Guest,
    /// Any signed-in user, profile complete or not.
    SignedIn,
    /// Signed in with a degree on record.
    ProfileComplete,
    /// The profile-setup page itself: signed in, degree still missing.
    ProfileSetup,
}

/// The core rule for protected views.
pub fn evaluate(
    identity: Option<&Identity>,
    profile: Option<&Account>,
    is_loading: bool,
    requires_profile_completion: bool,
) -> Decision {
    if is_loading {
        return Decision::Loading;
    }
    if identity.is_none() {
        return Decision::Redirect(Route::SignIn);
    }
    // A missing profile admits: the view degrades instead of looping on setup.
    if requires_profile_completion && profile.is_some_and(|p| !p.has_degree()) {
        return Decision::Redirect(Route::ProfileSetup);
    }
    Decision::Admit
}

/// Guard any kind of view against a session snapshot.
pub fn evaluate_access(state: &SessionState, access: Access) -> Decision {
    let identity = state.identity.as_ref();
    let profile = state.profile.as_deref();

    match access {
        Access::SignedIn => evaluate(identity, profile, state.is_loading, false),
        Access::ProfileComplete => evaluate(identity, profile, state.is_loading, true),
        Access::Guest => {
            if state.is_loading {
                Decision::Loading
            } else if identity.is_some() {
                Decision::Redirect(Route::Dashboard)
            } else {
                Decision::Admit
            }
        }
        Access::ProfileSetup => match evaluate(identity, profile, state.is_loading, false) {
            Decision::Admit if profile.is_some_and(Account::has_degree) => {
                Decision::Redirect(Route::Dashboard)
            }
            other => other,
        },
    }
}
