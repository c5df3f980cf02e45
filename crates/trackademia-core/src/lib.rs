//! Session and data-consistency layer of Trackademia.
//!
//! - **[`DataGateway`]**: policy-free CRUD over the remote document store.
//!   Stamps `createdAt`/`updatedAt` and normalizes date fields so that
//!   records round-trip without timezone drift.
//!
//! - **[`IdentityGateway`]**: email/password sign-up, sign-in, and sign-out,
//!   plus [`subscribe`](IdentityGateway::subscribe) for identity changes.
//!   Sign-up provisions the user's [`Account`] record as a best-effort
//!   follow-up.
//!
//! - **[`SessionController`]**: the single writer of
//!   `{identity, profile, is_loading}`; readers get snapshots or a
//!   [`SessionWatch`].
//!
//! - **[`guard`]** and **[`selection`]**: pure decisions for route access
//!   and for which lecture to open first.
//!
//! - **[`Library`]**: book and lecture use cases for one owner, every call
//!   passing through the ownership checkpoint in [`authz`].
//!
//! [`Services`] builds all of the above once from a [`ClientConfig`].

pub mod authz;
pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod identity;
pub mod library;
pub mod model;
pub mod ports;
pub mod record;
pub mod selection;
pub mod services;
pub mod session;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, TlsVerification, UploadConfig};
pub use error::{AuthErrorKind, CoreError};
pub use gateway::DataGateway;
pub use guard::{Access, Decision, Route};
pub use identity::{Identity, IdentityGateway, Subscription};
pub use library::{LectureBoard, Library};
pub use ports::{DocumentStore, IdentityProvider};
pub use record::{Collection, Owned, Record};
pub use selection::select_active;
pub use services::Services;
pub use session::{SessionController, SessionState, SessionWatch};

pub use model::{
    Account, AccountPatch, Book, BookPatch, Difficulty, Lecture, LecturePatch, NewAccount,
    NewBook, NewLecture, RecordId, Topic,
};

// Image payload for `Library::upload_cover` and its default size ceiling.
pub use trackademia_api::{ImageFile, MAX_UPLOAD_BYTES};
