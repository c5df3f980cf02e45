// ── Domain model ──
//
// Canonical record types shared by the gateway, the session controller,
// and the CLI. Wire field names are camelCase; timestamps are normalized
// to `DateTime<Utc>` (instants) or `NaiveDate` (calendar days).

pub mod account;
pub mod book;
pub mod lecture;
pub mod record_id;

pub use account::{Account, AccountPatch, NewAccount};
pub use book::{Book, BookPatch, NewBook};
pub use lecture::{Difficulty, Lecture, LecturePatch, NewLecture, Topic};
pub use record_id::RecordId;
