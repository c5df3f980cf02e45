// ── Stored record types ──
//
// `Record` ties a domain type to its collection, its write shapes, and
// the fields that hold dates, so the gateway can stay generic.

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumString};

use crate::model::{
    Account, AccountPatch, Book, BookPatch, Lecture, LecturePatch, NewAccount, NewBook,
    NewLecture, RecordId,
};

/// The three collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Accounts,
    Books,
    Lectures,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Books => "books",
            Self::Lectures => "lectures",
        }
    }
}

/// A domain type persisted as one document per record.
pub trait Record: DeserializeOwned + Send + Sync + 'static {
    /// Shape written on create.
    type Draft: Serialize + Send + Sync;
    /// Shape written on update; absent fields are left untouched.
    type Patch: Serialize + Send + Sync;

    const COLLECTION: Collection;
    /// Singular noun for error messages.
    const KIND: &'static str;
    /// Fields holding instants (stored and read back as full timestamps).
    const INSTANT_FIELDS: &'static [&'static str] = &["createdAt", "updatedAt"];
    /// Fields holding calendar days (stored as UTC midnight).
    const DAY_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &RecordId;
}

/// A record that belongs to exactly one account.
pub trait Owned {
    fn owner_id(&self) -> &RecordId;
}

impl Record for Account {
    type Draft = NewAccount;
    type Patch = AccountPatch;

    const COLLECTION: Collection = Collection::Accounts;
    const KIND: &'static str = "account";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Book {
    type Draft = NewBook;
    type Patch = BookPatch;

    const COLLECTION: Collection = Collection::Books;
    const KIND: &'static str = "book";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Lecture {
    type Draft = NewLecture;
    type Patch = LecturePatch;

    const COLLECTION: Collection = Collection::Lectures;
    const KIND: &'static str = "lecture";
    const DAY_FIELDS: &'static [&'static str] = &["date"];

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Owned for Account {
    fn owner_id(&self) -> &RecordId {
        &self.id
    }
}

impl Owned for Book {
    fn owner_id(&self) -> &RecordId {
        &self.owner_id
    }
}

impl Owned for Lecture {
    fn owner_id(&self) -> &RecordId {
        &self.owner_id
    }
}
