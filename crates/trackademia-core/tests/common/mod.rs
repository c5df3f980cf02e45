// Shared fakes for core integration tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use trackademia_api::{Direction, Document, Error, Fields, Query, Rejection, Value};
use trackademia_core::ports::{DocumentStore, IdentityProvider, PortResult};
use trackademia_core::{Identity, RecordId};

// ── MemoryStore ─────────────────────────────────────────────────────

/// In-memory document store with the query semantics of the real one.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<(String, String), Fields>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    token: Mutex<Option<String>>,
    fail_creates_in: Mutex<Option<String>>,
    fail_reads: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create/patch/delete calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.docs
            .lock()
            .unwrap()
            .contains_key(&(collection.to_owned(), id.to_owned()))
    }

    pub fn raw(&self, collection: &str, id: &str) -> Option<Fields> {
        self.docs
            .lock()
            .unwrap()
            .get(&(collection.to_owned(), id.to_owned()))
            .cloned()
    }

    /// Insert a document as-is, bypassing the gateway.
    pub fn seed(&self, collection: &str, id: &str, fields: Fields) {
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_owned(), id.to_owned()), fields);
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// Make every create in `collection` fail with a 503.
    pub fn fail_creates_in(&self, collection: &str) {
        *self.fail_creates_in.lock().unwrap() = Some(collection.to_owned());
    }

    /// Make every get fail with a 503.
    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    fn document(collection: &str, id: &str, fields: Fields) -> Document {
        Document {
            name: format!("projects/test/databases/(default)/documents/{collection}/{id}"),
            fields,
            ..Document::default()
        }
    }

    fn unavailable() -> Error {
        Error::Store {
            status: 503,
            message: "backend unavailable".into(),
            code: Some("UNAVAILABLE".into()),
        }
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Timestamp(x)), Some(Value::Timestamp(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Integer(x)), Some(Value::Integer(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> PortResult<Document> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_creates_in.lock().unwrap().as_deref() == Some(collection) {
            return Err(Self::unavailable());
        }
        let id = id.map_or_else(
            || format!("doc-{}", self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1),
            str::to_owned,
        );
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_owned(), id.clone()), fields.clone());
        Ok(Self::document(collection, &id, fields))
    }

    async fn get(&self, collection: &str, id: &str) -> PortResult<Option<Document>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(Self::unavailable());
        }
        Ok(self
            .raw(collection, id)
            .map(|fields| Self::document(collection, id, fields)))
    }

    async fn query(&self, query: &Query) -> PortResult<Vec<Document>> {
        let docs = self.docs.lock().unwrap();
        let mut hits: Vec<(String, Fields)> = docs
            .iter()
            .filter(|((collection, _), _)| *collection == query.collection)
            .filter(|(_, fields)| {
                query
                    .filters
                    .iter()
                    .all(|f| fields.get(&f.field) == Some(&f.value))
            })
            .map(|((_, id), fields)| (id.clone(), fields.clone()))
            .collect();
        drop(docs);

        if let Some(order) = &query.order_by {
            hits.sort_by(|(_, a), (_, b)| {
                let ord = compare(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        Ok(hits
            .into_iter()
            .map(|(id, fields)| Self::document(&query.collection, &id, fields))
            .collect())
    }

    async fn patch(&self, collection: &str, id: &str, fields: Fields) -> PortResult<()> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let mut docs = self.docs.lock().unwrap();
        let Some(existing) = docs.get_mut(&(collection.to_owned(), id.to_owned())) else {
            return Err(Error::Store {
                status: 404,
                message: format!("No document to update: {collection}/{id}"),
                code: Some("NOT_FOUND".into()),
            });
        };
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.docs
            .lock()
            .unwrap()
            .remove(&(collection.to_owned(), id.to_owned()));
        Ok(())
    }

    fn authorize(&self, id_token: Option<SecretString>) {
        *self.token.lock().unwrap() = id_token.map(|t| t.expose_secret().to_owned());
    }
}

// ── ScriptedIdentity ────────────────────────────────────────────────

/// Identity provider backed by a map of email -> (uid, password).
#[derive(Default)]
pub struct ScriptedIdentity {
    users: Mutex<HashMap<String, (String, String, Option<String>)>>,
    next_uid: AtomicUsize,
}

impl ScriptedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, uid: &str, password: &str) -> Self {
        self.users.lock().unwrap().insert(
            email.to_owned(),
            (uid.to_owned(), password.to_owned(), None),
        );
        self
    }

    fn identity(uid: &str, email: &str, display_name: Option<String>) -> Identity {
        Identity::new(
            RecordId::from(uid),
            email,
            display_name,
            SecretString::from(format!("token-{uid}")),
        )
    }

    fn reject(rejection: Rejection, code: &str) -> Error {
        Error::Identity {
            rejection,
            message: code.to_owned(),
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn sign_up(&self, email: &str, password: &SecretString) -> PortResult<Identity> {
        if password.expose_secret().len() < 6 {
            return Err(Self::reject(Rejection::WeakPassword, "WEAK_PASSWORD"));
        }
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(Self::reject(Rejection::EmailExists, "EMAIL_EXISTS"));
        }
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, AtomicOrdering::SeqCst) + 1);
        users.insert(
            email.to_owned(),
            (uid.clone(), password.expose_secret().to_owned(), None),
        );
        Ok(Self::identity(&uid, email, None))
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> PortResult<Identity> {
        let users = self.users.lock().unwrap();
        match users.get(email) {
            Some((uid, stored, name)) if stored == password.expose_secret() => {
                Ok(Self::identity(uid, email, name.clone()))
            }
            _ => Err(Self::reject(
                Rejection::InvalidCredentials,
                "INVALID_LOGIN_CREDENTIALS",
            )),
        }
    }

    async fn set_display_name(&self, identity: &Identity, display_name: &str) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(entry) = users.get_mut(&identity.email) {
            entry.2 = Some(display_name.to_owned());
        }
        Ok(())
    }
}
