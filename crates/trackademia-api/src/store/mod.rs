// Document store client (Firestore REST v1 dialect).
//
// Base path: {store_url}/v1/projects/{project}/databases/(default)/documents
// Auth: `key` query parameter plus `Authorization: Bearer <idToken>` once signed in

pub mod client;
pub mod query;
pub mod value;

pub use client::DocumentClient;
pub use query::{Direction, FieldFilter, Order, Query};
pub use value::{ArrayValue, Document, Fields, MapValue, Value};
