// ── Data-access gateway ──
//
// Policy-free CRUD over the document store. Construct once, clone the
// handle wherever it's needed. Stamps `createdAt`/`updatedAt` from the
// local clock and normalizes date fields on the way in and out; it does
// not check ownership (see `authz`).

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, warn};

use trackademia_api::{FieldFilter, Order, Query};

use crate::convert;
use crate::error::CoreError;
use crate::model::RecordId;
use crate::ports::DocumentStore;
use crate::record::{Collection, Record};

/// Shared handle to the document store.
#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn DocumentStore>,
}

impl DataGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Forward the signed-in user's token (or its absence) to the store.
    pub fn authorize(&self, id_token: Option<SecretString>) {
        self.store.authorize(id_token);
    }

    /// Create a record with a store-assigned id.
    pub async fn create<T: Record>(&self, draft: &T::Draft) -> Result<RecordId, CoreError> {
        self.insert::<T>(None, draft).await
    }

    /// Create a record under a caller-chosen id (accounts use the user id).
    pub async fn create_with_id<T: Record>(
        &self,
        id: &RecordId,
        draft: &T::Draft,
    ) -> Result<RecordId, CoreError> {
        self.insert::<T>(Some(id), draft).await
    }

    async fn insert<T: Record>(
        &self,
        id: Option<&RecordId>,
        draft: &T::Draft,
    ) -> Result<RecordId, CoreError> {
        let mut object = convert::to_object(draft)?;
        let now = convert::now_json(Utc::now());
        object.entry("createdAt").or_insert_with(|| now.clone());
        object.entry("updatedAt").or_insert(now);

        let fields = convert::encode_fields::<T>(object)?;
        let doc = self
            .store
            .create(T::COLLECTION.as_str(), id.map(RecordId::as_str), fields)
            .await?;

        let id = RecordId::from(doc.id());
        debug!(collection = %T::COLLECTION, %id, "record created");
        Ok(id)
    }

    /// Fetch one record. Absence is `Ok(None)`.
    pub async fn get<T: Record>(&self, id: &RecordId) -> Result<Option<T>, CoreError> {
        let Some(doc) = self.store.get(T::COLLECTION.as_str(), id.as_str()).await? else {
            return Ok(None);
        };
        convert::decode_document::<T>(doc).map(Some)
    }

    /// Records matching every equality filter, sorted by `order` (descending unless
    /// built with `Order::asc`). Documents that fail to decode are logged and skipped.
    pub async fn list<T: Record>(
        &self,
        filters: Vec<FieldFilter>,
        order: impl Into<Order>,
    ) -> Result<Vec<T>, CoreError> {
        let query = Query {
            collection: T::COLLECTION.as_str().to_owned(),
            filters,
            order_by: Some(order.into()),
        };
        let docs = self.store.query(&query).await?;
        debug!(collection = %T::COLLECTION, count = docs.len(), "records listed");
        let records = docs
            .into_iter()
            .filter_map(|doc| match convert::decode_document::<T>(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection = %T::COLLECTION, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Merge the fields present in `patch` and stamp `updatedAt`.
    pub async fn update<T: Record>(&self, id: &RecordId, patch: &T::Patch) -> Result<(), CoreError> {
        let mut object = convert::to_object(patch)?;
        object.remove("createdAt");
        object.insert("updatedAt".to_owned(), convert::now_json(Utc::now()));

        let fields = convert::encode_fields::<T>(object)?;
        self.store
            .patch(T::COLLECTION.as_str(), id.as_str(), fields)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    CoreError::NotFound {
                        kind: T::KIND,
                        id: id.to_string(),
                    }
                } else {
                    e.into()
                }
            })?;
        debug!(collection = %T::COLLECTION, %id, "record updated");
        Ok(())
    }

    /// Delete by id. An id that is already gone is not an error.
    pub async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), CoreError> {
        match self.store.delete(collection.as_str(), id.as_str()).await {
            Ok(()) => {
                debug!(%collection, %id, "record deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
