// ── Ownership checkpoint ──
//
// The gateway is policy-free; every owner check in the crate goes
// through `ensure_owned` so that a new use case cannot forget one.

use tracing::warn;

use crate::error::CoreError;
use crate::model::RecordId;
use crate::record::{Owned, Record};

/// Pass `record` through if `actor` owns it.
pub fn ensure_owned<T: Record + Owned>(record: T, actor: &RecordId) -> Result<T, CoreError> {
    if record.owner_id() == actor {
        Ok(record)
    } else {
        warn!(
            kind = T::KIND,
            id = %record.id(),
            actor = %actor,
            "ownership check failed"
        );
        Err(CoreError::Unauthorized {
            kind: T::KIND,
            id: record.id().to_string(),
        })
    }
}
