// ── Record <-> document conversion ──
//
// Records go through `serde_json` on their way to and from the store's
// typed field map. Date-valued fields are the only ones needing care:
// instants travel as RFC 3339 strings in JSON and as native timestamps
// in the store; calendar days are pinned to UTC midnight so that a day
// survives the round trip regardless of the local timezone.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::{Map, Value as Json};

use trackademia_api::store::value::format_timestamp;
use trackademia_api::{Document, Fields, Value};

use crate::error::CoreError;
use crate::record::Record;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Store representation of a calendar day.
pub fn day_to_timestamp(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Calendar day of a stored timestamp.
pub fn timestamp_to_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Serialize a write shape into a JSON object.
pub(crate) fn to_object<S: serde::Serialize>(value: &S) -> Result<Map<String, Json>, CoreError> {
    match serde_json::to_value(value) {
        Ok(Json::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::Internal(format!(
            "record must serialize to an object, got {other}"
        ))),
        Err(e) => Err(CoreError::Internal(format!("record serialization failed: {e}"))),
    }
}

/// Turn a JSON object into store fields, typing the date-valued ones.
pub(crate) fn encode_fields<T: Record>(object: Map<String, Json>) -> Result<Fields, CoreError> {
    object
        .into_iter()
        .map(|(name, json)| {
            let value = match json {
                Json::String(raw) if T::INSTANT_FIELDS.contains(&name.as_str()) => {
                    Value::Timestamp(parse_instant(&name, &raw)?)
                }
                Json::String(raw) if T::DAY_FIELDS.contains(&name.as_str()) => {
                    Value::Timestamp(day_to_timestamp(parse_day(&name, &raw)?))
                }
                other => Value::from_json(other),
            };
            Ok((name, value))
        })
        .collect()
}

/// Rebuild a record from a fetched document, attaching its id.
pub(crate) fn decode_document<T: Record>(doc: Document) -> Result<T, CoreError> {
    let id = doc.id().to_owned();
    let mut object: Map<String, Json> = doc
        .fields
        .into_iter()
        .map(|(name, value)| {
            let json = match value {
                Value::Timestamp(ts) if T::DAY_FIELDS.contains(&name.as_str()) => {
                    Json::String(timestamp_to_day(ts).format(DAY_FORMAT).to_string())
                }
                other => other.into_json(),
            };
            (name, json)
        })
        .collect();
    object.insert("id".to_owned(), Json::String(id.clone()));

    serde_json::from_value(Json::Object(object)).map_err(|e| CoreError::Malformed {
        collection: T::COLLECTION.to_string(),
        id,
        message: e.to_string(),
    })
}

/// Current time as the JSON string the encoder expects for instant fields.
pub(crate) fn now_json(now: DateTime<Utc>) -> Json {
    Json::String(format_timestamp(&now))
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::validation(format!("{field}: invalid timestamp {raw:?}: {e}")))
}

fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|e| CoreError::validation(format!("{field}: invalid date {raw:?}: {e}")))
}
