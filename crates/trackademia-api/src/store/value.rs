// Typed field values as the document store puts them on the wire.
//
// Every value is a single-key object naming its type, e.g.
// `{"stringValue":"Algorithms"}` or `{"timestampValue":"2024-01-10T00:00:00Z"}`.
// Integers travel as decimal strings.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Field map of a document or of a nested map value.
pub type Fields = BTreeMap<String, Value>;

/// One typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "integerValue", with = "integer")]
    Integer(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "timestampValue", with = "timestamp")]
    Timestamp(DateTime<Utc>),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: Fields,
}

impl Value {
    /// Convert untyped JSON into a typed value.
    ///
    /// Strings stay strings; callers that know a field holds a timestamp
    /// build `Value::Timestamp` themselves.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null(()),
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Double(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(ArrayValue {
                values: items.into_iter().map(Self::from_json).collect(),
            }),
            serde_json::Value::Object(map) => Self::Map(MapValue {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            }),
        }
    }

    /// Convert back to untyped JSON. Timestamps become RFC 3339 strings.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Self::Null(()) => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(b),
            Self::Integer(i) => serde_json::Value::from(i),
            Self::Double(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Timestamp(t) => serde_json::Value::String(format_timestamp(&t)),
            Self::String(s) => serde_json::Value::String(s),
            Self::Array(a) => {
                serde_json::Value::Array(a.values.into_iter().map(Self::into_json).collect())
            }
            Self::Map(m) => serde_json::Value::Object(
                m.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

/// RFC 3339 with a `Z` suffix, the form the store emits.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ── Document ────────────────────────────────────────────────────────

/// A stored document: resource name plus typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/(default)/documents/{collection}/{id}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    /// The document id: last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

// ── Serde helpers ───────────────────────────────────────────────────

mod integer {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_shapes_match_store_encoding() {
        let day = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let fields: Fields = [
            ("title".to_owned(), Value::from("Algorithms")),
            ("pages".to_owned(), Value::Integer(412)),
            ("date".to_owned(), Value::Timestamp(day)),
            ("cover".to_owned(), Value::Null(())),
        ]
        .into_iter()
        .collect();

        let wire = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            wire,
            json!({
                "title": { "stringValue": "Algorithms" },
                "pages": { "integerValue": "412" },
                "date": { "timestampValue": "2024-01-10T00:00:00Z" },
                "cover": { "nullValue": null },
            })
        );
    }

    #[test]
    fn nested_topics_decode_from_wire() {
        let wire = json!({
            "arrayValue": { "values": [
                { "mapValue": { "fields": {
                    "name": { "stringValue": "Graphs" },
                    "difficulty": { "stringValue": "hard" },
                }}}
            ]}
        });
        let value: Value = serde_json::from_value(wire).unwrap();
        assert_eq!(
            value.into_json(),
            json!([{ "name": "Graphs", "difficulty": "hard" }])
        );
    }

    #[test]
    fn empty_array_has_no_values_key() {
        let value: Value = serde_json::from_value(json!({ "arrayValue": {} })).unwrap();
        assert_eq!(value, Value::Array(ArrayValue::default()));
    }

    #[test]
    fn json_numbers_pick_integer_or_double() {
        assert_eq!(Value::from_json(json!(3)), Value::Integer(3));
        assert_eq!(Value::from_json(json!(2.5)), Value::Double(2.5));
    }

    #[test]
    fn document_id_is_last_name_segment() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/books/abc123".into(),
            ..Document::default()
        };
        assert_eq!(doc.id(), "abc123");
    }
}
