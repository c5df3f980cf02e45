// Structured queries: equality filters joined by AND, one ordering.

use serde::Serialize;
use serde_json::json;

use super::value::Value;

/// Sort direction for a query ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

/// `field == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Ordering on a single field. Descending unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }
}

impl From<&str> for Order {
    fn from(field: &str) -> Self {
        Self::desc(field)
    }
}

/// A query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<Order>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: impl Into<Order>) -> Self {
        self.order_by = Some(order.into());
        self
    }

    /// Request body for `documents:runQuery`.
    pub fn to_request_body(&self) -> serde_json::Value {
        let mut structured = json!({
            "from": [{ "collectionId": self.collection }],
        });

        let mut filters: Vec<serde_json::Value> = self
            .filters
            .iter()
            .map(|f| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": f.field },
                        "op": "EQUAL",
                        "value": f.value,
                    }
                })
            })
            .collect();

        // A composite filter needs at least two operands.
        match filters.len() {
            0 => {}
            1 => structured["where"] = filters.remove(0),
            _ => {
                structured["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                });
            }
        }

        if let Some(order) = &self.order_by {
            structured["orderBy"] = json!([{
                "field": { "fieldPath": order.field },
                "direction": order.direction,
            }]);
        }

        json!({ "structuredQuery": structured })
    }
}
