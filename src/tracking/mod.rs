//! Production-tracking service access
//!
//! [`TrackingService`] is the seam between submission logic and the remote
//! site. The REST implementation talks to a real site; tests substitute
//! their own.

mod context;
mod factory;
mod rest;

pub use context::{context_from_task, user_by_login};
pub use factory::create_tracking_service;
pub use rest::{RestTrackingService, collection_name};

use crate::error::Result;
use crate::types::{Entity, RecordData};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;
use url::Url;

/// Comparison used in a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Equal
    Is,
    /// Strictly greater
    GreaterThan,
    /// Member of a list
    In,
}

/// A query filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field relation value`
    Condition {
        /// Field path
        field: String,
        /// Comparison
        relation: Relation,
        /// Right-hand side
        value: Value,
    },
    /// Matches when every inner filter matches
    All(Vec<Filter>),
    /// Matches when any inner filter matches
    Any(Vec<Filter>),
}

impl Filter {
    /// `field is value`
    pub fn is(field: &str, value: impl Into<Value>) -> Self {
        Self::condition(field, Relation::Is, value)
    }

    /// `field greater_than value`
    pub fn greater_than(field: &str, value: impl Into<Value>) -> Self {
        Self::condition(field, Relation::GreaterThan, value)
    }

    /// Any relation
    pub fn condition(field: &str, relation: Relation, value: impl Into<Value>) -> Self {
        Self::Condition {
            field: field.to_string(),
            relation,
            value: value.into(),
        }
    }

    /// Hash form understood by the REST search endpoint
    pub fn to_json(&self) -> Value {
        match self {
            Self::Condition {
                field,
                relation,
                value,
            } => {
                let values = match value {
                    Value::Array(items) if *relation == Relation::In => items.clone(),
                    other => vec![other.clone()],
                };
                json!({ "path": field, "relation": relation, "values": values })
            }
            Self::All(filters) => group_json("and", filters),
            Self::Any(filters) => group_json("or", filters),
        }
    }
}

fn group_json(operator: &str, filters: &[Filter]) -> Value {
    json!({
        "logical_operator": operator,
        "conditions": filters.iter().map(Filter::to_json).collect::<Vec<_>>(),
    })
}

/// Sort key for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Field to sort on
    pub field: String,
    /// Sort newest/largest first
    pub descending: bool,
}

/// A find request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filters, all of which must match
    pub filters: Vec<Filter>,
    /// Fields to return
    pub fields: Vec<String>,
    /// Sort order
    pub order: Vec<Order>,
    /// Maximum number of records
    pub limit: Option<u32>,
}

impl Query {
    /// Query matching all of `filters`
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Set the fields to return
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Append a descending sort key
    #[must_use]
    pub fn order_desc(mut self, field: &str) -> Self {
        self.order.push(Order {
            field: field.to_string(),
            descending: true,
        });
        self
    }

    /// Cap the number of records
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Tracking service operations used by the review workflow
///
/// Retries and authentication are the implementation's concern.
#[async_trait]
pub trait TrackingService: Send + Sync {
    /// Find records of `entity_type` matching `query`
    async fn find(&self, entity_type: &str, query: &Query) -> Result<Vec<Entity>>;

    /// Find the first record matching `filters`
    async fn find_one(
        &self,
        entity_type: &str,
        filters: Vec<Filter>,
        fields: &[&str],
    ) -> Result<Option<Entity>> {
        let query = Query::new(filters).fields(fields).limit(1);
        Ok(self.find(entity_type, &query).await?.into_iter().next())
    }

    /// Create a record and return it with its id
    async fn create(&self, entity_type: &str, data: RecordData) -> Result<Entity>;

    /// Upload a file into a field of an existing record
    async fn upload(
        &self,
        entity_type: &str,
        entity_id: u64,
        path: &Path,
        field_name: &str,
    ) -> Result<()>;

    /// Site address, used to build links to records
    fn base_url(&self) -> &Url;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_json() {
        let f = Filter::is("project", json!({ "type": "Project", "id": 4 }));
        assert_eq!(
            f.to_json(),
            json!({ "path": "project", "relation": "is", "values": [{ "type": "Project", "id": 4 }] })
        );
    }

    #[test]
    fn test_in_condition_spreads_values() {
        let f = Filter::condition("id", Relation::In, json!([1, 2]));
        assert_eq!(f.to_json()["values"], json!([1, 2]));
    }

    #[test]
    fn test_any_group_json() {
        let f = Filter::Any(vec![
            Filter::greater_than("sg_date_and_time", "2024-01-01T00:00:00Z"),
            Filter::is("sg_date_and_time", Value::Null),
        ]);
        let v = f.to_json();
        assert_eq!(v["logical_operator"], "or");
        assert_eq!(v["conditions"][0]["relation"], "greater_than");
        assert_eq!(v["conditions"][1]["values"], json!([null]));
    }

    #[test]
    fn test_query_builder() {
        let q = Query::new(vec![])
            .fields(&["code", "id"])
            .order_desc("updated_at")
            .limit(10);
        assert_eq!(q.fields, vec!["code", "id"]);
        assert_eq!(q.order[0].field, "updated_at");
        assert!(q.order[0].descending);
        assert_eq!(q.limit, Some(10));
    }
}
