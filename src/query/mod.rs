//! Backend-neutral description of a table query and its chainable builder.

pub mod builder;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use builder::QueryBuilder;

/// Row filter accumulated by the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
    /// Case-insensitive substring match
    Ilike(String, String),
    /// Raw PostgREST `or=(...)` expression, e.g. `name.ilike.*lon*,country.eq.UK`
    Or(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// What the query does to the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryOperation {
    Select,
    Insert(Value),
    Update(Value),
    Delete,
}

impl QueryOperation {
    pub fn name(&self) -> &'static str {
        match self {
            QueryOperation::Select => "select",
            QueryOperation::Insert(_) => "insert",
            QueryOperation::Update(_) => "update",
            QueryOperation::Delete => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, QueryOperation::Select)
    }
}

/// How many rows the caller expects back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Returning {
    /// JSON array
    #[default]
    Many,
    /// Exactly one row as an object, anything else is an error
    Single,
    /// Zero rows as `null`, one row as an object
    MaybeSingle,
}

/// Fully described request handed to a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub table: String,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
    pub operation: QueryOperation,
    pub returning: Returning,
}

impl QueryRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            operation: QueryOperation::Select,
            returning: Returning::Many,
        }
    }
}
