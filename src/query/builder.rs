use serde_json::Value;
use std::sync::Arc;

use crate::backend::Backend;
use crate::models::response::Envelope;
use crate::query::{Filter, Order, QueryOperation, QueryRequest, Returning};

/// Chainable query against one table.
///
/// `select`, filters, `order` and `limit` only record state. The terminal
/// methods hand the request to the bound backend and resolve to an envelope.
#[derive(Clone)]
pub struct QueryBuilder {
    backend: Arc<dyn Backend>,
    request: QueryRequest,
}

impl QueryBuilder {
    pub fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            request: QueryRequest::new(table),
        }
    }

    pub fn table(&self) -> &str {
        &self.request.table
    }

    /// Recorded request, mostly for inspection
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.request.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.request
            .filters
            .push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.request
            .filters
            .push(Filter::Neq(column.to_string(), value.into()));
        self
    }

    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.request
            .filters
            .push(Filter::Ilike(column.to_string(), pattern.to_string()));
        self
    }

    pub fn or(mut self, expression: &str) -> Self {
        self.request.filters.push(Filter::Or(expression.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.request.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.request.limit = Some(count);
        self
    }

    async fn run(mut self, operation: QueryOperation, returning: Returning) -> Envelope<Value> {
        self.request.operation = operation;
        self.request.returning = returning;
        self.backend.execute(self.request).await
    }

    /// Fetch the matching rows as an array
    pub async fn execute(self) -> Envelope<Value> {
        self.run(QueryOperation::Select, Returning::Many).await
    }

    /// Fetch exactly one row
    pub async fn single(self) -> Envelope<Value> {
        self.run(QueryOperation::Select, Returning::Single).await
    }

    /// Fetch zero or one row; zero resolves to `null` without an error
    pub async fn maybe_single(self) -> Envelope<Value> {
        self.run(QueryOperation::Select, Returning::MaybeSingle).await
    }

    pub async fn insert(self, rows: Value) -> Envelope<Value> {
        self.run(QueryOperation::Insert(rows), Returning::Many).await
    }

    pub async fn update(self, values: Value) -> Envelope<Value> {
        self.run(QueryOperation::Update(values), Returning::Many).await
    }

    pub async fn delete(self) -> Envelope<Value> {
        self.run(QueryOperation::Delete, Returning::Many).await
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("backend", &self.backend.kind())
            .field("request", &self.request)
            .finish()
    }
}
