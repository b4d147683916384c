use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::auth::{AuthClient, RemoteAuthClient};
use crate::backend::{Backend, HealthReport, HealthStatus};
use crate::config::constants::REST_PATH;
use crate::config::settings::{BackendKind, RemoteConfig};
use crate::error::{GatewayError, Result};
use crate::models::response::{Envelope, ErrorInfo};
use crate::query::{Filter, QueryOperation, QueryRequest, Returning};
use crate::storage::SessionStorage;
use crate::utils::http::error_info_from_response;

const PREFER_REPRESENTATION: &str = "return=representation";
const ACCEPT_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP request derived from a [`QueryRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct PostgrestPlan {
    pub method: Method,
    /// Path below `/rest/v1`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub prefer: Option<&'static str>,
    pub accept: Option<&'static str>,
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn ilike_pattern(pattern: &str) -> String {
    if pattern.contains('%') || pattern.contains('*') {
        pattern.replace('%', "*")
    } else {
        format!("*{}*", pattern)
    }
}

/// Translate builder state into a PostgREST call
pub fn postgrest_plan(request: &QueryRequest) -> PostgrestPlan {
    let mut query = Vec::new();

    match (&request.operation, &request.columns) {
        (QueryOperation::Select, columns) => {
            query.push((
                "select".to_string(),
                columns.clone().unwrap_or_else(|| "*".to_string()),
            ));
        }
        (_, Some(columns)) => query.push(("select".to_string(), columns.clone())),
        (_, None) => {}
    }

    for filter in &request.filters {
        let pair = match filter {
            Filter::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", render_value(value))),
            Filter::Neq(column, Value::Null) => (column.clone(), "not.is.null".to_string()),
            Filter::Neq(column, value) => (column.clone(), format!("neq.{}", render_value(value))),
            Filter::Ilike(column, pattern) => {
                (column.clone(), format!("ilike.{}", ilike_pattern(pattern)))
            }
            Filter::Or(expression) => {
                let trimmed = expression.trim();
                let wrapped = if trimmed.starts_with('(') && trimmed.ends_with(')') {
                    trimmed.to_string()
                } else {
                    format!("({})", trimmed)
                };
                ("or".to_string(), wrapped)
            }
        };
        query.push(pair);
    }

    if !request.order.is_empty() {
        let order = request
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        query.push(("order".to_string(), order));
    }

    if let Some(limit) = request.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }

    let (method, body) = match &request.operation {
        QueryOperation::Select => (Method::GET, None),
        QueryOperation::Insert(rows) => (Method::POST, Some(rows.clone())),
        QueryOperation::Update(values) => (Method::PATCH, Some(values.clone())),
        QueryOperation::Delete => (Method::DELETE, None),
    };

    PostgrestPlan {
        method,
        path: format!("/{}", request.table),
        query,
        body,
        prefer: request
            .operation
            .is_mutation()
            .then_some(PREFER_REPRESENTATION),
        accept: (request.returning == Returning::Single).then_some(ACCEPT_OBJECT),
    }
}

/// Reduce a row array to `null` or its only row; more rows is an error
pub fn collapse_maybe_single(rows: Value) -> Envelope<Value> {
    match rows {
        Value::Array(mut rows) => match rows.len() {
            0 => Envelope::ok(Value::Null),
            1 => Envelope::ok(rows.remove(0)),
            n => Envelope::failure(
                ErrorInfo::new("JSON object requested, multiple (or no) rows returned")
                    .with_code("PGRST116")
                    .with_details(format!("The result contains {} rows", n)),
            ),
        },
        other => Envelope::ok(other),
    }
}

/// Hosted Supabase backend speaking PostgREST over HTTP
pub struct RemoteBackend {
    http: Client,
    rest_url: String,
    anon_key: String,
    auth: Arc<RemoteAuthClient>,
}

impl RemoteBackend {
    pub fn new(config: &RemoteConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to build HTTP client: {}", e)))?;
        let base = config.require_url()?;

        Ok(Self {
            rest_url: format!("{}{}", base, REST_PATH),
            anon_key: config.require_anon_key()?.to_string(),
            auth: Arc::new(RemoteAuthClient::new(config, http.clone(), storage)?),
            http,
        })
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .auth
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        builder.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Value, ErrorInfo> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| GatewayError::from(e).to_error_info())?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from(e).to_error_info())?;

        if !status.is_success() {
            return Err(error_info_from_response(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::from(e).to_error_info())
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn auth(&self) -> Arc<dyn AuthClient> {
        self.auth.clone()
    }

    #[instrument(
        skip(self, request),
        fields(table = %request.table, op = request.operation.name())
    )]
    async fn execute(&self, request: QueryRequest) -> Envelope<Value> {
        let plan = postgrest_plan(&request);
        let url = format!("{}{}", self.rest_url, plan.path);
        debug!("{} {} {:?}", plan.method, url, plan.query);

        let mut builder = self.http.request(plan.method, url).query(&plan.query);
        if let Some(body) = &plan.body {
            builder = builder.json(body);
        }
        if let Some(prefer) = plan.prefer {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(accept) = plan.accept {
            builder = builder.header("Accept", accept);
        }

        match self.send(builder).await {
            Ok(value) if request.returning == Returning::MaybeSingle => {
                collapse_maybe_single(value)
            }
            Ok(value) => Envelope::ok(value),
            Err(info) => {
                warn!("❌ Query on {} failed: {}", request.table, info);
                Envelope::failure(info)
            }
        }
    }

    #[instrument(skip(self, args))]
    async fn rpc(&self, function: &str, args: Value) -> Envelope<Value> {
        let url = format!("{}/rpc/{}", self.rest_url, function);
        match self.send(self.http.post(url).json(&args)).await {
            Ok(value) => Envelope::ok(value),
            Err(info) => {
                warn!("❌ RPC {} failed: {}", function, info);
                Envelope::failure(info)
            }
        }
    }

    async fn health_check(&self) -> HealthReport {
        let url = format!("{}/", self.rest_url);
        let (status, details) = match self.send(self.http.get(&url)).await {
            Ok(_) => (HealthStatus::Connected, json!({ "url": self.rest_url })),
            Err(info) => {
                error!("❌ Remote backend unreachable: {}", info);
                (
                    HealthStatus::Unreachable,
                    json!({ "url": self.rest_url, "error": info }),
                )
            }
        };

        HealthReport {
            status,
            backend: BackendKind::Remote,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;

    fn pairs(plan: &PostgrestPlan) -> Vec<(&str, &str)> {
        plan.query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_select_plan() {
        let mut request = QueryRequest::new("merchants");
        request.columns = Some("id,business_name".to_string());
        request.filters = vec![
            Filter::Eq("status".into(), json!("active")),
            Filter::Neq("tier".into(), json!(3)),
            Filter::Ilike("business_name".into(), "cafe".into()),
            Filter::Or("city.eq.Manama,city.eq.Doha".into()),
        ];
        request.order = vec![crate::query::Order {
            column: "created_at".into(),
            ascending: false,
        }];
        request.limit = Some(5);
        request.returning = Returning::Single;

        let plan = postgrest_plan(&request);
        assert_eq!(plan.method, Method::GET);
        assert_eq!(plan.path, "/merchants");
        assert_eq!(
            pairs(&plan),
            vec![
                ("select", "id,business_name"),
                ("status", "eq.active"),
                ("tier", "neq.3"),
                ("business_name", "ilike.*cafe*"),
                ("or", "(city.eq.Manama,city.eq.Doha)"),
                ("order", "created_at.desc"),
                ("limit", "5"),
            ]
        );
        assert_eq!(plan.accept, Some(ACCEPT_OBJECT));
        assert!(plan.prefer.is_none());
        assert!(plan.body.is_none());
    }

    #[test]
    fn test_mutation_plans() {
        let mut request = QueryRequest::new("profiles");
        request.filters = vec![Filter::Eq("id".into(), json!(7))];
        request.operation = QueryOperation::Update(json!({"points": 10}));

        let plan = postgrest_plan(&request);
        assert_eq!(plan.method, Method::PATCH);
        assert_eq!(pairs(&plan), vec![("id", "eq.7")]);
        assert_eq!(plan.body, Some(json!({"points": 10})));
        assert_eq!(plan.prefer, Some(PREFER_REPRESENTATION));

        request.operation = QueryOperation::Delete;
        request.filters = vec![Filter::Eq("deleted_at".into(), Value::Null)];
        let plan = postgrest_plan(&request);
        assert_eq!(plan.method, Method::DELETE);
        assert_eq!(pairs(&plan), vec![("deleted_at", "is.null")]);
    }

    #[test]
    fn test_ilike_keeps_explicit_wildcards() {
        assert_eq!(ilike_pattern("lon%"), "lon*");
        assert_eq!(ilike_pattern("*don"), "*don");
        assert_eq!(ilike_pattern("par"), "*par*");
    }

    #[test]
    fn test_collapse_maybe_single() {
        assert_eq!(collapse_maybe_single(json!([])), Envelope::ok(Value::Null));
        assert_eq!(
            collapse_maybe_single(json!([{"id": 1}])),
            Envelope::ok(json!({"id": 1}))
        );
        let res = collapse_maybe_single(json!([{"id": 1}, {"id": 2}]));
        let err = res.error.unwrap();
        assert_eq!(err.code.as_deref(), Some("PGRST116"));
        assert_eq!(err.details.as_deref(), Some("The result contains 2 rows"));
    }

    #[test]
    fn test_new_requires_remote_settings() {
        let storage = Arc::new(MemorySessionStorage::new());
        let err = RemoteBackend::new(&RemoteConfig::default(), storage.clone()).err();
        assert_eq!(err.map(|e| e.category()), Some("config"));

        let config = RemoteConfig {
            url: Some("https://demo.supabase.co/".to_string()),
            anon_key: Some("anon".to_string()),
            ..RemoteConfig::default()
        };
        let backend = RemoteBackend::new(&config, storage).unwrap();
        assert_eq!(backend.rest_url(), "https://demo.supabase.co/rest/v1");
        assert_eq!(backend.kind(), BackendKind::Remote);
    }

    #[test]
    fn test_data_requests_carry_session_token_once_signed_in() {
        use crate::auth::token::generate_session;
        use crate::models::auth::AuthUser;
        use crate::utils::time::unix_now;

        let config = RemoteConfig {
            url: Some("http://127.0.0.1:9".to_string()),
            anon_key: Some("anon".to_string()),
            ..RemoteConfig::default()
        };
        let backend =
            RemoteBackend::new(&config, Arc::new(MemorySessionStorage::new())).unwrap();
        let authorization = |backend: &RemoteBackend| {
            let request = backend
                .authorized(backend.http.get("http://127.0.0.1:9/rest/v1/cities_lookup"))
                .build()
                .unwrap();
            assert_eq!(request.headers()["apikey"], "anon");
            request.headers()["authorization"]
                .to_str()
                .unwrap()
                .to_string()
        };

        assert_eq!(authorization(&backend), "Bearer anon");

        let session = generate_session(AuthUser::new("member@example.com", "member"), unix_now());
        let expected = format!("Bearer {}", session.access_token);
        backend.auth.session().set_session(session);
        assert_eq!(authorization(&backend), expected);
    }
}
