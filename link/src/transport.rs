//! Relational API transport.
//!
//! A [`RestRequest`] is the fully-described table call produced by
//! [`crate::query::TableQuery`]. [`RestTransport`] executes it; the HTTP
//! implementation renders it in the PostgREST dialect:
//!
//! | piece | wire form |
//! |---|---|
//! | table | `{url}/rest/v1/{table}` |
//! | schema | `Accept-Profile` (reads) / `Content-Profile` (writes) |
//! | columns | `select=id,nome` |
//! | filters | `nome=ilike.%ana%`, `status=neq.finalizada`, `data_evento=not.is.null` |
//! | order | `order=data.desc,created_at.desc` |
//! | pagination | `limit=50&offset=100` |
//! | count | `Prefer: count=exact`, total read from `Content-Range` |

use crate::{
    auth::Credential,
    error::{CondoLinkError, Result},
    models::{ErrorDetail, QueryResponse},
};
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;

/// Kind of table call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    fn method(self) -> reqwest::Method {
        match self {
            Operation::Select => reqwest::Method::GET,
            Operation::Insert => reqwest::Method::POST,
            Operation::Update => reqwest::Method::PATCH,
            Operation::Delete => reqwest::Method::DELETE,
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, Operation::Select)
    }
}

/// Row filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive pattern match; `%` is the wildcard
    ILike,
    IsNull,
    NotNull,
}

/// One `column op value` condition. All filters on a request are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Right-hand side of the `column=...` query pair.
    pub fn to_query_value(&self) -> String {
        match self.op {
            FilterOp::Eq => format!("eq.{}", self.value),
            FilterOp::Neq => format!("neq.{}", self.value),
            FilterOp::Gt => format!("gt.{}", self.value),
            FilterOp::Gte => format!("gte.{}", self.value),
            FilterOp::Lt => format!("lt.{}", self.value),
            FilterOp::Lte => format!("lte.{}", self.value),
            FilterOp::ILike => format!("ilike.{}", self.value),
            FilterOp::IsNull => "is.null".to_string(),
            FilterOp::NotNull => "not.is.null".to_string(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// One sort key; several keys form a composite order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    fn to_query_value(&self) -> String {
        match self.direction {
            Direction::Ascending => format!("{}.asc", self.column),
            Direction::Descending => format!("{}.desc", self.column),
        }
    }
}

/// Row counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    Exact,
}

/// Fully-described table call, bound to one schema, one table and the
/// credential captured when the accessor was built.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub schema: String,
    pub table: String,
    pub operation: Operation,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub count: Option<CountMode>,
    pub payload: Option<JsonValue>,
    pub credential: Credential,
}

impl RestRequest {
    pub(crate) fn new(
        schema: String,
        table: String,
        operation: Operation,
        credential: Credential,
    ) -> Self {
        Self {
            schema,
            table,
            operation,
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            count: None,
            payload: None,
            credential,
        }
    }

    /// URL query pairs in a stable order: select, filters, order, limit, offset.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        match (&self.columns, self.operation) {
            (Some(columns), _) => pairs.push(("select".to_string(), columns.clone())),
            (None, Operation::Select) => pairs.push(("select".to_string(), "*".to_string())),
            (None, _) => {},
        }
        for filter in &self.filters {
            pairs.push((filter.column.clone(), filter.to_query_value()));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(Order::to_query_value)
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        pairs
    }

    /// Value of the `Prefer` header, if any preference applies.
    pub fn prefer_header(&self) -> Option<String> {
        let mut prefs = Vec::new();
        if !self.operation.is_read() {
            prefs.push("return=representation");
        }
        if self.count == Some(CountMode::Exact) {
            prefs.push("count=exact");
        }
        if prefs.is_empty() {
            None
        } else {
            Some(prefs.join(","))
        }
    }

    /// Header naming the schema; reads and writes use different names.
    pub fn profile_header(&self) -> (&'static str, &str) {
        if self.operation.is_read() {
            ("Accept-Profile", &self.schema)
        } else {
            ("Content-Profile", &self.schema)
        }
    }
}

/// Executes table calls against the relational API.
///
/// One call is one round trip: implementations must not retry, cache or
/// batch.
#[async_trait::async_trait]
pub trait RestTransport: Send + Sync + 'static {
    async fn execute(&self, request: RestRequest) -> Result<QueryResponse>;
}

/// A shared, reference-counted [`RestTransport`].
pub type ArcRestTransport = Arc<dyn RestTransport>;

/// PostgREST-over-HTTP transport.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub(crate) fn new(base_url: String, anon_key: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            anon_key,
            http_client,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn build(&self, request: &RestRequest) -> reqwest::RequestBuilder {
        let url = self.table_url(&request.table);
        let mut builder = self
            .http_client
            .request(request.operation.method(), &url)
            .query(&request.query_pairs());

        let (profile_name, schema) = request.profile_header();
        builder = builder.header(profile_name, schema);

        if let Some(prefer) = request.prefer_header() {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        request.credential.apply_to_request(builder, &self.anon_key)
    }
}

/// Total row count from a `Content-Range` header (`0-24/3573`, `*/0`).
pub fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait::async_trait]
impl RestTransport for HttpTransport {
    async fn execute(&self, request: RestRequest) -> Result<QueryResponse> {
        let start = Instant::now();
        debug!(
            "[REST] {:?} {}.{} filters={} authenticated={}",
            request.operation,
            request.schema,
            request.table,
            request.filters.len(),
            request.credential.is_authenticated()
        );

        let response = self.build(&request).send().await.map_err(|e| {
            warn!(
                "[REST] Transport error on {}.{}: {} duration_ms={}",
                request.schema,
                request.table,
                e,
                start.elapsed().as_millis()
            );
            CondoLinkError::from(e)
        })?;

        let status = response.status();
        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let body = response.text().await?;
        debug!(
            "[REST] Response status={} bytes={} duration_ms={}",
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorDetail>(&body).unwrap_or_else(|_| ErrorDetail {
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                },
                ..ErrorDetail::default()
            });
            warn!(
                "[REST] Server error on {}.{}: status={} message=\"{}\"",
                request.schema, request.table, status, detail.message
            );
            return Err(CondoLinkError::DataAccess {
                status_code: status.as_u16(),
                code: detail.code,
                message: detail.message,
                details: detail.details,
                hint: detail.hint,
            });
        }

        let rows = if body.trim().is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str::<JsonValue>(&body)? {
                JsonValue::Array(rows) => rows,
                JsonValue::Null => Vec::new(),
                single => vec![single],
            }
        };

        Ok(QueryResponse::new(rows, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::new(
            "https://abc.supabase.co".to_string(),
            "anon-key".to_string(),
            reqwest::Client::new(),
        )
    }

    fn select(table: &str) -> RestRequest {
        RestRequest::new(
            "vila_da_serra".to_string(),
            table.to_string(),
            Operation::Select,
            Credential::bearer("tok"),
        )
    }

    #[test]
    fn test_filter_encoding() {
        assert_eq!(Filter::new("status", FilterOp::Eq, "finalizada").to_query_value(), "eq.finalizada");
        assert_eq!(Filter::new("status", FilterOp::Neq, "finalizada").to_query_value(), "neq.finalizada");
        assert_eq!(Filter::new("data", FilterOp::Gte, "2025-01-01").to_query_value(), "gte.2025-01-01");
        assert_eq!(Filter::new("data", FilterOp::Lte, "2025-01-31").to_query_value(), "lte.2025-01-31");
        assert_eq!(Filter::new("nome", FilterOp::ILike, "%ana%").to_query_value(), "ilike.%ana%");
        assert_eq!(Filter::new("data_evento", FilterOp::NotNull, "").to_query_value(), "not.is.null");
        assert_eq!(Filter::new("data_evento", FilterOp::IsNull, "").to_query_value(), "is.null");
    }

    #[test]
    fn test_query_pairs_order() {
        let mut request = select("transacoes");
        request.columns = Some("id,data,valor".to_string());
        request.filters.push(Filter::new("tipo", FilterOp::Eq, "entrada"));
        request.order.push(Order {
            column: "data".to_string(),
            direction: Direction::Descending,
        });
        request.order.push(Order {
            column: "created_at".to_string(),
            direction: Direction::Descending,
        });
        request.limit = Some(500);

        let pairs = request.query_pairs();
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        assert_eq!(
            rendered,
            vec![
                "select=id,data,valor",
                "tipo=eq.entrada",
                "order=data.desc,created_at.desc",
                "limit=500",
            ]
        );
    }

    #[test]
    fn test_select_defaults_to_star() {
        let pairs = select("moradores").query_pairs();
        assert_eq!(pairs, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_prefer_and_profile_headers() {
        let mut read = select("moradores");
        assert_eq!(read.prefer_header(), None);
        assert_eq!(read.profile_header(), ("Accept-Profile", "vila_da_serra"));
        read.count = Some(CountMode::Exact);
        assert_eq!(read.prefer_header().as_deref(), Some("count=exact"));

        let write = RestRequest::new(
            "vila_da_serra".to_string(),
            "moradores".to_string(),
            Operation::Insert,
            Credential::none(),
        );
        assert_eq!(write.prefer_header().as_deref(), Some("return=representation"));
        assert_eq!(write.profile_header(), ("Content-Profile", "vila_da_serra"));
    }

    #[test]
    fn test_built_request_carries_schema_and_credential() {
        let mut request = RestRequest::new(
            "vila_da_serra".to_string(),
            "moradores".to_string(),
            Operation::Update,
            Credential::bearer("tok-9"),
        );
        request.filters.push(Filter::new("id", FilterOp::Eq, "42"));
        request.payload = Some(json!({ "nome": "Ana" }));

        let built = transport().build(&request).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::PATCH);
        assert_eq!(built.url().path(), "/rest/v1/moradores");
        assert_eq!(built.url().query(), Some("id=eq.42"));
        assert_eq!(built.headers()["content-profile"], "vila_da_serra");
        assert_eq!(built.headers()["authorization"], "Bearer tok-9");
        assert_eq!(built.headers()["apikey"], "anon-key");
        assert_eq!(built.headers()["prefer"], "return=representation");
    }

    #[test]
    fn test_built_request_without_credential_has_no_bearer() {
        let mut request = select("ocorrencias");
        request.credential = Credential::none();
        let built = transport().build(&request).build().unwrap();
        assert_eq!(built.method(), reqwest::Method::GET);
        assert!(built.headers().get("authorization").is_none());
        assert_eq!(built.headers()["accept-profile"], "vila_da_serra");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }
}
