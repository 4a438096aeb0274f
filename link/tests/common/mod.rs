#![allow(dead_code)]
//! In-memory backend for condo-link integration tests.
//!
//! [`FakeBackend`] plays both the identity provider and the relational API.
//! It records every table request it receives so tests can assert on what
//! reached the wire, and evaluates filters/order/pagination/count on JSON
//! rows the way the real API does.

use condo_link::{
    AuthError, CondoClient, CondoLinkError, Credential, Direction, FilterOp, Identity,
    IdentityApi, MemorySessionStore, Operation, QueryResponse, RestRequest, RestTransport,
    Session, SessionContext, SessionStore,
};
use serde_json::{json, Map, Value as JsonValue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SCHEMA: &str = "vila_da_serra";
pub const INSTANCE: &str = "test";
pub const EMAIL: &str = "a@x.com";
pub const PASSWORD: &str = "right";

#[derive(Default)]
struct FakeState {
    users: HashMap<String, (String, Identity)>,
    live_tokens: HashMap<String, Identity>,
    refresh_tokens: HashMap<String, Identity>,
    token_counter: u64,
    token_ttl: i64,
    tables: HashMap<(String, String), Vec<JsonValue>>,
    requests: Vec<RestRequest>,
    auth_calls: Vec<String>,
    fail_sign_out: bool,
    unreachable: bool,
    row_counter: u64,
}

#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self {
            state: Arc::new(Mutex::new(FakeState {
                token_ttl: 3600,
                ..FakeState::default()
            })),
        };
        backend.add_user(EMAIL, PASSWORD);
        backend
    }

    pub fn add_user(&self, email: &str, password: &str) {
        let mut state = self.state.lock().unwrap();
        let id = format!("user-{}", state.users.len() + 1);
        state
            .users
            .insert(email.to_string(), (password.to_string(), Identity::new(id, email)));
    }

    /// Revoke every issued access token, as if all sessions timed out.
    pub fn expire_access_tokens(&self) {
        self.state.lock().unwrap().live_tokens.clear();
    }

    /// Newly issued sessions expire this many seconds after issue.
    pub fn set_token_ttl(&self, secs: i64) {
        self.state.lock().unwrap().token_ttl = secs;
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.state.lock().unwrap().fail_sign_out = fail;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    pub fn is_live(&self, token: &str) -> bool {
        self.state.lock().unwrap().live_tokens.contains_key(token)
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn auth_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().auth_calls.clone()
    }

    pub fn rows(&self, schema: &str, table: &str) -> Vec<JsonValue> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn seed(&self, schema: &str, table: &str, rows: Vec<JsonValue>) {
        self.state
            .lock()
            .unwrap()
            .tables
            .entry((schema.to_string(), table.to_string()))
            .or_default()
            .extend(rows);
    }

    pub fn client(&self) -> CondoClient {
        CondoClient::builder()
            .schema(SCHEMA)
            .identity_api(Arc::new(self.clone()))
            .transport(Arc::new(self.clone()))
            .build()
            .expect("fake client builds")
    }

    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.client(), Box::new(MemorySessionStore::new()), INSTANCE)
    }
}

/// Session store shared between contexts, standing in for the browser
/// session that survives from one page render to the next.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemorySessionStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Option<Session> {
        self.inner.lock().unwrap().load(INSTANCE).unwrap()
    }

    pub fn put(&self, session: &Session) {
        self.inner.lock().unwrap().save(INSTANCE, session).unwrap();
    }
}

impl SessionStore for SharedStore {
    fn load(&self, instance: &str) -> condo_link::Result<Option<Session>> {
        self.inner.lock().unwrap().load(instance)
    }

    fn save(&mut self, instance: &str, session: &Session) -> condo_link::Result<()> {
        self.inner.lock().unwrap().save(instance, session)
    }

    fn clear(&mut self, instance: &str) -> condo_link::Result<()> {
        self.inner.lock().unwrap().clear(instance)
    }
}

impl FakeBackend {
    /// A fresh context (one page render) over a store shared across renders.
    pub fn render(&self, store: &SharedStore) -> SessionContext {
        SessionContext::new(self.client(), Box::new(store.clone()), INSTANCE)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl FakeState {
    fn issue(&mut self, identity: Identity) -> Session {
        self.token_counter += 1;
        let access_token = format!("access-{}", self.token_counter);
        let refresh_token = format!("refresh-{}", self.token_counter);
        self.live_tokens.insert(access_token.clone(), identity.clone());
        self.refresh_tokens.insert(refresh_token.clone(), identity.clone());
        Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: Some(self.token_ttl),
            expires_at: Some(now() + self.token_ttl),
            refresh_token: Some(refresh_token),
            user: identity,
        }
    }
}

#[async_trait::async_trait]
impl IdentityApi for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls.push(format!("sign_in:{}", email));
        if state.unreachable {
            return Err(AuthError::Unreachable("connection refused".into()));
        }
        let identity = match state.users.get(email) {
            Some((expected, identity)) if expected == password => identity.clone(),
            _ => return Err(AuthError::InvalidCredentials("Invalid login credentials".into())),
        };
        Ok(state.issue(identity))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls.push("refresh".to_string());
        if state.unreachable {
            return Err(AuthError::Unreachable("connection refused".into()));
        }
        match state.refresh_tokens.remove(refresh_token) {
            Some(identity) => Ok(state.issue(identity)),
            None => Err(AuthError::SessionExpired),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls.push("get_user".to_string());
        if state.unreachable {
            return Err(AuthError::Unreachable("connection refused".into()));
        }
        state
            .live_tokens
            .get(access_token)
            .cloned()
            .ok_or(AuthError::SessionExpired)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock().unwrap();
        state.auth_calls.push("sign_out".to_string());
        if state.fail_sign_out || state.unreachable {
            return Err(AuthError::Unreachable("connection reset".into()));
        }
        state.live_tokens.remove(access_token);
        Ok(())
    }
}

// ── Table emulation ─────────────────────────────────────────────────────────

fn as_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// `%` matches any run of characters; comparison is case-insensitive.
fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let (mut t, mut p) = (0, 0);
    let (mut star, mut mark) = (None, 0);
    while t < text.len() {
        if p < pattern.len() && pattern[p] != '%' && pattern[p] == text[t] {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }
    p == pattern.len()
}

fn matches(row: &JsonValue, request: &RestRequest) -> bool {
    request.filters.iter().all(|filter| {
        let cell = row.get(&filter.column).and_then(as_text);
        match (filter.op, cell) {
            (FilterOp::IsNull, cell) => cell.is_none(),
            (FilterOp::NotNull, cell) => cell.is_some(),
            (_, None) => false,
            (FilterOp::Eq, Some(v)) => v == filter.value,
            (FilterOp::Neq, Some(v)) => v != filter.value,
            (FilterOp::Gt, Some(v)) => compare_text(&v, &filter.value) == Ordering::Greater,
            (FilterOp::Gte, Some(v)) => compare_text(&v, &filter.value) != Ordering::Less,
            (FilterOp::Lt, Some(v)) => compare_text(&v, &filter.value) == Ordering::Less,
            (FilterOp::Lte, Some(v)) => compare_text(&v, &filter.value) != Ordering::Greater,
            (FilterOp::ILike, Some(v)) => ilike(&v, &filter.value),
        }
    })
}

fn sort_rows(rows: &mut [JsonValue], request: &RestRequest) {
    rows.sort_by(|a, b| {
        for key in &request.order {
            let x = a.get(&key.column).and_then(as_text);
            let y = b.get(&key.column).and_then(as_text);
            // Postgres default: NULLS LAST ascending, NULLS FIRST descending
            let ord = match (x, y) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => compare_text(&x, &y),
            };
            let ord = match key.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn project(row: &JsonValue, columns: Option<&str>) -> JsonValue {
    match columns {
        None | Some("*") => row.clone(),
        Some(columns) => {
            let mut out = Map::new();
            for column in columns.split(',').map(str::trim) {
                if let Some(value) = row.get(column) {
                    out.insert(column.to_string(), value.clone());
                }
            }
            JsonValue::Object(out)
        },
    }
}

fn denied(message: &str) -> CondoLinkError {
    CondoLinkError::DataAccess {
        status_code: 401,
        code: Some("42501".to_string()),
        message: message.to_string(),
        details: None,
        hint: None,
    }
}

#[async_trait::async_trait]
impl RestTransport for FakeBackend {
    async fn execute(&self, request: RestRequest) -> condo_link::Result<QueryResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if state.unreachable {
            return Err(CondoLinkError::NetworkError("connection refused".into()));
        }
        match &request.credential {
            Credential::None => return Err(denied("permission denied for anonymous role")),
            Credential::Bearer(token) if !state.live_tokens.contains_key(token) => {
                return Err(denied("JWT expired"))
            },
            Credential::Bearer(_) => {},
        }

        let key = (request.schema.clone(), request.table.clone());
        let now = chrono::Utc::now().to_rfc3339();

        match request.operation {
            Operation::Select => {
                let Some(table) = state.tables.get(&key) else {
                    return Err(CondoLinkError::DataAccess {
                        status_code: 404,
                        code: Some("PGRST205".to_string()),
                        message: format!(
                            "Could not find the table '{}.{}' in the schema cache",
                            request.schema, request.table
                        ),
                        details: None,
                        hint: None,
                    });
                };
                let mut rows: Vec<JsonValue> =
                    table.iter().filter(|row| matches(row, &request)).cloned().collect();
                let count = request.count.map(|_| rows.len() as u64);
                sort_rows(&mut rows, &request);
                let offset = request.offset.unwrap_or(0) as usize;
                let limit = request.limit.map(|l| l as usize).unwrap_or(usize::MAX);
                let rows = rows
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .map(|row| project(&row, request.columns.as_deref()))
                    .collect();
                Ok(QueryResponse::new(rows, count))
            },
            Operation::Insert => {
                let payload = request.payload.clone().unwrap_or(JsonValue::Null);
                let incoming = match payload {
                    JsonValue::Array(rows) => rows,
                    JsonValue::Object(_) => vec![payload],
                    _ => return Err(CondoLinkError::SerializationError("bad payload".into())),
                };
                let mut inserted = Vec::new();
                for mut row in incoming {
                    state.row_counter += 1;
                    let id = format!("{:08x}-0000-4000-8000-{:012x}", state.row_counter, state.row_counter);
                    if let Some(obj) = row.as_object_mut() {
                        obj.entry("id").or_insert(json!(id));
                        obj.entry("created_at").or_insert(json!(now));
                    }
                    inserted.push(row);
                }
                state.tables.entry(key).or_default().extend(inserted.clone());
                let count = request.count.map(|_| inserted.len() as u64);
                Ok(QueryResponse::new(inserted, count))
            },
            Operation::Update => {
                let patch = request.payload.clone().unwrap_or(JsonValue::Null);
                let table = state.tables.entry(key).or_default();
                let mut updated = Vec::new();
                for row in table.iter_mut().filter(|row| matches(row, &request)) {
                    if let (Some(obj), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
                        for (k, v) in patch {
                            obj.insert(k.clone(), v.clone());
                        }
                    }
                    updated.push(row.clone());
                }
                let count = request.count.map(|_| updated.len() as u64);
                Ok(QueryResponse::new(updated, count))
            },
            Operation::Delete => {
                let table = state.tables.entry(key).or_default();
                let (removed, kept): (Vec<JsonValue>, Vec<JsonValue>) =
                    table.drain(..).partition(|row| matches(row, &request));
                *table = kept;
                let count = request.count.map(|_| removed.len() as u64);
                Ok(QueryResponse::new(removed, count))
            },
        }
    }
}
