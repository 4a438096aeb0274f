//! Schema-scoped table query builder.
//!
//! A [`TableQuery`] is the value returned by the scoped accessor. It is bound
//! to one schema, one table and the credential in effect when it was built;
//! builder methods consume and return it, so a handle is never shared or
//! mutated after it leaves the accessor.
//!
//! ```rust,no_run
//! # async fn example(page: &condo_link::Authenticated<'_>) -> condo_link::Result<()> {
//! use condo_link::Direction;
//!
//! let residents = page
//!     .accessor("moradores")
//!     .select("id,nome,predio,apto")
//!     .ilike("nome", "%ana%")
//!     .order("nome", Direction::Ascending)
//!     .limit(1000)
//!     .execute()
//!     .await?;
//! println!("{} residents", residents.rows.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::Credential,
    error::Result,
    models::QueryResponse,
    transport::{
        ArcRestTransport, CountMode, Direction, Filter, FilterOp, Operation, Order, RestRequest,
    },
};
use log::debug;
use serde_json::Value as JsonValue;
use std::fmt::Display;

/// Query builder for one table in one schema.
#[derive(Clone)]
pub struct TableQuery {
    request: RestRequest,
    transport: ArcRestTransport,
}

impl TableQuery {
    pub(crate) fn new(
        transport: ArcRestTransport,
        schema: &str,
        table: &str,
        credential: Credential,
    ) -> Self {
        Self {
            request: RestRequest::new(
                schema.to_string(),
                table.to_string(),
                Operation::Select,
                credential,
            ),
            transport,
        }
    }

    pub fn schema(&self) -> &str {
        &self.request.schema
    }

    pub fn table(&self) -> &str {
        &self.request.table
    }

    /// Credential captured when this handle was built
    pub fn credential(&self) -> &Credential {
        &self.request.credential
    }

    /// The request as it would be sent
    pub fn request(&self) -> &RestRequest {
        &self.request
    }

    // ── Operations ─────────────────────────────────────────────────────────

    /// Read rows, returning the given comma-separated columns.
    pub fn select(mut self, columns: &str) -> Self {
        self.request.operation = Operation::Select;
        self.request.columns = Some(columns.to_string());
        self
    }

    /// Read rows and also compute the total number of matching rows.
    pub fn select_with_count(self, columns: &str, mode: CountMode) -> Self {
        self.select(columns).count(mode)
    }

    /// Ask for a total row count alongside the operation.
    pub fn count(mut self, mode: CountMode) -> Self {
        self.request.count = Some(mode);
        self
    }

    /// Insert one row (object) or several rows (array of objects).
    pub fn insert(mut self, payload: JsonValue) -> Self {
        self.request.operation = Operation::Insert;
        self.request.payload = Some(payload);
        self
    }

    /// Update every row matched by the filters that follow.
    pub fn update(mut self, payload: JsonValue) -> Self {
        self.request.operation = Operation::Update;
        self.request.payload = Some(payload);
        self
    }

    /// Delete every row matched by the filters that follow.
    pub fn delete(mut self) -> Self {
        self.request.operation = Operation::Delete;
        self.request.payload = None;
        self
    }

    // ── Filters ────────────────────────────────────────────────────────────

    fn filter(mut self, column: &str, op: FilterOp, value: String) -> Self {
        self.request.filters.push(Filter::new(column, op, value));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Eq, value.to_string())
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Neq, value.to_string())
    }

    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Gt, value.to_string())
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Gte, value.to_string())
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Lt, value.to_string())
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, FilterOp::Lte, value.to_string())
    }

    /// Case-insensitive match; use `%` as wildcard (`%ana%` for "contains").
    pub fn ilike(self, column: &str, pattern: impl Display) -> Self {
        self.filter(column, FilterOp::ILike, pattern.to_string())
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, FilterOp::IsNull, String::new())
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(column, FilterOp::NotNull, String::new())
    }

    // ── Ordering and pagination ────────────────────────────────────────────

    /// Add a sort key. Call repeatedly for a composite order; earlier keys
    /// take precedence.
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.request.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.request.limit = Some(limit);
        self
    }

    /// Restrict to rows `from..=to` (zero-based, inclusive).
    ///
    /// An inverted range (`to < from`) selects no rows. A range too wide to
    /// express as a row count leaves the limit open.
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.request.offset = Some(from);
        self.request.limit = match to.checked_sub(from) {
            Some(span) => span.checked_add(1),
            None => Some(0),
        };
        self
    }

    /// Send the request. One round trip; errors are returned as-is.
    pub async fn execute(self) -> Result<QueryResponse> {
        debug!(
            "[QUERY] {:?} on {}.{}",
            self.request.operation, self.request.schema, self.request.table
        );
        self.transport.execute(self.request).await
    }
}

impl std::fmt::Debug for TableQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableQuery")
            .field("request", &self.request)
            .finish()
    }
}
