//! Cash flow page (`transacoes`).

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use condo_link::{Authenticated, Direction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use super::{null_as_empty, required};
use crate::error::{CLIError, Result};
use crate::formatter::{format_brl, format_date_br, short_id, TableRow};

pub const TABLE: &str = "transacoes";
const COLUMNS: &str = "id,data,descricao,valor,tipo,created_at";
const LIST_LIMIT: u64 = 500;
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Entrada,
    Saida,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Entrada => "entrada",
            TransactionKind::Saida => "saida",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub descricao: String,
    #[serde(default)]
    pub valor: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tipo: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TableRow for Transaction {
    fn headers() -> &'static [&'static str] {
        &["ID", "Data", "Transação", "Valor", "Tipo"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            short_id(Some(&self.id)),
            format_date_br(self.data.as_deref()),
            self.descricao.clone(),
            format_brl(self.valor),
            self.tipo.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct CashflowFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
}

impl CashflowFilter {
    /// Date window with defaults filled in: the last 30 days up to `today`.
    pub fn window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or_else(|| today - Duration::days(DEFAULT_WINDOW_DAYS));
        if from > to {
            return Err(CLIError::validation(format!(
                "Start date {} is after end date {}.",
                from, to
            )));
        }
        Ok((from, to))
    }
}

/// Validated fields for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub descricao: String,
    pub tipo: TransactionKind,
    pub valor: f64,
    pub data: NaiveDate,
}

fn check_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CLIError::validation("O valor deve ser maior ou igual a zero."));
    }
    Ok(amount)
}

impl NewTransaction {
    pub fn new(description: &str, kind: TransactionKind, amount: f64, date: NaiveDate) -> Result<Self> {
        Ok(Self {
            descricao: required(description, "Informe a descrição.")?,
            tipo: kind,
            valor: check_amount(amount)?,
            data: date,
        })
    }

    pub fn payload(&self) -> JsonValue {
        json!({
            "descricao": self.descricao,
            "tipo": self.tipo.as_str(),
            "valor": self.valor,
            "data": self.data.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl TransactionChanges {
    pub fn payload(&self) -> Result<JsonValue> {
        let mut payload = Map::new();
        if let Some(description) = &self.description {
            payload.insert("descricao".into(), json!(required(description, "Informe a descrição.")?));
        }
        if let Some(kind) = self.kind {
            payload.insert("tipo".into(), json!(kind.as_str()));
        }
        if let Some(amount) = self.amount {
            payload.insert("valor".into(), json!(check_amount(amount)?));
        }
        if let Some(date) = self.date {
            payload.insert("data".into(), json!(date.to_string()));
        }
        if payload.is_empty() {
            return Err(CLIError::validation("Nothing to update."));
        }
        Ok(JsonValue::Object(payload))
    }
}

/// Transactions in the window, newest first.
pub async fn list(
    page: &Authenticated<'_>,
    filter: &CashflowFilter,
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    let (from, to) = filter.window(today)?;
    let mut query = page
        .accessor(TABLE)
        .select(COLUMNS)
        .gte("data", from)
        .lte("data", to);
    if let Some(kind) = filter.kind {
        query = query.eq("tipo", kind.as_str());
    }
    let response = query
        .order("data", Direction::Descending)
        .order("created_at", Direction::Descending)
        .limit(LIST_LIMIT)
        .execute()
        .await?;
    Ok(response.rows_as()?)
}

pub async fn create(page: &Authenticated<'_>, transaction: &NewTransaction) -> Result<Transaction> {
    let response = page.accessor(TABLE).insert(transaction.payload()).execute().await?;
    response
        .rows_as::<Transaction>()?
        .into_iter()
        .next()
        .ok_or_else(|| CLIError::FormatError("insert returned no row".into()))
}

pub async fn update(
    page: &Authenticated<'_>,
    id: &str,
    changes: &TransactionChanges,
) -> Result<Transaction> {
    let payload = changes.payload()?;
    let response = page
        .accessor(TABLE)
        .update(payload)
        .eq("id", id)
        .execute()
        .await?;
    response
        .rows_as::<Transaction>()?
        .into_iter()
        .next()
        .ok_or_else(|| not_found(id))
}

pub async fn delete(page: &Authenticated<'_>, id: &str) -> Result<()> {
    let response = page.accessor(TABLE).delete().eq("id", id).execute().await?;
    if response.is_empty() {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: &str) -> CLIError {
    CLIError::validation(format!("No transaction with id '{}'.", id))
}
