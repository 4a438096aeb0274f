//! Incidents page (`ocorrencias`).

use chrono::NaiveDate;
use clap::ValueEnum;
use condo_link::{Authenticated, Direction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use super::{null_as_empty, optional, required, residents};
use crate::error::{CLIError, Result};
use crate::formatter::{format_date_br, short_id, TableRow};

pub const TABLE: &str = "ocorrencias";
const COLUMNS: &str = "id,titulo,descricao,status,morador_id,data_evento,created_at";
const LIST_LIMIT: u64 = 500;
const SUMMARY_CHARS: usize = 240;

/// Lifecycle of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    #[value(name = "aberta")]
    Aberta,
    #[value(name = "em_andamento")]
    EmAndamento,
    #[value(name = "finalizada")]
    Finalizada,
}

impl IncidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Aberta => "aberta",
            IncidentStatus::EmAndamento => "em_andamento",
            IncidentStatus::Finalizada => "finalizada",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncidentStatus::Aberta => "Aberta",
            IncidentStatus::EmAndamento => "Em andamento",
            IncidentStatus::Finalizada => "Finalizada",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "aberta" => Some(IncidentStatus::Aberta),
            "em_andamento" => Some(IncidentStatus::EmAndamento),
            "finalizada" => Some(IncidentStatus::Finalizada),
            _ => None,
        }
    }
}

/// Display label for a stored status; unknown values are shown verbatim.
pub fn status_label(value: &str) -> String {
    IncidentStatus::parse(value)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub morador_id: Option<String>,
    #[serde(default)]
    pub data_evento: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Label of the linked resident, resolved by [`list`]
    #[serde(default, skip_deserializing)]
    pub morador: Option<String>,
}

impl Incident {
    /// Case-insensitive substring match on title or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.titulo.to_lowercase().contains(&term)
            || self
                .descricao
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false)
    }

    pub fn summary(&self) -> String {
        truncate(self.descricao.as_deref(), SUMMARY_CHARS)
    }
}

impl TableRow for Incident {
    fn headers() -> &'static [&'static str] {
        &["ID", "Status", "Título", "Morador", "Resumo", "Evento", "Abertura"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            short_id(Some(&self.id)),
            status_label(&self.status),
            if self.titulo.is_empty() { "(sem título)".to_string() } else { self.titulo.clone() },
            self.morador.clone().unwrap_or_else(|| "—".to_string()),
            self.summary(),
            format_date_br(self.data_evento.as_deref()),
            format_date_br(self.created_at.as_deref()),
        ]
    }
}

fn truncate(text: Option<&str>, max_chars: usize) -> String {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return "—".to_string();
    };
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub search: Option<String>,
}

/// Validated fields for a new incident.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: IncidentStatus,
    pub morador_id: Option<String>,
    pub data_evento: Option<NaiveDate>,
}

impl NewIncident {
    pub fn new(
        title: &str,
        description: Option<&str>,
        status: Option<IncidentStatus>,
        resident_id: Option<&str>,
        event_date: Option<NaiveDate>,
    ) -> Result<Self> {
        Ok(Self {
            titulo: required(title, "Informe um título.")?,
            descricao: optional(description),
            status: status.unwrap_or_default(),
            morador_id: optional(resident_id),
            data_evento: event_date,
        })
    }

    pub fn payload(&self) -> JsonValue {
        json!({
            "titulo": self.titulo,
            "descricao": self.descricao,
            "status": self.status.as_str(),
            "morador_id": self.morador_id,
            "data_evento": self.data_evento.map(|d| d.to_string()),
        })
    }
}

/// Fields to change; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct IncidentChanges {
    pub title: Option<String>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub status: Option<IncidentStatus>,
    /// `Some("")` unlinks the resident
    pub resident_id: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub clear_event_date: bool,
}

impl IncidentChanges {
    pub fn payload(&self) -> Result<JsonValue> {
        let mut payload = Map::new();
        if let Some(title) = &self.title {
            payload.insert("titulo".into(), json!(required(title, "Informe um título.")?));
        }
        if let Some(description) = &self.description {
            payload.insert("descricao".into(), json!(optional(Some(description))));
        }
        if let Some(status) = self.status {
            payload.insert("status".into(), json!(status.as_str()));
        }
        if let Some(resident_id) = &self.resident_id {
            payload.insert("morador_id".into(), json!(optional(Some(resident_id))));
        }
        if self.clear_event_date {
            payload.insert("data_evento".into(), JsonValue::Null);
        } else if let Some(date) = self.event_date {
            payload.insert("data_evento".into(), json!(date.to_string()));
        }
        if payload.is_empty() {
            return Err(CLIError::validation("Nothing to update."));
        }
        Ok(JsonValue::Object(payload))
    }
}

/// Latest incidents first, each with its resident label. The status filter
/// runs on the server, the text search on the fetched rows.
pub async fn list(page: &Authenticated<'_>, filter: &IncidentFilter) -> Result<Vec<Incident>> {
    let labels = residents::labels(page).await?;

    let mut query = page
        .accessor(TABLE)
        .select(COLUMNS)
        .order("created_at", Direction::Descending)
        .limit(LIST_LIMIT);
    if let Some(status) = filter.status {
        query = query.eq("status", status.as_str());
    }
    let mut rows: Vec<Incident> = query.execute().await?.rows_as()?;
    for row in rows.iter_mut() {
        row.morador = residents::label_for(&labels, row.morador_id.as_deref());
    }

    Ok(match optional(filter.search.as_deref()) {
        Some(term) => rows.into_iter().filter(|r| r.matches_search(&term)).collect(),
        None => rows,
    })
}

pub async fn create(page: &Authenticated<'_>, incident: &NewIncident) -> Result<Incident> {
    let response = page.accessor(TABLE).insert(incident.payload()).execute().await?;
    response
        .rows_as::<Incident>()?
        .into_iter()
        .next()
        .ok_or_else(|| CLIError::FormatError("insert returned no row".into()))
}

pub async fn update(page: &Authenticated<'_>, id: &str, changes: &IncidentChanges) -> Result<Incident> {
    let payload = changes.payload()?;
    let response = page
        .accessor(TABLE)
        .update(payload)
        .eq("id", id)
        .execute()
        .await?;
    response
        .rows_as::<Incident>()?
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
    CLIError::validation(format!("No incident with id '{}'.", id))
}
