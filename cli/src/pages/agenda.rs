//! Agenda page: dated incidents plus staff tasks (`agenda_eventos`).

use chrono::NaiveDate;
use condo_link::{Authenticated, Direction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::{date_key, incidents, null_as_empty, optional, required, residents};
use crate::error::{CLIError, Result};
use crate::formatter::{format_date_br, short_id, TableRow};

pub const TASKS_TABLE: &str = "agenda_eventos";
const INCIDENT_COLUMNS: &str = "id,titulo,descricao,status,morador_id,data_evento";
const TASK_COLUMNS: &str = "id,titulo,descricao,inicio,fim,ocorrencia_id";
const LIST_LIMIT: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub inicio: Option<String>,
    #[serde(default)]
    pub fim: Option<String>,
    #[serde(default)]
    pub ocorrencia_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Ocorrencia,
    Tarefa,
}

/// One line of the agenda, from either source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaEntry {
    pub kind: EntryKind,
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub titulo: String,
    pub status: Option<String>,
    pub descricao: Option<String>,
    /// Linked resident label; incidents only
    pub morador: Option<String>,
}

impl From<incidents::Incident> for AgendaEntry {
    fn from(incident: incidents::Incident) -> Self {
        Self {
            kind: EntryKind::Ocorrencia,
            date: date_key(incident.data_evento.as_deref()),
            id: incident.id,
            titulo: incident.titulo,
            status: Some(incident.status),
            descricao: incident.descricao,
            morador: incident.morador,
        }
    }
}

impl From<Task> for AgendaEntry {
    fn from(task: Task) -> Self {
        Self {
            kind: EntryKind::Tarefa,
            date: date_key(task.inicio.as_deref()),
            id: task.id,
            titulo: task.titulo,
            status: None,
            descricao: task.descricao,
            morador: None,
        }
    }
}

impl TableRow for AgendaEntry {
    fn headers() -> &'static [&'static str] {
        &["Data", "Tipo", "Título", "Status", "Morador", "ID"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format_date_br(Some(&self.date)),
            match self.kind {
                EntryKind::Ocorrencia => "Ocorrência".to_string(),
                EntryKind::Tarefa => "Tarefa".to_string(),
            },
            self.titulo.clone(),
            self.status
                .as_deref()
                .map(incidents::status_label)
                .unwrap_or_else(|| "—".to_string()),
            self.morador.clone().unwrap_or_else(|| "—".to_string()),
            short_id(Some(&self.id)),
        ]
    }
}

/// Merge both sources in date order; on the same day incidents come first.
pub fn merge(incidents: Vec<incidents::Incident>, tasks: Vec<Task>) -> Vec<AgendaEntry> {
    let mut entries: Vec<AgendaEntry> = incidents
        .into_iter()
        .filter(|i| i.data_evento.as_deref().map(|d| !d.is_empty()).unwrap_or(false))
        .map(AgendaEntry::from)
        .chain(
            tasks
                .into_iter()
                .filter(|t| t.inicio.is_some())
                .map(AgendaEntry::from),
        )
        .collect();
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| (a.kind == EntryKind::Tarefa).cmp(&(b.kind == EntryKind::Tarefa)))
    });
    entries
}

/// Validated all-day task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub date: NaiveDate,
    pub titulo: String,
    pub descricao: Option<String>,
    pub ocorrencia_id: Option<String>,
}

impl NewTask {
    pub fn new(
        date: NaiveDate,
        title: &str,
        description: Option<&str>,
        incident_id: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            date,
            titulo: required(title, "Informe um título.")?,
            descricao: optional(description),
            ocorrencia_id: optional(incident_id),
        })
    }

    pub fn payload(&self) -> JsonValue {
        json!({
            "titulo": self.titulo,
            "descricao": self.descricao,
            "inicio": format!("{}T00:00:00Z", self.date),
            "fim": null,
            "ocorrencia_id": self.ocorrencia_id,
        })
    }
}

pub async fn list(page: &Authenticated<'_>) -> Result<Vec<AgendaEntry>> {
    let labels = residents::labels(page).await?;

    let mut dated: Vec<incidents::Incident> = page
        .accessor(incidents::TABLE)
        .select(INCIDENT_COLUMNS)
        .not_null("data_evento")
        .order("data_evento", Direction::Ascending)
        .limit(LIST_LIMIT)
        .execute()
        .await?
        .rows_as()?;
    for incident in dated.iter_mut() {
        incident.morador = residents::label_for(&labels, incident.morador_id.as_deref());
    }

    let tasks: Vec<Task> = page
        .accessor(TASKS_TABLE)
        .select(TASK_COLUMNS)
        .order("inicio", Direction::Ascending)
        .limit(LIST_LIMIT)
        .execute()
        .await?
        .rows_as()?;

    Ok(merge(dated, tasks))
}

pub async fn add_task(page: &Authenticated<'_>, task: &NewTask) -> Result<Task> {
    let response = page
        .accessor(TASKS_TABLE)
        .insert(task.payload())
        .execute()
        .await?;
    response
        .rows_as::<Task>()?
        .into_iter()
        .next()
        .ok_or_else(|| CLIError::FormatError("insert returned no row".into()))
}
