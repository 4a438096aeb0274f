//! Residents page (`moradores`).

use condo_link::{Authenticated, Direction, TableQuery};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

use super::{null_as_empty, optional, required};
use crate::error::{CLIError, Result};
use crate::formatter::{format_date_br, short_id, TableRow};

pub const TABLE: &str = "moradores";
const COLUMNS: &str = "id,nome,telefone,predio,apto,created_at";
const LABEL_COLUMNS: &str = "id,nome,predio,apto";
const LIST_LIMIT: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub nome: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub predio: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub apto: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resident {
    /// "Nome — Prédio X, Apto Y", as used when linking incidents.
    pub fn label(&self) -> String {
        format!("{} — Prédio {}, Apto {}", self.nome, self.predio, self.apto)
    }
}

impl TableRow for Resident {
    fn headers() -> &'static [&'static str] {
        &["ID", "Nome", "Telefone", "Prédio", "Apto", "Cadastro"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            short_id(Some(&self.id)),
            self.nome.clone(),
            self.telefone.clone().unwrap_or_default(),
            self.predio.clone(),
            self.apto.clone(),
            format_date_br(self.created_at.as_deref()),
        ]
    }
}

/// Substring filters for the list; blank values are ignored.
#[derive(Debug, Clone, Default)]
pub struct ResidentFilter {
    pub name: Option<String>,
    pub building: Option<String>,
    pub unit: Option<String>,
}

impl ResidentFilter {
    pub(crate) fn apply(&self, mut query: TableQuery) -> TableQuery {
        let filters = [
            ("nome", &self.name),
            ("predio", &self.building),
            ("apto", &self.unit),
        ];
        for (column, value) in filters {
            if let Some(term) = optional(value.as_deref()) {
                query = query.ilike(column, format!("%{}%", term));
            }
        }
        query
    }
}

/// Validated fields for a new resident.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResident {
    pub nome: String,
    pub telefone: Option<String>,
    pub predio: String,
    pub apto: String,
}

impl NewResident {
    pub fn new(name: &str, phone: Option<&str>, building: &str, unit: &str) -> Result<Self> {
        Ok(Self {
            nome: required(name, "Informe o nome.")?,
            telefone: optional(phone),
            predio: required(building, "Informe o prédio.")?,
            apto: required(unit, "Informe o apartamento.")?,
        })
    }

    pub fn payload(&self) -> JsonValue {
        json!({
            "nome": self.nome,
            "telefone": self.telefone,
            "predio": self.predio,
            "apto": self.apto,
        })
    }
}

/// Fields to change; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct ResidentChanges {
    pub name: Option<String>,
    /// `Some("")` clears the phone
    pub phone: Option<String>,
    pub building: Option<String>,
    pub unit: Option<String>,
}

impl ResidentChanges {
    pub fn payload(&self) -> Result<JsonValue> {
        let mut payload = Map::new();
        if let Some(name) = &self.name {
            payload.insert("nome".into(), json!(required(name, "Informe o nome.")?));
        }
        if let Some(phone) = &self.phone {
            payload.insert("telefone".into(), json!(optional(Some(phone))));
        }
        if let Some(building) = &self.building {
            payload.insert("predio".into(), json!(required(building, "Informe o prédio.")?));
        }
        if let Some(unit) = &self.unit {
            payload.insert("apto".into(), json!(required(unit, "Informe o apartamento.")?));
        }
        if payload.is_empty() {
            return Err(CLIError::validation("Nothing to update."));
        }
        Ok(JsonValue::Object(payload))
    }
}

pub async fn list(page: &Authenticated<'_>, filter: &ResidentFilter) -> Result<Vec<Resident>> {
    let query = page
        .accessor(TABLE)
        .select(COLUMNS)
        .order("nome", Direction::Ascending)
        .limit(LIST_LIMIT);
    let response = filter.apply(query).execute().await?;
    Ok(response.rows_as()?)
}

/// Resident id to [`Resident::label`], for pages that link to residents.
pub type ResidentLabels = HashMap<String, String>;

/// Labels for every resident, fetched once per page render.
pub async fn labels(page: &Authenticated<'_>) -> Result<ResidentLabels> {
    let rows: Vec<Resident> = page
        .accessor(TABLE)
        .select(LABEL_COLUMNS)
        .order("nome", Direction::Ascending)
        .limit(LIST_LIMIT)
        .execute()
        .await?
        .rows_as()?;
    Ok(rows.into_iter().map(|r| (r.id.clone(), r.label())).collect())
}

/// Label for a linked resident; `None` when unlinked or unknown.
pub fn label_for(labels: &ResidentLabels, id: Option<&str>) -> Option<String> {
    id.filter(|id| !id.is_empty())
        .and_then(|id| labels.get(id))
        .cloned()
}

pub async fn create(page: &Authenticated<'_>, resident: &NewResident) -> Result<Resident> {
    let response = page.accessor(TABLE).insert(resident.payload()).execute().await?;
    first_row(response.rows_as()?, "insert returned no row")
}

pub async fn update(page: &Authenticated<'_>, id: &str, changes: &ResidentChanges) -> Result<Resident> {
    let payload = changes.payload()?;
    let response = page
        .accessor(TABLE)
        .update(payload)
        .eq("id", id)
        .execute()
        .await?;
    response.rows_as::<Resident>()?.into_iter().next().ok_or_else(|| not_found(id))
}

pub async fn delete(page: &Authenticated<'_>, id: &str) -> Result<()> {
    let response = page.accessor(TABLE).delete().eq("id", id).execute().await?;
    if response.is_empty() {
        return Err(not_found(id));
    }
    Ok(())
}

fn not_found(id: &str) -> CLIError {
    CLIError::validation(format!("No resident with id '{}'.", id))
}

fn first_row<T>(rows: Vec<T>, context: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| CLIError::FormatError(context.to_string()))
}
