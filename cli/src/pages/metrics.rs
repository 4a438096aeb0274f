//! Metrics page: exact row counts.

use condo_link::{Authenticated, CountMode, TableQuery};
use serde::Serialize;

use super::{incidents, residents};
use crate::error::Result;

const FINISHED: &str = "finalizada";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub moradores: u64,
    pub ocorrencias: u64,
    pub finalizadas: u64,
    pub em_aberto: u64,
}

impl Metrics {
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Moradores", self.moradores.to_string()),
            ("Ocorrências", self.ocorrencias.to_string()),
            ("Finalizadas", self.finalizadas.to_string()),
            ("Em aberto", self.em_aberto.to_string()),
        ]
    }
}

async fn count(query: TableQuery) -> Result<u64> {
    Ok(query.execute().await?.count_or_zero())
}

fn counting(page: &Authenticated<'_>, table: &str) -> TableQuery {
    page.accessor(table).select_with_count("id", CountMode::Exact)
}

pub async fn load(page: &Authenticated<'_>) -> Result<Metrics> {
    Ok(Metrics {
        moradores: count(counting(page, residents::TABLE)).await?,
        ocorrencias: count(counting(page, incidents::TABLE)).await?,
        finalizadas: count(counting(page, incidents::TABLE).eq("status", FINISHED)).await?,
        em_aberto: count(counting(page, incidents::TABLE).neq("status", FINISHED)).await?,
    })
}
