use chrono::{Local, NaiveDate};
use condo_cli::formatter::{format_brl, short_id};
use condo_cli::pages::{
    agenda, cashflow, incidents, metrics, parse_date, residents,
};
use condo_cli::{OutputFormatter, Result};
use condo_link::SessionContext;

use crate::args::{AgendaCommand, CashflowCommand, IncidentsCommand, ResidentsCommand};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

pub async fn residents(
    ctx: &mut SessionContext,
    formatter: &OutputFormatter,
    cmd: ResidentsCommand,
) -> Result<()> {
    let page = ctx.require_session().await?;

    match cmd {
        ResidentsCommand::List { name, building, unit } => {
            let filter = residents::ResidentFilter { name, building, unit };
            let rows = residents::list(&page, &filter).await?;
            println!("{}", formatter.format_rows(&rows)?);
        },
        ResidentsCommand::Add { name, building, unit, phone } => {
            let resident = residents::NewResident::new(&name, phone.as_deref(), &building, &unit)?;
            let created = residents::create(&page, &resident).await?;
            println!(
                "{}",
                formatter.success(&format!("Resident {} registered ({})", created.nome, short_id(Some(&created.id))))
            );
        },
        ResidentsCommand::Update { id, fields } => {
            let changes = residents::ResidentChanges {
                name: fields.name,
                phone: fields.phone,
                building: fields.building,
                unit: fields.unit,
            };
            let updated = residents::update(&page, &id, &changes).await?;
            println!("{}", formatter.success(&format!("Resident {} updated", updated.label())));
        },
        ResidentsCommand::Delete { id } => {
            residents::delete(&page, &id).await?;
            println!("{}", formatter.success(&format!("Resident {} removed", short_id(Some(&id)))));
        },
    }
    Ok(())
}

pub async fn incidents(
    ctx: &mut SessionContext,
    formatter: &OutputFormatter,
    cmd: IncidentsCommand,
) -> Result<()> {
    let page = ctx.require_session().await?;

    match cmd {
        IncidentsCommand::List { status, search } => {
            let filter = incidents::IncidentFilter { status, search };
            let rows = incidents::list(&page, &filter).await?;
            println!("{}", formatter.format_rows(&rows)?);
        },
        IncidentsCommand::Add {
            title,
            description,
            status,
            resident_id,
            date,
        } => {
            let incident = incidents::NewIncident::new(
                &title,
                description.as_deref(),
                status,
                resident_id.as_deref(),
                parse_optional_date(date.as_deref())?,
            )?;
            let created = incidents::create(&page, &incident).await?;
            println!(
                "{}",
                formatter.success(&format!("Incident {} opened", short_id(Some(&created.id))))
            );
        },
        IncidentsCommand::Update {
            id,
            title,
            description,
            status,
            resident_id,
            date,
            clear_date,
        } => {
            let changes = incidents::IncidentChanges {
                title,
                description,
                status,
                resident_id,
                event_date: parse_optional_date(date.as_deref())?,
                clear_event_date: clear_date,
            };
            let updated = incidents::update(&page, &id, &changes).await?;
            println!(
                "{}",
                formatter.success(&format!(
                    "Incident {} updated ({})",
                    short_id(Some(&updated.id)),
                    incidents::status_label(&updated.status)
                ))
            );
        },
        IncidentsCommand::Delete { id } => {
            incidents::delete(&page, &id).await?;
            println!("{}", formatter.success(&format!("Incident {} removed", short_id(Some(&id)))));
        },
    }
    Ok(())
}

pub async fn cashflow(
    ctx: &mut SessionContext,
    formatter: &OutputFormatter,
    cmd: CashflowCommand,
) -> Result<()> {
    let page = ctx.require_session().await?;

    match cmd {
        CashflowCommand::List { from, to, kind } => {
            let filter = cashflow::CashflowFilter {
                from: parse_optional_date(from.as_deref())?,
                to: parse_optional_date(to.as_deref())?,
                kind,
            };
            let rows = cashflow::list(&page, &filter, today()).await?;
            println!("{}", formatter.format_rows(&rows)?);
        },
        CashflowCommand::Add {
            description,
            kind,
            amount,
            date,
        } => {
            let date = parse_optional_date(date.as_deref())?.unwrap_or_else(today);
            let transaction = cashflow::NewTransaction::new(&description, kind, amount, date)?;
            let created = cashflow::create(&page, &transaction).await?;
            println!(
                "{}",
                formatter.success(&format!(
                    "Transaction {} recorded: {}",
                    short_id(Some(&created.id)),
                    format_brl(created.valor)
                ))
            );
        },
        CashflowCommand::Update {
            id,
            description,
            kind,
            amount,
            date,
        } => {
            let changes = cashflow::TransactionChanges {
                description,
                kind,
                amount,
                date: parse_optional_date(date.as_deref())?,
            };
            let updated = cashflow::update(&page, &id, &changes).await?;
            println!(
                "{}",
                formatter.success(&format!("Transaction {} updated", short_id(Some(&updated.id))))
            );
        },
        CashflowCommand::Delete { id } => {
            cashflow::delete(&page, &id).await?;
            println!("{}", formatter.success(&format!("Transaction {} removed", short_id(Some(&id)))));
        },
    }
    Ok(())
}

pub async fn agenda(
    ctx: &mut SessionContext,
    formatter: &OutputFormatter,
    cmd: AgendaCommand,
) -> Result<()> {
    let page = ctx.require_session().await?;

    match cmd {
        AgendaCommand::List => {
            let entries = agenda::list(&page).await?;
            println!("{}", formatter.format_rows(&entries)?);
        },
        AgendaCommand::AddTask {
            date,
            title,
            description,
            incident_id,
        } => {
            let task = agenda::NewTask::new(
                parse_date(&date)?,
                &title,
                description.as_deref(),
                incident_id.as_deref(),
            )?;
            let created = agenda::add_task(&page, &task).await?;
            println!(
                "{}",
                formatter.success(&format!("Task {} scheduled", short_id(Some(&created.id))))
            );
        },
    }
    Ok(())
}

pub async fn metrics(ctx: &mut SessionContext, formatter: &OutputFormatter) -> Result<()> {
    let page = ctx.require_session().await?;
    let metrics = metrics::load(&page).await?;
    println!("{}", formatter.format_value(&metrics, &metrics.lines())?);
    Ok(())
}
