use super::ui;
use crate::core::holding::{HoldingForm, HoldingId};
use crate::core::state::AppState;
use anyhow::{Context, Result};
use tracing::info;

fn parse_id(raw: &str) -> Result<HoldingId> {
    raw.trim()
        .parse::<HoldingId>()
        .with_context(|| format!("Invalid record id: {raw}"))
}

pub async fn add(state: &AppState, form: HoldingForm) -> Result<()> {
    let labels = state.language().await.labels();
    let holding = form.into_new_holding()?;
    let created = state.add_holding(holding).await?;
    info!(id = %created.id, "Holding created");

    println!(
        "{}: {}",
        ui::style_text(labels.record_added, ui::StyleType::TotalLabel),
        created.id
    );
    Ok(())
}

pub async fn edit(state: &AppState, id: &str, form: HoldingForm) -> Result<()> {
    let labels = state.language().await.labels();
    let id = parse_id(id)?;
    let patch = form.into_patch()?;
    let updated = state.update_holding(id, patch).await?;
    info!(id = %updated.id, "Holding updated");

    println!(
        "{}: {}",
        ui::style_text(labels.record_updated, ui::StyleType::TotalLabel),
        updated.id
    );
    Ok(())
}

pub async fn remove(state: &AppState, id: &str) -> Result<()> {
    let labels = state.language().await.labels();
    let id = parse_id(id)?;
    state.delete_holding(id).await?;
    info!(%id, "Holding deleted");

    println!(
        "{}: {}",
        ui::style_text(labels.record_deleted, ui::StyleType::TotalLabel),
        id
    );
    Ok(())
}
