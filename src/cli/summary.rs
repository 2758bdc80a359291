use super::{prices, ui};
use crate::core::config::AppConfig;
use crate::core::holding::GoldHolding;
use crate::core::i18n::Labels;
use crate::core::price::PriceQuote;
use crate::core::state::AppState;
use crate::core::valuation::PortfolioSummary;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join;

/// Holdings table, newest first, each valued at `quote`.
pub fn display_holdings(holdings: &[GoldHolding], quote: &PriceQuote, labels: &Labels) -> String {
    if holdings.is_empty() {
        return ui::style_text(labels.no_records, ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell(labels.karat),
        ui::header_cell(labels.category),
        ui::header_cell(labels.grams),
        ui::header_cell(labels.purchase_price),
        ui::header_cell(labels.purchase_date),
        ui::header_cell(labels.shop),
        ui::header_cell(labels.value),
    ]);

    for holding in holdings {
        let date = holding.purchase_date.map(|d| d.format("%Y-%m-%d").to_string());
        table.add_row(vec![
            Cell::new(holding.id),
            Cell::new(holding.purity),
            Cell::new(labels.category(holding.category)),
            ui::amount_cell(holding.mass_grams),
            ui::amount_cell(holding.purchase_cost_total),
            ui::optional_cell(date.as_deref()),
            ui::optional_cell(holding.shop_name.as_deref()),
            ui::amount_cell(holding.mass_grams * quote.price_for(holding.purity)),
        ]);
    }

    format!(
        "{}\n\n{table}",
        ui::style_text(labels.your_records, ui::StyleType::Title)
    )
}

/// Valuation block. The zakat amount appears only once the nisab is reached.
pub fn display_summary(summary: &PortfolioSummary, labels: &Labels, currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.add_row(vec![
        Cell::new(labels.total_purchase_value),
        ui::amount_cell(summary.total_purchase_cost),
    ]);
    table.add_row(vec![
        Cell::new(labels.current_value),
        ui::amount_cell(summary.total_current_value),
    ]);
    table.add_row(vec![
        Cell::new(labels.unrealized_gain),
        ui::gain_cell(summary.unrealized_gain()),
        ui::change_cell(summary.unrealized_gain_pct()),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} ({})", labels.grams, labels.k21)),
        ui::amount_cell(summary.grams_21),
    ]);
    table.add_row(vec![
        Cell::new(format!("{} ({})", labels.grams, labels.k24)),
        ui::amount_cell(summary.grams_24),
    ]);
    table.add_row(vec![
        Cell::new(labels.nisab),
        ui::amount_cell(summary.nisab_threshold),
    ]);

    let mut output = format!(
        "{} ({})\n\n{table}\n\n",
        ui::style_text(labels.zakat_calculation, ui::StyleType::Title),
        currency
    );

    if summary.levy_eligible {
        output.push_str(&format!(
            "{}\n{}: {}",
            ui::style_text(labels.eligible_for_zakat, ui::StyleType::TotalLabel),
            labels.zakat_due,
            ui::style_text(
                &format!("{} {currency}", ui::format_amount(summary.levy_amount)),
                ui::StyleType::TotalValue
            )
        ));
    } else {
        output.push_str(&ui::style_text(
            labels.not_eligible_for_zakat,
            ui::StyleType::Subtle,
        ));
    }
    output
}

pub async fn run(state: &AppState, config: &AppConfig) -> Result<()> {
    let labels = state.language().await.labels();

    let pb = ui::new_spinner("Loading records and prices...");
    let (holdings, quote) = join(
        state.load_holdings(),
        state.refresh_if_stale(config.refresh_interval()),
    )
    .await;
    pb.finish_and_clear();
    let holdings = holdings?;

    println!(
        "{}\n",
        ui::style_text(labels.app_name, ui::StyleType::Title)
    );
    println!("{}", prices::display_quote(&quote, labels, &config.currency));
    ui::print_separator();
    println!("{}", display_holdings(&holdings, &quote, labels));
    ui::print_separator();
    println!(
        "{}",
        display_summary(&state.summary().await, labels, &config.currency)
    );
    Ok(())
}
