use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use goldtrack::core::holding::HoldingForm;
use goldtrack::core::i18n::Language;
use goldtrack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Record fields. Amounts accept thousands separators ("35,000").
#[derive(Args)]
struct HoldingArgs {
    /// Purity in karats: 21 or 24
    #[arg(short, long)]
    karat: Option<String>,
    /// jewelry, coin, bar, pound or sabikah
    #[arg(short = 't', long = "type")]
    category: Option<String>,
    /// Weight in grams
    #[arg(short, long)]
    grams: Option<String>,
    /// Total price paid for the lot
    #[arg(short = 'p', long = "price")]
    cost: Option<String>,
    /// Purchase date (YYYY-MM-DD)
    #[arg(short, long = "date")]
    date: Option<String>,
    #[arg(long = "shop")]
    shop_name: Option<String>,
    #[arg(long = "company")]
    company_name: Option<String>,
    #[arg(long)]
    production_cost: Option<String>,
    #[arg(long)]
    cashback: Option<String>,
    #[arg(short, long)]
    notes: Option<String>,
}

impl From<HoldingArgs> for HoldingForm {
    fn from(args: HoldingArgs) -> Self {
        HoldingForm {
            karat: args.karat,
            category: args.category,
            grams: args.grams,
            cost: args.cost,
            purchase_date: args.date,
            shop_name: args.shop_name,
            company_name: args.company_name,
            production_cost: args.production_cost,
            cashback: args.cashback,
            notes: args.notes,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display holdings, their value and zakat due
    Summary,
    /// Fetch current gold prices
    Prices,
    /// Refresh prices periodically until interrupted
    Watch,
    /// Record a new gold purchase
    Add(HoldingArgs),
    /// Change fields of an existing record
    Edit {
        id: String,
        #[command(flatten)]
        fields: HoldingArgs,
    },
    /// Delete a record
    Remove { id: String },
    /// Set the display language, or toggle it when omitted
    Language { language: Option<Language> },
}

impl From<Commands> for goldtrack::AppCommand {
    fn from(cmd: Commands) -> goldtrack::AppCommand {
        match cmd {
            Commands::Summary => goldtrack::AppCommand::Summary,
            Commands::Prices => goldtrack::AppCommand::Prices,
            Commands::Watch => goldtrack::AppCommand::Watch,
            Commands::Add(fields) => goldtrack::AppCommand::Add(fields.into()),
            Commands::Edit { id, fields } => goldtrack::AppCommand::Edit {
                id,
                form: fields.into(),
            },
            Commands::Remove { id } => goldtrack::AppCommand::Remove { id },
            Commands::Language { language } => goldtrack::AppCommand::Language(language),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => goldtrack::cli::setup::setup(),
        Some(cmd) => goldtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
