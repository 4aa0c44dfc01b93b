use crate::commands::{run_health, run_quote, HealthArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rate_engine::error::AppError;
use rate_engine::quotes::Product;

#[derive(Parser, Debug)]
#[command(
    name = "Rate Engine",
    about = "Quote risk-adjusted house loan and fixed deposit rates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Quote a rate for a stored customer using the scoring models
    Quote {
        #[command(subcommand)]
        command: QuoteCommand,
    },
    /// Print the static health-score breakdown for a stored customer
    Health {
        #[command(subcommand)]
        command: HealthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QuoteCommand {
    /// House loan: the adjustment is a discount on the base rate
    Loan(QuoteArgs),
    /// Fixed deposit: the adjustment is a bonus on the base rate
    Deposit(QuoteArgs),
}

impl QuoteCommand {
    fn split(self) -> (Product, QuoteArgs) {
        match self {
            QuoteCommand::Loan(args) => (Product::HouseLoan, args),
            QuoteCommand::Deposit(args) => (Product::FixedDeposit, args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum HealthCommand {
    /// House loan static breakdown
    Loan(HealthArgs),
    /// Fixed deposit static breakdown
    Deposit(HealthArgs),
}

impl HealthCommand {
    fn split(self) -> (Product, HealthArgs) {
        match self {
            HealthCommand::Loan(args) => (Product::HouseLoan, args),
            HealthCommand::Deposit(args) => (Product::FixedDeposit, args),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote { command } => {
            let (product, args) = command.split();
            run_quote(product, args).await
        }
        Command::Health { command } => {
            let (product, args) = command.split();
            run_health(product, args)
        }
    }
}
