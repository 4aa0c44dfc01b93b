use crate::infra::{build_service, ApiService};
use clap::Args;
use rate_engine::config::AppConfig;
use rate_engine::error::AppError;
use rate_engine::quotes::{Product, RateQuoteRequest};
use rate_engine::telemetry;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub(crate) struct QuoteArgs {
    /// Customer identifier as stored in the customer file
    pub(crate) customer_id: String,
    /// Loan principal, or deposit amount for deposits
    #[arg(long)]
    pub(crate) amount: f64,
    /// Loan duration, or deposit tenure in years
    #[arg(long)]
    pub(crate) duration: f64,
    /// Base interest rate in percent
    #[arg(long)]
    pub(crate) base_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct HealthArgs {
    /// Customer identifier as stored in the customer file
    pub(crate) customer_id: String,
    /// Base interest rate in percent
    #[arg(long)]
    pub(crate) base_rate: f64,
}

fn load_service() -> Result<ApiService, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    build_service(&config.pricing)
}

pub(crate) async fn run_quote(product: Product, args: QuoteArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let request = RateQuoteRequest {
        customer_id: Some(args.customer_id),
        amount: Some(args.amount),
        duration: Some(args.duration),
        base_rate: Some(args.base_rate),
    };

    match product {
        Product::HouseLoan => print_json(&service.quote_house_loan(&request).await?),
        Product::FixedDeposit => print_json(&service.quote_fixed_deposit(&request).await?),
    }
}

pub(crate) fn run_health(product: Product, args: HealthArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let breakdown = service.health_breakdown(&args.customer_id, product, args.base_rate)?;

    println!(
        "{} health breakdown for {} (base {:.2}%)",
        product.label(),
        breakdown.customer_id,
        breakdown.base_rate
    );
    for line in &breakdown.lines {
        println!(
            "  {:<28} {:>12}  health {:>5.1}%  {:>7.3} bps",
            line.parameter,
            line.value.to_string(),
            line.health,
            line.bps
        );
    }
    println!(
        "Total: {:.3} bps -> final rate {:.2}%",
        breakdown.total_bps, breakdown.final_rate
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    println!("{rendered}");
    Ok(())
}
