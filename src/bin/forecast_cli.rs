use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde::Serialize;
use storefront_forecast::{
    config,
    db,
    errors::{ErrorResponse, ServiceError},
    ml::forecasting::ForecastResult,
    repositories::SeaOrmSalesHistory,
    services::forecasting::{ForecastService, InventoryForecast, InventoryForecastQuery},
};
use tracing::debug;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "forecast-cli",
    about = "Inventory demand forecast and reorder recommendations",
    version
)]
struct Cli {
    #[arg(long, help = "Forecast horizon in days (defaults to the configured horizon, 30)")]
    days: Option<i64>,
    #[arg(long, help = "Restrict the forecast to a single product")]
    product_id: Option<Uuid>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Only list products that need reordering"
    )]
    reorder_only: bool,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ServiceError>() {
                Some(service_error) if cli.json => {
                    let _ = print_json(&ErrorResponse::from(service_error));
                }
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    let source = Arc::new(SeaOrmSalesHistory::new(Arc::new(pool)));
    let service = ForecastService::new(source, &cfg.forecast);

    let query = InventoryForecastQuery {
        forecast_period_days: cli.days,
        product_id: cli.product_id,
    };
    debug!(?query, "Requesting inventory forecast");

    let mut forecast = service.get_inventory_forecast(query).await?;
    if cli.reorder_only {
        forecast.forecasts.retain(|f| f.needs_reorder);
    }

    if cli.json {
        print_json(&forecast)?;
    } else {
        print_table(&forecast);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(forecast: &InventoryForecast) {
    println!(
        "Forecast horizon: {} days (lookback {} days)",
        forecast.forecast_period_days, forecast.lookback_period_days
    );
    if forecast.forecasts.is_empty() {
        println!("No products in scope.");
        return;
    }

    println!(
        "{:<36}  {:<24} {:>8} {:>9} {:>9} {:>10} {:>9} {:>7} {:>9}",
        "PRODUCT ID", "NAME", "STOCK", "DAILY", "DEMAND", "STOCKOUT", "REORDER@", "REORDER", "ORDER QTY"
    );
    for row in &forecast.forecasts {
        println!("{}", format_row(row));
    }
}

fn format_row(row: &ForecastResult) -> String {
    let stockout = row
        .projected_stockout_days
        .map(|days| format!("{:.1}d", days))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<36}  {:<24} {:>8} {:>9.2} {:>9.1} {:>10} {:>9.1} {:>7} {:>9.1}",
        row.product_id,
        truncate(&row.product_name, 24),
        row.current_stock,
        row.daily_average_sales,
        row.forecasted_demand,
        stockout,
        row.reorder_point,
        if row.needs_reorder { "yes" } else { "no" },
        row.recommended_order_quantity,
    )
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
