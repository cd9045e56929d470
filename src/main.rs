use clap::Parser;
use inxpress_rates::core::quoter::{report_error, RATE_ERROR_CODE, VERIFY_ERROR_CODE};
use inxpress_rates::domain::model::{ReportSeverity, ShippingDestination};
use inxpress_rates::utils::error::{ErrorSeverity, QuoteError, Result};
use inxpress_rates::utils::{logger, validation::Validate};
use inxpress_rates::{
    CliConfig, Command, HttpTransport, ItemPackager, Order, RateQuoter, ShippingOptions,
    TomlConfig, TracingReporter,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting inxpress-rates");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = TomlConfig::from_file(&cli.config)?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let transport = HttpTransport::from_config(&config.carrier)?;
    let quoter = RateQuoter::from_config(&config, transport);

    match cli.command {
        Command::Quote { order, packaging } => {
            let content = std::fs::read_to_string(&order)?;
            let order: Order = serde_json::from_str(&content)?;
            let mode = packaging.unwrap_or(config.packaging.mode);
            let mut packager = ItemPackager::from_order(&order, mode);

            tracing::info!(
                "📦 Quoting {} package(s) to {} ({:?} packaging)",
                packager.remaining(),
                order.destination.country,
                mode
            );

            let rate = quoter
                .quote(&order.destination, &mut packager)
                .await
                .inspect_err(|e| {
                    report_error(&TracingReporter, e, RATE_ERROR_CODE, ReportSeverity::Transaction)
                })?;

            let mut options = ShippingOptions::new();
            options.insert(rate);
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Verify { postcode, country } => {
            let destination = probe_destination(&config, postcode, country)?;
            quoter
                .verify(&destination)
                .await
                .inspect_err(|e| {
                    report_error(&TracingReporter, e, VERIFY_ERROR_CODE, ReportSeverity::Addon)
                })?;
            println!(
                "✅ InXpress account '{}' verified",
                quoter.carrier().account_id
            );
        }
    }

    Ok(())
}

/// Flags take precedence over the `[verification]` section.
fn probe_destination(
    config: &TomlConfig,
    postcode: Option<String>,
    country: Option<String>,
) -> Result<ShippingDestination> {
    let fallback = config.verification_destination();
    let postcode = postcode
        .or_else(|| fallback.as_ref().map(|d| d.postcode.clone()))
        .ok_or_else(|| QuoteError::MissingConfigError {
            field: "verification.postcode".to_string(),
        })?;
    let country = country
        .or_else(|| fallback.as_ref().map(|d| d.country.clone()))
        .ok_or_else(|| QuoteError::MissingConfigError {
            field: "verification.country".to_string(),
        })?;
    Ok(ShippingDestination::new(postcode, country))
}
