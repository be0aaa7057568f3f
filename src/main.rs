use clap::Parser;
use listing_pricer::adapters::{DeclaredAttributes, FileListingSource, TemplateCopyWriter};
use listing_pricer::config::cli::Command;
use listing_pricer::domain::model::{ItemAttributes, ItemDetails};
use listing_pricer::utils::error::ErrorSeverity;
use listing_pricer::utils::{logger, validation::Validate};
use listing_pricer::{CliConfig, ListingEngine, PricerError, PricingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting listing-pricer");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        fail(&e);
    }

    let config = match load_pricing_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    match run(&cli, config).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn load_pricing_config(cli: &CliConfig) -> listing_pricer::Result<PricingConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading pricing config from: {}", path.display());
            PricingConfig::from_file(path)?
        }
        None => PricingConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: PricingConfig) -> listing_pricer::Result<String> {
    match &cli.command {
        Command::PriceCheck(args) => {
            let attributes = ItemAttributes {
                brand: args.item.brand.clone(),
                item_type: args.item.item_type.clone().unwrap_or_default(),
                color: None,
                material: None,
                confidence: None,
            };
            let engine = ListingEngine::new(
                DeclaredAttributes::new(attributes),
                FileListingSource::new(&args.listings),
                TemplateCopyWriter::new(),
                config,
            );

            let estimate = engine
                .price_check(&args.item.query(), args.item.condition(), args.item.speed)
                .await?;
            Ok(serde_json::to_string_pretty(&estimate)?)
        }
        Command::Create(args) => {
            let image = tokio::fs::read(&args.image).await?;
            let engine = ListingEngine::new(
                DeclaredAttributes::new(args.attributes()),
                FileListingSource::new(&args.listings),
                TemplateCopyWriter::new(),
                config,
            );

            let details = ItemDetails {
                size: args.item.size.clone().unwrap_or_default(),
                condition: args.item.condition(),
                sale_speed: args.item.speed,
                style: args.style,
            };
            let draft = engine.create_listing(&image, &details).await?;
            Ok(serde_json::to_string_pretty(&draft)?)
        }
    }
}

fn fail(e: &PricerError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
