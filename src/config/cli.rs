use crate::core::text::map_condition;
use crate::domain::model::{
    Condition, ConditionGrade, CopyStyle, ItemAttributes, QueryAttributes, SaleSpeed,
};
use crate::utils::error::{PricerError, Result};
use crate::utils::validation::{validate_file_extension, validate_non_empty_string, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const LISTING_FILE_EXTENSIONS: &[&str] = &["json", "csv"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Parser)]
#[command(name = "listing-pricer")]
#[command(about = "Recommend marketplace prices from scraped comparables")]
pub struct CliConfig {
    /// Pricing policy TOML file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Price an item from a comparables export, without a photo
    PriceCheck(PriceCheckArgs),
    /// Build a full listing draft from a photo and a comparables export
    Create(CreateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long = "type")]
    pub item_type: Option<String>,

    #[arg(long)]
    pub size: Option<String>,

    /// Condition label, e.g. new, like-new, good, fair, poor, "Ottimo"
    #[arg(long, default_value = "good", value_parser = parse_condition)]
    pub condition: ConditionGrade,

    #[arg(long, value_enum, default_value_t = SaleSpeed::Normal)]
    pub speed: SaleSpeed,
}

impl ItemArgs {
    pub fn query(&self) -> QueryAttributes {
        QueryAttributes {
            brand: self.brand.clone(),
            item_type: self.item_type.clone(),
            size: self.size.clone(),
            condition: Some(self.condition.to_string()),
            ..Default::default()
        }
    }

    pub fn condition(&self) -> Condition {
        Condition::Known(self.condition)
    }
}

#[derive(Debug, Clone, Args)]
pub struct PriceCheckArgs {
    /// Scraped comparables (.json array or .csv with header)
    #[arg(long)]
    pub listings: PathBuf,

    #[command(flatten)]
    pub item: ItemArgs,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long)]
    pub listings: PathBuf,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub material: Option<String>,

    /// Tone of the generated description
    #[arg(long, value_enum, default_value_t = CopyStyle::Friendly)]
    pub style: CopyStyle,

    #[command(flatten)]
    pub item: ItemArgs,
}

impl CreateArgs {
    pub fn attributes(&self) -> ItemAttributes {
        ItemAttributes {
            brand: self.item.brand.clone(),
            item_type: self.item.item_type.clone().unwrap_or_default(),
            color: self.color.clone(),
            material: self.material.clone(),
            // declared by the seller, not inferred
            confidence: Some(1.0),
        }
    }
}

fn parse_condition(label: &str) -> std::result::Result<ConditionGrade, String> {
    match map_condition(label) {
        Condition::Known(grade) => Ok(grade),
        Condition::Unknown => Err(format!(
            "unrecognized condition '{}' (try new, like-new, good, fair, poor)",
            label
        )),
    }
}

fn validate_item(item: &ItemArgs) -> Result<()> {
    if !item.query().is_identifiable() {
        return Err(PricerError::InvalidQuery {
            message: "pass --brand, --type or both".to_string(),
        });
    }
    Ok(())
}

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::PriceCheck(args) => {
                validate_file_extension("listings", &path_str(&args.listings), LISTING_FILE_EXTENSIONS)?;
                validate_item(&args.item)
            }
            Command::Create(args) => {
                validate_file_extension("listings", &path_str(&args.listings), LISTING_FILE_EXTENSIONS)?;
                validate_file_extension("image", &path_str(&args.image), IMAGE_EXTENSIONS)?;
                validate_non_empty_string("type", args.item.item_type.as_deref().unwrap_or_default())?;
                validate_non_empty_string("size", args.item.size.as_deref().unwrap_or_default())?;
                validate_item(&args.item)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_check_args() {
        let cli = CliConfig::try_parse_from([
            "listing-pricer",
            "price-check",
            "--listings",
            "comps.json",
            "--brand",
            "Nike",
            "--type",
            "Felpa",
            "--condition",
            "Ottimo",
            "--speed",
            "fast",
        ])
        .unwrap();

        let Command::PriceCheck(args) = &cli.command else {
            panic!("expected price-check");
        };
        assert_eq!(args.item.condition, ConditionGrade::LikeNew);
        assert_eq!(args.item.speed, SaleSpeed::Fast);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_unknown_condition_is_rejected() {
        let result = CliConfig::try_parse_from([
            "listing-pricer",
            "price-check",
            "--listings",
            "comps.json",
            "--brand",
            "Nike",
            "--condition",
            "meh",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_brand_or_type() {
        let cli = CliConfig::try_parse_from(["listing-pricer", "price-check", "--listings", "comps.csv"])
            .unwrap();
        assert!(matches!(cli.validate(), Err(PricerError::InvalidQuery { .. })));
    }

    #[test]
    fn test_create_requires_image_type_and_size() {
        let cli = CliConfig::try_parse_from([
            "listing-pricer",
            "create",
            "--image",
            "photo.gif",
            "--listings",
            "comps.json",
            "--type",
            "Felpa",
            "--size",
            "M",
        ])
        .unwrap();
        assert!(cli.validate().is_err());

        let cli = CliConfig::try_parse_from([
            "listing-pricer",
            "create",
            "--image",
            "photo.jpg",
            "--listings",
            "comps.json",
            "--brand",
            "Nike",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_create_style_flag() {
        let cli = CliConfig::try_parse_from([
            "listing-pricer",
            "create",
            "--image",
            "photo.jpg",
            "--listings",
            "comps.json",
            "--type",
            "Felpa",
            "--size",
            "M",
            "--style",
            "trendy",
        ])
        .unwrap();

        let Command::Create(args) = &cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.style, CopyStyle::Trendy);
        assert!(cli.validate().is_ok());

        let cli = CliConfig::try_parse_from([
            "listing-pricer",
            "create",
            "--image",
            "photo.jpg",
            "--listings",
            "comps.json",
            "--type",
            "Felpa",
            "--size",
            "M",
        ])
        .unwrap();
        let Command::Create(args) = &cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.style, CopyStyle::Friendly);
    }
}
