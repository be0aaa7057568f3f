#[cfg(feature = "cli")]
pub mod cli;
pub mod pricing;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use pricing::PricingConfig;
