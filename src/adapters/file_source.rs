use crate::domain::model::{QueryAttributes, RawPrice, ScrapedListing};
use crate::domain::ports::ListingSource;
use crate::utils::error::{PricerError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Serves comparables from a scraper export on disk (`.json` array or `.csv`
/// with a header row). Every search returns the whole file; relevance is the
/// normalizer's job.
#[derive(Debug, Clone)]
pub struct FileListingSource {
    path: PathBuf,
}

impl FileListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ListingSource for FileListingSource {
    async fn search(&self, query: &QueryAttributes) -> Result<Vec<ScrapedListing>> {
        tracing::debug!(
            "Reading comparables for {:?} {:?} from {}",
            query.brand(),
            query.item_type(),
            self.path.display()
        );

        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| unavailable(&self.path, &e))?;
        let listings = load_listings(&self.path, &data).map_err(|e| unavailable(&self.path, &e))?;

        tracing::info!("📥 Loaded {} raw listings from {}", listings.len(), self.path.display());
        Ok(listings)
    }
}

fn unavailable(path: &Path, error: &dyn std::fmt::Display) -> PricerError {
    PricerError::ScrapeUnavailable {
        message: format!("{}: {}", path.display(), error),
    }
}

/// Picks the format from the extension; anything other than `.csv` is read as JSON.
pub fn load_listings(path: &Path, data: &[u8]) -> Result<Vec<ScrapedListing>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_listings_csv(data)
    } else {
        parse_listings_json(data)
    }
}

/// The top level must be an array. Elements that do not fit a listing are
/// skipped, so one bad record never costs the whole export.
pub fn parse_listings_json(data: &[u8]) -> Result<Vec<ScrapedListing>> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(data)?;
    let total = records.len();

    let listings: Vec<ScrapedListing> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::debug!("Skipping malformed listing #{}: {}", index, e);
                None
            }
        })
        .collect();

    log_skipped(total, listings.len());
    Ok(listings)
}

fn log_skipped(total: usize, kept: usize) {
    if kept < total {
        tracing::debug!("Skipped {} of {} malformed listings", total - kept, total);
    }
}

#[derive(Debug, Deserialize)]
struct CsvListingRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    sold: Option<bool>,
}

impl From<CsvListingRow> for ScrapedListing {
    fn from(row: CsvListingRow) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        ScrapedListing {
            title: row.title,
            price: non_empty(row.price).map(RawPrice::Text),
            condition: non_empty(row.condition),
            size: non_empty(row.size),
            brand: non_empty(row.brand),
            url: non_empty(row.url),
            sold: row.sold,
        }
    }
}

pub fn parse_listings_csv(data: &[u8]) -> Result<Vec<ScrapedListing>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut total = 0;
    let mut listings = Vec::new();
    for row in reader.deserialize::<CsvListingRow>() {
        total += 1;
        match row {
            Ok(row) => listings.push(row.into()),
            Err(e) => tracing::debug!("Skipping malformed CSV row: {}", e),
        }
    }

    log_skipped(total, listings.len());
    Ok(listings)
}
