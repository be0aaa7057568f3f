use crate::domain::model::ItemAttributes;
use crate::domain::ports::VisionAnalyzer;
use crate::utils::error::{PricerError, Result};
use async_trait::async_trait;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Stands in for the image model when the seller states the attributes
/// themselves. Still checks that the photo is something a listing could use.
#[derive(Debug, Clone)]
pub struct DeclaredAttributes {
    attributes: ItemAttributes,
}

impl DeclaredAttributes {
    pub fn new(attributes: ItemAttributes) -> Self {
        Self { attributes }
    }
}

#[async_trait]
impl VisionAnalyzer for DeclaredAttributes {
    async fn analyze_image(&self, image: &[u8]) -> Result<ItemAttributes> {
        if image.is_empty() {
            return Err(PricerError::ValidationError {
                message: "image is empty".to_string(),
            });
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(PricerError::ValidationError {
                message: format!(
                    "image is {} bytes, the limit is {} bytes",
                    image.len(),
                    MAX_IMAGE_BYTES
                ),
            });
        }
        if self.attributes.item_type.trim().is_empty() {
            return Err(PricerError::AnalysisUnavailable {
                message: "no item type was declared".to_string(),
            });
        }

        Ok(self.attributes.clone())
    }
}
