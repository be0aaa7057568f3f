use crate::domain::model::{CopyRequest, CopyStyle, ListingCopy};
use crate::domain::ports::CopyWriter;
use crate::utils::error::{PricerError, Result};
use crate::utils::validation::{
    truncate_chars, validate_listing_description, validate_listing_title, MAX_DESCRIPTION_CHARS,
    MAX_TITLE_CHARS,
};
use async_trait::async_trait;

/// Deterministic copy for when no language model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCopyWriter;

impl TemplateCopyWriter {
    pub fn new() -> Self {
        Self
    }

    fn title(request: &CopyRequest) -> String {
        let attrs = &request.attributes;
        let brand = attrs.brand.as_deref().unwrap_or_default();
        let color = attrs.color.as_deref().unwrap_or_default();

        let item_type = attrs.item_type.as_str();
        let size = request.size.as_str();

        let candidates = [
            join_words(&[brand, item_type, color, "-", "size", size]),
            join_words(&[brand, item_type, "size", size]),
            join_words(&[item_type, size]),
        ];

        // first template that fits, else the shortest one cut down
        candidates
            .iter()
            .find(|title| title.chars().count() <= MAX_TITLE_CHARS)
            .cloned()
            .unwrap_or_else(|| truncate_chars(&candidates[2], MAX_TITLE_CHARS))
    }

    fn description(request: &CopyRequest) -> String {
        let lines = match request.style {
            CopyStyle::Friendly => Self::friendly_lines(request),
            CopyStyle::Professional => Self::professional_lines(request),
            CopyStyle::Trendy => Self::trendy_lines(request),
        };
        truncate_chars(&lines.join("\n"), MAX_DESCRIPTION_CHARS)
    }

    fn friendly_lines(request: &CopyRequest) -> Vec<String> {
        let attrs = &request.attributes;
        let mut lines = vec![
            format!(
                "Hi! Selling this lovely {} {} in {} condition 😊",
                attrs.item_type.to_lowercase(),
                attrs.brand.as_deref().unwrap_or("unbranded"),
                request.condition
            ),
            String::new(),
            format!("📏 Size: {}", request.size),
        ];
        if let Some(color) = &attrs.color {
            lines.push(format!("🎨 Color: {}", color));
        }
        if let Some(material) = &attrs.material {
            lines.push(format!("🧵 Material: {}", material));
        }
        lines.push(String::new());
        lines.push(format!("💰 Price: {}€, bundle discounts welcome", request.price));
        lines.push("📦 Ships quickly and carefully packed".to_string());
        lines.push("💬 Message me for more photos or any question!".to_string());
        lines.push(String::new());
        lines.push(tags(request, &["secondhand", "sustainable"]));
        lines
    }

    fn professional_lines(request: &CopyRequest) -> Vec<String> {
        let attrs = &request.attributes;
        let brand = attrs.brand.as_deref().unwrap_or("Unbranded");
        let mut lines = vec![
            format!(
                "For sale: {} {} in {} condition.",
                brand,
                attrs.item_type.to_lowercase(),
                request.condition
            ),
            String::new(),
            "PRODUCT DETAILS:".to_string(),
            format!("• Brand: {}", brand),
            format!("• Type: {}", attrs.item_type),
            format!("• Size: {}", request.size),
        ];
        if let Some(color) = &attrs.color {
            lines.push(format!("• Color: {}", color));
        }
        if let Some(material) = &attrs.material {
            lines.push(format!("• Material: {}", material));
        }
        lines.push(format!("• Condition: {}", request.condition));
        lines.push(String::new());
        lines.push("TERMS OF SALE:".to_string());
        lines.push(format!("• Price: {}€", request.price));
        lines.push("• Shipping: tracked".to_string());
        lines.push("• Payment: through the platform only".to_string());
        lines.push(String::new());
        lines.push("Feel free to get in touch for further details or photos.".to_string());
        lines.push(String::new());
        lines.push(tags(request, &["preloved"]));
        lines
    }

    fn trendy_lines(request: &CopyRequest) -> Vec<String> {
        let attrs = &request.attributes;
        let mut lines = vec![
            "🔥 SUPER FIND 🔥".to_string(),
            String::new(),
            format!(
                "{} {} your closet can't miss! 💅",
                attrs.brand.as_deref().unwrap_or("This"),
                attrs.item_type
            ),
            String::new(),
            "✨ SPECS:".to_string(),
            format!("📐 Size: {}", request.size),
        ];
        if let Some(color) = &attrs.color {
            lines.push(format!("🌈 Color: {}", color));
        }
        if let Some(material) = &attrs.material {
            lines.push(format!("🔗 Material: {}", material));
        }
        lines.push(format!("💯 Condition: {}", request.condition));
        lines.push(String::new());
        lines.push(format!("💸 Price: {}€", request.price));
        lines.push("📲 DM me for more info!".to_string());
        lines.push(String::new());
        lines.push(tags(request, &["thrifted", "ootd", "preloved"]));
        lines
    }
}

/// Brand and type hashtags first, then the style's own.
fn tags(request: &CopyRequest, extra: &[&str]) -> String {
    let attrs = &request.attributes;
    [attrs.brand.as_deref(), Some(attrs.item_type.as_str())]
        .into_iter()
        .flatten()
        .chain(extra.iter().copied())
        .map(|tag| tag.to_lowercase().replace([' ', '-'], ""))
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_words(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl CopyWriter for TemplateCopyWriter {
    async fn generate_copy(&self, request: &CopyRequest) -> Result<ListingCopy> {
        let copy = ListingCopy {
            title: Self::title(request),
            description: Self::description(request),
        };

        validate_listing_title(&copy.title)
            .and_then(|_| validate_listing_description(&copy.description))
            .map_err(|e| PricerError::GenerationUnavailable {
                message: e.to_string(),
            })?;

        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Condition, ConditionGrade, ItemAttributes};

    fn request(brand: Option<&str>, item_type: &str) -> CopyRequest {
        CopyRequest {
            attributes: ItemAttributes {
                brand: brand.map(str::to_string),
                item_type: item_type.to_string(),
                color: Some("Grigio".to_string()),
                material: None,
                confidence: None,
            },
            size: "M".to_string(),
            condition: Condition::Known(ConditionGrade::LikeNew),
            price: 18.0,
            style: CopyStyle::default(),
        }
    }

    #[tokio::test]
    async fn test_generates_valid_copy() {
        let copy = TemplateCopyWriter::new()
            .generate_copy(&request(Some("Nike"), "Felpa"))
            .await
            .unwrap();

        assert_eq!(copy.title, "Nike Felpa Grigio - size M");
        assert!(copy.description.starts_with("Hi! Selling this lovely felpa Nike"));
        assert!(copy.description.contains("like-new"));
        assert!(copy.description.contains("Price: 18€"));
        assert!(copy.description.contains("#nike #felpa #secondhand"));
    }

    #[tokio::test]
    async fn test_professional_style() {
        let mut request = request(Some("Nike"), "Felpa");
        request.style = CopyStyle::Professional;

        let copy = TemplateCopyWriter::new().generate_copy(&request).await.unwrap();

        assert!(copy.description.starts_with("For sale: Nike felpa in like-new condition."));
        assert!(copy.description.contains("PRODUCT DETAILS:"));
        assert!(copy.description.contains("• Color: Grigio"));
        assert!(copy.description.contains("• Price: 18€"));
        assert!(copy.description.ends_with("#nike #felpa #preloved"));
        assert!(!copy.description.contains('🔥'));
    }

    #[tokio::test]
    async fn test_trendy_style() {
        let mut request = request(Some("Nike"), "Felpa");
        request.style = CopyStyle::Trendy;

        let copy = TemplateCopyWriter::new().generate_copy(&request).await.unwrap();

        assert!(copy.description.starts_with("🔥 SUPER FIND 🔥"));
        assert!(copy.description.contains("💯 Condition: like-new"));
        assert!(copy.description.contains("💸 Price: 18€"));
        assert!(copy.description.ends_with("#nike #felpa #thrifted #ootd #preloved"));
    }

    #[tokio::test]
    async fn test_styles_share_the_title() {
        let mut titles = Vec::new();
        for style in [CopyStyle::Friendly, CopyStyle::Professional, CopyStyle::Trendy] {
            let mut request = request(None, "Jeans");
            request.style = style;
            let copy = TemplateCopyWriter::new().generate_copy(&request).await.unwrap();
            assert!(copy.description.contains("Size: M"));
            titles.push(copy.title);
        }
        assert!(titles.iter().all(|title| title == "Jeans Grigio - size M"));
    }

    #[tokio::test]
    async fn test_long_brand_falls_back_to_shorter_title() {
        let brand = "A Very Long Designer Brand Name That Goes On And On";
        let copy = TemplateCopyWriter::new()
            .generate_copy(&request(Some(brand), "Giacca"))
            .await
            .unwrap();

        assert!(copy.title.chars().count() <= MAX_TITLE_CHARS);
        assert_eq!(copy.title, "Giacca M");
    }
}
