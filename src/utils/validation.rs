use crate::utils::error::{PricerError, Result};
use std::collections::HashSet;

pub const MAX_TITLE_CHARS: usize = 60;
pub const MIN_TITLE_CHARS: usize = 5;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MIN_DESCRIPTION_CHARS: usize = 20;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_positive_amount(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive, finite number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    let extension = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed_set.contains(ext.as_str()) => Ok(()),
        Some(ext) => Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(PricerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

/// Marketplace limits: 5-60 characters with at least one letter.
pub fn validate_listing_title(title: &str) -> Result<()> {
    validate_listing_text("title", title, MIN_TITLE_CHARS, MAX_TITLE_CHARS)
}

pub fn validate_listing_description(description: &str) -> Result<()> {
    validate_listing_text(
        "description",
        description,
        MIN_DESCRIPTION_CHARS,
        MAX_DESCRIPTION_CHARS,
    )
}

fn validate_listing_text(field_name: &str, text: &str, min: usize, max: usize) -> Result<()> {
    let chars = text.chars().count();
    if chars < min || chars > max {
        return Err(PricerError::ValidationError {
            message: format!(
                "{} must be between {} and {} characters (got {})",
                field_name, min, max, chars
            ),
        });
    }
    if !text.chars().any(char::is_alphabetic) {
        return Err(PricerError::ValidationError {
            message: format!("{} must contain at least one letter", field_name),
        });
    }
    Ok(())
}

/// Cuts `text` to at most `max` characters, ending with an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("outliers.min_sample", 4, 1).is_ok());
        assert!(validate_positive_number("outliers.min_sample", 0, 1).is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("fallback.default_price", 15.0).is_ok());
        assert!(validate_positive_amount("fallback.default_price", 0.0).is_err());
        assert!(validate_positive_amount("fallback.default_price", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("image", "photo.JPG", &["jpg", "jpeg", "png"]).is_ok());
        assert!(validate_file_extension("image", "photo.gif", &["jpg", "jpeg", "png"]).is_err());
        assert!(validate_file_extension("image", "photo", &["jpg"]).is_err());
    }

    #[test]
    fn test_listing_text_limits() {
        assert!(validate_listing_title("Felpa Nike M").is_ok());
        assert!(validate_listing_title("Nike").is_err());
        assert!(validate_listing_title("12345678").is_err());
        assert!(validate_listing_description("short").is_err());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 60), "short");
        let long = "a".repeat(70);
        let cut = truncate_chars(&long, 60);
        assert_eq!(cut.chars().count(), 60);
        assert!(cut.ends_with("..."));
    }
}
