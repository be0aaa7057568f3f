//! Untrusted marketplace text to structured values: prices, condition grades,
//! size tokens and relevance keywords. Every mapping is a fixed table with an
//! explicit fallback; nothing here guesses.

use crate::domain::model::{is_plausible_price, Condition, ConditionGrade, RawPrice, SizeToken};
use deunicode::deunicode;
use regex::Regex;

lazy_static::lazy_static! {
    static ref CURRENCY_RE: Regex = Regex::new(r"(?i)(€|\$|£|euros?|eur|usd|gbp|chf)").unwrap();
    static ref AMOUNT_RE: Regex = Regex::new(r"^\d[\d.,]*$").unwrap();
    static ref SIZE_PREFIX_RE: Regex = Regex::new(r"^(taglia|tg\.?|size|sz)\s*:?\s*").unwrap();
    static ref NUMERIC_SIZE_RE: Regex =
        Regex::new(r"^(?:(eu|it|fr|uk|us)\s*)?(\d{1,2}(?:[.,]5)?)$").unwrap();
}

const CONDITION_LABELS: &[(&str, ConditionGrade)] = &[
    ("new", ConditionGrade::New),
    ("brand new", ConditionGrade::New),
    ("new with tags", ConditionGrade::New),
    ("brand new with tags", ConditionGrade::New),
    ("nwt", ConditionGrade::New),
    ("nuovo", ConditionGrade::New),
    ("nuovo con etichetta", ConditionGrade::New),
    ("nuovo con cartellino", ConditionGrade::New),
    ("like new", ConditionGrade::LikeNew),
    ("new without tags", ConditionGrade::LikeNew),
    ("brand new without tags", ConditionGrade::LikeNew),
    ("very good", ConditionGrade::LikeNew),
    ("excellent", ConditionGrade::LikeNew),
    ("mint", ConditionGrade::LikeNew),
    ("ottimo", ConditionGrade::LikeNew),
    ("come nuovo", ConditionGrade::LikeNew),
    ("nuovo senza etichetta", ConditionGrade::LikeNew),
    ("good", ConditionGrade::Good),
    ("used good", ConditionGrade::Good),
    ("buono", ConditionGrade::Good),
    ("fair", ConditionGrade::Fair),
    ("satisfactory", ConditionGrade::Fair),
    ("acceptable", ConditionGrade::Fair),
    ("discreto", ConditionGrade::Fair),
    ("poor", ConditionGrade::Poor),
    ("worn", ConditionGrade::Poor),
    ("damaged", ConditionGrade::Poor),
    ("heavily used", ConditionGrade::Poor),
    ("rovinato", ConditionGrade::Poor),
];

const LETTER_SIZES: &[(&str, &str)] = &[
    ("xxs", "XXS"),
    ("xs", "XS"),
    ("extra small", "XS"),
    ("s", "S"),
    ("small", "S"),
    ("m", "M"),
    ("medium", "M"),
    ("l", "L"),
    ("large", "L"),
    ("xl", "XL"),
    ("extra large", "XL"),
    ("xxl", "XXL"),
    ("2xl", "XXL"),
    ("extra extra large", "XXL"),
    ("xxxl", "XXXL"),
    ("3xl", "XXXL"),
    ("unica", "ONE SIZE"),
    ("taglia unica", "ONE SIZE"),
    ("one size", "ONE SIZE"),
    ("os", "ONE SIZE"),
    ("tu", "ONE SIZE"),
];

const BRAND_ALIASES: &[(&str, &[&str])] = &[
    ("nike", &["nike", "just do it"]),
    ("adidas", &["adidas", "three stripes"]),
    ("zara", &["zara", "zara man", "zara woman"]),
    ("h&m", &["h&m", "hm", "hennes mauritz"]),
    ("uniqlo", &["uniqlo", "uniqlo u"]),
];

const ITEM_TYPE_ALIASES: &[(&str, &[&str])] = &[
    ("felpa", &["felpa", "hoodie", "sweatshirt", "pullover"]),
    ("t-shirt", &["t-shirt", "tshirt", "maglietta", "maglia"]),
    ("jeans", &["jeans", "denim", "pantaloni"]),
    ("scarpe", &["scarpe", "scarpa", "sneakers", "shoes"]),
    ("giacca", &["giacca", "giacche", "giaccone", "giubbotto", "jacket"]),
    ("camicia", &["camicia", "shirt", "button down"]),
];

/// Lowercase, accents folded to ASCII, whitespace collapsed.
pub fn fold(text: &str) -> String {
    deunicode(text)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_price(raw: &RawPrice) -> Option<f64> {
    let value = match raw {
        RawPrice::Number(value) => *value,
        RawPrice::Text(text) => parse_price_text(text)?,
        RawPrice::Amount { amount, .. } => parse_price(amount)?,
    };
    is_plausible_price(value).then_some(value)
}

/// Reads amounts like `12,50€`, `€ 1.234,56`, `1,234.56 USD` or `14 EUR`.
/// Ranges, negatives and anything with leftover text yield `None`.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let without_currency = CURRENCY_RE.replace_all(text, "");
    let compact: String = without_currency
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();
    let compact = compact.trim_end_matches(['.', ',']);
    if !AMOUNT_RE.is_match(compact) {
        return None;
    }

    let mark = decimal_mark(compact)?;
    let normalized: String = compact
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == mark => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect();

    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// `Some(None)` means the amount has no decimal part; outer `None` rejects it.
fn decimal_mark(amount: &str) -> Option<Option<char>> {
    let last_dot = amount.rfind('.');
    let last_comma = amount.rfind(',');
    let mark = match (last_dot, last_comma) {
        (None, None) => return Some(None),
        (Some(dot), Some(comma)) => {
            let mark = if dot > comma { '.' } else { ',' };
            if amount.matches(mark).count() > 1 {
                return None;
            }
            return Some(Some(mark));
        }
        (Some(_), None) => '.',
        (None, Some(_)) => ',',
    };

    if amount.matches(mark).count() > 1 {
        // 1.234.567
        return Some(None);
    }
    let digits_after = amount.len() - amount.rfind(mark)? - 1;
    if digits_after == 3 {
        Some(None)
    } else {
        Some(Some(mark))
    }
}

pub fn map_condition(label: &str) -> Condition {
    let key = fold(&label.replace(['_', '-'], " "));
    CONDITION_LABELS
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, grade)| Condition::Known(*grade))
        .unwrap_or(Condition::Unknown)
}

pub fn normalize_size(size: &str) -> SizeToken {
    let folded = fold(size);
    let stripped = SIZE_PREFIX_RE.replace(&folded, "");
    let key = stripped.trim();
    if key.is_empty() {
        return SizeToken::Unknown;
    }

    if let Some((_, token)) = LETTER_SIZES.iter().find(|(alias, _)| *alias == key) {
        return SizeToken::Known(token.to_string());
    }

    match NUMERIC_SIZE_RE.captures(key) {
        Some(caps) => {
            let region = caps
                .get(1)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_else(|| "EU".to_string());
            let number = caps[2].replace(',', ".");
            SizeToken::Known(format!("{} {}", region, number))
        }
        None => SizeToken::Unknown,
    }
}

/// Maps a brand or type to its canonical name when a known alias occurs in it.
fn canonical<'a>(value: &str, table: &'a [(&'a str, &'a [&'a str])]) -> Option<(&'a str, &'a [&'a str])> {
    table
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| value.contains(*alias)))
        .copied()
}

pub fn canonical_item_type(item_type: &str) -> String {
    let folded = fold(item_type);
    canonical(&folded, ITEM_TYPE_ALIASES)
        .map(|(name, _)| name.to_string())
        .unwrap_or(folded)
}

/// Keywords a relevant title must contain at least one of.
pub fn relevance_tokens(brand: Option<&str>, item_type: Option<&str>) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut push = |token: &str| {
        if !token.is_empty() && !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    };

    for (value, table) in [(brand, BRAND_ALIASES), (item_type, ITEM_TYPE_ALIASES)] {
        let Some(value) = value else { continue };
        let folded = fold(value);
        if folded.is_empty() {
            continue;
        }

        let words: Vec<&str> = folded.split(' ').filter(|w| w.chars().count() >= 2).collect();
        if words.is_empty() {
            push(&folded);
        }
        for word in words {
            push(word);
        }
        if let Some((_, aliases)) = canonical(&folded, table) {
            for alias in aliases {
                push(alias);
            }
        }
    }

    tokens
}

pub fn title_matches(title: &str, tokens: &[String]) -> bool {
    let folded = fold(title);
    tokens.iter().any(|token| folded.contains(token.as_str()))
}
