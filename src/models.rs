// Domain data structures: vehicle records and filter criteria.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One image attached to a vehicle listing. The store holds either a plain
/// URL string or a structured descriptor with an inline base64 fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleImage {
    pub url: Option<String>,
    pub base64: Option<String>,
}

impl VehicleImage {
    pub fn from_url(url: impl Into<String>) -> Self {
        VehicleImage {
            url: Some(url.into()),
            base64: None,
        }
    }

    /// Displayable source for this image: url, then inline data, then a
    /// placeholder so a broken image never propagates to the list.
    pub fn display_url(&self) -> &str {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.base64.as_deref().filter(|b| !b.is_empty()))
            .unwrap_or("/static/placeholder.svg")
    }
}

/// One car listing, converted from its raw store document at fetch time and
/// immutable for the rest of the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// First whitespace token of the title.
    pub brand: String,
    /// Second and third tokens of the title.
    pub model: String,
    /// String-encoded currency; empty/zero/non-numeric means "price on request".
    pub price: String,
    pub year: Option<u32>,
    pub km: u32,
    pub category: Option<String>,
    pub color: Option<String>,
    pub is_shielding: bool,
    pub is_zero_km: bool,
    pub is_consignment: bool,
    pub is_semi_new: bool,
    pub in_preparation: bool,
    pub in_transit: bool,
    pub active: bool,
    pub featured: bool,
    pub images: Vec<VehicleImage>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VehicleRecord {
    /// Created within the last 24 hours relative to `now`.
    pub fn is_recently_added(&self, now: DateTime<Utc>) -> bool {
        match self.created_at {
            Some(created) => (now - created).abs() <= Duration::hours(24),
            None => false,
        }
    }

    /// Numeric price for range filtering. Unparsable prices collapse to 0
    /// rather than excluding the record.
    pub fn price_value(&self) -> f64 {
        parse_price(&self.price)
    }
}

/// Parses a string-encoded currency value. Strips everything except digits
/// and separators, tolerates comma decimals ("50.000,00"), defaults to 0.0.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    // Locale-formatted values use '.' for thousands and ',' for the decimal
    // mark; plain values use '.' as the decimal mark.
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse::<f64>().unwrap_or(0.0)
}

/// Formats a price for display. Empty, zero or garbage input renders as
/// "Consulte" (price on request); otherwise pt-BR currency grouping.
pub fn format_price(raw: &str) -> String {
    let value = parse_price(raw);
    if value <= 0.0 {
        return "Consulte".to_string();
    }
    let whole = value.round() as i64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("R$ {}", grouped)
}

/// Splits a listing title into (brand, model): first token is the brand,
/// the next two tokens are the model.
pub fn split_title(title: &str) -> (String, String) {
    let parts: Vec<&str> = title.split_whitespace().collect();
    let brand = parts.first().copied().unwrap_or("").to_string();
    let model = parts
        .iter()
        .skip(1)
        .take(2)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    (brand, model)
}

/// The mutually exclusive quick-filter shortcuts. Selecting one clears the
/// others at the point of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickTag {
    ShowAll,
    ZeroKm,
    Consignment,
    SemiNew,
    Favorites,
}

/// The user's current search/filter intent. Replaced wholesale on every
/// interaction, held in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_term: String,
    /// Exact-match year as entered ("2023").
    pub year: String,
    /// Inclusive price interval.
    pub price_range: [f64; 2],
    pub fuel_type: String,
    pub transmission: String,
    pub category: String,
    /// None = don't care, Some(flag) = required value.
    pub is_shielding: Option<bool>,
    pub is_zero_km: bool,
    pub is_consignment: bool,
    pub is_semi_new: bool,
    pub show_all: bool,
    pub show_favorites: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            search_term: String::new(),
            year: String::new(),
            price_range: [0.0, 1_000_000.0],
            fuel_type: String::new(),
            transmission: String::new(),
            category: String::new(),
            is_shielding: None,
            is_zero_km: false,
            is_consignment: false,
            is_semi_new: false,
            show_all: true,
            show_favorites: false,
        }
    }
}

impl FilterCriteria {
    /// Applies a quick tag, enforcing the exclusivity invariant: exactly one
    /// of show_all / show_favorites / the three tag booleans is set.
    pub fn with_quick_tag(mut self, tag: QuickTag) -> Self {
        self.is_zero_km = tag == QuickTag::ZeroKm;
        self.is_consignment = tag == QuickTag::Consignment;
        self.is_semi_new = tag == QuickTag::SemiNew;
        self.show_favorites = tag == QuickTag::Favorites;
        self.show_all = tag == QuickTag::ShowAll;
        self
    }

    pub fn active_quick_tag(&self) -> QuickTag {
        if self.show_favorites {
            QuickTag::Favorites
        } else if self.is_zero_km {
            QuickTag::ZeroKm
        } else if self.is_consignment {
            QuickTag::Consignment
        } else if self.is_semi_new {
            QuickTag::SemiNew
        } else {
            QuickTag::ShowAll
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_handles_plain_and_locale_formats() {
        assert_eq!(parse_price("50000"), 50000.0);
        assert_eq!(parse_price("R$ 50.000,00"), 50000.0);
        assert_eq!(parse_price("129900.50"), 129900.5);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("Consulte o vendedor"), 0.0);
    }

    #[test]
    fn format_price_renders_consulte_for_missing_values() {
        assert_eq!(format_price(""), "Consulte");
        assert_eq!(format_price("0"), "Consulte");
        assert_eq!(format_price("abc"), "Consulte");
        assert_eq!(format_price("50000"), "R$ 50.000");
        assert_eq!(format_price("1250000"), "R$ 1.250.000");
    }

    #[test]
    fn split_title_takes_brand_and_two_model_tokens() {
        let (brand, model) = split_title("Toyota Corolla Cross XRE 2023");
        assert_eq!(brand, "Toyota");
        assert_eq!(model, "Corolla Cross");

        let (brand, model) = split_title("BMW");
        assert_eq!(brand, "BMW");
        assert_eq!(model, "");

        let (brand, model) = split_title("");
        assert_eq!(brand, "");
        assert_eq!(model, "");
    }

    #[test]
    fn recently_added_uses_24_hour_cutoff() {
        let now = Utc::now();
        let mut car = VehicleRecord::default();
        assert!(!car.is_recently_added(now));

        car.created_at = Some(now - Duration::hours(3));
        assert!(car.is_recently_added(now));

        car.created_at = Some(now - Duration::hours(25));
        assert!(!car.is_recently_added(now));
    }

    #[test]
    fn quick_tags_are_mutually_exclusive() {
        let criteria = FilterCriteria::default().with_quick_tag(QuickTag::ZeroKm);
        assert!(criteria.is_zero_km);
        assert!(!criteria.show_all);
        assert!(!criteria.is_consignment);
        assert!(!criteria.is_semi_new);
        assert!(!criteria.show_favorites);

        let criteria = criteria.with_quick_tag(QuickTag::Favorites);
        assert!(criteria.show_favorites);
        assert!(!criteria.is_zero_km);
        assert!(!criteria.show_all);

        let criteria = criteria.with_quick_tag(QuickTag::ShowAll);
        assert_eq!(criteria.active_quick_tag(), QuickTag::ShowAll);
    }

    #[test]
    fn image_display_url_falls_back_in_order() {
        let img = VehicleImage::from_url("https://cdn.example.com/a.jpg");
        assert_eq!(img.display_url(), "https://cdn.example.com/a.jpg");

        let img = VehicleImage {
            url: None,
            base64: Some("data:image/jpeg;base64,abc".to_string()),
        };
        assert_eq!(img.display_url(), "data:image/jpeg;base64,abc");

        let img = VehicleImage::default();
        assert_eq!(img.display_url(), "/static/placeholder.svg");
    }
}
