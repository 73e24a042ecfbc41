use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a CLI or backend string names no known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// What kind of item is listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Property,
    Vehicle,
    Equipment,
    Electronics,
    #[serde(other)]
    Other,
}

impl ListingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCategory::Property => "property",
            ListingCategory::Vehicle => "vehicle",
            ListingCategory::Equipment => "equipment",
            ListingCategory::Electronics => "electronics",
            ListingCategory::Other => "other",
        }
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "property" => Ok(ListingCategory::Property),
            "vehicle" => Ok(ListingCategory::Vehicle),
            "equipment" => Ok(ListingCategory::Equipment),
            "electronics" => Ok(ListingCategory::Electronics),
            _ => Err(ParseEnumError::new("category", s)),
        }
    }
}

/// Transactions a listing is offered for, as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Rent,
    Buy,
    Both,
}

/// Core listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: ListingCategory,
    pub sub_category: String,
    pub listing_type: ListingType,
    pub rent_price: Option<Decimal>,
    /// Raw billing unit ("hourly", "daily", ...); parsed when pricing
    pub rent_unit: Option<String>,
    pub buy_price: Option<Decimal>,
    pub location: String,
    pub condition: String,
    #[serde(default, deserialize_with = "features_from_json")]
    pub features: Vec<ListingFeature>,
    #[serde(default, deserialize_with = "images_from_json")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_delivery: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_insurance: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instant_booking: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Headline price shown when browsing: rent price, else buy price
    pub fn display_price(&self) -> Decimal {
        self.rent_price
            .or(self.buy_price)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Highlight shown on a listing card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFeature {
    #[serde(default)]
    pub icon: String,
    pub label: String,
}

/// Lifecycle of a booking row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Booking insert payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub listing_id: String,
    pub renter_id: String,
    pub transaction_type: ListingType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub total_price: Decimal,
    pub notes: Option<String>,
}

/// Stored booking row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub listing_id: String,
    pub renter_id: String,
    pub transaction_type: ListingType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub total_price: Decimal,
    #[serde(default)]
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A listing saved by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub listing_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `features` is a free-form JSON column: anything but an array reads as
/// empty, bare strings become labels and unreadable entries are skipped
fn features_from_json<'de, D>(deserializer: D) -> Result<Vec<ListingFeature>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = json_array(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            serde_json::Value::String(label) => Some(ListingFeature {
                icon: String::new(),
                label,
            }),
            other => serde_json::from_value(other).ok(),
        })
        .collect())
}

/// `images` is a JSON column of URLs; non-string entries are skipped
fn images_from_json<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = json_array(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            serde_json::Value::String(url) => Some(url),
            _ => None,
        })
        .collect())
}

fn json_array<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(entries) => Ok(entries),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn listing_row() -> serde_json::Value {
        json!({
            "id": "b7c1",
            "owner_id": "u-1",
            "title": "Canon EOS R6",
            "description": "Full frame body",
            "category": "electronics",
            "sub_category": "camera",
            "listing_type": "both",
            "rent_price": 35.5,
            "rent_unit": "daily",
            "buy_price": "1899.00",
            "location": "Austin, TX",
            "condition": "excellent",
            "features": null,
            "images": ["https://cdn.example.com/r6.jpg"],
            "has_delivery": true,
            "has_insurance": null,
            "instant_booking": false,
            "available": true,
            "views": 12,
            "created_at": "2024-05-02T10:15:00.123456+00:00",
            "updated_at": null
        })
    }

    #[test]
    fn test_listing_row_deserializes() {
        let listing: Listing = serde_json::from_value(listing_row()).unwrap();

        assert_eq!(listing.category, ListingCategory::Electronics);
        assert_eq!(listing.listing_type, ListingType::Both);
        assert_eq!(listing.rent_price, Some(dec!(35.5)));
        assert_eq!(listing.buy_price, Some(dec!(1899.00)));
        assert!(listing.features.is_empty());
        assert!(!listing.has_insurance);
        assert!(listing.available);
        assert!(listing.created_at.is_some());
    }

    #[test]
    fn test_object_features_deserialize() {
        let mut row = listing_row();
        row["features"] = json!([
            {"icon": "🚗", "label": "GPS"},
            "Bluetooth",
            {"unexpected": true},
            42
        ]);

        let listing: Listing = serde_json::from_value(row).unwrap();

        assert_eq!(
            listing.features,
            vec![
                ListingFeature {
                    icon: "🚗".to_string(),
                    label: "GPS".to_string(),
                },
                ListingFeature {
                    icon: String::new(),
                    label: "Bluetooth".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_non_array_json_columns_read_as_empty() {
        let mut row = listing_row();
        row["features"] = json!({"icon": "🚗", "label": "GPS"});
        row["images"] = json!("https://cdn.example.com/one.jpg");

        let listing: Listing = serde_json::from_value(row).unwrap();

        assert!(listing.features.is_empty());
        assert!(listing.images.is_empty());
    }

    #[test]
    fn test_unknown_category_maps_to_other() {
        let mut row = listing_row();
        row["category"] = json!("furniture");

        let listing: Listing = serde_json::from_value(row).unwrap();

        assert_eq!(listing.category, ListingCategory::Other);
    }

    #[test]
    fn test_display_price_falls_back_to_buy_price() {
        let mut row = listing_row();
        row["rent_price"] = json!(null);
        let listing: Listing = serde_json::from_value(row).unwrap();
        assert_eq!(listing.display_price(), dec!(1899));

        let mut row = listing_row();
        row["rent_price"] = json!(null);
        row["buy_price"] = json!(null);
        let listing: Listing = serde_json::from_value(row).unwrap();
        assert_eq!(listing.display_price(), Decimal::ZERO);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Vehicle".parse::<ListingCategory>(), Ok(ListingCategory::Vehicle));
        assert!("boats".parse::<ListingCategory>().is_err());
    }
}
