use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PricingError;
use crate::models::{Listing, ListingType, ParseEnumError};

/// How elapsed rental time turns into billable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCadence {
    Hourly,
    Daily,
    Weekly,
    /// Fixed 30-day months
    Monthly,
}

impl BillingCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCadence::Hourly => "hourly",
            BillingCadence::Daily => "daily",
            BillingCadence::Weekly => "weekly",
            BillingCadence::Monthly => "monthly",
        }
    }

    /// Billable units for a rental spanning `days` started days.
    /// Partial weeks and months are charged in full.
    pub fn units_for_days(&self, days: i64) -> i64 {
        match self {
            BillingCadence::Hourly => days * 24,
            BillingCadence::Daily => days,
            BillingCadence::Weekly => div_ceil(days, 7),
            BillingCadence::Monthly => div_ceil(days, 30),
        }
    }
}

fn div_ceil(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1) / divisor
}

impl fmt::Display for BillingCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCadence {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(BillingCadence::Hourly),
            "daily" => Ok(BillingCadence::Daily),
            "weekly" => Ok(BillingCadence::Weekly),
            "monthly" => Ok(BillingCadence::Monthly),
            _ => Err(ParseEnumError::new("billing cadence", s)),
        }
    }
}

/// Which transactions a listing accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    RentOnly,
    PurchaseOnly,
    RentOrPurchase,
}

impl TransactionMode {
    pub fn permits(&self, mode: RequestMode) -> bool {
        !matches!(
            (self, mode),
            (TransactionMode::RentOnly, RequestMode::Purchase)
                | (TransactionMode::PurchaseOnly, RequestMode::Rent)
        )
    }
}

impl From<ListingType> for TransactionMode {
    fn from(listing_type: ListingType) -> Self {
        match listing_type {
            ListingType::Rent => TransactionMode::RentOnly,
            ListingType::Buy => TransactionMode::PurchaseOnly,
            ListingType::Both => TransactionMode::RentOrPurchase,
        }
    }
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionMode::RentOnly => "rent only",
            TransactionMode::PurchaseOnly => "purchase only",
            TransactionMode::RentOrPurchase => "rent or purchase",
        })
    }
}

/// What the customer asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    Rent,
    Purchase,
}

impl RequestMode {
    /// Transaction type recorded on a booking row
    pub fn listing_type(&self) -> ListingType {
        match self {
            RequestMode::Rent => ListingType::Rent,
            RequestMode::Purchase => ListingType::Buy,
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestMode::Rent => "rent",
            RequestMode::Purchase => "purchase",
        })
    }
}

/// Pricing attributes of a single listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPriceModel {
    /// Price per billing unit
    pub unit_price: Decimal,
    pub billing_cadence: BillingCadence,
    /// Set only when the listing can be bought outright
    pub purchase_price: Option<Decimal>,
    pub transaction_mode: TransactionMode,
}

impl ListingPriceModel {
    pub fn new(
        unit_price: Decimal,
        billing_cadence: BillingCadence,
        purchase_price: Option<Decimal>,
        transaction_mode: TransactionMode,
    ) -> Result<Self, PricingError> {
        let model = Self {
            unit_price,
            billing_cadence,
            purchase_price,
            transaction_mode,
        };
        model.validate()?;
        Ok(model)
    }

    /// Build the price model for a backend listing row.
    ///
    /// A missing or unknown rent unit falls back to daily billing. A listing
    /// without a rent price cannot be rented: rent-only rows are rejected
    /// with `MissingRentPrice` and rent-or-buy rows become purchase only.
    pub fn from_listing(listing: &Listing) -> Result<Self, PricingError> {
        let billing_cadence = listing
            .rent_unit
            .as_deref()
            .and_then(|unit| unit.parse().ok())
            .unwrap_or(BillingCadence::Daily);

        let (unit_price, transaction_mode) = match (listing.listing_type, listing.rent_price) {
            (_, Some(price)) => (price, listing.listing_type.into()),
            (ListingType::Rent, None) => return Err(PricingError::MissingRentPrice),
            (ListingType::Both | ListingType::Buy, None) => {
                (Decimal::ZERO, TransactionMode::PurchaseOnly)
            }
        };

        Self::new(
            unit_price,
            billing_cadence,
            listing.buy_price,
            transaction_mode,
        )
    }

    /// Reject negative prices, including ones that arrived through serde
    pub fn validate(&self) -> Result<(), PricingError> {
        let purchase_negative = self
            .purchase_price
            .map_or(false, |price| price < Decimal::ZERO);

        if self.unit_price < Decimal::ZERO || purchase_negative {
            return Err(PricingError::NegativePrice);
        }
        Ok(())
    }
}

/// A requested transaction against one listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub mode: RequestMode,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl BookingRequest {
    /// Rent between two instants
    pub fn rent(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            mode: RequestMode::Rent,
            start: Some(start),
            end: Some(end),
        }
    }

    /// Rent between two calendar dates, each taken at midnight
    pub fn rent_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self::rent(start_of_day(start), start_of_day(end))
    }

    pub fn purchase() -> Self {
        Self {
            mode: RequestMode::Purchase,
            start: None,
            end: None,
        }
    }
}

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Outcome of a pricing computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub total_price: Decimal,
    /// Units charged under the listing's cadence, rentals only
    pub billable_units: Option<i64>,
    /// Started days covered by the rental, rentals only
    pub effective_duration_days: Option<i64>,
}
