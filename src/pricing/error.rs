use thiserror::Error;

use super::types::{RequestMode, TransactionMode};

/// Reasons a price cannot be computed for a request
///
/// Every variant is an input problem: the request does not fit the listing
/// or is not chronological. Nothing here is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("{requested} is not offered for this listing ({allowed})")]
    UnsupportedMode {
        requested: RequestMode,
        allowed: TransactionMode,
    },

    #[error("a rental needs both a start and an end date")]
    MissingDateRange,

    #[error("the end date must be after the start date")]
    InvalidDateRange,

    #[error("this listing has no purchase price")]
    MissingPurchasePrice,

    #[error("this listing is offered for rent but has no rent price")]
    MissingRentPrice,

    #[error("prices cannot be negative")]
    NegativePrice,

    #[error("the total price is too large to represent")]
    PriceOverflow,
}

impl PricingError {
    /// Name of the input a form should highlight for this error
    pub fn field(&self) -> &'static str {
        match self {
            PricingError::UnsupportedMode { .. } => "mode",
            PricingError::MissingDateRange | PricingError::InvalidDateRange => "dates",
            PricingError::MissingPurchasePrice => "purchase_price",
            PricingError::MissingRentPrice
            | PricingError::NegativePrice
            | PricingError::PriceOverflow => "price",
        }
    }
}
