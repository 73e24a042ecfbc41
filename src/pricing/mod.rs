//! Pricing for rentals and purchases

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{compute_price, PricingEngine};
pub use error::PricingError;
pub use types::{
    BillingCadence, BookingRequest, ListingPriceModel, PricingResult, RequestMode,
    TransactionMode,
};
