//! # rental-market
//!
//! Pricing and checkout core for a rental marketplace where listings
//! (properties, vehicles, equipment, electronics) can be rented for a date
//! range or bought outright.
//!
//! Durable state lives in a hosted backend reached through the repository
//! traits in [`backend`]; prices come from the pure [`pricing`] engine.

pub mod backend;
pub mod checkout;
pub mod config;
pub mod models;
pub mod pricing;

pub use checkout::{BookingDraft, Checkout, CheckoutError, Quote};
pub use pricing::{compute_price, BookingRequest, ListingPriceModel, PricingError, PricingResult};
