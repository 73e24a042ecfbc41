//! Booking and purchase checkout
//!
//! Loads the listing through a [`ListingRepository`], prices the request
//! with [`PricingEngine`] and stores the booking through a
//! [`BookingRepository`]. Whether the dates are actually free is left to the
//! backend.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{BookingRepository, ListingRepository};
use crate::models::{Booking, Listing, NewBooking};
use crate::pricing::{
    BookingRequest, ListingPriceModel, PricingEngine, PricingError, PricingResult, RequestMode,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("listing {0} does not exist")]
    ListingNotFound(String),

    #[error("listing {0} is not available")]
    ListingUnavailable(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Priced request for one listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub listing_id: String,
    pub title: String,
    pub mode: RequestMode,
    #[serde(flatten)]
    pub result: PricingResult,
}

/// What a renter submits from the booking form
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub renter_id: String,
    pub listing_id: String,
    pub request: BookingRequest,
    pub notes: Option<String>,
}

pub struct Checkout<L, B> {
    listings: L,
    bookings: B,
    engine: PricingEngine,
}

impl<L, B> Checkout<L, B>
where
    L: ListingRepository,
    B: BookingRepository,
{
    pub fn new(listings: L, bookings: B) -> Self {
        Self {
            listings,
            bookings,
            engine: PricingEngine::new(),
        }
    }

    async fn available_listing(&self, listing_id: &str) -> Result<Listing, CheckoutError> {
        let listing = self
            .listings
            .fetch_listing(listing_id)
            .await?
            .ok_or_else(|| CheckoutError::ListingNotFound(listing_id.to_string()))?;

        if !listing.available {
            return Err(CheckoutError::ListingUnavailable(listing_id.to_string()));
        }
        Ok(listing)
    }

    fn price(
        &self,
        listing: &Listing,
        request: &BookingRequest,
    ) -> Result<PricingResult, CheckoutError> {
        ListingPriceModel::from_listing(listing)
            .and_then(|model| self.engine.compute_price(&model, request))
            .map_err(|err| {
                warn!(listing = %listing.id, field = err.field(), "Pricing rejected: {}", err);
                CheckoutError::from(err)
            })
    }

    /// Price a request without booking anything
    #[instrument(skip(self, request), fields(mode = %request.mode))]
    pub async fn quote(
        &self,
        listing_id: &str,
        request: &BookingRequest,
    ) -> Result<Quote, CheckoutError> {
        let listing = self.available_listing(listing_id).await?;
        let result = self.price(&listing, request)?;

        Ok(Quote {
            listing_id: listing.id,
            title: listing.title,
            mode: request.mode,
            result,
        })
    }

    /// Price and store a booking. Purchases start on `today`; rentals keep
    /// the requested dates.
    #[instrument(
        skip(self, draft),
        fields(listing = %draft.listing_id, mode = %draft.request.mode)
    )]
    pub async fn submit(
        &self,
        draft: &BookingDraft,
        today: NaiveDate,
    ) -> Result<Booking, CheckoutError> {
        let listing = self.available_listing(&draft.listing_id).await?;
        let result = self.price(&listing, &draft.request)?;

        let (start_date, end_date) = match draft.request.mode {
            RequestMode::Rent => (
                draft.request.start.map_or(today, |start| start.date()),
                draft.request.end.map(|end| end.date()),
            ),
            RequestMode::Purchase => (today, None),
        };

        let notes = draft
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string);

        let booking = self
            .bookings
            .create_booking(NewBooking {
                listing_id: listing.id,
                renter_id: draft.renter_id.clone(),
                transaction_type: draft.request.mode.listing_type(),
                start_date,
                end_date,
                total_price: result.total_price,
                notes,
            })
            .await?;

        info!(
            "✅ Booking {} created for {} ({})",
            booking.id, booking.listing_id, booking.total_price
        );
        Ok(booking)
    }
}
