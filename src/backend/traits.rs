use crate::backend::types::ListingQuery;
use crate::models::{Booking, Favorite, Listing, NewBooking};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to marketplace listings
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Look up a single listing, available or not
    async fn fetch_listing(&self, id: &str) -> Result<Option<Listing>>;

    /// Available listings matching the query, in browse order
    async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>>;

    /// Every listing an owner has posted, newest first, unavailable ones included
    async fn listings_for_owner(&self, owner_id: &str) -> Result<Vec<Listing>>;
}

/// Booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking>;

    /// A renter's bookings, newest first
    async fn bookings_for_renter(&self, renter_id: &str) -> Result<Vec<Booking>>;
}

/// Saved listings per user
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn is_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool>;

    /// Flip the saved state and return the new one
    async fn toggle_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool>;

    /// A user's favorites, newest first
    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>>;
}

/// Everything the hosted backend provides
pub trait MarketplaceBackend: ListingRepository + BookingRepository + FavoriteRepository {
    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl<T: ListingRepository + ?Sized> ListingRepository for Arc<T> {
    async fn fetch_listing(&self, id: &str) -> Result<Option<Listing>> {
        (**self).fetch_listing(id).await
    }

    async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        (**self).search_listings(query).await
    }

    async fn listings_for_owner(&self, owner_id: &str) -> Result<Vec<Listing>> {
        (**self).listings_for_owner(owner_id).await
    }
}

#[async_trait]
impl<T: BookingRepository + ?Sized> BookingRepository for Arc<T> {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        (**self).create_booking(booking).await
    }

    async fn bookings_for_renter(&self, renter_id: &str) -> Result<Vec<Booking>> {
        (**self).bookings_for_renter(renter_id).await
    }
}

#[async_trait]
impl<T: FavoriteRepository + ?Sized> FavoriteRepository for Arc<T> {
    async fn is_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        (**self).is_favorite(user_id, listing_id).await
    }

    async fn toggle_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        (**self).toggle_favorite(user_id, listing_id).await
    }

    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>> {
        (**self).favorites_for_user(user_id).await
    }
}
