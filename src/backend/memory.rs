use crate::backend::traits::{
    BookingRepository, FavoriteRepository, ListingRepository, MarketplaceBackend,
};
use crate::backend::types::ListingQuery;
use crate::models::{
    Booking, BookingStatus, Favorite, Listing, ListingCategory, ListingType, NewBooking,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// In-process backend used offline and in tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    listings: RwLock<Vec<Listing>>,
    bookings: RwLock<Vec<Booking>>,
    favorites: RwLock<Vec<Favorite>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            ..Self::default()
        }
    }

    /// Backend seeded with a small catalog across all categories
    pub fn demo() -> Self {
        info!("📋 Seeding in-memory backend with demo listings");
        Self::with_listings(demo_listings())
    }

    pub async fn insert_listing(&self, listing: Listing) {
        self.listings.write().await.push(listing);
    }
}

#[async_trait]
impl ListingRepository for MemoryBackend {
    async fn fetch_listing(&self, id: &str) -> Result<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        // Stored oldest first; browse shows newest first
        let newest_first: Vec<Listing> = listings.iter().rev().cloned().collect();
        let results = query.apply(&newest_first);
        debug!("Memory search matched {} of {} listings", results.len(), listings.len());
        Ok(results)
    }

    async fn listings_for_owner(&self, owner_id: &str) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings
            .iter()
            .rev()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryBackend {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        if self.fetch_listing(&booking.listing_id).await?.is_none() {
            anyhow::bail!("Booking references unknown listing {}", booking.listing_id);
        }

        let stored = Booking {
            id: Uuid::new_v4().to_string(),
            listing_id: booking.listing_id,
            renter_id: booking.renter_id,
            transaction_type: booking.transaction_type,
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_price: booking.total_price,
            status: BookingStatus::Pending,
            notes: booking.notes,
            created_at: Some(Utc::now()),
        };

        self.bookings.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn bookings_for_renter(&self, renter_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .rev()
            .filter(|b| b.renter_id == renter_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FavoriteRepository for MemoryBackend {
    async fn is_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        let favorites = self.favorites.read().await;
        Ok(favorites
            .iter()
            .any(|f| f.user_id == user_id && f.listing_id == listing_id))
    }

    async fn toggle_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        let mut favorites = self.favorites.write().await;
        let before = favorites.len();
        favorites.retain(|f| !(f.user_id == user_id && f.listing_id == listing_id));

        if favorites.len() < before {
            return Ok(false);
        }

        favorites.push(Favorite {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            listing_id: listing_id.to_string(),
            created_at: Some(Utc::now()),
        });
        Ok(true)
    }

    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let favorites = self.favorites.read().await;
        Ok(favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl MarketplaceBackend for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Demo catalog, oldest listing first
pub fn demo_listings() -> Vec<Listing> {
    vec![
        demo_listing(DemoListing {
            id: "lst-001",
            title: "Sunny Loft Apartment",
            category: ListingCategory::Property,
            sub_category: "apartment",
            listing_type: ListingType::Both,
            rent_price: Some(Decimal::from(2400)),
            rent_unit: Some("monthly"),
            buy_price: Some(Decimal::from(385_000)),
            location: "Pearl District, Portland, OR",
            available: true,
            day: 1,
        }),
        demo_listing(DemoListing {
            id: "lst-002",
            title: "Tesla Model 3 Long Range",
            category: ListingCategory::Vehicle,
            sub_category: "car",
            listing_type: ListingType::Rent,
            rent_price: Some(Decimal::from(89)),
            rent_unit: Some("daily"),
            buy_price: None,
            location: "Seattle, WA",
            available: true,
            day: 2,
        }),
        demo_listing(DemoListing {
            id: "lst-003",
            title: "Mini Excavator 3.5t",
            category: ListingCategory::Equipment,
            sub_category: "construction",
            listing_type: ListingType::Rent,
            rent_price: Some(Decimal::from(650)),
            rent_unit: Some("weekly"),
            buy_price: None,
            location: "Gresham, Portland Metro, OR",
            available: true,
            day: 3,
        }),
        demo_listing(DemoListing {
            id: "lst-004",
            title: "Sony A7 IV Camera Kit",
            category: ListingCategory::Electronics,
            sub_category: "camera",
            listing_type: ListingType::Both,
            rent_price: Some(Decimal::from(12)),
            rent_unit: Some("hourly"),
            buy_price: Some(Decimal::from(2300)),
            location: "Denver, CO",
            available: true,
            day: 4,
        }),
        demo_listing(DemoListing {
            id: "lst-005",
            title: "MacBook Pro 16\" M3",
            category: ListingCategory::Electronics,
            sub_category: "laptop",
            listing_type: ListingType::Buy,
            rent_price: None,
            rent_unit: None,
            buy_price: Some(Decimal::from(2100)),
            location: "Austin, TX",
            available: true,
            day: 5,
        }),
        demo_listing(DemoListing {
            id: "lst-006",
            title: "Vintage Sailboat",
            category: ListingCategory::Vehicle,
            sub_category: "boat",
            listing_type: ListingType::Rent,
            rent_price: Some(Decimal::from(300)),
            rent_unit: Some("daily"),
            buy_price: None,
            location: "Portland, OR",
            available: false,
            day: 6,
        }),
    ]
}

struct DemoListing {
    id: &'static str,
    title: &'static str,
    category: ListingCategory,
    sub_category: &'static str,
    listing_type: ListingType,
    rent_price: Option<Decimal>,
    rent_unit: Option<&'static str>,
    buy_price: Option<Decimal>,
    location: &'static str,
    available: bool,
    day: u32,
}

fn demo_listing(seed: DemoListing) -> Listing {
    Listing {
        id: seed.id.to_string(),
        owner_id: "demo-owner".to_string(),
        title: seed.title.to_string(),
        description: format!("{} in {}.", seed.title, seed.location),
        category: seed.category,
        sub_category: seed.sub_category.to_string(),
        listing_type: seed.listing_type,
        rent_price: seed.rent_price,
        rent_unit: seed.rent_unit.map(str::to_string),
        buy_price: seed.buy_price,
        location: seed.location.to_string(),
        condition: "excellent".to_string(),
        features: vec![],
        images: vec![],
        has_delivery: false,
        has_insurance: true,
        instant_booking: seed.available,
        available: seed.available,
        created_at: Utc.with_ymd_and_hms(2024, 1, seed.day, 12, 0, 0).single(),
    }
}
