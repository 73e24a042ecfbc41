use crate::backend::traits::{
    BookingRepository, FavoriteRepository, ListingRepository, MarketplaceBackend,
};
use crate::backend::types::ListingQuery;
use crate::models::{Booking, Favorite, Listing, NewBooking};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const LISTINGS: &str = "listings";
const BOOKINGS: &str = "bookings";
const FAVORITES: &str = "favorites";

/// Hosted backend reached through its PostgREST REST surface
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseBackend {
    /// Create a client for the project at `base_url` using its API key
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rental-market/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to reach backend while {}", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Backend returned {} while {}: {}", status, what, body);
            anyhow::bail!("Backend returned {} while {}", status, what);
        }

        Ok(response)
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<Vec<T>> {
        let response = self.send(builder, what).await?;
        let rows = response
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("Failed to decode rows while {}", what))?;
        debug!("Received {} rows while {}", rows.len(), what);
        Ok(rows)
    }
}

/// Server-side filters for a browse query; search and sort run locally
pub fn listing_query_params(query: &ListingQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("available", "eq.true".to_string()),
        ("order", "created_at.desc".to_string()),
    ];
    if let Some(category) = query.category {
        params.push(("category", format!("eq.{}", category)));
    }
    params
}

/// An owner's listings regardless of availability
pub fn owner_listing_params(owner_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("owner_id", eq(owner_id)),
        ("order", "created_at.desc".to_string()),
    ]
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ListingRepository for SupabaseBackend {
    async fn fetch_listing(&self, id: &str) -> Result<Option<Listing>> {
        let builder = self
            .request(Method::GET, LISTINGS)
            .query(&[("select", "*".to_string()), ("id", eq(id))]);

        let mut rows: Vec<Listing> = self.rows(builder, "fetching a listing").await?;
        Ok(rows.pop())
    }

    async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let builder = self
            .request(Method::GET, LISTINGS)
            .query(&listing_query_params(query));

        let rows: Vec<Listing> = self.rows(builder, "searching listings").await?;
        let results = query.apply(&rows);
        info!("Found {} listings ({} before local filters)", results.len(), rows.len());
        Ok(results)
    }

    async fn listings_for_owner(&self, owner_id: &str) -> Result<Vec<Listing>> {
        let builder = self
            .request(Method::GET, LISTINGS)
            .query(&owner_listing_params(owner_id));

        self.rows(builder, "loading owner listings").await
    }
}

#[async_trait]
impl BookingRepository for SupabaseBackend {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        let builder = self
            .request(Method::POST, BOOKINGS)
            .header("Prefer", "return=representation")
            .json(&booking);

        let mut rows: Vec<Booking> = self.rows(builder, "creating a booking").await?;
        rows.pop().context("Backend did not return the created booking")
    }

    async fn bookings_for_renter(&self, renter_id: &str) -> Result<Vec<Booking>> {
        let builder = self.request(Method::GET, BOOKINGS).query(&[
            ("select", "*".to_string()),
            ("renter_id", eq(renter_id)),
            ("order", "created_at.desc".to_string()),
        ]);

        self.rows(builder, "loading bookings").await
    }
}

#[async_trait]
impl FavoriteRepository for SupabaseBackend {
    async fn is_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        let builder = self.request(Method::GET, FAVORITES).query(&[
            ("select", "id".to_string()),
            ("user_id", eq(user_id)),
            ("listing_id", eq(listing_id)),
        ]);

        let rows: Vec<serde_json::Value> = self.rows(builder, "checking a favorite").await?;
        Ok(!rows.is_empty())
    }

    async fn toggle_favorite(&self, user_id: &str, listing_id: &str) -> Result<bool> {
        if self.is_favorite(user_id, listing_id).await? {
            let builder = self
                .request(Method::DELETE, FAVORITES)
                .query(&[("user_id", eq(user_id)), ("listing_id", eq(listing_id))]);
            self.send(builder, "removing a favorite").await?;
            return Ok(false);
        }

        let builder = self
            .request(Method::POST, FAVORITES)
            .json(&json!({ "user_id": user_id, "listing_id": listing_id }));
        self.send(builder, "adding a favorite").await?;
        Ok(true)
    }

    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let builder = self.request(Method::GET, FAVORITES).query(&[
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", "created_at.desc".to_string()),
        ]);

        self.rows(builder, "loading favorites").await
    }
}

impl MarketplaceBackend for SupabaseBackend {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::ListingSort;
    use crate::models::ListingCategory;

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let backend =
            SupabaseBackend::new("https://demo.supabase.co/", "anon", Duration::from_secs(5))
                .unwrap();

        assert_eq!(
            backend.table_url(LISTINGS),
            "https://demo.supabase.co/rest/v1/listings"
        );
    }

    #[test]
    fn test_listing_query_params() {
        let query = ListingQuery::new()
            .with_category(ListingCategory::Equipment)
            .with_search("drill")
            .with_sort(ListingSort::PriceLow);

        let params = listing_query_params(&query);

        assert!(params.contains(&("available", "eq.true".to_string())));
        assert!(params.contains(&("category", "eq.equipment".to_string())));
        assert!(params.iter().all(|(key, _)| *key != "search"));
    }

    #[test]
    fn test_listing_query_params_without_category() {
        let params = listing_query_params(&ListingQuery::new());

        assert!(params.iter().all(|(key, _)| *key != "category"));
        assert!(params.contains(&("order", "created_at.desc".to_string())));
    }

    #[test]
    fn test_owner_listing_params_skip_availability() {
        let params = owner_listing_params("u-42");

        assert!(params.contains(&("owner_id", "eq.u-42".to_string())));
        assert!(params.contains(&("order", "created_at.desc".to_string())));
        assert!(params.iter().all(|(key, _)| *key != "available"));
    }
}
