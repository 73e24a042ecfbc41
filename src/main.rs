use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use rental_market::backend::{
    FavoriteRepository, ListingQuery, ListingRepository, ListingSort, MarketplaceBackend,
    MemoryBackend, SupabaseBackend,
};
use rental_market::config::AppConfig;
use rental_market::models::ListingCategory;
use rental_market::pricing::{BookingRequest, RequestMode};
use rental_market::{BookingDraft, Checkout};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rental-market", version, about = "Rental marketplace pricing and checkout")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a rental or purchase without booking it
    Quote {
        listing: String,
        #[command(flatten)]
        window: Window,
    },
    /// Price and store a booking
    Book {
        listing: String,
        #[arg(long)]
        renter: String,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        window: Window,
    },
    /// List available listings
    Browse {
        #[arg(long)]
        category: Option<ListingCategory>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "featured")]
        sort: ListingSort,
    },
    /// Save or unsave a listing for a user
    Favorite {
        listing: String,
        #[arg(long)]
        user: String,
    },
}

#[derive(Args)]
struct Window {
    /// First day of the rental (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Day the rental ends (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Buy outright instead of renting
    #[arg(long, conflicts_with_all = ["start", "end"])]
    purchase: bool,
}

impl Window {
    fn request(&self) -> BookingRequest {
        if self.purchase {
            return BookingRequest::purchase();
        }
        match (self.start, self.end) {
            (Some(start), Some(end)) => BookingRequest::rent_dates(start, end),
            // Let the engine report the missing half of the range
            _ => BookingRequest {
                mode: RequestMode::Rent,
                start: self.start.map(|d| d.and_time(Default::default())),
                end: self.end.map(|d| d.and_time(Default::default())),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let backend: Arc<dyn MarketplaceBackend> = match &config.backend {
        Some(settings) => Arc::new(SupabaseBackend::new(
            &settings.url,
            &settings.api_key,
            config.http_timeout,
        )?),
        None => Arc::new(MemoryBackend::demo()),
    };
    info!("🏠 Rental Market ({} backend)", backend.backend_name());

    let checkout = Checkout::new(backend.clone(), backend.clone());

    match cli.command {
        Command::Quote { listing, window } => {
            let quote = checkout.quote(&listing, &window.request()).await?;

            println!("{} ({})", quote.title, quote.listing_id);
            if let (Some(units), Some(days)) =
                (quote.result.billable_units, quote.result.effective_duration_days)
            {
                println!("   {} days, {} billable units", days, units);
            }
            println!("   Total: {}", quote.result.total_price);

            save_json(&config.output_path, &quote).await?;
        }
        Command::Book {
            listing,
            renter,
            notes,
            window,
        } => {
            let draft = BookingDraft {
                renter_id: renter,
                listing_id: listing,
                request: window.request(),
                notes,
            };
            let booking = checkout.submit(&draft, Utc::now().date_naive()).await?;

            println!("Booking {} ({:?})", booking.id, booking.status);
            println!("   Listing: {}", booking.listing_id);
            println!("   Total: {}", booking.total_price);

            save_json(&config.output_path, &booking).await?;
        }
        Command::Browse {
            category,
            search,
            sort,
        } => {
            let query = ListingQuery {
                category,
                search,
                sort,
            };
            let listings = backend.search_listings(&query).await?;
            info!("✅ Found {} listings", listings.len());

            for (i, listing) in listings.iter().enumerate() {
                println!("{}. {} ({})", i + 1, listing.title, listing.display_price());
                println!("   {} / {}", listing.category, listing.sub_category);
                println!("   Location: {}", listing.location);
                println!("   ID: {}", listing.id);
                println!();
            }

            save_json(&config.output_path, &listings).await?;
        }
        Command::Favorite { listing, user } => {
            let saved = backend.toggle_favorite(&user, &listing).await?;
            if saved {
                println!("Added {} to favorites", listing);
            } else {
                println!("Removed {} from favorites", listing);
            }
        }
    }

    Ok(())
}

async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved result to {}", path.display());
    Ok(())
}
