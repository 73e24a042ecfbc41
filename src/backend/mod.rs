pub mod memory;
pub mod supabase;
pub mod traits;
pub mod types;

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;
pub use traits::{BookingRepository, FavoriteRepository, ListingRepository, MarketplaceBackend};
pub use types::{ListingQuery, ListingSort};
