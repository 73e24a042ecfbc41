use crate::models::{Listing, ListingCategory, ParseEnumError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Browse ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingSort {
    /// Backend order (newest created first)
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Newest,
}

impl fmt::Display for ListingSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListingSort::Featured => "featured",
            ListingSort::PriceLow => "price-low",
            ListingSort::PriceHigh => "price-high",
            ListingSort::Newest => "newest",
        })
    }
}

impl FromStr for ListingSort {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "featured" => Ok(ListingSort::Featured),
            "price-low" => Ok(ListingSort::PriceLow),
            "price-high" => Ok(ListingSort::PriceHigh),
            "newest" => Ok(ListingSort::Newest),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// Browse filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Only this category, or all when unset
    pub category: Option<ListingCategory>,
    /// Case-insensitive match against title or location
    pub search: Option<String>,
    pub sort: ListingSort,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: ListingCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort: ListingSort) -> Self {
        self.sort = sort;
        self
    }

    /// Lowercased search term, if there is anything to search for
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Filter and order `listings` the way the browse page shows them.
    /// Unavailable listings are dropped; `Featured` keeps input order.
    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        let needle = self.needle();

        let mut results: Vec<Listing> = listings
            .iter()
            .filter(|listing| listing.available)
            .filter(|listing| self.category.map_or(true, |c| listing.category == c))
            .filter(|listing| match &needle {
                Some(needle) => {
                    listing.title.to_lowercase().contains(needle)
                        || listing.location.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();

        match self.sort {
            ListingSort::Featured => {}
            ListingSort::PriceLow => results.sort_by_key(Listing::display_price),
            ListingSort::PriceHigh => {
                results.sort_by(|a, b| b.display_price().cmp(&a.display_price()))
            }
            ListingSort::Newest => results.sort_by(|a, b| b.id.cmp(&a.id)),
        }

        results
    }
}
