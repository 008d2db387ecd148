mod resolver;
mod types;

pub use resolver::{ListingError, extract_links, fetch_listing, select_candidates};
pub use types::{Architecture, ListingEntry, MatchPolicy};
