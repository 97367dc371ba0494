use crate::models::{Listing, Query, ScoredListing};

/// Whether a listing is the user's own current home
#[inline]
pub fn is_current_address(listing: &Listing, query: &Query) -> bool {
    listing.address == query.current_address
}

/// Whether `count` equals `desired` or `desired + 1`
#[inline]
fn within_upgrade_tolerance(count: f64, desired: u32) -> bool {
    let desired = f64::from(desired);
    count == desired || count == desired + 1.0
}

/// Bedroom and bathroom counts each match the request or exceed it by one
#[inline]
pub fn matches_room_tolerance(listing: &Listing, query: &Query) -> bool {
    within_upgrade_tolerance(listing.bed, query.bed)
        && within_upgrade_tolerance(listing.bath, query.bath)
}

/// Drop the query's own address and listings outside the room tolerance
///
/// Both predicates are independent of ordering, so the ranked order is preserved.
pub fn apply_result_filters(ranked: Vec<ScoredListing>, query: &Query) -> Vec<ScoredListing> {
    ranked
        .into_iter()
        .filter(|scored| !is_current_address(&scored.listing, query))
        .filter(|scored| matches_room_tolerance(&scored.listing, query))
        .collect()
}
