//! Rating merge: primary list first, legacy list only fills the gaps.

use std::collections::hash_map::Entry;

use tracing::info;

use crate::model::{RatingEntry, RatingMap};

/// Merge a variant's primary rating rows with the legacy list.
///
/// Primary rows are stable-sorted by `list_key` descending and the first row
/// seen per player wins, so equal keys resolve to the row the source returned
/// first. Legacy rows only apply to players the primary pass left unmapped.
pub fn merge(mut primary: Vec<RatingEntry>, secondary: Vec<RatingEntry>) -> RatingMap {
    primary.sort_by(|a, b| b.list_key.cmp(&a.list_key));

    let mut ratings = RatingMap::new();
    keep_first_seen(&mut ratings, &primary);
    let initial = ratings.len();

    keep_first_seen(&mut ratings, &secondary);
    info!(
        initial_ratings = initial,
        augmented_ratings = ratings.len(),
        legacy_rows = secondary.len(),
        "ratings merged"
    );
    ratings
}

fn keep_first_seen(ratings: &mut RatingMap, rows: &[RatingEntry]) {
    for row in rows {
        if let Entry::Vacant(slot) = ratings.entry(row.player_id) {
            slot.insert(row.rating);
        }
    }
}
