//! Seed selection from the favorites collection

use crate::models::FavoriteRecord;

/// Titles of the first `seed_count` favorites that carry a usable title.
///
/// Stored order is kept and duplicates are allowed; records without any title field
/// are skipped and do not count towards the limit.
pub fn select_seeds(favorites: &[FavoriteRecord], seed_count: usize) -> Vec<String> {
    favorites
        .iter()
        .filter_map(FavoriteRecord::seed_title)
        .take(seed_count)
        .map(str::to_owned)
        .collect()
}
