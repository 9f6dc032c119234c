use chrono::{Datelike, NaiveDate};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{info, warn};

use crate::error::{ExportError, Result};
use crate::model::{RatingEntry, Variant};
use crate::util::db::Db;

/// Published lists before this date are ignored.
pub const DEFAULT_CUTOFF: &str = "2009-01-01";

const LIVE_SQL: &str = "\
SELECT r.player_id, r.new_rating, t.rating_order \
FROM results r \
JOIN tournaments t ON t.id = r.tournament_id \
WHERE t.stage = 'rated' AND r.new_rating IS NOT NULL \
ORDER BY t.rating_order IS NULL, t.rating_order DESC";

const LEGACY_SQL: &str = "\
SELECT player_id, rating \
FROM old_ratings \
WHERE rating IS NOT NULL";

fn published_sql(cutoff: NaiveDate) -> String {
    // `cutoff` is a parsed date, so its ISO form is safe to inline.
    format!(
        "SELECT player_id, rating, CAST(list AS TEXT) AS list \
         FROM ratings \
         WHERE rating IS NOT NULL AND list >= '{}' \
         ORDER BY list DESC",
        cutoff.format("%Y-%m-%d")
    )
}

/// Primary rating rows for `variant`, most recent list first.
pub async fn primary_ratings(
    db: &Db,
    variant: Variant,
    cutoff: NaiveDate,
) -> Result<Vec<RatingEntry>> {
    let entries = match variant {
        Variant::Published => {
            let rows = sqlx::query(&published_sql(cutoff))
                .fetch_all(&db.pool)
                .await
                .map_err(ExportError::query("published ratings"))?;
            let mut entries = Vec::with_capacity(rows.len());
            for row in &rows {
                let list: Option<String> = row
                    .try_get("list")
                    .map_err(ExportError::query("published ratings"))?;
                let Some(list_key) = list.as_deref().and_then(list_date_key) else {
                    warn!(list = ?list, "skipping rating row with unreadable list date");
                    continue;
                };
                let (player_id, rating) = id_and_rating(row, "rating", "published ratings")?;
                entries.push(RatingEntry::new(player_id, rating, list_key));
            }
            entries
        }
        Variant::Live => {
            let rows = sqlx::query(LIVE_SQL)
                .fetch_all(&db.pool)
                .await
                .map_err(ExportError::query("live ratings"))?;
            let mut entries = Vec::with_capacity(rows.len());
            for row in &rows {
                let (player_id, rating) = id_and_rating(row, "new_rating", "live ratings")?;
                let order: Option<i64> = row
                    .try_get("rating_order")
                    .map_err(ExportError::query("live ratings"))?;
                // Unordered tournaments rank below every ordered one.
                entries.push(RatingEntry::new(player_id, rating, order.unwrap_or(i64::MIN)));
            }
            entries
        }
    };
    info!(variant = %variant, rows = entries.len(), "primary ratings loaded");
    Ok(entries)
}

/// The legacy flat list; one row per player, no ordering.
pub async fn legacy_ratings(db: &Db) -> Result<Vec<RatingEntry>> {
    let rows = sqlx::query(LEGACY_SQL)
        .fetch_all(&db.pool)
        .await
        .map_err(ExportError::query("legacy ratings"))?;
    let entries = rows
        .iter()
        .map(|row| {
            id_and_rating(row, "rating", "legacy ratings")
                .map(|(player_id, rating)| RatingEntry::new(player_id, rating, 0))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(rows = entries.len(), "legacy ratings loaded");
    Ok(entries)
}

fn id_and_rating(row: &AnyRow, rating_col: &str, what: &'static str) -> Result<(i64, i32)> {
    let player_id: i64 = row.try_get("player_id").map_err(ExportError::query(what))?;
    let rating: i64 = row.try_get(rating_col).map_err(ExportError::query(what))?;
    let rating = i32::try_from(rating).map_err(|e| ExportError::Query {
        what,
        source: sqlx::Error::Decode(Box::new(e)),
    })?;
    Ok((player_id, rating))
}

/// Ordering key of a published list: days since the common era.
fn list_date_key(raw: &str) -> Option<i64> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| i64::from(d.num_days_from_ce()))
}
