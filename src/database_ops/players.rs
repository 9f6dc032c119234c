use chrono::NaiveDate;
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::model::{Gender, Player, Players};
use crate::util::db::Db;

const ACTIVE_PLAYERS_SQL: &str = "\
SELECT id, last_name, first_name, gender, CAST(dob AS TEXT) AS dob, club, title, fed \
FROM players \
WHERE NOT deceased AND merged_into_id IS NULL";

/// All players that are neither deceased nor merged into another record.
pub async fn load_players(db: &Db) -> Result<Players> {
    let rows = sqlx::query(ACTIVE_PLAYERS_SQL)
        .fetch_all(&db.pool)
        .await
        .map_err(ExportError::query("players"))?;

    let mut players = Players::new();
    for row in rows {
        let decode = ExportError::query("players");
        let id: i64 = row.try_get("id").map_err(decode)?;
        let text = |col: &str| -> Result<Option<String>> {
            row.try_get::<Option<String>, _>(col)
                .map_err(ExportError::query("players"))
        };

        let dob = text("dob")?;
        let date_of_birth = parse_birth_date(dob.as_deref());
        if dob.is_some() && date_of_birth.is_none() {
            debug!(player_id = id, raw = ?dob, "ignoring malformed date of birth");
        }

        players.insert(
            id,
            Player {
                id,
                last_name: text("last_name")?.unwrap_or_default(),
                first_name: text("first_name")?.unwrap_or_default(),
                gender: Gender::from_db(text("gender")?.as_deref()),
                date_of_birth,
                club: non_blank(text("club")?),
                title: non_blank(text("title")?),
                federation: non_blank(text("fed")?),
            },
        );
    }
    info!(players = players.len(), "players loaded");
    Ok(players)
}

/// `YYYY-MM-DD` only; anything else counts as unknown.
pub fn parse_birth_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
