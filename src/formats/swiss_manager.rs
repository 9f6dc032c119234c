//! Swiss Manager fixed-width player list (`.txt`, UTF-8).
//!
//! Every column is left-justified text, ratings included; the layout only
//! reads [`Column::width`]. Values are never cut, so an id or name wider than
//! its column pushes the rest of that line to the right.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use super::{
    birth_year, flag, padded_id, title_code, Column, ColumnKind, MissingRating, Row,
};
use crate::error::{ExportError, Result};
use crate::model::{sorted_players, Players, RatingMap};

/// Placeholder name of the rating column; its heading is the month label.
const RATING_COLUMN: &str = "RATING";

pub const COLUMNS: &[Column] = &[
    Column {
        name: "ID_NO",
        kind: ColumnKind::Character,
        width: 10,
        value: |row| padded_id(row.player.id),
    },
    Column {
        name: "NAME",
        kind: ColumnKind::Character,
        width: 34,
        value: |row| format!("{}, {}", row.player.last_name, row.player.first_name),
    },
    Column {
        name: "TIT",
        kind: ColumnKind::Character,
        width: 5,
        value: |row| title_code(row.player.title.as_deref()),
    },
    Column {
        name: "FED",
        kind: ColumnKind::Character,
        width: 5,
        value: |row| row.player.federation.clone().unwrap_or_default(),
    },
    Column {
        name: RATING_COLUMN,
        kind: ColumnKind::Character,
        width: 7,
        value: |row| MissingRating::Blank.render(row.rating),
    },
    Column {
        name: "GMS",
        kind: ColumnKind::Character,
        width: 5,
        value: |_| "0".to_string(),
    },
    Column {
        name: "B-DAY",
        kind: ColumnKind::Character,
        width: 6,
        value: |row| birth_year(row.player.date_of_birth),
    },
    Column {
        name: "FLAG",
        kind: ColumnKind::Character,
        width: 0,
        value: |row| flag(row.player.gender, row.player.club.as_deref()),
    },
];

/// Month/year heading of the rating column, e.g. `Sep11`.
pub fn month_label(as_of: NaiveDate) -> String {
    as_of.format("%b%y").to_string()
}

/// Write the Swiss Manager list and return the number of bytes written.
pub fn emit_fixedwidth(
    players: &Players,
    ratings: &RatingMap,
    label: &str,
    path: &Path,
) -> Result<u64> {
    let file = File::create(path).map_err(ExportError::output(path))?;
    let mut out = BufWriter::new(file);
    let written = write_list(&mut out, players, ratings, label)
        .and_then(|n| out.flush().map(|_| n))
        .map_err(ExportError::output(path))?;
    info!(
        path = %path.display(),
        bytes = written,
        records = players.len(),
        label,
        "swiss manager file written"
    );
    Ok(written)
}

pub fn write_list<W: Write>(
    out: &mut W,
    players: &Players,
    ratings: &RatingMap,
    label: &str,
) -> io::Result<u64> {
    let mut written = 0u64;

    let headings: Vec<String> = COLUMNS
        .iter()
        .map(|c| {
            if c.name == RATING_COLUMN {
                label.to_string()
            } else {
                c.name.to_string()
            }
        })
        .collect();
    let line = format_line(headings.iter().map(String::as_str));
    out.write_all(line.as_bytes())?;
    written += line.len() as u64;

    for player in sorted_players(players) {
        let row = Row::new(player, ratings);
        let values: Vec<String> = COLUMNS.iter().map(|c| (c.value)(&row)).collect();
        let line = format_line(values.iter().map(String::as_str));
        out.write_all(line.as_bytes())?;
        written += line.len() as u64;
    }
    Ok(written)
}

/// Lay values out against [`COLUMNS`]. Every column but the last is padded
/// to its width; a value that fills or overruns the width is kept whole and
/// followed by a single space.
fn format_line<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::new();
    let last = COLUMNS.len() - 1;
    for (idx, (column, value)) in COLUMNS.iter().zip(values).enumerate() {
        line.push_str(value);
        if idx == last {
            continue;
        }
        let used = value.chars().count();
        let pad = column.width.saturating_sub(used).max(1);
        line.extend(std::iter::repeat(' ').take(pad));
    }
    line.push('\n');
    line
}
