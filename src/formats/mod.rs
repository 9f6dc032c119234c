//! Legacy tournament-software record layouts.
//!
//! Both emitters describe their records with a [`Column`] table and walk the
//! players in [`sorted_players`](crate::model::sorted_players) order. The
//! helpers here hold the per-field transformation rules they share.

pub mod swiss_manager;
pub mod swiss_perfect;

use chrono::{Datelike, NaiveDate};

use crate::model::{Gender, Player, RatingMap};

/// One player as seen by a record layout.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub player: &'a Player,
    pub rating: Option<i32>,
}

impl<'a> Row<'a> {
    pub fn new(player: &'a Player, ratings: &RatingMap) -> Self {
        Self {
            player,
            rating: ratings.get(&player.id).copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Left-justified, space-padded text.
    Character,
    /// Right-justified, space-padded digits.
    Numeric,
}

/// Field descriptor shared by both layouts.
#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub width: usize,
    pub value: fn(&Row<'_>) -> String,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("width", &self.width)
            .finish()
    }
}

/// What a layout writes for a player with no rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRating {
    Zero,
    Blank,
}

impl MissingRating {
    pub fn render(self, rating: Option<i32>) -> String {
        match (rating, self) {
            (Some(r), _) => r.to_string(),
            (None, MissingRating::Zero) => "0".to_string(),
            (None, MissingRating::Blank) => String::new(),
        }
    }
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// `DD-MM-YYYY`, or empty when the date is unknown.
pub fn day_month_year(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

/// Four-digit year of birth, or empty.
pub fn birth_year(date: Option<NaiveDate>) -> String {
    date.map(|d| format!("{:04}", d.year())).unwrap_or_default()
}

/// Ids shorter than four digits are zero-padded (7 -> "0007").
pub fn padded_id(id: i64) -> String {
    format!("{id:04}")
}

fn base_title_code(title: &str) -> &'static str {
    match title {
        "GM" => "g",
        "IM" => "i",
        "FM" => "f",
        "CM" => "c",
        _ => "",
    }
}

/// Single-letter title code; a leading `W` marks a woman's title.
pub fn title_code(title: Option<&str>) -> String {
    let Some(title) = title.map(str::trim) else {
        return String::new();
    };
    match title.strip_prefix('W') {
        Some(base) => match base_title_code(base) {
            "" => String::new(),
            code => format!("w{code}"),
        },
        None => base_title_code(title).to_string(),
    }
}

/// Flag column: `w` for women, with the club folded in front of it.
///
/// `W`/`w` inside the club are rewritten to `U`/`u` so the club can never be
/// read as the gender marker.
pub fn flag(gender: Gender, club: Option<&str>) -> String {
    let gender_flag = if gender == Gender::Female { "w" } else { "" };
    let club = club.map(str::trim).filter(|c| !c.is_empty());
    match club {
        None => gender_flag.to_string(),
        Some(club) => {
            let club: String = club
                .chars()
                .map(|c| match c {
                    'W' => 'U',
                    'w' => 'u',
                    other => other,
                })
                .collect();
            if gender_flag.is_empty() {
                club
            } else {
                format!("{club} {gender_flag}")
            }
        }
    }
}
