use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Lenient parse of the stored gender column; anything but M/F is unknown.
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(g) if g.eq_ignore_ascii_case("m") => Gender::Male,
            Some(g) if g.eq_ignore_ascii_case("f") => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Unknown => "",
        }
    }
}

/// Snapshot of one active player for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub club: Option<String>,
    pub title: Option<String>,
    pub federation: Option<String>,
}

/// Active players keyed by id.
pub type Players = BTreeMap<i64, Player>;

/// One merged rating per player id.
pub type RatingMap = HashMap<i64, i32>;

/// A single historical rating row. Higher `list_key` means more recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingEntry {
    pub player_id: i64,
    pub rating: i32,
    pub list_key: i64,
}

impl RatingEntry {
    pub fn new(player_id: i64, rating: i32, list_key: i64) -> Self {
        Self {
            player_id,
            rating,
            list_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Published,
    Live,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Published, Variant::Live];

    /// Short name used in output file names.
    pub fn short_name(self) -> &'static str {
        match self {
            Variant::Published => "pub",
            Variant::Live => "live",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Published => "published",
            Variant::Live => "live",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pub" | "published" => Ok(Variant::Published),
            "live" => Ok(Variant::Live),
            other => Err(format!("unknown variant '{other}' (expected pub or live)")),
        }
    }
}

/// Players in output order: (last_name, first_name) ordinal ascending.
/// Ties keep id order since the map iterates by id and the sort is stable.
pub fn sorted_players(players: &Players) -> Vec<&Player> {
    let mut out: Vec<&Player> = players.values().collect();
    out.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
    out
}
