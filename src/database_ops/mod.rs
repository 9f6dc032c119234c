//! Read-only queries feeding the export.

pub mod players;
pub mod ratings;
