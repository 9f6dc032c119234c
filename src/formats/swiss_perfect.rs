//! Swiss Perfect player database (dBase III `.dbf`).
//!
//! Character fields are Windows-1252, as flagged by the header's language
//! driver byte.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use super::{
    day_month_year, truncate_chars, Column, ColumnKind, MissingRating, Row,
};
use crate::error::{ExportError, Result};
use crate::model::{sorted_players, Players, RatingMap};

const VERSION: u8 = 0x03;
const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const RECORD_ACTIVE: u8 = b' ';
/// Language driver id for code page 1252.
const LANGUAGE_DRIVER: u8 = 0x03;
const LANGUAGE_DRIVER_OFFSET: usize = 29;

/// Code page 1252 bytes 0x80..=0x9F. `None` marks the five unassigned slots.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

pub const COLUMNS: &[Column] = &[
    Column {
        name: "ID",
        kind: ColumnKind::Numeric,
        width: 20,
        value: |row| row.player.id.to_string(),
    },
    Column {
        name: "FIRSTNAME",
        kind: ColumnKind::Character,
        width: 50,
        value: |row| truncate_chars(&row.player.first_name, 50).to_string(),
    },
    Column {
        name: "SURNAME",
        kind: ColumnKind::Character,
        width: 50,
        value: |row| truncate_chars(&row.player.last_name, 50).to_string(),
    },
    Column {
        name: "RATING",
        kind: ColumnKind::Numeric,
        width: 5,
        value: |row| MissingRating::Zero.render(row.rating),
    },
    Column {
        name: "SEX",
        kind: ColumnKind::Character,
        width: 1,
        value: |row| row.player.gender.code().to_string(),
    },
    Column {
        name: "CLUB",
        kind: ColumnKind::Character,
        width: 25,
        value: |row| {
            row.player
                .club
                .as_deref()
                .map(|c| truncate_chars(c, 25).to_string())
                .unwrap_or_default()
        },
    },
    Column {
        name: "BIRTHDATE",
        kind: ColumnKind::Character,
        width: 10,
        value: |row| day_month_year(row.player.date_of_birth),
    },
];

pub fn header_len(columns: &[Column]) -> usize {
    HEADER_LEN + DESCRIPTOR_LEN * columns.len() + 1
}

pub fn record_len(columns: &[Column]) -> usize {
    1 + columns.iter().map(|c| c.width).sum::<usize>()
}

/// Write the Swiss Perfect file and return the number of bytes written.
pub fn emit_tabular(
    players: &Players,
    ratings: &RatingMap,
    path: &Path,
    last_update: NaiveDate,
) -> Result<u64> {
    let file = File::create(path).map_err(ExportError::output(path))?;
    let mut out = BufWriter::new(file);
    let written = write_dbf(&mut out, players, ratings, last_update)
        .and_then(|n| out.flush().map(|_| n))
        .map_err(ExportError::output(path))?;
    info!(
        path = %path.display(),
        bytes = written,
        records = players.len(),
        "swiss perfect file written"
    );
    Ok(written)
}

pub fn write_dbf<W: Write>(
    out: &mut W,
    players: &Players,
    ratings: &RatingMap,
    last_update: NaiveDate,
) -> io::Result<u64> {
    let mut written = 0u64;
    let mut put = |out: &mut W, bytes: &[u8]| -> io::Result<()> {
        out.write_all(bytes)?;
        written += bytes.len() as u64;
        Ok(())
    };

    let header = file_header(COLUMNS, players.len(), last_update)?;
    put(out, &header)?;
    for column in COLUMNS {
        put(out, &field_descriptor(column)?)?;
    }
    put(out, &[HEADER_TERMINATOR])?;

    let mut record = Vec::with_capacity(record_len(COLUMNS));
    for player in sorted_players(players) {
        let row = Row::new(player, ratings);
        record.clear();
        record.push(RECORD_ACTIVE);
        for column in COLUMNS {
            record.extend_from_slice(&render_field(column, &(column.value)(&row)));
        }
        put(out, &record)?;
    }
    put(out, &[END_OF_FILE])?;
    Ok(written)
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn file_header(
    columns: &[Column],
    records: usize,
    last_update: NaiveDate,
) -> io::Result<[u8; HEADER_LEN]> {
    let records =
        u32::try_from(records).map_err(|_| invalid(format!("too many records: {records}")))?;
    let header_len = u16::try_from(header_len(columns))
        .map_err(|_| invalid("too many fields for a dBase header".into()))?;
    let record_len = u16::try_from(record_len(columns))
        .map_err(|_| invalid("record too wide for a dBase file".into()))?;
    let year = u8::try_from(last_update.year() - 1900)
        .map_err(|_| invalid(format!("last update year out of range: {last_update}")))?;

    let mut header = [0u8; HEADER_LEN];
    header[0] = VERSION;
    header[1] = year;
    header[2] = last_update.month() as u8;
    header[3] = last_update.day() as u8;
    header[4..8].copy_from_slice(&records.to_le_bytes());
    header[8..10].copy_from_slice(&header_len.to_le_bytes());
    header[10..12].copy_from_slice(&record_len.to_le_bytes());
    header[LANGUAGE_DRIVER_OFFSET] = LANGUAGE_DRIVER;
    Ok(header)
}

fn field_descriptor(column: &Column) -> io::Result<[u8; DESCRIPTOR_LEN]> {
    let name = column.name.as_bytes();
    if name.len() > 10 || !column.name.is_ascii() {
        return Err(invalid(format!("invalid dBase field name: {}", column.name)));
    }
    let width = u8::try_from(column.width)
        .map_err(|_| invalid(format!("field {} too wide", column.name)))?;

    let mut descriptor = [0u8; DESCRIPTOR_LEN];
    descriptor[..name.len()].copy_from_slice(name);
    descriptor[11] = match column.kind {
        ColumnKind::Character => b'C',
        ColumnKind::Numeric => b'N',
    };
    descriptor[16] = width;
    descriptor[17] = 0;
    Ok(descriptor)
}

/// One Windows-1252 byte per character; anything outside the code page is `?`.
pub fn encode_cp1252(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match u32::from(c) {
            code @ (0..=0x7F | 0xA0..=0xFF) => code as u8,
            _ => CP1252_HIGH
                .iter()
                .position(|&high| high == Some(c))
                .map_or(b'?', |idx| 0x80 + idx as u8),
        })
        .collect()
}

/// Pad (or cut) a value to exactly the field's byte width.
fn render_field(column: &Column, value: &str) -> Vec<u8> {
    let width = column.width;
    match column.kind {
        ColumnKind::Character => {
            let mut field = encode_cp1252(truncate_chars(value, width));
            field.resize(width, b' ');
            field
        }
        // dBase marks numbers that do not fit with asterisks.
        ColumnKind::Numeric if value.len() > width => vec![b'*'; width],
        ColumnKind::Numeric => format!("{value:>width$}").into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Player};

    fn player(id: i64, last: &str, first: &str) -> Player {
        Player {
            id,
            last_name: last.into(),
            first_name: first.into(),
            gender: Gender::Unknown,
            date_of_birth: None,
            club: None,
            title: None,
            federation: None,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 9, 1).unwrap()
    }

    fn write(players: &Players, ratings: &RatingMap) -> Vec<u8> {
        let mut buf = Vec::new();
        let n = write_dbf(&mut buf, players, ratings, as_of()).unwrap();
        assert_eq!(n as usize, buf.len());
        buf
    }

    fn record(buf: &[u8], idx: usize) -> &[u8] {
        let start = header_len(COLUMNS) + idx * record_len(COLUMNS);
        &buf[start..start + record_len(COLUMNS)]
    }

    fn field<'a>(record: &'a [u8], name: &str) -> &'a str {
        let mut offset = 1;
        for column in COLUMNS {
            if column.name == name {
                return std::str::from_utf8(&record[offset..offset + column.width]).unwrap();
            }
            offset += column.width;
        }
        panic!("no field {name}");
    }

    #[test]
    fn header_describes_layout() {
        let mut players = Players::new();
        players.insert(1, player(1, "Smith", "Anna"));
        players.insert(2, player(2, "Jones", "Bob"));
        let buf = write(&players, &RatingMap::new());

        assert_eq!(buf[0], 0x03);
        assert_eq!(&buf[1..4], &[111, 9, 1]);
        assert_eq!(u32::from_le_bytes(buf[4..8].try_into().unwrap()), 2);
        assert_eq!(
            u16::from_le_bytes(buf[8..10].try_into().unwrap()) as usize,
            32 + 32 * 7 + 1
        );
        assert_eq!(
            u16::from_le_bytes(buf[10..12].try_into().unwrap()) as usize,
            1 + 20 + 50 + 50 + 5 + 1 + 25 + 10
        );
        assert_eq!(buf[header_len(COLUMNS) - 1], 0x0D);
        assert_eq!(*buf.last().unwrap(), 0x1A);
        assert_eq!(
            buf.len(),
            header_len(COLUMNS) + 2 * record_len(COLUMNS) + 1
        );
    }

    #[test]
    fn descriptors_name_type_and_width() {
        let buf = write(&Players::new(), &RatingMap::new());
        let first = &buf[32..64];
        assert_eq!(&first[..3], b"ID\0");
        assert_eq!(first[11], b'N');
        assert_eq!(first[16], 20);
        let club = &buf[32 + 5 * 32..32 + 6 * 32];
        assert_eq!(&club[..5], b"CLUB\0");
        assert_eq!(club[11], b'C');
        assert_eq!(club[16], 25);
    }

    #[test]
    fn records_follow_name_order_and_defaults() {
        let mut players = Players::new();
        let mut anna = player(7, "Smith", "Anna");
        anna.gender = Gender::Female;
        anna.club = Some("Wanderers".into());
        anna.date_of_birth = NaiveDate::from_ymd_opt(1990, 5, 3);
        players.insert(7, anna);
        players.insert(3, player(3, "Adams", "Zed"));
        let mut ratings = RatingMap::new();
        ratings.insert(7, 1850);
        let buf = write(&players, &ratings);

        let first = record(&buf, 0);
        assert_eq!(first[0], b' ');
        assert_eq!(field(first, "ID").trim(), "3");
        assert_eq!(field(first, "RATING"), "    0");
        assert_eq!(field(first, "SEX"), " ");
        assert_eq!(field(first, "BIRTHDATE"), "          ");

        let second = record(&buf, 1);
        assert_eq!(field(second, "ID"), format!("{:>20}", 7));
        assert_eq!(field(second, "SURNAME").trim_end(), "Smith");
        assert_eq!(field(second, "RATING"), " 1850");
        assert_eq!(field(second, "SEX"), "F");
        assert_eq!(field(second, "CLUB").trim_end(), "Wanderers");
        assert_eq!(field(second, "BIRTHDATE"), "03-05-1990");
    }

    #[test]
    fn long_values_are_truncated() {
        let mut players = Players::new();
        let mut p = player(1, &"L".repeat(60), "F");
        p.club = Some("C".repeat(40));
        players.insert(1, p);
        let buf = write(&players, &RatingMap::new());
        let rec = record(&buf, 0);
        assert_eq!(field(rec, "SURNAME"), "L".repeat(50));
        assert_eq!(field(rec, "CLUB"), "C".repeat(25));
    }

    #[test]
    fn numeric_overflow_is_starred() {
        let rating = COLUMNS.iter().find(|c| c.name == "RATING").unwrap();
        assert_eq!(render_field(rating, "123456"), b"*****");
        assert_eq!(render_field(rating, "42"), b"   42");
    }

    #[test]
    fn text_is_windows_1252() {
        assert_eq!(encode_cp1252("Zoë"), b"Zo\xEB");
        assert_eq!(encode_cp1252("Šimić"), b"\x8Aimi?");
        assert_eq!(encode_cp1252("€ café"), b"\x80 caf\xE9");

        let mut players = Players::new();
        let mut p = player(1, "Müller", "Zoë");
        p.club = Some("Łódź Chess".into());
        players.insert(1, p);
        let buf = write(&players, &RatingMap::new());
        assert_eq!(buf[29], 0x03);

        let rec = record(&buf, 0);
        assert_eq!(rec.len(), record_len(COLUMNS));
        let surname = 1 + 20 + 50;
        assert_eq!(&rec[surname..surname + 7], b"M\xFCller ");
        let club = surname + 50 + 5 + 1;
        assert_eq!(&rec[club..club + 11], b"?\xF3d? Chess ");
    }

    #[test]
    fn accented_values_truncate_to_the_field_width() {
        let mut players = Players::new();
        players.insert(1, player(1, &"é".repeat(60), "F"));
        let buf = write(&players, &RatingMap::new());
        let rec = record(&buf, 0);
        let surname = 1 + 20 + 50;
        assert_eq!(&rec[surname..surname + 50], &[0xE9u8; 50][..]);
        assert_eq!(rec[surname + 50], b' ');
    }

    #[test]
    fn emit_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("swiss_perfect_pub.dbf");
        let err = emit_tabular(&Players::new(), &RatingMap::new(), &path, as_of()).unwrap_err();
        assert!(matches!(err, ExportError::Output { .. }));
    }
}
