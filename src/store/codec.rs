//! Line-record codec for the catalog store
//!
//! One comma-separated record per line, ten fields in fixed order:
//! `mediaType,title,author,catalogId,copyId,status,dueDate,fineAmount,borrowedBy,amountPaid`.
//! Text fields are assumed free of embedded commas; no quoting or escaping.
//!
//! Decoding is lenient field by field: missing trailing fields take
//! defaults, unparsable values take defaults, and a line is rejected only
//! when the four leading identity fields are not all present.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::media::{MediaItem, MediaStatus, MediaType};

/// Store date format, fixed-width, no timezone
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of fields in a canonical record
pub const FIELD_COUNT: usize = 10;

/// Decode one store line; `None` means "skip this line"
pub fn decode_line(line: &str) -> Option<MediaItem> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 4 {
        return None;
    }

    let media_type = MediaType::from_label(fields[0]);
    let title = fields[1].trim().to_string();
    let author = fields[2].trim().to_string();
    let catalog_id = fields[3].trim().to_string();

    let copy_id = fields
        .get(4)
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(1);
    let status = fields
        .get(5)
        .map(|s| MediaStatus::from_label(s))
        .unwrap_or_default();
    let due_date = fields
        .get(6)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok());
    let fine_amount = fields
        .get(7)
        .and_then(|s| Decimal::from_str(s.trim()).ok())
        .unwrap_or(Decimal::ZERO);
    // a legacy column-shift bug left "0.0" in the borrower column; treat it as absent
    let borrowed_by = fields
        .get(8)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "0.0")
        .unwrap_or("")
        .to_string();
    let amount_paid = fields
        .get(9)
        .and_then(|s| Decimal::from_str(s.trim()).ok())
        .unwrap_or(Decimal::ZERO);

    Some(MediaItem::from_record(
        media_type,
        title,
        author,
        catalog_id,
        copy_id,
        status,
        due_date,
        fine_amount,
        borrowed_by,
        amount_paid,
    ))
}

/// Encode one item as a canonical ten-field line (no trailing newline)
pub fn encode_line(item: &MediaItem) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        item.media_type,
        item.title,
        item.author,
        item.catalog_id,
        item.copy_id(),
        item.status,
        item.due_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        item.fine_amount,
        item.borrowed_by,
        item.amount_paid,
    )
}
