//! FILENAME: formula-parser/src/cell_ref.rs
//! PURPOSE: Conversions between A1-style reference text and 0-based indices.
//! CONTEXT: Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally. A '$' before the column letters
//! marks the column absolute; a '$' before the row digits marks the row absolute.

use crate::error::CellRefError;

/// A fully specified cell address with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
    pub row_absolute: bool,
    pub col_absolute: bool,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        CellReference {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }
}

/// Converts a column string (e.g., "A", "AA", "ABC") to a 0-based column index.
/// "A" -> 0, "B" -> 1, ..., "Z" -> 25, "AA" -> 26, "AB" -> 27, etc.
///
/// Letters are matched case-insensitively. Returns `None` for an empty
/// string, any non-letter character, or a column past `u32::MAX`, so every
/// index `index_to_column_name` produces decodes back to itself.
pub fn column_name_to_index(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    // Bijective base 26: "A" = 1 ... "Z" = 26, shifted to 0-based at the end.
    let mut number: u64 = 0;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = u64::from(ch.to_ascii_uppercase() as u8 - b'A') + 1;
        number = number.checked_mul(26)?.checked_add(digit)?;
    }
    u32::try_from(number - 1).ok()
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_column_name(col_index: u32) -> String {
    let mut letters = Vec::new();
    let mut number = u64::from(col_index) + 1;
    while number > 0 {
        let digit = (number - 1) % 26;
        letters.push(b'A' + digit as u8);
        number = (number - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Parses 1-based row digits ("1", "42") into a 0-based row index.
/// Returns `None` for non-digits, row 0, or overflow.
pub fn row_number_to_index(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: u64 = digits.parse().ok()?;
    u32::try_from(row.checked_sub(1)?).ok()
}

/// Decodes reference text such as "A1", "$A$1", "A$1" or "$A1".
///
/// Grammar: `['$'] letters ['$'] digits`, nothing else.
pub fn parse_cell_reference(text: &str) -> Result<CellReference, CellRefError> {
    if text.is_empty() {
        return Err(CellRefError::Empty);
    }

    let mut rest = text;
    let col_absolute = match rest.strip_prefix('$') {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let letters_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if letters_len == 0 {
        return Err(CellRefError::MissingColumn(text.to_string()));
    }
    let (letters, after_letters) = rest.split_at(letters_len);
    rest = after_letters;

    let row_absolute = match rest.strip_prefix('$') {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_len == 0 {
        return Err(CellRefError::MissingRow(text.to_string()));
    }
    let (digits, trailing) = rest.split_at(digits_len);
    if !trailing.is_empty() {
        return Err(CellRefError::TrailingCharacters(text.to_string()));
    }

    let col = column_name_to_index(letters)
        .ok_or_else(|| CellRefError::ColumnOutOfRange(text.to_string()))?;
    let row =
        row_number_to_index(digits).ok_or_else(|| CellRefError::RowOutOfRange(text.to_string()))?;

    Ok(CellReference {
        row,
        col,
        row_absolute,
        col_absolute,
    })
}

/// Encodes a cell address back to A1 text, including '$' markers.
/// (0, 0) -> "A1", (1, 1) -> "B2", (99, 26) -> "AA100"
pub fn format_cell_reference(reference: &CellReference) -> String {
    format!(
        "{}{}{}{}",
        if reference.col_absolute { "$" } else { "" },
        index_to_column_name(reference.col),
        if reference.row_absolute { "$" } else { "" },
        u64::from(reference.row) + 1
    )
}
