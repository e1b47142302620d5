//! Conversion of raw cells into typed parameters.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::inference::parse_date;
use crate::schema::ColumnType;
use crate::store::SqlValue;

/// Convert one raw cell to the storage type of its column.
///
/// `None` (cell missing from a short row) is always NULL. Empty cells are
/// NULL for typed columns and kept verbatim for text columns.
pub fn coerce_cell(raw: Option<&str>, column_type: ColumnType) -> Result<SqlValue, String> {
    let Some(raw) = raw else {
        return Ok(SqlValue::Null);
    };

    if column_type == ColumnType::Text {
        return Ok(SqlValue::Text(raw.to_string()));
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(SqlValue::Null);
    }

    match column_type {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(SqlValue::Integer)
            .map_err(|_| format!("'{}' is not a valid integer", trimmed)),
        ColumnType::Numeric => parse_decimal(trimmed)
            .map(SqlValue::Numeric)
            .ok_or_else(|| format!("'{}' is not a valid number", trimmed)),
        ColumnType::Date => parse_date(trimmed)
            .map(SqlValue::Date)
            .ok_or_else(|| format!("'{}' is not a recognized date", trimmed)),
        ColumnType::Text => unreachable!("text handled above"),
    }
}

/// Parse decimal text, accepting the float spellings inference counts as
/// numeric (`.5`, `1.`, `+2`, `1e3`).
fn parse_decimal(value: &str) -> Option<BigDecimal> {
    let (sign, digits) = match value.strip_prefix(['+', '-']) {
        Some(rest) => (&value[..1], rest),
        None => ("", value),
    };

    let mut normalized = String::with_capacity(value.len() + 2);
    if sign == "-" {
        normalized.push('-');
    }
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits);
    if let Some(stripped) = normalized.strip_suffix('.') {
        normalized = stripped.to_string();
    }
    if let Some(pos) = normalized.find(".e").or_else(|| normalized.find(".E")) {
        normalized.remove(pos);
    }

    BigDecimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> SqlValue {
        SqlValue::Numeric(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn test_missing_cell_is_null() {
        for ty in [ColumnType::Integer, ColumnType::Numeric, ColumnType::Date, ColumnType::Text] {
            assert_eq!(coerce_cell(None, ty), Ok(SqlValue::Null));
        }
    }

    #[test]
    fn test_empty_cells() {
        assert_eq!(coerce_cell(Some(" "), ColumnType::Integer), Ok(SqlValue::Null));
        assert_eq!(coerce_cell(Some(""), ColumnType::Date), Ok(SqlValue::Null));
        assert_eq!(
            coerce_cell(Some(""), ColumnType::Text),
            Ok(SqlValue::Text(String::new()))
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(coerce_cell(Some(" 42 "), ColumnType::Integer), Ok(SqlValue::Integer(42)));
        assert_eq!(coerce_cell(Some("+7"), ColumnType::Integer), Ok(SqlValue::Integer(7)));
        assert!(coerce_cell(Some("4.5"), ColumnType::Integer).is_err());
        assert!(coerce_cell(Some("bad"), ColumnType::Integer).is_err());
    }

    #[test]
    fn test_numeric_spellings() {
        assert_eq!(coerce_cell(Some("1.50"), ColumnType::Numeric), Ok(dec("1.50")));
        assert_eq!(coerce_cell(Some(".5"), ColumnType::Numeric), Ok(dec("0.5")));
        assert_eq!(coerce_cell(Some("-.5"), ColumnType::Numeric), Ok(dec("-0.5")));
        assert_eq!(coerce_cell(Some("3."), ColumnType::Numeric), Ok(dec("3")));
        assert_eq!(coerce_cell(Some("+2"), ColumnType::Numeric), Ok(dec("2")));
        assert_eq!(coerce_cell(Some("1e3"), ColumnType::Numeric), Ok(dec("1000")));
        assert!(coerce_cell(Some("abc"), ColumnType::Numeric).is_err());
    }

    #[test]
    fn test_date() {
        assert_eq!(
            coerce_cell(Some("3/4/2023"), ColumnType::Date),
            Ok(SqlValue::Date(NaiveDate::from_ymd_opt(2023, 3, 4).unwrap()))
        );
        assert!(coerce_cell(Some("n/a"), ColumnType::Date).is_err());
    }

    #[test]
    fn test_text_kept_verbatim() {
        assert_eq!(
            coerce_cell(Some("  padded "), ColumnType::Text),
            Ok(SqlValue::Text("  padded ".into()))
        );
    }
}
