//! Identifier sanitization for column and table names.
//!
//! Everything user-supplied that ends up in DDL passes through here first.
//! Output identifiers only contain `[a-z0-9_]` and never start with a digit,
//! so they are safe to embed in double-quoted SQL identifiers.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{IngotError, Result};

/// Substituted when a column name has no usable characters.
pub const FALLBACK_COLUMN_NAME: &str = "unnamed_column";

/// Substituted when a logical table name has no usable characters.
pub const FALLBACK_TABLE_NAME: &str = "table";

/// Number of owner id characters used in the physical name namespace.
pub const OWNER_PREFIX_LEN: usize = 8;

/// Longest identifier Postgres keeps without truncating.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Column names managed by the storage engine on every provisioned table.
pub const RESERVED_COLUMN_NAMES: &[&str] = &["id", "created_at"];

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

/// Convert a raw header into a column identifier.
///
/// Lowercases, turns spaces into underscores, drops everything outside
/// `[a-z0-9_]`, prefixes `col_` when the result starts with a digit and falls
/// back to [`FALLBACK_COLUMN_NAME`] when nothing is left.
///
/// ```
/// use ingot::sanitize::sanitize_column_name;
///
/// assert_eq!(sanitize_column_name("First Name"), "first_name");
/// assert_eq!(sanitize_column_name("2024 Sales ($)"), "col_2024_sales_");
/// assert_eq!(sanitize_column_name("???"), "unnamed_column");
/// ```
pub fn sanitize_column_name(raw: &str) -> String {
    let mut sanitized: String = raw
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert_str(0, "col_");
    }

    if sanitized.is_empty() {
        sanitized = FALLBACK_COLUMN_NAME.to_string();
    }

    sanitized
}

/// Derive the physical table name for an owner's logical table name.
///
/// The result is namespaced as `user_<first 8 chars of owner>_<name>`, so two
/// owners never collide while one owner reusing a logical name always does.
///
/// ```
/// use ingot::sanitize::sanitize_physical_table_name;
///
/// let name = sanitize_physical_table_name("3f2a9c1e-77aa", "Q3 Sales -- 2024!");
/// assert_eq!(name, "user_3f2a9c1e_q3_sales_2024");
/// ```
pub fn sanitize_physical_table_name(owner_id: &str, raw_logical_name: &str) -> String {
    let mut sanitized = NON_ALPHANUMERIC_RUN
        .replace_all(raw_logical_name, "_")
        .to_lowercase()
        .trim_matches('_')
        .to_string();

    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert_str(0, "table_");
    }

    if sanitized.is_empty() {
        sanitized = FALLBACK_TABLE_NAME.to_string();
    }

    let mut physical = format!("user_{}_{}", owner_prefix(owner_id), sanitized);
    physical.truncate(MAX_IDENTIFIER_LEN);
    physical
}

/// Namespace component for an owner: the first [`OWNER_PREFIX_LEN`]
/// characters, lowercased, with anything non-alphanumeric replaced.
fn owner_prefix(owner_id: &str) -> String {
    owner_id
        .chars()
        .take(OWNER_PREFIX_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Make a list of sanitized column names unique.
///
/// Later duplicates, and names equal to one of [`RESERVED_COLUMN_NAMES`], get
/// the first free `_2`, `_3`, ... suffix. Names are capped at
/// [`MAX_IDENTIFIER_LEN`] so the engine cannot truncate two of them into the
/// same identifier.
pub fn dedupe_column_names(names: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = RESERVED_COLUMN_NAMES.iter().map(|s| s.to_string()).collect();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let base = truncate_identifier(name, MAX_IDENTIFIER_LEN);
        let mut unique = base.clone();
        let mut n = 2usize;
        while taken.contains(&unique) {
            let suffix = format!("_{}", n);
            let stem = truncate_identifier(&base, MAX_IDENTIFIER_LEN - suffix.len());
            unique = format!("{}{}", stem, suffix);
            n += 1;
        }
        taken.insert(unique.clone());
        result.push(unique);
    }

    result
}

fn truncate_identifier(name: &str, max_len: usize) -> String {
    // Identifiers produced here are ASCII, so byte and char lengths agree.
    name.chars().take(max_len).collect()
}

/// Check a user-supplied logical table name.
pub fn validate_table_name(name: &str, max_len: usize) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(IngotError::InvalidTableName(
            "table name is required".to_string(),
        ));
    }

    if trimmed.chars().count() > max_len {
        return Err(IngotError::InvalidTableName(format!(
            "table name must be at most {} characters",
            max_len
        )));
    }

    Ok(())
}

/// Check that an owner id is long enough to namespace physical tables.
pub fn validate_owner_id(owner_id: &str) -> Result<()> {
    if owner_id.chars().count() < OWNER_PREFIX_LEN {
        return Err(IngotError::InvalidOwner(format!(
            "owner id must be at least {} characters",
            OWNER_PREFIX_LEN
        )));
    }
    Ok(())
}

/// True when `name` is a safe identifier as produced by this module.
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_column_basic() {
        assert_eq!(sanitize_column_name("Name"), "name");
        assert_eq!(sanitize_column_name("Order Date"), "order_date");
        assert_eq!(sanitize_column_name("price (USD)"), "price_usd");
        assert_eq!(sanitize_column_name("e-mail"), "email");
    }

    #[test]
    fn test_sanitize_column_leading_digit() {
        assert_eq!(sanitize_column_name("1st place"), "col_1st_place");
        assert_eq!(sanitize_column_name("2024"), "col_2024");
    }

    #[test]
    fn test_sanitize_column_fallback() {
        assert_eq!(sanitize_column_name(""), FALLBACK_COLUMN_NAME);
        assert_eq!(sanitize_column_name("%%%"), FALLBACK_COLUMN_NAME);
        assert_eq!(sanitize_column_name("名前"), FALLBACK_COLUMN_NAME);
    }

    #[test]
    fn test_sanitize_column_idempotent() {
        for raw in ["Hello World", "9lives", "__x__", "ÄÖÜ abc", ""] {
            let once = sanitize_column_name(raw);
            assert_eq!(sanitize_column_name(&once), once);
        }
    }

    #[test]
    fn test_physical_name() {
        assert_eq!(
            sanitize_physical_table_name("abcdefgh-1234", "My Sales Data"),
            "user_abcdefgh_my_sales_data"
        );
        assert_eq!(
            sanitize_physical_table_name("abcdefgh-1234", "__2023 report__"),
            "user_abcdefgh_table_2023_report"
        );
        assert_eq!(
            sanitize_physical_table_name("abcdefgh-1234", "!!!"),
            "user_abcdefgh_table"
        );
    }

    #[test]
    fn test_physical_name_owner_scoped() {
        let a = sanitize_physical_table_name("11111111-aaaa", "sales");
        let b = sanitize_physical_table_name("22222222-aaaa", "sales");
        assert_ne!(a, b);
        assert_eq!(a, sanitize_physical_table_name("11111111-bbbb", "sales"));
    }

    #[test]
    fn test_physical_name_owner_prefix_is_safe() {
        let name = sanitize_physical_table_name("AB-CD.EF", "x");
        assert_eq!(name, "user_ab_cd_ef_x");
        assert!(is_safe_identifier(&name));
    }

    #[test]
    fn test_physical_name_length_capped() {
        let long = "x".repeat(200);
        let name = sanitize_physical_table_name("abcdefgh", &long);
        assert_eq!(name.len(), MAX_IDENTIFIER_LEN);
    }

    #[test]
    fn test_dedupe_column_names() {
        let names: Vec<String> = ["name", "name", "id", "name_2", "created_at"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            dedupe_column_names(&names),
            vec!["name", "name_2", "id_2", "name_2_2", "created_at_2"]
        );
    }

    #[test]
    fn test_dedupe_truncates_long_names() {
        let long = "a".repeat(80);
        let deduped = dedupe_column_names(&[long.clone(), long]);
        assert_eq!(deduped[0].len(), MAX_IDENTIFIER_LEN);
        assert_eq!(deduped[1].len(), MAX_IDENTIFIER_LEN);
        assert!(deduped[1].ends_with("_2"));
        assert_ne!(deduped[0], deduped[1]);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("sales", 255).is_ok());
        assert!(validate_table_name("   ", 255).is_err());
        assert!(validate_table_name(&"x".repeat(255), 255).is_ok());
        assert!(validate_table_name(&"x".repeat(256), 255).is_err());
    }

    #[test]
    fn test_validate_owner_id() {
        assert!(validate_owner_id("12345678").is_ok());
        assert!(validate_owner_id("1234567").is_err());
    }
}
