//! Statistical classification of a column's storage type.
//!
//! A column is sampled from the top, each non-empty value is classified, and
//! the column type is decided by majority vote against a fixed threshold.

use crate::schema::ColumnType;

use super::dates::parse_date;

/// Inference settings.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Leading rows examined per column.
    pub sample_limit: usize,
    /// Minimum share of non-empty sampled values a type needs (inclusive).
    pub threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_limit: 100,
            threshold: 0.8,
        }
    }
}

/// Per-kind tallies over the sampled, non-empty values of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    /// Non-empty sampled values.
    pub total: usize,
    /// Values parsable as a 64-bit integer.
    pub integer: usize,
    /// Values parsable as a finite float but not as an integer.
    pub float: usize,
    /// Values matching one of the date layouts (counted independently).
    pub date: usize,
}

impl TypeCounts {
    /// Classify one trimmed, non-empty value.
    fn observe(&mut self, value: &str) {
        self.total += 1;

        if value.parse::<i64>().is_ok() {
            self.integer += 1;
        } else if value.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
            self.float += 1;
        }

        if parse_date(value).is_some() {
            self.date += 1;
        }
    }

    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.total as f64
    }
}

/// Classifies column storage types.
#[derive(Debug, Clone, Default)]
pub struct TypeInferrer {
    config: InferenceConfig,
}

impl TypeInferrer {
    /// Create an inferrer with the default sample limit and threshold.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Tally the leading `sample_limit` values of a column.
    ///
    /// `None` stands for a row too short to have this column; such rows use
    /// up a sample slot but are otherwise skipped. Values that are empty
    /// after trimming are ignored entirely.
    pub fn count<'a, I>(&self, values: I) -> TypeCounts
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut counts = TypeCounts::default();
        for value in values.into_iter().take(self.config.sample_limit).flatten() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                counts.observe(trimmed);
            }
        }
        counts
    }

    /// Decide a column type from its tallies.
    ///
    /// Integer beats numeric beats date beats text; each needs its share of
    /// the non-empty values to reach the threshold.
    pub fn decide(&self, counts: &TypeCounts) -> ColumnType {
        if counts.total == 0 {
            return ColumnType::Text;
        }

        let threshold = self.config.threshold;
        if counts.ratio(counts.integer) >= threshold {
            ColumnType::Integer
        } else if counts.ratio(counts.integer + counts.float) >= threshold {
            ColumnType::Numeric
        } else if counts.ratio(counts.date) >= threshold {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }

    /// Infer the storage type of a column from its values in row order.
    pub fn infer<'a, I>(&self, values: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        self.decide(&self.count(values))
    }

    /// Infer the type of column `index` over a set of raw rows.
    pub fn infer_column(&self, rows: &[Vec<String>], index: usize) -> ColumnType {
        self.infer(rows.iter().map(|row| row.get(index).map(String::as_str)))
    }
}
