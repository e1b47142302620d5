//! Inference engine for column storage types.

mod dates;
mod statistical;

pub use dates::{parse_date, DateFormat, DATE_FORMATS};
pub use statistical::{InferenceConfig, TypeCounts, TypeInferrer};
