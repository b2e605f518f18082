//! Range selection of papers by the numeric suffix of their IDs.

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::paper_number;

#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("Lower range must be a positive number")]
    LowerNotPositive,

    #[error("Upper range must be a positive number")]
    UpperNotPositive,

    #[error("Upper range must be greater than lower range")]
    NotIncreasing,
}

/// Inclusive range of paper numbers
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperRange {
    pub lower_range: f64,
    pub upper_range: f64,
}

impl PaperRange {
    pub fn new(lower_range: f64, upper_range: f64) -> Result<Self, RangeError> {
        let range = Self {
            lower_range,
            upper_range,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), RangeError> {
        // NaN fails every comparison, so it is rejected here too
        if !(self.lower_range > 0.0) {
            return Err(RangeError::LowerNotPositive);
        }
        if !(self.upper_range > 0.0) {
            return Err(RangeError::UpperNotPositive);
        }
        if self.upper_range <= self.lower_range {
            return Err(RangeError::NotIncreasing);
        }
        Ok(())
    }

    pub fn contains(&self, number: u64) -> bool {
        let n = number as f64;
        n >= self.lower_range && n <= self.upper_range
    }
}

pub fn validate_ranges(ranges: &[PaperRange]) -> Result<(), RangeError> {
    ranges.iter().try_for_each(PaperRange::validate)
}

/// Keep the items whose paper number falls inside any of `ranges`.
///
/// Order is preserved. Items whose ID has no numeric suffix are dropped.
pub fn select_in_ranges<T>(
    items: Vec<T>,
    ranges: &[PaperRange],
    paper_id: impl Fn(&T) -> &str,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            paper_number(paper_id(item))
                .map(|n| ranges.iter().any(|r| r.contains(n)))
                .unwrap_or(false)
        })
        .collect()
}
