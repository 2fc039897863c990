//! Shared hourly time axis
//!
//! A [`TimeAxis`] is stored as start, step and length, so monotonicity and a
//! constant step hold by construction. Lists of timestamps coming from a
//! source are validated on the way in.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::DomainError;

/// Ordered UTC timestamps with a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    start: DateTime<Utc>,
    step: TimeDelta,
    len: usize,
}

impl TimeAxis {
    /// Create an axis of `len` timestamps starting at `start`
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeAxis` if the step is not positive.
    pub fn new(start: DateTime<Utc>, step: TimeDelta, len: usize) -> Result<Self, DomainError> {
        if step <= TimeDelta::zero() {
            return Err(DomainError::InvalidTimeAxis(format!(
                "step must be positive, got {step}"
            )));
        }
        Ok(Self { start, step, len })
    }

    /// Validate an explicit list of timestamps against a step
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeAxis` if the list is empty or any two consecutive
    /// timestamps are not exactly `step` apart.
    pub fn from_timestamps(
        timestamps: &[DateTime<Utc>],
        step: TimeDelta,
    ) -> Result<Self, DomainError> {
        let Some(&start) = timestamps.first() else {
            return Err(DomainError::InvalidTimeAxis(
                "no timestamps in source data".to_string(),
            ));
        };
        for (i, pair) in timestamps.windows(2).enumerate() {
            let delta = pair[1] - pair[0];
            if delta != step {
                return Err(DomainError::InvalidTimeAxis(format!(
                    "step between rows {i} and {} is {delta}, expected {step}",
                    i + 1
                )));
            }
        }
        Self::new(start, step, timestamps.len())
    }

    /// First timestamp
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end (one step past the last timestamp)
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp(self.len)
    }

    /// Distance between consecutive timestamps
    #[must_use]
    pub const fn step(&self) -> TimeDelta {
        self.step
    }

    /// Number of timestamps
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the axis has no timestamps
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Timestamp at a row index (indices past the end extrapolate)
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn timestamp(&self, index: usize) -> DateTime<Utc> {
        self.start + self.step * (index as i32)
    }

    /// Iterate over the timestamps in order
    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.len).map(|i| self.timestamp(i))
    }

    /// Index of the first timestamp at or after `boundary`
    ///
    /// Returns `len()` if every timestamp is earlier.
    #[must_use]
    pub fn first_index_at_or_after(&self, boundary: DateTime<Utc>) -> usize {
        self.iter().position(|t| t >= boundary).unwrap_or(self.len)
    }

    /// Axis made of the rows from `index` onward
    #[must_use]
    pub fn tail_from(&self, index: usize) -> Self {
        let index = index.min(self.len);
        Self {
            start: self.timestamp(index),
            step: self.step,
            len: self.len - index,
        }
    }
}

/// First timestamp shown in every chart of a run
///
/// The current time truncated to the hour, plus one hour.
///
/// # Errors
///
/// Returns `InvalidDateTime` if the time cannot be truncated.
pub fn truncation_boundary(now: DateTime<Utc>) -> Result<DateTime<Utc>, DomainError> {
    let hour = TimeDelta::hours(1);
    now.duration_trunc(hour)
        .map(|start_of_hour| start_of_hour + hour)
        .map_err(|e| DomainError::InvalidDateTime(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, hour, minute, 0).unwrap()
    }

    fn hourly(len: usize) -> TimeAxis {
        TimeAxis::new(at(0, 0), TimeDelta::hours(1), len).unwrap()
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(TimeAxis::new(at(0, 0), TimeDelta::zero(), 3).is_err());
        assert!(TimeAxis::new(at(0, 0), TimeDelta::hours(-1), 3).is_err());
    }

    #[test]
    fn from_timestamps_accepts_constant_step() {
        let ts: Vec<_> = (0..4).map(|h| at(h, 0)).collect();
        let axis = TimeAxis::from_timestamps(&ts, TimeDelta::hours(1)).unwrap();
        assert_eq!(axis, hourly(4));
    }

    #[test]
    fn from_timestamps_rejects_gaps() {
        let ts = vec![at(0, 0), at(1, 0), at(3, 0)];
        let err = TimeAxis::from_timestamps(&ts, TimeDelta::hours(1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTimeAxis(_)));
    }

    #[test]
    fn from_timestamps_rejects_empty() {
        assert!(TimeAxis::from_timestamps(&[], TimeDelta::hours(1)).is_err());
    }

    #[test]
    fn iter_is_monotonic() {
        let axis = hourly(24);
        let ts: Vec<_> = axis.iter().collect();
        assert!(ts.windows(2).all(|w| w[1] - w[0] == TimeDelta::hours(1)));
    }

    #[test]
    fn boundary_is_next_top_of_hour() {
        assert_eq!(truncation_boundary(at(1, 15)).unwrap(), at(2, 0));
        assert_eq!(truncation_boundary(at(1, 59)).unwrap(), at(2, 0));
    }

    #[test]
    fn boundary_on_the_hour_moves_forward() {
        assert_eq!(truncation_boundary(at(1, 0)).unwrap(), at(2, 0));
    }

    #[test]
    fn first_index_at_or_after_boundary() {
        let axis = hourly(6);
        assert_eq!(axis.first_index_at_or_after(at(2, 0)), 2);
        assert_eq!(axis.first_index_at_or_after(at(1, 30)), 2);
        assert_eq!(axis.first_index_at_or_after(at(0, 0)), 0);
        assert_eq!(axis.first_index_at_or_after(at(9, 0)), 6);
    }

    #[test]
    fn tail_from_shifts_start() {
        let tail = hourly(6).tail_from(2);
        assert_eq!(tail.start(), at(2, 0));
        assert_eq!(tail.len(), 4);
        assert!(hourly(6).tail_from(10).is_empty());
    }
}
