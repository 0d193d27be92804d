//! Time indexing for loaded recordings
//!
//! Maps between continuous time (seconds), sample index and epoch index.
//! The time vector is immutable once the recording is loaded, so a
//! `TimeIndex` can be shared read-only between every view.

use thiserror::Error;

/// Errors that can occur when querying or building a time index
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    /// Query with a NaN or infinite time value
    #[error("time query is not finite: {0}")]
    OutOfRange(f64),

    /// Time vector is too short or not strictly increasing
    #[error("time vector must be strictly increasing with at least 2 finite samples")]
    NotMonotonic,

    /// Epoch length must be a positive number of seconds
    #[error("invalid epoch length: {0}")]
    InvalidEpochLength(f64),
}

/// Result type for time-index operations
pub type TimeResult<T> = Result<T, TimeError>;

/// Immutable mapping between seconds, sample indices and epoch indices
#[derive(Debug, Clone)]
pub struct TimeIndex {
    time: Vec<f64>,
    sampling_interval: f64,
}

impl TimeIndex {
    /// Build an index from an explicit time vector (seconds, ascending)
    pub fn new(time: Vec<f64>) -> TimeResult<Self> {
        if time.len() < 2 || time.iter().any(|t| !t.is_finite()) {
            return Err(TimeError::NotMonotonic);
        }
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TimeError::NotMonotonic);
        }
        let sampling_interval = time[1] - time[0];
        Ok(Self {
            time,
            sampling_interval,
        })
    }

    /// Build a uniform index from a sample count and sampling frequency
    pub fn from_sampling(n_samples: usize, sampling_frequency: f64) -> TimeResult<Self> {
        if !(sampling_frequency > 0.0) || !sampling_frequency.is_finite() {
            return Err(TimeError::NotMonotonic);
        }
        let time: Vec<f64> = (0..n_samples)
            .map(|i| i as f64 / sampling_frequency)
            .collect();
        Self::new(time)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always false for a constructed index (construction requires >= 2 samples)
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Time of the first sample (seconds)
    pub fn t_min(&self) -> f64 {
        self.time[0]
    }

    /// Time of the last sample (seconds)
    pub fn t_max(&self) -> f64 {
        self.time[self.time.len() - 1]
    }

    /// Total recording duration (seconds)
    pub fn duration(&self) -> f64 {
        self.t_max() - self.t_min()
    }

    /// Interval between consecutive samples (assumed uniform)
    pub fn sampling_interval(&self) -> f64 {
        self.sampling_interval
    }

    /// Time of sample `i`, if in range
    pub fn get(&self, i: usize) -> Option<f64> {
        self.time.get(i).copied()
    }

    /// The raw time vector
    pub fn times(&self) -> &[f64] {
        &self.time
    }

    /// Index of the sample whose time is closest to `t`
    ///
    /// Ties break toward the lower index. Values outside the recorded
    /// range resolve to the nearest boundary sample. Fails only when
    /// `t` is NaN or infinite.
    pub fn sample_index_for_time(&self, t: f64) -> TimeResult<usize> {
        if !t.is_finite() {
            return Err(TimeError::OutOfRange(t));
        }
        let n = self.time.len();
        let i = self.time.partition_point(|&x| x < t);
        if i == 0 {
            return Ok(0);
        }
        if i >= n {
            return Ok(n - 1);
        }
        let below = t - self.time[i - 1];
        let above = self.time[i] - t;
        Ok(if above < below { i } else { i - 1 })
    }

    /// Closest sample indices for both ends of a time window
    ///
    /// The caller passes ordered times, so `i_start <= i_end` holds by
    /// construction.
    pub fn index_pair_for_window(&self, t_start: f64, t_end: f64) -> TimeResult<(usize, usize)> {
        let i_start = self.sample_index_for_time(t_start)?;
        let i_end = self.sample_index_for_time(t_end)?;
        Ok((i_start, i_end))
    }

    /// Epoch index containing `t`, for a fixed epoch length in seconds
    pub fn epoch_index_for_time(&self, t: f64, epoch_seconds: f64) -> TimeResult<usize> {
        if !(epoch_seconds > 0.0) || !epoch_seconds.is_finite() {
            return Err(TimeError::InvalidEpochLength(epoch_seconds));
        }
        if !t.is_finite() {
            return Err(TimeError::OutOfRange(t));
        }
        let clamped = t.clamp(self.t_min(), self.t_max());
        Ok(((clamped - self.t_min()) / epoch_seconds).floor() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hz(n: usize) -> TimeIndex {
        TimeIndex::from_sampling(n, 1.0).unwrap()
    }

    #[test]
    fn test_rejects_short_or_unsorted_time() {
        assert!(matches!(
            TimeIndex::new(vec![0.0]),
            Err(TimeError::NotMonotonic)
        ));
        assert!(TimeIndex::new(vec![0.0, 1.0, 0.5]).is_err());
        assert!(TimeIndex::new(vec![0.0, 0.0, 1.0]).is_err());
        assert!(TimeIndex::new(vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_nearest_neighbor_property() {
        let idx = one_hz(100);
        // Exhaustive check on a fine grid: returned index is never worse
        // than any other index.
        for k in 0..1000 {
            let t = k as f64 * 0.0991;
            let i = idx.sample_index_for_time(t).unwrap();
            let best = (0..100)
                .map(|j| (idx.get(j).unwrap() - t).abs())
                .fold(f64::INFINITY, f64::min);
            assert!((idx.get(i).unwrap() - t).abs() <= best + 1e-12);
        }
    }

    #[test]
    fn test_ties_break_toward_lower_index() {
        let idx = one_hz(10);
        // 2.5 is equidistant from samples 2 and 3
        assert_eq!(idx.sample_index_for_time(2.5).unwrap(), 2);
    }

    #[test]
    fn test_out_of_range_clamps_to_boundaries() {
        let idx = one_hz(10);
        assert_eq!(idx.sample_index_for_time(-5.0).unwrap(), 0);
        assert_eq!(idx.sample_index_for_time(1e9).unwrap(), 9);
    }

    #[test]
    fn test_non_finite_query_fails() {
        let idx = one_hz(10);
        assert!(matches!(
            idx.sample_index_for_time(f64::NAN),
            Err(TimeError::OutOfRange(_))
        ));
        assert!(idx.sample_index_for_time(f64::INFINITY).is_err());
    }

    #[test]
    fn test_index_pair_is_ordered() {
        let idx = one_hz(100);
        let (i0, i1) = idx.index_pair_for_window(10.0, 40.0).unwrap();
        assert_eq!((i0, i1), (10, 40));
        assert!(i0 <= i1);
    }

    #[test]
    fn test_epoch_index() {
        let idx = one_hz(120);
        assert_eq!(idx.epoch_index_for_time(0.0, 30.0).unwrap(), 0);
        assert_eq!(idx.epoch_index_for_time(29.9, 30.0).unwrap(), 0);
        assert_eq!(idx.epoch_index_for_time(30.0, 30.0).unwrap(), 1);
        assert_eq!(idx.epoch_index_for_time(95.0, 30.0).unwrap(), 3);
        assert!(idx.epoch_index_for_time(5.0, 0.0).is_err());
    }

    #[test]
    fn test_sampling_interval() {
        let idx = TimeIndex::from_sampling(100, 256.0).unwrap();
        assert!((idx.sampling_interval() - 1.0 / 256.0).abs() < 1e-12);
        assert!((idx.duration() - 99.0 / 256.0).abs() < 1e-12);
    }
}
