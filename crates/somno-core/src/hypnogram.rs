//! Hypnogram storage
//!
//! `HypnogramStore` owns the per-sample vigilance-state array and is the
//! single source of truth for scoring state. Writes are validated before
//! touching the backing array, so no failed operation ever leaves a
//! partially-written hypnogram. There is no undo history: the most
//! recent edit wins. An undo layer could wrap `set_range` later without
//! touching any caller.

use thiserror::Error;

use crate::catalog::StateCatalog;
use crate::time::{TimeIndex, TimeResult};

/// Errors raised by hypnogram writes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HypnogramError {
    /// Replacement array length differs from the recording length
    #[error("hypnogram length mismatch: expected {expected} samples, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// Label code not present in the state catalog
    #[error("unknown vigilance-state code: {0}")]
    InvalidLabel(i16),
}

/// Per-sample vigilance-state array plus its immutable state catalog
#[derive(Debug, Clone)]
pub struct HypnogramStore {
    values: Vec<i16>,
    catalog: StateCatalog,
}

impl HypnogramStore {
    /// Create a store filled with the catalog's default code
    pub fn new_default(n_samples: usize, catalog: StateCatalog) -> Self {
        let default = catalog.default_code();
        Self {
            values: vec![default; n_samples],
            catalog,
        }
    }

    /// Create a store from loader-supplied values, falling back to a
    /// default-filled array when the values are rejected
    ///
    /// Loader-facing policy: a malformed hypnogram is surfaced as a
    /// warning plus a safe fallback, never a partial apply.
    pub fn from_values_or_default(
        values: Vec<i16>,
        n_samples: usize,
        catalog: StateCatalog,
    ) -> Self {
        let mut store = Self::new_default(n_samples, catalog);
        if let Err(e) = store.bulk_replace(values) {
            log::warn!(
                "rejected loaded hypnogram ({}); using default-filled array (code {})",
                e,
                store.catalog.default_code()
            );
        }
        store
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the recording has no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The full per-sample label array
    pub fn values(&self) -> &[i16] {
        &self.values
    }

    /// The state catalog this store validates against
    pub fn catalog(&self) -> &StateCatalog {
        &self.catalog
    }

    /// Read-only slice of labels over `[i_start, i_end)`, clamped to bounds
    pub fn get_range(&self, i_start: usize, i_end: usize) -> &[i16] {
        let end = i_end.min(self.values.len());
        let start = i_start.min(end);
        &self.values[start..end]
    }

    /// Write `label` over the half-open range `[i_start, i_end)`
    ///
    /// Silent no-op when the range is empty; the end index is clamped to
    /// the array length. The label is validated before any sample is
    /// touched.
    pub fn set_range(&mut self, i_start: usize, i_end: usize, label: i16) -> Result<(), HypnogramError> {
        if !self.catalog.contains_code(label) {
            return Err(HypnogramError::InvalidLabel(label));
        }
        let end = i_end.min(self.values.len());
        if i_start >= end {
            return Ok(());
        }
        self.values[i_start..end].fill(label);
        log::debug!("set_range: samples [{}, {}) <- {}", i_start, end, label);
        Ok(())
    }

    /// Reset every sample to the catalog's default code
    ///
    /// Destructive; callers are expected to have confirmed with the user.
    pub fn reset(&mut self) {
        let default = self.catalog.default_code();
        self.values.fill(default);
        log::info!("hypnogram reset to default code {}", default);
    }

    /// Replace the whole array, all-or-nothing
    ///
    /// Fails with `ShapeMismatch` on a length difference and
    /// `InvalidLabel` on the first unknown code; in both cases the
    /// current array is left untouched.
    pub fn bulk_replace(&mut self, new_values: Vec<i16>) -> Result<(), HypnogramError> {
        if new_values.len() != self.values.len() {
            return Err(HypnogramError::ShapeMismatch {
                expected: self.values.len(),
                got: new_values.len(),
            });
        }
        if let Some(&bad) = new_values.iter().find(|v| !self.catalog.contains_code(**v)) {
            return Err(HypnogramError::InvalidLabel(bad));
        }
        self.values = new_values;
        Ok(())
    }

    /// Label at the sample closest to time `t`
    pub fn label_at_time(&self, t: f64, time: &TimeIndex) -> TimeResult<i16> {
        let i = time.sample_index_for_time(t)?;
        Ok(self.values[i.min(self.values.len() - 1)])
    }
}
