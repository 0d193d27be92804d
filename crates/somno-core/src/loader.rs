//! Recording loader contract
//!
//! File-format parsing lives outside the core; a loader hands over the
//! time vector, the channels-by-samples data matrix and the sampling
//! frequency, and this module validates the shapes once so every view
//! downstream can index without re-checking.

use thiserror::Error;

use crate::catalog::StateCatalog;
use crate::hypnogram::HypnogramStore;
use crate::time::{TimeError, TimeIndex};

/// Errors raised while assembling a loaded recording
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Channel data rows must all match the time-vector length
    #[error("channel `{channel}` has {got} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: String,
        got: usize,
        expected: usize,
    },

    /// Loader supplied no channels at all
    #[error("recording must contain at least one channel")]
    NoChannels,

    /// Invalid time vector
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// A loaded multi-channel recording, read-only input to every view
#[derive(Debug, Clone)]
pub struct Recording {
    channels: Vec<String>,
    data: Vec<Vec<f32>>,
    time: TimeIndex,
    sampling_frequency: f64,
}

impl Recording {
    /// Assemble a recording from loader-supplied arrays
    ///
    /// `data` is channels-by-samples. A missing or wrong-length channel
    /// name list is replaced by `chan0..chanN` defaults with a warning;
    /// a wrong-length data row is an error.
    pub fn new(
        channel_names: Option<Vec<String>>,
        data: Vec<Vec<f32>>,
        time: Vec<f64>,
        sampling_frequency: f64,
    ) -> Result<Self, LoaderError> {
        if data.is_empty() {
            return Err(LoaderError::NoChannels);
        }
        let time = TimeIndex::new(time)?;

        let channels = match channel_names {
            Some(names) if names.len() == data.len() => names,
            other => {
                if other.is_some() {
                    log::warn!(
                        "channel name count does not match {} data rows; using defaults",
                        data.len()
                    );
                }
                (0..data.len()).map(|k| format!("chan{}", k)).collect()
            }
        };

        for (name, row) in channels.iter().zip(&data) {
            if row.len() != time.len() {
                return Err(LoaderError::ChannelLengthMismatch {
                    channel: name.clone(),
                    got: row.len(),
                    expected: time.len(),
                });
            }
        }

        Ok(Self {
            channels,
            data,
            time,
            sampling_frequency,
        })
    }

    /// Channel names, in data order
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    /// Raw samples for channel `ch`
    pub fn channel_data(&self, ch: usize) -> Option<&[f32]> {
        self.data.get(ch).map(|row| row.as_slice())
    }

    /// The shared time index
    pub fn time(&self) -> &TimeIndex {
        &self.time
    }

    /// Sampling frequency after any downsampling (Hz)
    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Attach a hypnogram to this recording
    ///
    /// `values` of `None` or the wrong shape/codes yields a
    /// default-filled store (reject-all-or-default, never partial).
    pub fn attach_hypnogram(
        &self,
        values: Option<Vec<i16>>,
        catalog: StateCatalog,
    ) -> HypnogramStore {
        match values {
            Some(v) => HypnogramStore::from_values_or_default(v, self.time.len(), catalog),
            None => HypnogramStore::new_default(self.time.len(), catalog),
        }
    }
}
