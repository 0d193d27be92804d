//! Hypnogram track geometry
//!
//! Per-sample polyline for the hypnogram view: a y-position (state
//! display rank, 0 at the top) and an RGBA color per sample. Scoring
//! edits update only the touched span instead of rebuilding the whole
//! track.

use somno_core::catalog::StateCatalog;
use somno_core::hypnogram::HypnogramStore;
use somno_core::time::TimeIndex;

use crate::broadcast::Rect;

/// Renderable per-sample hypnogram polyline
#[derive(Debug, Clone)]
pub struct HypnogramTrack {
    ypos: Vec<f32>,
    colors: Vec<[f32; 4]>,
}

impl HypnogramTrack {
    /// Build the full track from the current store contents
    pub fn new(store: &HypnogramStore) -> Self {
        let mut track = Self {
            ypos: Vec::new(),
            colors: Vec::new(),
        };
        track.set_data(store);
        track
    }

    /// Rebuild every sample (hypnogram load, clean/reset)
    pub fn set_data(&mut self, store: &HypnogramStore) {
        let catalog = store.catalog();
        self.ypos = store
            .values()
            .iter()
            .map(|&v| catalog.display_ypos(v).unwrap_or(0.0) as f32)
            .collect();
        self.colors = store.values().iter().map(|&v| catalog.color_rgba(v)).collect();
    }

    /// Update only the half-open span `[i_start, i_end)` after a range write
    pub fn set_state(&mut self, i_start: usize, i_end: usize, code: i16, catalog: &StateCatalog) {
        let end = i_end.min(self.ypos.len());
        if i_start >= end {
            return;
        }
        let y = catalog.display_ypos(code).unwrap_or(0.0) as f32;
        let color = catalog.color_rgba(code);
        self.ypos[i_start..end].fill(y);
        self.colors[i_start..end].fill(color);
    }

    /// Number of samples on the track
    pub fn len(&self) -> usize {
        self.ypos.len()
    }

    /// True for an empty (never-loaded) track
    pub fn is_empty(&self) -> bool {
        self.ypos.is_empty()
    }

    /// Per-sample display y-positions (0 at the top state, negative below)
    pub fn ypos(&self) -> &[f32] {
        &self.ypos
    }

    /// Per-sample RGBA colors
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// Whole-recording camera rectangle for the hypnogram view
    pub fn camera_rect(time: &TimeIndex, catalog: &StateCatalog) -> Rect {
        let n = catalog.len() as f64;
        Rect {
            x: time.t_min(),
            y: -n,
            width: time.duration(),
            height: n + 1.0,
        }
    }

    /// Grid spacing scale for a given window length (seconds)
    pub fn grid_scale(time: &TimeIndex, window_seconds: f64) -> (f64, f64) {
        (window_seconds * time.t_max() / time.len() as f64, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somno_core::catalog::StateCatalog;
    use somno_core::hypnogram::HypnogramStore;
    use somno_core::time::TimeIndex;

    #[test]
    fn test_track_follows_store() {
        let catalog = StateCatalog::default();
        let mut store = HypnogramStore::new_default(100, catalog.clone());
        store.set_range(10, 20, 4).unwrap();
        let track = HypnogramTrack::new(&store);
        assert_eq!(track.len(), 100);
        // Wake rank is -1, REM rank -2 in the default catalog
        assert_eq!(track.ypos()[0], -1.0);
        assert_eq!(track.ypos()[15], -2.0);
        assert_eq!(track.colors()[15], catalog.color_rgba(4));
    }

    #[test]
    fn test_set_state_partial_update() {
        let catalog = StateCatalog::default();
        let store = HypnogramStore::new_default(50, catalog.clone());
        let mut track = HypnogramTrack::new(&store);

        track.set_state(5, 10, 2, &catalog);
        assert_eq!(track.ypos()[4], -1.0);
        assert_eq!(track.ypos()[5], -4.0); // N2 rank
        assert_eq!(track.ypos()[9], -4.0);
        assert_eq!(track.ypos()[10], -1.0); // half-open: untouched

        // Empty span is a no-op; end is clamped
        track.set_state(20, 20, 3, &catalog);
        track.set_state(48, 500, 3, &catalog);
        assert_eq!(track.ypos()[20], -1.0);
        assert_eq!(track.ypos()[49], -5.0);
    }

    #[test]
    fn test_camera_rect_spans_recording_and_states() {
        let time = TimeIndex::from_sampling(100, 1.0).unwrap();
        let catalog = StateCatalog::default();
        let rect = HypnogramTrack::camera_rect(&time, &catalog);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, -6.0);
        assert_eq!(rect.width, 99.0);
        assert_eq!(rect.height, 7.0);
    }
}
