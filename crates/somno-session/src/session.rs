//! Interactive scoring session
//!
//! Owns the loaded recording, the hypnogram store, the window model and
//! the view-sync parameters, and drives all of them from a single
//! `update` entry point. The outer shell feeds `SessionEvent`s in and
//! applies the returned `ViewUpdate`s; all cross-view consistency rules
//! live here, not in the widgets.

use somno_core::catalog::ConfigError;
use somno_core::config::SessionConfig;
use somno_core::hypnogram::HypnogramStore;
use somno_core::loader::Recording;

use crate::broadcast::{SpectrogramRequest, ViewSync, ViewTarget, ViewUpdate};
use crate::event::SessionEvent;
use crate::scoring::{ScoringController, ScoringPhase};
use crate::views::HypnogramTrack;
use crate::window::WindowModel;

/// Seconds of amplitude headroom added or removed per amplitude step
const AMPLITUDE_STEP: f32 = 2.5;

/// One loaded recording plus all interactive scoring state
#[derive(Debug)]
pub struct Session {
    recording: Recording,
    store: HypnogramStore,
    window: WindowModel,
    controller: ScoringController,
    track: HypnogramTrack,
    sync: ViewSync,
}

impl Session {
    /// Start a session over a loaded recording
    ///
    /// The state catalog is validated up front; a broken shortcut table
    /// aborts startup instead of surfacing during scoring. `hypnogram`
    /// values that fail validation fall back to a default-filled array.
    pub fn new(
        recording: Recording,
        hypnogram: Option<Vec<i16>>,
        config: &SessionConfig,
    ) -> Result<Self, ConfigError> {
        config.states.validate()?;
        let store = recording.attach_hypnogram(hypnogram, config.states.clone());
        let window = WindowModel::new(recording.time(), config);
        let track = HypnogramTrack::new(&store);
        let sync = ViewSync {
            scoring_indicator_visible: !config.lock_scoring_to_display,
            video_offset: config.video_offset,
            ..ViewSync::default()
        };
        Ok(Self {
            recording,
            store,
            window,
            controller: ScoringController::new(),
            track,
            sync,
        })
    }

    /// The loaded recording
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// The hypnogram store
    pub fn store(&self) -> &HypnogramStore {
        &self.store
    }

    /// The window model
    pub fn window(&self) -> &WindowModel {
        &self.window
    }

    /// The renderable hypnogram track
    pub fn track(&self) -> &HypnogramTrack {
        &self.track
    }

    /// The view-sync parameters
    pub fn sync(&self) -> &ViewSync {
        &self.sync
    }

    /// Handle one input event and return the view updates it produced
    pub fn update(&mut self, event: SessionEvent) -> Vec<ViewUpdate> {
        match event {
            SessionEvent::SliderMoved(value) => {
                self.window.set_slider_value(value);
                self.broadcast()
            }
            SessionEvent::Goto(t) => {
                self.window.goto(t);
                self.broadcast()
            }
            SessionEvent::DisplaySizeChanged(size) => {
                self.window.set_display(self.window.display_start(), size);
                self.broadcast()
            }
            SessionEvent::ScoringSizeChanged(size) => {
                self.window.set_scoring_size(size);
                self.sync.scoring_indicator_visible = true;
                self.broadcast()
            }
            SessionEvent::LockToggled(enabled) => {
                self.window.toggle_lock(enabled);
                // A locked scoring window is the display window; its bars
                // would only trace the display edges.
                self.sync.scoring_indicator_visible = !enabled;
                self.broadcast()
            }
            SessionEvent::NextWindow => {
                self.window.next_window();
                self.broadcast()
            }
            SessionEvent::PrevWindow => {
                self.window.prev_window();
                self.broadcast()
            }
            SessionEvent::MouseWheel(delta) => {
                let steps = delta.trunc();
                if steps == 0.0 {
                    return Vec::new();
                }
                self.window
                    .goto(self.window.display_start() + steps * self.window.page_step());
                self.broadcast()
            }
            SessionEvent::KeyPressed(key) => self.on_key(key),
            SessionEvent::MousePressed(t) => {
                self.controller.press(&mut self.window, t);
                self.sync.video_seek(t).into_iter().collect()
            }
            SessionEvent::MouseMoved(t) => {
                self.controller.drag(&mut self.window, t);
                if self.controller.phase() == ScoringPhase::DraggingScoring {
                    // Indicator and status only; video follows on release
                    self.sync
                        .scoring_refresh(&self.window, &self.store, self.recording.time())
                } else {
                    Vec::new()
                }
            }
            SessionEvent::MouseReleased => {
                self.controller.release(&mut self.window);
                let mut updates =
                    self.sync
                        .scoring_refresh(&self.window, &self.store, self.recording.time());
                let (s0, _) = self.window.current_scoring_bounds();
                updates.extend(self.sync.video_seek(s0));
                updates
            }
            SessionEvent::ZoomToggled(enabled) => {
                self.sync.zoom = enabled;
                self.broadcast()
            }
            SessionEvent::IndicatorsToggled(visible) => {
                self.sync.indicators_visible = visible;
                self.broadcast()
            }
            SessionEvent::ScoringIndicatorToggled(visible) => {
                self.sync.scoring_indicator_visible = visible;
                self.broadcast()
            }
            SessionEvent::AmplitudeStep(direction) => {
                self.step_amplitude(direction);
                self.broadcast()
            }
            SessionEvent::ResetHypnogram => {
                self.store.reset();
                self.track.set_data(&self.store);
                self.broadcast()
            }
            SessionEvent::HypnogramLoaded(values) => {
                if let Err(e) = self.store.bulk_replace(values) {
                    log::warn!("rejected loaded hypnogram ({}); resetting to default", e);
                    self.store.reset();
                }
                self.track.set_data(&self.store);
                self.broadcast()
            }
            SessionEvent::TimeUnitChanged(unit) => {
                self.sync.unit = unit;
                self.broadcast()
            }
            SessionEvent::AbsoluteTimeToggled(enabled) => {
                self.sync.absolute_time = enabled;
                self.broadcast()
            }
            SessionEvent::VideoDurationReported(duration) => {
                if duration.is_finite() && duration > 0.0 {
                    self.sync.video_duration = Some(duration);
                }
                Vec::new()
            }
        }
    }

    /// Explicit spectrogram recompute for one channel
    ///
    /// Never triggered by window moves; the transform is recomputed only
    /// on channel or parameter changes.
    pub fn request_spectrogram(&self, channel: usize) -> Option<SpectrogramRequest> {
        if channel >= self.recording.channel_count() {
            return None;
        }
        Some(SpectrogramRequest {
            channel,
            band: self.sync.spectrogram_band,
        })
    }

    /// Keyboard dispatch: navigation and view toggles take precedence
    /// over scoring shortcuts, which is why those keys are reserved at
    /// catalog validation.
    fn on_key(&mut self, key: char) -> Vec<ViewUpdate> {
        match key.to_ascii_lowercase() {
            'n' => {
                self.window.next_window();
                self.broadcast()
            }
            'b' => {
                self.window.prev_window();
                self.broadcast()
            }
            'z' => {
                self.sync.zoom = !self.sync.zoom;
                self.broadcast()
            }
            'i' => {
                self.sync.indicators_visible = !self.sync.indicators_visible;
                self.broadcast()
            }
            's' => vec![ViewUpdate::ViewToggled(ViewTarget::Spectrogram)],
            'h' => vec![ViewUpdate::ViewToggled(ViewTarget::Hypnogram)],
            'p' => vec![ViewUpdate::ViewToggled(ViewTarget::NavigationBar)],
            'x' => vec![ViewUpdate::ViewToggled(ViewTarget::TimeAxis)],
            'g' => vec![ViewUpdate::ViewToggled(ViewTarget::Grid)],
            '+' => {
                self.step_amplitude(1);
                self.broadcast()
            }
            '-' => {
                self.step_amplitude(-1);
                self.broadcast()
            }
            _ => self.on_scoring_key(key),
        }
    }

    fn on_scoring_key(&mut self, key: char) -> Vec<ViewUpdate> {
        match self.controller.handle_key(
            &mut self.window,
            &mut self.store,
            self.recording.time(),
            key,
        ) {
            Ok(Some(applied)) => {
                self.track
                    .set_state(applied.span.0, applied.span.1, applied.code, self.store.catalog());
                self.broadcast()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("scoring key `{}` failed: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Grow or shrink the shared amplitude limits symmetrically
    fn step_amplitude(&mut self, direction: i8) {
        let d = direction as f32 * AMPLITUDE_STEP;
        let (lo, hi) = self.sync.amplitude;
        let (lo, hi) = (lo - d, hi + d);
        // Never let the limits cross or collapse
        if lo < hi {
            self.sync.amplitude = (lo, hi);
        }
    }

    fn broadcast(&self) -> Vec<ViewUpdate> {
        self.sync
            .broadcast(&self.window, &self.store, self.recording.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::TimeUnit;

    fn recording(n: usize) -> Recording {
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Recording::new(
            Some(vec!["Cz".into(), "Fz".into()]),
            vec![vec![0.0; n], vec![0.0; n]],
            time,
            1.0,
        )
        .unwrap()
    }

    fn session(n: usize) -> Session {
        Session::new(recording(n), None, &SessionConfig::default()).unwrap()
    }

    fn has_status(updates: &[ViewUpdate]) -> bool {
        updates.iter().any(|u| matches!(u, ViewUpdate::Status { .. }))
    }

    #[test]
    fn test_keystroke_scoring_end_to_end() {
        // Locked 30 s window over a 100 s recording: pressing `2` labels
        // the first 30 samples N2 and pages forward.
        let mut s = session(100);
        let updates = s.update(SessionEvent::KeyPressed('2'));

        assert!(s.store().get_range(0, 30).iter().all(|&v| v == 2));
        assert!(s.store().values()[30..].iter().all(|&v| v == 0));
        assert_eq!(s.window().display_start(), 30.0);
        // Track follows the store without a full rebuild
        assert_eq!(s.track().ypos()[0], -4.0);
        assert_eq!(s.track().ypos()[30], -1.0);
        assert!(has_status(&updates));
        assert!(matches!(updates[0], ViewUpdate::Trace { .. }));
    }

    #[test]
    fn test_navigation_keys() {
        let mut s = session(1000);
        s.update(SessionEvent::KeyPressed('n'));
        s.update(SessionEvent::KeyPressed('n'));
        assert_eq!(s.window().display_start(), 60.0);
        s.update(SessionEvent::KeyPressed('b'));
        assert_eq!(s.window().display_start(), 30.0);
        // Navigation keys never touch the hypnogram
        assert!(s.store().values().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_view_toggle_keys_pass_through() {
        let mut s = session(100);
        assert_eq!(
            s.update(SessionEvent::KeyPressed('g')),
            vec![ViewUpdate::ViewToggled(ViewTarget::Grid)]
        );
        assert_eq!(
            s.update(SessionEvent::KeyPressed('h')),
            vec![ViewUpdate::ViewToggled(ViewTarget::Hypnogram)]
        );
        assert_eq!(s.window().display_start(), 0.0);
    }

    #[test]
    fn test_unknown_key_is_silent() {
        let mut s = session(100);
        assert!(s.update(SessionEvent::KeyPressed('q')).is_empty());
        assert!(s.store().values().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_drag_scoring_flow() {
        let mut s = session(1000);
        assert!(s.update(SessionEvent::MousePressed(12.0)).is_empty());
        // Sub-threshold motion: still a click, nothing to redraw
        assert!(s.update(SessionEvent::MouseMoved(12.02)).is_empty());

        let updates = s.update(SessionEvent::MouseMoved(18.0));
        assert!(matches!(
            updates[0],
            ViewUpdate::ScoringIndicator { start, end, .. } if start == 12.0 && end == 18.0
        ));

        // Label the dragged window, then release
        s.update(SessionEvent::KeyPressed('r'));
        assert!(s.store().get_range(12, 18).iter().all(|&v| v == 4));
        s.update(SessionEvent::MouseReleased);
        assert!(!s.window().gesture_pressed());
    }

    #[test]
    fn test_scoring_size_change_shows_indicator() {
        let mut s = session(1000);
        // Locked by default, so the bars start hidden
        assert!(!s.sync().scoring_indicator_visible);
        s.update(SessionEvent::ScoringSizeChanged(10.0));
        assert!(s.sync().scoring_indicator_visible);
        assert!(!s.window().locked());

        s.update(SessionEvent::LockToggled(true));
        assert!(!s.sync().scoring_indicator_visible);
        assert_eq!(s.window().scoring_size(), 30.0);
    }

    #[test]
    fn test_reset_and_load() {
        let mut s = session(100);
        s.update(SessionEvent::KeyPressed('3'));
        assert!(s.store().values()[..30].iter().all(|&v| v == 3));

        s.update(SessionEvent::ResetHypnogram);
        assert!(s.store().values().iter().all(|&v| v == 0));
        assert!(s.track().ypos().iter().all(|&y| y == -1.0));

        s.update(SessionEvent::HypnogramLoaded(vec![2; 100]));
        assert!(s.store().values().iter().all(|&v| v == 2));
        assert!(s.track().ypos().iter().all(|&y| y == -4.0));

        // A malformed load resets rather than half-applying
        s.update(SessionEvent::HypnogramLoaded(vec![99; 100]));
        assert!(s.store().values().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_amplitude_steps_never_cross() {
        let mut s = session(100);
        s.update(SessionEvent::AmplitudeStep(1));
        assert_eq!(s.sync().amplitude, (-52.5, 52.5));
        for _ in 0..100 {
            s.update(SessionEvent::AmplitudeStep(-1));
        }
        let (lo, hi) = s.sync().amplitude;
        assert!(lo < hi);
    }

    #[test]
    fn test_video_seek_after_duration_reported() {
        let mut s = session(1000);
        // No duration yet: nothing seeks
        let updates = s.update(SessionEvent::Goto(100.0));
        assert!(!updates.iter().any(|u| matches!(u, ViewUpdate::VideoSeek { .. })));

        s.update(SessionEvent::VideoDurationReported(3600.0));
        let updates = s.update(SessionEvent::Goto(200.0));
        assert!(updates
            .iter()
            .any(|u| matches!(u, ViewUpdate::VideoSeek { seconds } if *seconds == 200.0)));
    }

    #[test]
    fn test_wheel_navigation_moves_whole_pages() {
        let mut s = session(1000);
        assert!(s.update(SessionEvent::MouseWheel(0.4)).is_empty());
        s.update(SessionEvent::MouseWheel(2.7));
        assert_eq!(s.window().display_start(), 60.0);
        s.update(SessionEvent::MouseWheel(-1.0));
        assert_eq!(s.window().display_start(), 30.0);
    }

    #[test]
    fn test_time_unit_changes_status() {
        let mut s = session(1000);
        s.update(SessionEvent::Goto(600.0));
        let updates = s.update(SessionEvent::TimeUnitChanged(TimeUnit::Minutes));
        let status = updates
            .iter()
            .find_map(|u| match u {
                ViewUpdate::Status { text, .. } => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert!(status.contains("min"), "{}", status);
    }

    #[test]
    fn test_spectrogram_recompute_is_explicit() {
        let mut s = session(1000);
        let before = s.request_spectrogram(1);
        // Window moves never imply a recompute; the request is the same
        s.update(SessionEvent::NextWindow);
        assert_eq!(s.request_spectrogram(1), before);
        assert!(s.request_spectrogram(2).is_none());
    }

    #[test]
    fn test_invalid_catalog_aborts_startup() {
        let mut config = SessionConfig::default();
        let mut states = config.states.states().to_vec();
        states[0].shortcut = "n".into();
        config.states = serde_yaml::from_str(&serde_yaml::to_string(&states).unwrap()).unwrap();
        assert!(Session::new(recording(100), None, &config).is_err());
    }
}
