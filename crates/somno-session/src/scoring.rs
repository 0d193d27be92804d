//! Interactive scoring state machine
//!
//! Drives hypnogram edits from two input modes: discrete keystroke
//! scoring (apply a label to the whole current scoring window) and
//! click-and-drag scoring (an ad hoc window drawn with the mouse).
//! After every applied label the display window advances so the next
//! derived scoring window starts exactly where this one ended, enabling
//! contiguous sequential scoring.

use thiserror::Error;

use somno_core::hypnogram::{HypnogramError, HypnogramStore};
use somno_core::time::{TimeError, TimeIndex};

use crate::window::WindowModel;

/// Errors surfaced by a label write
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Hypnogram(#[from] HypnogramError),
}

/// Mouse-gesture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringPhase {
    /// No gesture in progress
    #[default]
    Idle,
    /// Mouse down, not yet dragged past the threshold
    PressedUndetermined,
    /// Active drag defining an ad hoc scoring window
    DraggingScoring,
}

/// Outcome of a successful label write, for partial view updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedLabel {
    /// Written vigilance-state code
    pub code: i16,
    /// Half-open sample span that was overwritten
    pub span: (usize, usize),
    /// Display-window start after the auto-advance
    pub next_start: f64,
}

/// State machine for interactive hypnogram edits
#[derive(Debug, Default)]
pub struct ScoringController {
    phase: ScoringPhase,
}

impl ScoringController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture phase
    pub fn phase(&self) -> ScoringPhase {
        self.phase
    }

    /// Mouse press at cursor time `t`
    pub fn press(&mut self, window: &mut WindowModel, t: f64) {
        window.begin_gesture(t);
        self.phase = ScoringPhase::PressedUndetermined;
    }

    /// Mouse motion to cursor time `t` while pressed
    pub fn drag(&mut self, window: &mut WindowModel, t: f64) {
        if self.phase == ScoringPhase::Idle {
            return;
        }
        window.extend_gesture(t);
        if window.gesture_active() {
            self.phase = ScoringPhase::DraggingScoring;
        }
    }

    /// Mouse release: clears the ad hoc window, reverting to the derived
    /// scoring window; a sub-threshold drag is a plain click
    pub fn release(&mut self, window: &mut WindowModel) {
        window.end_gesture();
        self.phase = ScoringPhase::Idle;
    }

    /// Apply `code` to the current scoring window, then auto-advance
    ///
    /// The next display start is chosen so the next derived scoring
    /// window begins exactly where this one ended; with the scoring
    /// window locked to the display window this degenerates to plain
    /// paging. The write itself is validated before mutating anything.
    pub fn apply_label(
        &mut self,
        window: &mut WindowModel,
        store: &mut HypnogramStore,
        time: &TimeIndex,
        code: i16,
    ) -> Result<AppliedLabel, ScoringError> {
        let (start, end) = window.current_scoring_bounds();
        let (i_start, i_end) = time.index_pair_for_window(start, end)?;
        store.set_range(i_start, i_end, code)?;

        // Advance so the next scoring window starts where this one ended
        let next_start = end - (window.display_size() - window.scoring_size()) / 2.0;
        window.goto(next_start);

        if let Some(state) = store.catalog().state_for_code(code) {
            log::info!("`{}` vigilance state inserted ({})", state.name, code);
        }

        Ok(AppliedLabel {
            code,
            span: (i_start, i_end),
            next_start: window.display_start(),
        })
    }

    /// Keystroke dispatch against the catalog's scoring shortcuts
    ///
    /// Unknown keys are ignored (no matching transition); reserved keys
    /// were rejected at configuration load and never reach the catalog.
    pub fn handle_key(
        &mut self,
        window: &mut WindowModel,
        store: &mut HypnogramStore,
        time: &TimeIndex,
        key: char,
    ) -> Result<Option<AppliedLabel>, ScoringError> {
        let code = match store.catalog().state_for_shortcut(key) {
            Some(state) => state.code,
            None => return Ok(None),
        };
        self.apply_label(window, store, time, code).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somno_core::catalog::StateCatalog;
    use somno_core::config::SessionConfig;
    use somno_core::time::TimeIndex;

    fn fixture(n: usize, display: f64, scoring: f64, locked: bool) -> (TimeIndex, WindowModel, HypnogramStore) {
        let time = TimeIndex::from_sampling(n, 1.0).unwrap();
        let config = SessionConfig {
            display_window: display,
            scoring_window: scoring,
            lock_scoring_to_display: locked,
            ..SessionConfig::default()
        };
        let window = WindowModel::new(&time, &config);
        let store = HypnogramStore::new_default(n, StateCatalog::default());
        (time, window, store)
    }

    #[test]
    fn test_locked_scoring_scenario() {
        // N=100 at 1 Hz, display (0, 30), locked: apply N2 writes
        // values[0..30] and pages to start 30.
        let (time, mut window, mut store) = fixture(100, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();

        let applied = ctl.apply_label(&mut window, &mut store, &time, 2).unwrap();
        assert_eq!(applied.span, (0, 30));
        assert!(store.get_range(0, 30).iter().all(|&v| v == 2));
        assert!(store.values()[30..].iter().all(|&v| v == 0));
        assert_eq!(window.display_start(), 30.0);
        assert_eq!(applied.next_start, 30.0);
    }

    #[test]
    fn test_advance_keeps_scoring_contiguous() {
        // Scoring 10 s inside a 30 s display: consecutive labels must
        // tile the hypnogram without gap or overlap.
        let (time, mut window, mut store) = fixture(1000, 30.0, 10.0, false);
        let mut ctl = ScoringController::new();

        let first = ctl.apply_label(&mut window, &mut store, &time, 1).unwrap();
        let (s, _) = window.current_scoring_bounds();
        assert_eq!(time.get(first.span.1).unwrap(), s);

        let second = ctl.apply_label(&mut window, &mut store, &time, 2).unwrap();
        assert_eq!(first.span.1, second.span.0);
    }

    #[test]
    fn test_apply_label_is_idempotent() {
        let (time, mut window, mut store) = fixture(100, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();

        ctl.apply_label(&mut window, &mut store, &time, 2).unwrap();
        let once = store.values().to_vec();
        // Re-apply with the same bounds
        window.goto(0.0);
        ctl.apply_label(&mut window, &mut store, &time, 2).unwrap();
        assert_eq!(store.values(), once.as_slice());
    }

    #[test]
    fn test_gesture_round_trip_leaves_values_untouched() {
        let (_time, mut window, store) = fixture(1000, 30.0, 30.0, true);
        let before = store.values().to_vec();
        let mut ctl = ScoringController::new();

        ctl.press(&mut window, 5.0);
        assert_eq!(ctl.phase(), ScoringPhase::PressedUndetermined);
        ctl.drag(&mut window, 5.02); // below threshold
        assert_eq!(ctl.phase(), ScoringPhase::PressedUndetermined);
        ctl.release(&mut window);
        assert_eq!(ctl.phase(), ScoringPhase::Idle);
        assert!(!window.gesture_active());
        assert_eq!(store.values(), before.as_slice());
    }

    #[test]
    fn test_drag_scoring_writes_ad_hoc_window() {
        let (time, mut window, mut store) = fixture(1000, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();

        ctl.press(&mut window, 12.0);
        ctl.drag(&mut window, 18.0);
        assert_eq!(ctl.phase(), ScoringPhase::DraggingScoring);

        let applied = ctl.apply_label(&mut window, &mut store, &time, 4).unwrap();
        assert_eq!(applied.span, (12, 18));
        assert!(store.get_range(12, 18).iter().all(|&v| v == 4));
        assert_eq!(store.values()[18], 0);

        ctl.release(&mut window);
        assert_eq!(ctl.phase(), ScoringPhase::Idle);
    }

    #[test]
    fn test_unknown_shortcut_is_ignored() {
        let (time, mut window, mut store) = fixture(100, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();
        let before = store.values().to_vec();

        assert_eq!(ctl.handle_key(&mut window, &mut store, &time, 'q').unwrap(), None);
        assert_eq!(store.values(), before.as_slice());
        assert_eq!(window.display_start(), 0.0);
    }

    #[test]
    fn test_shortcut_applies_catalog_state() {
        let (time, mut window, mut store) = fixture(100, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();

        let applied = ctl.handle_key(&mut window, &mut store, &time, 'R').unwrap().unwrap();
        assert_eq!(applied.code, 4); // REM
        assert!(store.get_range(0, 30).iter().all(|&v| v == 4));
    }

    #[test]
    fn test_invalid_code_leaves_window_in_place() {
        let (time, mut window, mut store) = fixture(100, 30.0, 30.0, true);
        let mut ctl = ScoringController::new();

        let err = ctl.apply_label(&mut window, &mut store, &time, 42).unwrap_err();
        assert_eq!(err, ScoringError::Hypnogram(HypnogramError::InvalidLabel(42)));
        assert_eq!(window.display_start(), 0.0);
        assert!(store.values().iter().all(|&v| v == 0));
    }
}
