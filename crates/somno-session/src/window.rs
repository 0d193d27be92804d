//! Window model
//!
//! Owns the three interdependent window values: the display window
//! (slider position + size), the scoring window (derived centered
//! sub-window, lockable to the display window, or an ad hoc
//! click-and-drag pair) and the derived current epoch. All widgets are
//! thin adapters over these setters; none of them holds its own copy of
//! the bounds.

use somno_core::config::SessionConfig;
use somno_core::time::{TimeIndex, TimeResult};

/// Minimum mouse displacement (seconds) for a drag to define a scoring window
pub const MIN_DRAG_SECONDS: f64 = 0.05;

/// Live click-and-drag pair: press position, then current drag position
#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    press: f64,
    drag: Option<f64>,
}

/// Shared notion of "current display window" and "current scoring window"
#[derive(Debug, Clone)]
pub struct WindowModel {
    t_min: f64,
    t_max: f64,
    /// Quantization step for display-window starts (seconds)
    slider_step: f64,
    /// Display start = t_min + slider_value * slider_step
    slider_value: i64,
    display_size: f64,
    scoring_size: f64,
    /// Seconds moved by next/previous-window navigation
    page_step: f64,
    locked: bool,
    gesture: Option<Gesture>,
}

impl WindowModel {
    /// Build a window model over a recording's time range
    pub fn new(time: &TimeIndex, config: &SessionConfig) -> Self {
        let t_min = time.t_min();
        let t_max = time.t_max();
        let total = t_max - t_min;
        let display_size = clamp_size(config.display_window, total);
        let locked = config.lock_scoring_to_display;
        let scoring_size = if locked {
            display_size
        } else {
            clamp_size(config.scoring_window, display_size)
        };
        Self {
            t_min,
            t_max,
            slider_step: if config.slider_step > 0.0 { config.slider_step } else { 1.0 },
            slider_value: 0,
            display_size,
            scoring_size,
            page_step: scoring_size,
            locked,
            gesture: None,
        }
    }

    // =====================================================================
    // Display window
    // =====================================================================

    /// Largest slider value keeping the display window inside the recording
    fn slider_max(&self) -> i64 {
        let max_start = (self.t_max - self.display_size).max(self.t_min);
        (((max_start - self.t_min) / self.slider_step).floor() as i64).max(0)
    }

    /// Current slider value
    pub fn slider_value(&self) -> i64 {
        self.slider_value
    }

    /// Move the slider directly (clamped)
    pub fn set_slider_value(&mut self, value: i64) {
        self.slider_value = value.clamp(0, self.slider_max());
    }

    /// Display window start (seconds); always a multiple of the slider step
    pub fn display_start(&self) -> f64 {
        self.t_min + self.slider_value as f64 * self.slider_step
    }

    /// Display window size (seconds)
    pub fn display_size(&self) -> f64 {
        self.display_size
    }

    /// Display window as (start, end)
    pub fn display_window(&self) -> (f64, f64) {
        let start = self.display_start();
        (start, start + self.display_size)
    }

    /// Set display position and size
    ///
    /// Size is clamped to `(0, total_duration]`, the start to
    /// `[t_min, t_max - size]` and quantized to the slider step. In lock
    /// mode the scoring window follows the display size.
    pub fn set_display(&mut self, start: f64, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.display_size = clamp_size(size, self.t_max - self.t_min);
        }
        if self.locked {
            self.scoring_size = self.display_size;
            self.page_step = self.display_size;
        } else if self.scoring_size > self.display_size {
            self.scoring_size = self.display_size;
        }
        let start = if start.is_finite() { start } else { self.t_min };
        let value = ((start - self.t_min) / self.slider_step).round() as i64;
        self.slider_value = value.clamp(0, self.slider_max());
    }

    /// Move the display window, keeping its size
    pub fn goto(&mut self, start: f64) {
        self.set_display(start, self.display_size);
    }

    /// Advance to the next window (one page step forward)
    pub fn next_window(&mut self) {
        self.goto(self.display_start() + self.page_step);
    }

    /// Go back one page step
    pub fn prev_window(&mut self) {
        self.goto(self.display_start() - self.page_step);
    }

    /// Seconds moved per navigation step (follows scoring size when
    /// unlocked, display size when locked)
    pub fn page_step(&self) -> f64 {
        self.page_step
    }

    // =====================================================================
    // Scoring window
    // =====================================================================

    /// Scoring window size (seconds)
    pub fn scoring_size(&self) -> f64 {
        self.scoring_size
    }

    /// Whether the scoring window is locked to the display window
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Set the scoring window size
    ///
    /// Clamped to `(0, display_size]`. Explicitly resizing the scoring
    /// window always unlocks it from the display window.
    pub fn set_scoring_size(&mut self, size: f64) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        self.scoring_size = clamp_size(size, self.display_size);
        self.locked = false;
        self.page_step = self.scoring_size;
    }

    /// Lock or unlock the scoring window
    ///
    /// Locking forces the scoring size to the display size; unlocking
    /// leaves it independently adjustable from its last value.
    pub fn toggle_lock(&mut self, enabled: bool) {
        self.locked = enabled;
        if enabled {
            self.scoring_size = self.display_size;
            self.page_step = self.display_size;
        }
    }

    /// Derived scoring window: centered in the display window, clamped
    /// to its bounds
    fn derived_scoring_bounds(&self) -> (f64, f64) {
        let (x0, x1) = self.display_window();
        let half = x0 + (x1 - x0) / 2.0;
        (
            (half - self.scoring_size / 2.0).max(x0),
            (half + self.scoring_size / 2.0).min(x1),
        )
    }

    /// Current scoring window: the ad hoc drag pair when a gesture is
    /// active, otherwise the derived centered window
    pub fn current_scoring_bounds(&self) -> (f64, f64) {
        self.ad_hoc_bounds().unwrap_or_else(|| self.derived_scoring_bounds())
    }

    /// Sample index at the scoring-window start
    ///
    /// The label shown for "the state currently being scored" is read at
    /// the leading edge of the scoring window, not its midpoint.
    pub fn current_epoch_start_index(&self, time: &TimeIndex) -> TimeResult<usize> {
        time.sample_index_for_time(self.current_scoring_bounds().0)
    }

    // =====================================================================
    // Click-and-drag gesture
    // =====================================================================

    /// Start an ad hoc scoring gesture at cursor time `t`
    pub fn begin_gesture(&mut self, t: f64) {
        self.gesture = Some(Gesture { press: t, drag: None });
    }

    /// Update the drag end of a live gesture
    pub fn extend_gesture(&mut self, t: f64) {
        if let Some(g) = &mut self.gesture {
            g.drag = Some(t);
        }
    }

    /// Clear the gesture, reverting to the derived scoring window
    ///
    /// For a gesture that never exceeded the drag threshold this is the
    /// sole effect (a plain click, not a scoring action).
    pub fn end_gesture(&mut self) {
        self.gesture = None;
    }

    /// Whether a mouse press is currently held
    pub fn gesture_pressed(&self) -> bool {
        self.gesture.is_some()
    }

    /// Normalized ad hoc scoring bounds, present once the drag exceeds
    /// the minimum threshold
    pub fn ad_hoc_bounds(&self) -> Option<(f64, f64)> {
        let g = self.gesture?;
        let drag = g.drag?;
        let (a, b) = if drag < g.press {
            (drag, g.press)
        } else {
            (g.press, drag)
        };
        if b - a > MIN_DRAG_SECONDS {
            Some((a, b))
        } else {
            None
        }
    }

    /// Whether an ad hoc scoring window is currently defined
    pub fn gesture_active(&self) -> bool {
        self.ad_hoc_bounds().is_some()
    }
}

fn clamp_size(size: f64, max: f64) -> f64 {
    if !size.is_finite() || size <= 0.0 {
        max
    } else {
        size.min(max)
    }
}
