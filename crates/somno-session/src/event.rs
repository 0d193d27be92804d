//! Session events
//!
//! One flat enum for everything the outer shell can feed into a
//! session: slider and keyboard navigation, mouse scoring gestures,
//! view toggles and hypnogram-level actions. The shell translates raw
//! input into these and applies the returned view updates; it never
//! mutates session state directly.

use crate::broadcast::TimeUnit;

/// Input event handled by [`Session::update`](crate::session::Session::update)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Navigation slider moved to a new quantized position
    SliderMoved(i64),
    /// Jump the display window to an absolute start time (seconds)
    Goto(f64),
    /// Display-window size changed (seconds)
    DisplaySizeChanged(f64),
    /// Scoring-window size changed (seconds); unlocks it from the display
    ScoringSizeChanged(f64),
    /// Lock or unlock the scoring window to the display window
    LockToggled(bool),
    /// Advance one page step
    NextWindow,
    /// Go back one page step
    PrevWindow,
    /// Scroll-wheel navigation, in wheel notches
    MouseWheel(f64),
    /// Keyboard input: navigation, view toggles or a scoring shortcut
    KeyPressed(char),
    /// Mouse press over a signal view at cursor time (seconds)
    MousePressed(f64),
    /// Mouse motion at cursor time while pressed
    MouseMoved(f64),
    /// Mouse release, ending any gesture
    MouseReleased,
    /// Zoom mode on/off (cameras follow the display window)
    ZoomToggled(bool),
    /// Display-window indicators on/off
    IndicatorsToggled(bool),
    /// Scoring-window indicator bars on/off
    ScoringIndicatorToggled(bool),
    /// Grow (+1) or shrink (-1) the shared trace amplitude limits
    AmplitudeStep(i8),
    /// Reset the whole hypnogram to the default state
    ResetHypnogram,
    /// Replace the hypnogram with loaded values
    HypnogramLoaded(Vec<i16>),
    /// Time-axis display unit changed
    TimeUnitChanged(TimeUnit),
    /// Show clock time instead of elapsed time
    AbsoluteTimeToggled(bool),
    /// External video player reported its duration (seconds)
    VideoDurationReported(f64),
}
