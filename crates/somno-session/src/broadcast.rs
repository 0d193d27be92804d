//! View synchronization fan-out
//!
//! Given a window-model snapshot and the hypnogram store, computes the
//! exact parameters each dependent view needs for one refresh: slice
//! bounds for the raw trace, indicator rectangles, the status summary
//! and the video seek target. Nothing here renders; every value is
//! plain geometry, color or text.
//!
//! Within one `broadcast` call the update order is fixed: raw trace,
//! then the hypnogram indicator, then the status text, so no view shows
//! a label inconsistent with the trace slice of the same refresh cycle.
//! No atomicity across views is promised beyond that ordering.

use somno_core::hypnogram::HypnogramStore;
use somno_core::time::TimeIndex;

use crate::window::WindowModel;

/// Axis-aligned rectangle handed to renderers (x, y, width, height)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Display unit for the time axis and status summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Seconds per unit
    pub fn factor(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
        }
    }

    /// Short label used in the status summary
    pub fn short(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "sec",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "hs",
        }
    }
}

/// Views a key press can toggle; forwarded to the renderer untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTarget {
    Spectrogram,
    Hypnogram,
    NavigationBar,
    TimeAxis,
    Grid,
}

/// One per-view parameter update, dispatched in order
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    /// Raw trace: sample slice of the display window plus amplitude limits
    Trace {
        slice: (usize, usize),
        amplitude: (f32, f32),
    },
    /// Scoring-window indicator bars over the signal views
    ScoringIndicator {
        start: f64,
        end: f64,
        bar_width: f64,
    },
    /// Display-window rectangle over the spectrogram
    SpectrogramIndicator { rect: Rect },
    /// Display-window rectangle over the hypnogram
    HypnogramIndicator { rect: Rect },
    /// Zoom mode: spectrogram camera follows the display window
    SpectrogramCamera { rect: Rect },
    /// Zoom mode: hypnogram camera follows the display window
    HypnogramCamera { rect: Rect },
    /// Zoom mode: time-axis camera follows the display window
    TimeAxisCamera { rect: Rect },
    /// Time-axis range and unit
    TimeAxis {
        start: f64,
        size: f64,
        unit: TimeUnit,
    },
    /// Status summary, colored by the current vigilance state
    Status { text: String, color: String },
    /// Highlight of the current state's label row (dense display rank)
    StateHighlight { rank: usize, color: String },
    /// Seek the external video player to this second
    VideoSeek { seconds: f64 },
    /// Renderer-side visibility toggle
    ViewToggled(ViewTarget),
}

/// Explicit spectrogram recompute request
///
/// Recomputing the transform is expensive; it is requested only on
/// explicit user action (channel/parameter change), never implicitly by
/// window moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramRequest {
    /// Channel to transform
    pub channel: usize,
    /// Frequency band of interest (Hz)
    pub band: (f64, f64),
}

/// View-sync parameters and fan-out
#[derive(Debug, Clone)]
pub struct ViewSync {
    /// Show the display-window indicators on spectrogram/hypnogram
    pub indicators_visible: bool,
    /// Show the scoring-window bars over the signal views
    pub scoring_indicator_visible: bool,
    /// Zoom mode: cameras follow the display window instead of indicators
    pub zoom: bool,
    /// Time-axis unit
    pub unit: TimeUnit,
    /// Show clock time instead of elapsed time in the status summary
    pub absolute_time: bool,
    /// Recording start as seconds since the Unix epoch (clock display)
    pub time_offset: f64,
    /// Shared per-channel amplitude limits for the raw trace
    pub amplitude: (f32, f32),
    /// Seconds added to scoring starts when seeking video
    pub video_offset: f64,
    /// Video duration when the player has reported one
    pub video_duration: Option<f64>,
    /// Spectrogram frequency band (Hz) for the indicator rectangle
    pub spectrogram_band: (f64, f64),
}

impl Default for ViewSync {
    fn default() -> Self {
        Self {
            indicators_visible: true,
            scoring_indicator_visible: false,
            zoom: false,
            unit: TimeUnit::Seconds,
            absolute_time: false,
            time_offset: 0.0,
            amplitude: (-50.0, 50.0),
            video_offset: 0.0,
            video_duration: None,
            spectrogram_band: (0.5, 20.0),
        }
    }
}

impl ViewSync {
    /// Compute one full refresh for every dependent view, in dispatch order
    pub fn broadcast(
        &self,
        window: &WindowModel,
        store: &HypnogramStore,
        time: &TimeIndex,
    ) -> Vec<ViewUpdate> {
        let mut updates = Vec::with_capacity(8);
        let (x0, x1) = window.display_window();
        let (s0, s1) = window.current_scoring_bounds();
        let n_states = store.catalog().len() as f64;

        // Raw trace first: every later view describes this slice
        let slice = time
            .index_pair_for_window(x0, x1)
            .unwrap_or((0, time.len() - 1));
        updates.push(ViewUpdate::Trace {
            slice,
            amplitude: self.amplitude,
        });

        if self.scoring_indicator_visible {
            updates.push(self.scoring_indicator(window));
        }

        if self.zoom {
            updates.push(ViewUpdate::SpectrogramCamera {
                rect: Rect {
                    x: x0,
                    y: self.spectrogram_band.0,
                    width: x1 - x0,
                    height: self.spectrogram_band.1 - self.spectrogram_band.0,
                },
            });
            updates.push(ViewUpdate::HypnogramCamera {
                rect: Rect {
                    x: x0,
                    y: -n_states,
                    width: x1 - x0,
                    height: n_states + 1.0,
                },
            });
            updates.push(ViewUpdate::TimeAxisCamera {
                rect: Rect {
                    x: x0,
                    y: 0.0,
                    width: window.display_size(),
                    height: 1.0,
                },
            });
        } else if self.indicators_visible {
            updates.push(ViewUpdate::SpectrogramIndicator {
                rect: Rect {
                    x: x0,
                    y: self.spectrogram_band.0,
                    width: x1 - x0,
                    height: self.spectrogram_band.1 - self.spectrogram_band.0,
                },
            });
            updates.push(ViewUpdate::HypnogramIndicator {
                rect: Rect {
                    x: x0,
                    y: -n_states,
                    width: x1 - x0,
                    height: n_states + 2.0,
                },
            });
        }

        updates.push(ViewUpdate::TimeAxis {
            start: x0,
            size: window.display_size(),
            unit: self.unit,
        });

        // Status text after the hypnogram indicator, per the ordering
        // guarantee
        let code = store
            .label_at_time(s0, time)
            .unwrap_or_else(|_| store.catalog().default_code());
        let color = self.state_color(store, code);
        updates.push(ViewUpdate::Status {
            text: self.format_status((x0, x1), (s0, s1), store, code),
            color: color.clone(),
        });
        if let Some(rank) = store.catalog().display_rank_of(code) {
            updates.push(ViewUpdate::StateHighlight { rank, color });
        }

        if let Some(seek) = self.video_seek(s0) {
            updates.push(seek);
        }

        updates
    }

    /// Partial refresh while a drag gesture reshapes the scoring window
    ///
    /// Video is deliberately not seeked here; live drags notify it only
    /// on release (debounced by event cadence, not by a timer).
    pub fn scoring_refresh(
        &self,
        window: &WindowModel,
        store: &HypnogramStore,
        time: &TimeIndex,
    ) -> Vec<ViewUpdate> {
        let (x0, x1) = window.display_window();
        let (s0, s1) = window.current_scoring_bounds();
        let code = store
            .label_at_time(s0, time)
            .unwrap_or_else(|_| store.catalog().default_code());
        vec![
            self.scoring_indicator(window),
            ViewUpdate::Status {
                text: self.format_status((x0, x1), (s0, s1), store, code),
                color: self.state_color(store, code),
            },
        ]
    }

    /// Scoring-window indicator bars
    fn scoring_indicator(&self, window: &WindowModel) -> ViewUpdate {
        let (s0, s1) = window.current_scoring_bounds();
        ViewUpdate::ScoringIndicator {
            start: s0,
            end: s1,
            bar_width: bar_width(window.display_size(), s1 - s0),
        }
    }

    /// Video seek command, gated on a reported duration containing the target
    pub fn video_seek(&self, scoring_start: f64) -> Option<ViewUpdate> {
        let duration = self.video_duration?;
        let seconds = scoring_start + self.video_offset;
        if (0.0..=duration).contains(&seconds) {
            Some(ViewUpdate::VideoSeek { seconds })
        } else {
            None
        }
    }

    fn state_color(&self, store: &HypnogramStore, code: i16) -> String {
        store
            .catalog()
            .state_for_code(code)
            .map(|s| s.color.clone())
            .unwrap_or_else(|| "#808080".to_string())
    }

    /// Window/scoring/state summary line
    fn format_status(
        &self,
        xlim: (f64, f64),
        xlim_scor: (f64, f64),
        store: &HypnogramStore,
        code: i16,
    ) -> String {
        let state = store
            .catalog()
            .state_for_code(code)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        if self.absolute_time {
            format!(
                "Window : [ {} ; {} ] || Scoring : [ {} ; {} ] || Vigilance state : {}",
                clock_time(self.time_offset + xlim.0),
                clock_time(self.time_offset + xlim.1),
                clock_time(self.time_offset + xlim_scor.0),
                clock_time(self.time_offset + xlim_scor.1),
                state
            )
        } else {
            let f = self.unit.factor();
            format!(
                "Window : [ {:.2} ; {:.2} ] {u} || Scoring : [ {:.2} ; {:.2} ] {u} || Vigilance state : {}",
                xlim.0 / f,
                xlim.1 / f,
                xlim_scor.0 / f,
                xlim_scor.1 / f,
                state,
                u = self.unit.short()
            )
        }
    }
}

/// Width of the scoring-window indicator bars
///
/// Constant apparent width as the display window resizes, shrinking for
/// very small scoring windows so the two bars never overlap.
pub fn bar_width(display_size: f64, scoring_len: f64) -> f64 {
    (display_size * 0.2 / 30.0).min((scoring_len / 2.0 - 0.05).max(0.05))
}

/// Clock time "hh:mm:ss.cc" from seconds since the Unix epoch
fn clock_time(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let centi = ((timestamp - secs) * 100.0).round() as u32;
    match chrono::DateTime::from_timestamp(secs as i64, 0) {
        Some(dt) => format!("{}.{:02}", dt.format("%H:%M:%S"), centi.min(99)),
        None => format!("{:.2}", timestamp),
    }
}
