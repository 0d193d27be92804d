//! Somno Session - Window synchronization, interactive scoring and view fan-out

pub mod broadcast;
pub mod event;
pub mod scoring;
pub mod session;
pub mod views;
pub mod window;

pub use broadcast::{Rect, SpectrogramRequest, TimeUnit, ViewSync, ViewTarget, ViewUpdate};
pub use event::SessionEvent;
pub use scoring::{AppliedLabel, ScoringController, ScoringError, ScoringPhase};
pub use session::Session;
pub use views::HypnogramTrack;
pub use window::{WindowModel, MIN_DRAG_SECONDS};
