//! View-facing geometry computed from core state
//!
//! Nothing in here renders; these types produce the plain positions and
//! colors a renderer draws directly.

pub mod hypnogram;

pub use hypnogram::HypnogramTrack;
