//! Somno Core - Shared data layer for the somno sleep-scoring tools

pub mod catalog;
pub mod config;
pub mod hypnogram;
pub mod loader;
pub mod time;

pub use catalog::{ConfigError, StateCatalog, StateDef, RESERVED_SHORTCUTS};
pub use config::SessionConfig;
pub use hypnogram::{HypnogramError, HypnogramStore};
pub use loader::{LoaderError, Recording};
pub use time::{TimeError, TimeIndex, TimeResult};
