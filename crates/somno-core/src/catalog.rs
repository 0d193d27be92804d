//! Vigilance-state catalog
//!
//! The catalog defines the recognized sleep/wake stages for a session:
//! name, numeric code, display color, top-to-bottom display rank and a
//! single-character scoring shortcut. It is loaded once (from the YAML
//! states config) and stays immutable for the whole session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Navigation and view-toggle keys that scoring shortcuts may not use
///
/// next / previous window, spectrogram, hypnogram, navigation bar,
/// time axis, grid, zoom, indicators.
pub const RESERVED_SHORTCUTS: [char; 9] = ['n', 'b', 's', 'h', 'p', 'x', 'g', 'z', 'i'];

/// Errors raised while validating a states configuration
///
/// All of these are fatal to session startup: a broken shortcut table
/// must never surface as a runtime failure during scoring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Catalog with no states at all
    #[error("states config must define at least one vigilance state")]
    EmptyCatalog,

    /// Two states share the same numeric code
    #[error("duplicate vigilance-state code: {0}")]
    DuplicateCode(i16),

    /// Shortcut is empty or longer than one character
    #[error("scoring shortcut for `{state}` must be a single character, got \"{shortcut}\"")]
    ShortcutNotSingleChar { state: String, shortcut: String },

    /// Two states share the same shortcut key
    #[error("duplicate scoring shortcut `{0}`")]
    DuplicateShortcut(char),

    /// Shortcut collides with a navigation/view-toggle key
    #[error("scoring shortcut `{0}` is reserved for navigation and view toggles")]
    ReservedShortcut(char),
}

/// One vigilance state definition
///
/// Field names mirror the on-disk states config (`value`,
/// `display_order`) so existing files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    /// Display name, e.g. "N2" or "Wake"
    pub name: String,
    /// Numeric code stored per sample in the hypnogram
    #[serde(rename = "value")]
    pub code: i16,
    /// Display color (hex string, passed through to renderers)
    pub color: String,
    /// Top-to-bottom position on the hypnogram track (0 = top)
    #[serde(rename = "display_order")]
    pub display_rank: u32,
    /// Single-character scoring shortcut
    pub shortcut: String,
}

/// Ordered, immutable set of vigilance states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCatalog {
    states: Vec<StateDef>,
}

impl StateCatalog {
    /// Build a catalog from explicit state definitions, validating the
    /// code and shortcut tables
    pub fn new(states: Vec<StateDef>) -> Result<Self, ConfigError> {
        let catalog = Self { states };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate codes and shortcuts; see `ConfigError` for the rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.states.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut codes: Vec<i16> = Vec::with_capacity(self.states.len());
        let mut keys: Vec<char> = Vec::with_capacity(self.states.len());
        for state in &self.states {
            if codes.contains(&state.code) {
                return Err(ConfigError::DuplicateCode(state.code));
            }
            codes.push(state.code);

            let mut chars = state.shortcut.chars();
            let key = match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_ascii_lowercase(),
                _ => {
                    return Err(ConfigError::ShortcutNotSingleChar {
                        state: state.name.clone(),
                        shortcut: state.shortcut.clone(),
                    })
                }
            };
            if RESERVED_SHORTCUTS.contains(&key) {
                return Err(ConfigError::ReservedShortcut(key));
            }
            if keys.contains(&key) {
                return Err(ConfigError::DuplicateShortcut(key));
            }
            keys.push(key);
        }
        Ok(())
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when the catalog holds no states (never after validation)
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All state definitions, in catalog order
    pub fn states(&self) -> &[StateDef] {
        &self.states
    }

    /// Whether `code` belongs to the catalog
    pub fn contains_code(&self, code: i16) -> bool {
        self.states.iter().any(|s| s.code == code)
    }

    /// Default label code: 0 when present, otherwise the minimum code
    pub fn default_code(&self) -> i16 {
        if self.contains_code(0) {
            0
        } else {
            self.states.iter().map(|s| s.code).min().unwrap_or(0)
        }
    }

    /// State definition for `code`
    pub fn state_for_code(&self, code: i16) -> Option<&StateDef> {
        self.states.iter().find(|s| s.code == code)
    }

    /// State (and its code) matching a scoring shortcut, case-insensitive
    pub fn state_for_shortcut(&self, key: char) -> Option<&StateDef> {
        let key = key.to_ascii_lowercase();
        self.states
            .iter()
            .find(|s| s.shortcut.chars().next().map(|c| c.to_ascii_lowercase()) == Some(key))
    }

    /// Dense display rank of `code`: 0 for the topmost state, counting down
    pub fn display_rank_of(&self, code: i16) -> Option<usize> {
        let state = self.state_for_code(code)?;
        let mut ranks: Vec<u32> = self.states.iter().map(|s| s.display_rank).collect();
        ranks.sort_unstable();
        ranks.iter().position(|&r| r == state.display_rank)
    }

    /// Display y-position of `code` on the hypnogram track
    ///
    /// 0.0 for the topmost state down to `-(n - 1)` for the bottom one.
    pub fn display_ypos(&self, code: i16) -> Option<f64> {
        self.display_rank_of(code).map(|rank| -(rank as f64))
    }

    /// Display color for `code` as RGBA floats, parsed from the hex string
    ///
    /// Unparsable colors fall back to opaque gray rather than failing a
    /// redraw.
    pub fn color_rgba(&self, code: i16) -> [f32; 4] {
        self.state_for_code(code)
            .and_then(|s| parse_hex_color(&s.color))
            .unwrap_or([0.5, 0.5, 0.5, 1.0])
    }
}

impl Default for StateCatalog {
    /// Default AASM-style catalog (Artefact, Wake, REM, N1, N2, N3)
    fn default() -> Self {
        let def = |name: &str, code: i16, color: &str, display_rank: u32, shortcut: &str| StateDef {
            name: name.to_string(),
            code,
            color: color.to_string(),
            display_rank,
            shortcut: shortcut.to_string(),
        };
        Self {
            states: vec![
                def("Art", -1, "#8bbf56", 0, "a"),
                def("Wake", 0, "#56bf8b", 1, "w"),
                def("REM", 4, "#bf5656", 2, "r"),
                def("N1", 1, "#aabcce", 3, "1"),
                def("N2", 2, "#405c79", 4, "2"),
                def("N3", 3, "#0b1c2c", 5, "3"),
            ],
        }
    }
}

/// Parse "#rrggbb" or "#rrggbbaa" into RGBA floats
fn parse_hex_color(color: &str) -> Option<[f32; 4]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let r = byte(0)? as f32 / 255.0;
    let g = byte(2)? as f32 / 255.0;
    let b = byte(4)? as f32 / 255.0;
    let a = if hex.len() == 8 {
        byte(6)? as f32 / 255.0
    } else {
        1.0
    };
    Some([r, g, b, a])
}
