//=========================================================================
// Character Options
//=========================================================================
//
// Construction-time configuration of a character.
//
// Two entry points:
// - `CharacterOptions` fields and fluent setters (checked by the compiler)
// - `CharacterOptions::from_entries` for key/value input coming from
//   level files or scripts; unknown keys and mistyped values are rejected
//   with a `ConfigError` that names every offending key
//   (`Stage::create_character_from_entries` builds a character from them)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeSet;

//=== Internal Dependencies ===============================================

use crate::core::error::ConfigError;

//=== CharacterOptions ====================================================

/// Recognized construction options.
///
/// # Default Values
///
/// - **x, y**: 0.0
/// - **costume**: none (zero-sized, nothing drawn)
/// - **angle**: 0.0 degrees (facing right)
/// - **visible**: true
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterOptions {
    pub x: f64,
    pub y: f64,
    /// Asset name of the costume image, resolved against the asset root.
    pub costume: Option<String>,
    pub angle: f64,
    pub visible: bool,
}

impl CharacterOptions {
    /// Keys accepted by [`from_entries`](Self::from_entries).
    pub const KEYS: [&'static str; 5] = ["x", "y", "costume", "angle", "visible"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn costume(mut self, name: impl Into<String>) -> Self {
        self.costume = Some(name.into());
        self
    }

    pub fn angle(mut self, degrees: f64) -> Self {
        self.angle = degrees;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builds options from dynamic key/value pairs.
    ///
    /// Unknown keys are reported all at once, sorted, before any value is
    /// type-checked. Missing keys keep their defaults.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: Into<String>,
    {
        let entries: Vec<(String, OptionValue)> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let unknown: BTreeSet<&str> = entries
            .iter()
            .map(|(key, _)| key.as_str())
            .filter(|key| !Self::KEYS.contains(key))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownOptions {
                keys: unknown.into_iter().map(str::to_string).collect(),
            });
        }

        let mut options = Self::default();
        for (key, value) in entries {
            let rejected = match (key.as_str(), value) {
                ("x", OptionValue::Number(n)) => {
                    options.x = n;
                    None
                }
                ("y", OptionValue::Number(n)) => {
                    options.y = n;
                    None
                }
                ("angle", OptionValue::Number(n)) => {
                    options.angle = n;
                    None
                }
                ("costume", OptionValue::Text(name)) => {
                    options.costume = Some(name);
                    None
                }
                ("costume", OptionValue::None) => {
                    options.costume = None;
                    None
                }
                ("visible", OptionValue::Bool(b)) => {
                    options.visible = b;
                    None
                }
                ("costume", _) => Some("an asset name or none"),
                ("visible", _) => Some("a boolean"),
                _ => Some("a number"),
            };
            if let Some(expected) = rejected {
                return Err(ConfigError::InvalidValue { key, expected });
            }
        }
        Ok(options)
    }
}

impl Default for CharacterOptions {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            costume: None,
            angle: 0.0,
            visible: true,
        }
    }
}

//=== OptionValue =========================================================

/// Dynamically typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Text(String),
    Bool(bool),
    None,
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
