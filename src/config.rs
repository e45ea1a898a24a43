//! Control configuration
//!
//! Behavior knobs a control accepts at construction. Visual parameters are
//! the presentation layer's business and do not live here.
//!
//! Can be loaded from TOML; every field is optional:
//!
//! ```toml
//! activation_keys = ["Space", "Enter"]
//! trigger_on_press = false
//! press_feedback_ms = 100
//! keyboard_mode_only = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{FocusError, Result};
use crate::state::keyboard::Key;

/// Longest pressed-visual hold after a keyboard activation.
pub const MAX_PRESS_FEEDBACK_MS: u64 = 60_000;

/// Per-control behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Keys that fire the action while the control is focused.
    pub activation_keys: Vec<Key>,
    /// Fire the action on button-down instead of on release inside.
    pub trigger_on_press: bool,
    /// How long the pressed visual stays on after a keyboard activation.
    pub press_feedback_ms: u64,
    /// Join the key-view loop only while in keyboard mode.
    pub keyboard_mode_only: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            activation_keys: vec![Key::Space, Key::Enter],
            trigger_on_press: false,
            press_feedback_ms: 100,
            keyboard_mode_only: true,
        }
    }
}

impl ControlConfig {
    /// Press feedback hold, capped at [`MAX_PRESS_FEEDBACK_MS`].
    pub fn press_feedback(&self) -> Duration {
        Duration::from_millis(self.press_feedback_ms.min(MAX_PRESS_FEEDBACK_MS))
    }

    pub fn with_trigger_on_press(mut self, trigger_on_press: bool) -> Self {
        self.trigger_on_press = trigger_on_press;
        self
    }

    pub fn with_activation_keys(mut self, keys: Vec<Key>) -> Self {
        self.activation_keys = keys;
        self
    }

    pub fn with_keyboard_mode_only(mut self, keyboard_mode_only: bool) -> Self {
        self.keyboard_mode_only = keyboard_mode_only;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(FocusError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be honored.
    pub fn validate(&self) -> Result<()> {
        if self.press_feedback_ms > MAX_PRESS_FEEDBACK_MS {
            return Err(FocusError::ConfigInvalid {
                field: "press_feedback_ms",
                reason: format!(
                    "{} exceeds the maximum of {} ms",
                    self.press_feedback_ms, MAX_PRESS_FEEDBACK_MS
                ),
            });
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(FocusError::ConfigRead)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(?path, "Loaded control config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControlConfig::default();
        assert_eq!(config.activation_keys, vec![Key::Space, Key::Enter]);
        assert!(!config.trigger_on_press);
        assert_eq!(config.press_feedback(), Duration::from_millis(100));
        assert!(config.keyboard_mode_only);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(ControlConfig::from_toml_str("").unwrap(), ControlConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ControlConfig::from_toml_str(
            r#"
            activation_keys = ["Enter"]
            trigger_on_press = true
            "#,
        )
        .unwrap();
        assert_eq!(config.activation_keys, vec![Key::Enter]);
        assert!(config.trigger_on_press);
        assert_eq!(config.press_feedback_ms, 100);
    }

    #[test]
    fn test_char_activation_key() {
        let config = ControlConfig::from_toml_str(r#"activation_keys = [{ Char = "k" }, "Space"]"#)
            .unwrap();
        assert_eq!(config.activation_keys, vec![Key::Char('k'), Key::Space]);
    }

    #[test]
    fn test_parse_error() {
        let err = ControlConfig::from_toml_str("trigger_on_press = \"yes\"").unwrap_err();
        assert!(matches!(err, FocusError::ConfigParse(_)));
    }

    #[test]
    fn test_huge_press_feedback_is_rejected() {
        let err = ControlConfig::from_toml_str("press_feedback_ms = 18446744073709551615").unwrap_err();
        assert!(matches!(
            err,
            FocusError::ConfigInvalid {
                field: "press_feedback_ms",
                ..
            }
        ));

        let at_limit = format!("press_feedback_ms = {}", MAX_PRESS_FEEDBACK_MS);
        assert!(ControlConfig::from_toml_str(&at_limit).is_ok());
    }

    #[test]
    fn test_press_feedback_is_capped_when_set_directly() {
        let config = ControlConfig {
            press_feedback_ms: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.press_feedback(),
            Duration::from_millis(MAX_PRESS_FEEDBACK_MS)
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ControlConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, FocusError::ConfigRead(_)));
    }
}
