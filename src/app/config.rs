//! Configuration constants
//!
//! The filter is configured by a handful of process-lifetime constants.
//! There is no config file and no runtime reconfiguration;
//! [`FilterConfig`] exists so the constants are named, validated once at
//! startup, and printable via `scrolltap config`.

use serde::{Deserialize, Serialize};

/// Process-lifetime filter constants, immutable once the taps are active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Invert the vertical axis for mouse-sourced scroll events.
    pub reverse_vertical: bool,
    /// Invert the horizontal axis for mouse-sourced scroll events.
    pub reverse_horizontal: bool,
    /// Magnitude multiplier per wheel notch, mouse-sourced events only.
    pub scroll_step: f64,
    /// A 2+-finger touch within this window classifies a continuous scroll
    /// event as trackpad.
    pub trackpad_window_ms: u64,
    /// Touch silence beyond this window classifies a continuous scroll
    /// event as mouse. Between the two windows the previous decision is
    /// carried forward.
    pub mouse_idle_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            reverse_vertical: true,
            reverse_horizontal: false,
            scroll_step: 3.0,
            trackpad_window_ms: 200,
            mouse_idle_ms: 500,
        }
    }
}

impl FilterConfig {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.scroll_step.is_finite() || self.scroll_step <= 0.0 {
            return Err(crate::Error::Config(format!(
                "scroll_step must be a positive finite number, got {}",
                self.scroll_step
            )));
        }
        if self.trackpad_window_ms == 0 {
            return Err(crate::Error::Config(
                "trackpad_window_ms must be > 0".to_string(),
            ));
        }
        if self.mouse_idle_ms <= self.trackpad_window_ms {
            return Err(crate::Error::Config(format!(
                "mouse_idle_ms ({}) must be greater than trackpad_window_ms ({})",
                self.mouse_idle_ms, self.trackpad_window_ms
            )));
        }
        Ok(())
    }

    pub fn trackpad_window_nanos(&self) -> u64 {
        self.trackpad_window_ms * 1_000_000
    }

    pub fn mouse_idle_nanos(&self) -> u64 {
        self.mouse_idle_ms * 1_000_000
    }

    /// Signed vertical multiplier: `sign * scroll_step`.
    pub fn vertical_multiplier(&self) -> f64 {
        if self.reverse_vertical {
            -self.scroll_step
        } else {
            self.scroll_step
        }
    }

    /// Signed horizontal multiplier: `sign * scroll_step`.
    pub fn horizontal_multiplier(&self) -> f64 {
        if self.reverse_horizontal {
            -self.scroll_step
        } else {
            self.scroll_step
        }
    }

    /// Render the effective constants as TOML.
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FilterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trackpad_window_ms, 200);
        assert_eq!(config.mouse_idle_ms, 500);
    }

    #[test]
    fn test_nanos_conversion() {
        let config = FilterConfig::default();
        assert_eq!(config.trackpad_window_nanos(), 200_000_000);
        assert_eq!(config.mouse_idle_nanos(), 500_000_000);
    }

    #[test]
    fn test_multiplier_signs() {
        let config = FilterConfig {
            reverse_vertical: true,
            reverse_horizontal: false,
            scroll_step: 3.0,
            ..FilterConfig::default()
        };
        assert_eq!(config.vertical_multiplier(), -3.0);
        assert_eq!(config.horizontal_multiplier(), 3.0);
    }

    #[test]
    fn test_validate_rejects_nonpositive_step() {
        let mut config = FilterConfig::default();
        config.scroll_step = 0.0;
        assert!(config.validate().is_err());
        config.scroll_step = -1.0;
        assert!(config.validate().is_err());
        config.scroll_step = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = FilterConfig::default();
        config.trackpad_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_windows() {
        let mut config = FilterConfig::default();
        config.mouse_idle_ms = config.trackpad_window_ms;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_rendering() {
        let toml_str = FilterConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("reverse_vertical = true"));
        assert!(toml_str.contains("scroll_step = 3.0"));
        assert!(toml_str.contains("trackpad_window_ms = 200"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let original = FilterConfig::default();
        let toml_str = original.to_toml().unwrap();
        let parsed: FilterConfig = toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(parsed.reverse_vertical, original.reverse_vertical);
        assert_eq!(parsed.scroll_step, original.scroll_step);
        assert_eq!(parsed.mouse_idle_ms, original.mouse_idle_ms);
    }
}
