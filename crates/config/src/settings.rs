use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Route prefix that marks the editor view.
const DEFAULT_EDITOR_PREFIX: &str = "/editor";
/// Countdown before a dangerous confirmation unlocks.
const DEFAULT_COUNTDOWN_SECS: u32 = 5;
/// Countdown tick period.
const DEFAULT_TICK_MS: u64 = 1000;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Routes starting with this prefix count as the editor context.
    pub editor_route_prefix: String,
    /// Confirmation gate timing.
    pub confirmation: ConfirmationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            editor_route_prefix: DEFAULT_EDITOR_PREFIX.to_string(),
            confirmation: ConfirmationSettings::default(),
        }
    }
}

impl Settings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.editor_route_prefix.starts_with('/') {
            return Err(Error::Validation {
                path: None,
                message: format!(
                    "editor_route_prefix must start with '/', got '{}'",
                    self.editor_route_prefix
                ),
            });
        }
        self.confirmation.validate()
    }
}

/// Timing of the confirmation countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfirmationSettings {
    /// Seconds a dangerous confirmation stays locked.
    pub countdown_secs: u32,
    /// Milliseconds between countdown ticks.
    pub tick_ms: u64,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl ConfirmationSettings {
    /// Tick period as a `Duration`.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Check value ranges.
    fn validate(&self) -> Result<(), Error> {
        if self.countdown_secs == 0 {
            return Err(Error::Validation {
                path: None,
                message: "confirmation.countdown_secs must be positive".to_string(),
            });
        }
        if self.tick_ms == 0 {
            return Err(Error::Validation {
                path: None,
                message: "confirmation.tick_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert_eq!(s.editor_route_prefix, "/editor");
        assert_eq!(s.confirmation.countdown_secs, 5);
        assert_eq!(s.confirmation.tick(), Duration::from_secs(1));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let mut s = Settings::default();
        s.confirmation.tick_ms = 0;
        assert!(matches!(s.validate(), Err(Error::Validation { .. })));

        let s = Settings {
            editor_route_prefix: "editor".into(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }
}
