//! Configuration for provider scopes and animated units.
//!
//! A provider scope carries defaults; each unit may override them
//! individually. Resolution happens once at unit construction.

use serde::{Deserialize, Serialize};

use glide_host::Easing;

/// Class name used when `enter` is enabled without an explicit name.
pub const DEFAULT_ENTER_CLASS: &str = "enter";
/// Class name used when `exit` is enabled without an explicit name.
pub const DEFAULT_EXIT_CLASS: &str = "exit";

/// A unit's trigger: the list of reactive values whose change starts a flip.
/// Compared structurally between renders.
pub type Trigger = Vec<serde_json::Value>;

/// Which part of a position-mode change an exit transition compensates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreserveMode {
    /// No compensation.
    Off,
    /// Compensate translation only.
    Position,
    /// Compensate scale only.
    Scale,
    /// Compensate both translation and scale.
    All,
}

impl Default for PreserveMode {
    fn default() -> Self {
        Self::Off
    }
}

impl PreserveMode {
    /// Whether translation is compensated.
    pub fn preserves_position(&self) -> bool {
        matches!(self, Self::Position | Self::All)
    }

    /// Whether scale is compensated.
    pub fn preserves_scale(&self) -> bool {
        matches!(self, Self::Scale | Self::All)
    }
}

/// Enter/exit class configuration: disabled, the default class name, or an
/// explicit one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassToggle {
    /// No class; the transition is disabled.
    Off,
    /// Enabled with the default class name.
    Default,
    /// Enabled with an explicit class name.
    Named(String),
}

impl Default for ClassToggle {
    fn default() -> Self {
        Self::Off
    }
}

impl ClassToggle {
    /// Resolve to a concrete class name, or `None` when disabled.
    pub fn resolve(&self, default_name: &str) -> Option<String> {
        match self {
            Self::Off => None,
            Self::Default => Some(default_name.to_string()),
            Self::Named(name) => Some(name.clone()),
        }
    }
}

impl From<bool> for ClassToggle {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Default } else { Self::Off }
    }
}

impl From<&str> for ClassToggle {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Provider-scope defaults applied to every unit that does not override
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeOptions {
    /// Animation duration in milliseconds.
    pub duration_ms: f64,
    /// Easing handed to the native animation facility.
    pub easing: Easing,
    /// Exit position-mode compensation.
    pub preserve: PreserveMode,
    /// Additional style properties to capture and animate, beyond the
    /// built-in translate/scale/color/opacity/border set.
    pub properties: Vec<String>,
    /// Mirror live animated values onto inspectable attributes.
    pub debug: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            easing: Easing::EaseInOut,
            preserve: PreserveMode::Off,
            properties: Vec::new(),
            debug: false,
        }
    }
}

impl ScopeOptions {
    /// Create the default scope options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default duration.
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set the default easing.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the default preserve mode.
    pub fn with_preserve(mut self, preserve: PreserveMode) -> Self {
        self.preserve = preserve;
        self
    }

    /// Set the default additional properties.
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = properties;
        self
    }

    /// Enable debug mirroring by default.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Per-unit declaration. `None` fields fall back to the scope defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitOptions {
    /// Animation key: unique within the scope, stable across the node's
    /// logical lifetime.
    pub key: String,
    /// When `false`, the unit skips flip and exit entirely and behaves as
    /// instant replacement.
    pub enabled: bool,
    /// Duration override.
    pub duration_ms: Option<f64>,
    /// Easing override.
    pub easing: Option<Easing>,
    /// Additional-properties override.
    pub properties: Option<Vec<String>>,
    /// Preserve-mode override.
    pub preserve: Option<PreserveMode>,
    /// Debug override.
    pub debug: Option<bool>,
    /// Enter transition class.
    pub enter: ClassToggle,
    /// Exit transition class.
    pub exit: ClassToggle,
}

impl UnitOptions {
    /// Create options for the given key with no overrides.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Disable or enable the unit.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the duration.
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Override the easing.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Override the additional properties.
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Override the preserve mode.
    pub fn with_preserve(mut self, preserve: PreserveMode) -> Self {
        self.preserve = Some(preserve);
        self
    }

    /// Override debug mirroring.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Configure the enter transition.
    pub fn with_enter(mut self, enter: impl Into<ClassToggle>) -> Self {
        self.enter = enter.into();
        self
    }

    /// Configure the exit transition.
    pub fn with_exit(mut self, exit: impl Into<ClassToggle>) -> Self {
        self.exit = exit.into();
        self
    }

    /// Resolve against the scope defaults.
    pub fn resolve(&self, scope: &ScopeOptions) -> ResolvedOptions {
        ResolvedOptions {
            enabled: self.enabled,
            duration_ms: self.duration_ms.unwrap_or(scope.duration_ms),
            easing: self.easing.unwrap_or(scope.easing),
            properties: self
                .properties
                .clone()
                .unwrap_or_else(|| scope.properties.clone()),
            preserve: self.preserve.unwrap_or(scope.preserve),
            debug: self.debug.unwrap_or(scope.debug),
            enter: self.enter.resolve(DEFAULT_ENTER_CLASS),
            exit: self.exit.resolve(DEFAULT_EXIT_CLASS),
        }
    }
}

/// A unit's fully-resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub enabled: bool,
    pub duration_ms: f64,
    pub easing: Easing,
    pub properties: Vec<String>,
    pub preserve: PreserveMode,
    pub debug: bool,
    pub enter: Option<String>,
    pub exit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_toggle_resolution() {
        assert_eq!(ClassToggle::Off.resolve("enter"), None);
        assert_eq!(
            ClassToggle::Default.resolve("enter"),
            Some("enter".to_string())
        );
        assert_eq!(
            ClassToggle::from("fade-in").resolve("enter"),
            Some("fade-in".to_string())
        );
        assert_eq!(ClassToggle::from(false), ClassToggle::Off);
        assert_eq!(ClassToggle::from(true), ClassToggle::Default);
    }

    #[test]
    fn test_unit_options_fall_back_to_scope() {
        let scope = ScopeOptions::new()
            .with_duration_ms(500.0)
            .with_easing(Easing::Linear)
            .with_properties(vec!["color".to_string()]);

        let resolved = UnitOptions::new("item").resolve(&scope);
        assert!(resolved.enabled);
        assert_eq!(resolved.duration_ms, 500.0);
        assert_eq!(resolved.easing, Easing::Linear);
        assert_eq!(resolved.properties, vec!["color".to_string()]);
        assert_eq!(resolved.enter, None);
        assert_eq!(resolved.exit, None);
    }

    #[test]
    fn test_unit_options_overrides_win() {
        let scope = ScopeOptions::new().with_duration_ms(500.0);
        let resolved = UnitOptions::new("item")
            .with_duration_ms(120.0)
            .with_easing(Easing::EaseOut)
            .with_enter(true)
            .with_exit("leave")
            .resolve(&scope);

        assert_eq!(resolved.duration_ms, 120.0);
        assert_eq!(resolved.easing, Easing::EaseOut);
        assert_eq!(resolved.enter, Some("enter".to_string()));
        assert_eq!(resolved.exit, Some("leave".to_string()));
    }

    #[test]
    fn test_preserve_mode_masks() {
        assert!(!PreserveMode::Off.preserves_position());
        assert!(PreserveMode::Position.preserves_position());
        assert!(!PreserveMode::Position.preserves_scale());
        assert!(PreserveMode::Scale.preserves_scale());
        assert!(PreserveMode::All.preserves_position());
        assert!(PreserveMode::All.preserves_scale());
    }
}
