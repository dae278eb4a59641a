//! Game settings
//!
//! Which mode to play, how to seed it, and an optional policy override for
//! tuning. Loaded from a JSON file (native) or LocalStorage (wasm).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SUBSTEPS;
use crate::error::SettingsError;
use crate::sim::{GameMode, ModePolicy};

/// Engine and runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game to play
    pub mode: GameMode,
    /// Base seed. None picks one from the OS.
    pub seed: Option<u64>,
    /// Maximum ticks run for one frame
    pub max_substeps: u32,

    // === Demo runner ===
    /// Let the autopilot play
    pub autopilot: bool,
    /// Simulated seconds the headless runner plays
    pub demo_seconds: f32,
    /// Where the native runner keeps best scores
    pub best_score_path: Option<PathBuf>,

    // === Tuning ===
    /// Replaces the built-in preset for `mode`
    pub policy: Option<ModePolicy>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Jumper,
            seed: None,
            max_substeps: MAX_SUBSTEPS,

            autopilot: true,
            demo_seconds: 30.0,
            best_score_path: None,

            policy: None,
        }
    }
}

impl Settings {
    /// Env var holding a path to a settings file (native only)
    pub const ENV_VAR: &'static str = "AQUA_ARCADE_SETTINGS";

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_substeps == 0 {
            return Err(SettingsError::Invalid {
                field: "max_substeps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.demo_seconds.is_nan() || self.demo_seconds <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "demo_seconds",
                reason: format!("must be positive, got {}", self.demo_seconds),
            });
        }
        self.policy().map(|_| ())
    }

    /// The policy the engine should run: the override if present, else the preset
    pub fn policy(&self) -> Result<ModePolicy, SettingsError> {
        let policy = match &self.policy {
            Some(p) if p.mode != self.mode => {
                return Err(SettingsError::Invalid {
                    field: "policy.mode",
                    reason: format!(
                        "override is for {} but mode is {}",
                        p.mode.as_str(),
                        self.mode.as_str()
                    ),
                });
            }
            Some(p) => p.clone(),
            None => ModePolicy::preset(self.mode),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Load from the file named by `AQUA_ARCADE_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(Self::ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };
        let path = PathBuf::from(path);
        match Self::load_from_path(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "aqua_arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "mode": "flyer", "seed": 7 }"#).unwrap();
        assert_eq!(settings.mode, GameMode::Flyer);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.max_substeps, MAX_SUBSTEPS);
        assert_eq!(settings.policy().unwrap(), ModePolicy::preset(GameMode::Flyer));
    }

    #[test]
    fn test_zero_substeps_rejected() {
        let err = Settings::from_json(r#"{ "max_substeps": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "max_substeps", .. }));
    }

    #[test]
    fn test_policy_override_must_match_mode() {
        let settings = Settings {
            mode: GameMode::Dodge,
            policy: Some(ModePolicy::preset(GameMode::Jumper)),
            ..Settings::default()
        };
        assert!(matches!(
            settings.policy(),
            Err(SettingsError::Invalid { field: "policy.mode", .. })
        ));
    }

    #[test]
    fn test_policy_override_is_used() {
        let mut policy = ModePolicy::preset(GameMode::Dodge);
        policy.scoring.round_every = 3;
        let settings = Settings {
            mode: GameMode::Dodge,
            policy: Some(policy.clone()),
            ..Settings::default()
        };
        assert_eq!(settings.policy().unwrap(), policy);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            Settings::from_json("mode = jumper"),
            Err(SettingsError::Parse(_))
        ));
    }
}
