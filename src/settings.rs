//! Player preferences
//!
//! Persisted in LocalStorage, separate from anything the host page stores.

use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::tuning::Difficulty;

/// How each run picks its RNG seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedPolicy {
    /// Fresh seed every run
    #[default]
    Random,
    /// Same asteroid sequence every run (practice mode)
    Fixed(u64),
}

impl SeedPolicy {
    pub fn resolve(&self) -> u64 {
        match self {
            SeedPolicy::Random => rand::random(),
            SeedPolicy::Fixed(seed) => *seed,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Hold the background overlay and thruster glow steady
    pub reduced_motion: bool,
    pub seed: SeedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            reduced_motion: false,
            seed: SeedPolicy::Random,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "astro_gate_settings";

    /// Engine options for the next run
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            difficulty: self.difficulty,
            seed: self.seed.resolve(),
            tuning: None,
            reduced_motion: self.reduced_motion,
        }
    }

    /// Parse stored JSON, falling back to defaults for anything unreadable
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("Ignoring stored settings: {}", err);
            Self::default()
        })
    }

    /// Parse `json`, persist the result and return it
    ///
    /// Unreadable input stores (and returns) the defaults.
    pub fn store_json(json: &str) -> Self {
        let settings = Self::from_json(json);
        settings.save();
        settings
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage.set_item(Self::STORAGE_KEY, &self.to_json()).is_ok() {
                log::info!("Settings saved");
            } else {
                log::warn!("Settings could not be saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No settings store on native, using defaults ({})", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert!(!settings.reduced_motion);
        assert_eq!(settings.seed, SeedPolicy::Random);
    }

    #[test]
    fn test_fixed_seed_reaches_engine_options() {
        let settings = Settings {
            difficulty: Difficulty::Hard,
            reduced_motion: true,
            seed: SeedPolicy::Fixed(99),
        };
        let options = settings.engine_options();
        assert_eq!(options.difficulty, Difficulty::Hard);
        assert_eq!(options.seed, 99);
        assert!(options.reduced_motion);
        assert!(options.tuning.is_none());
    }

    #[test]
    fn test_json_round_trip_and_partial_records() {
        let settings = Settings {
            difficulty: Difficulty::Normal,
            reduced_motion: false,
            seed: SeedPolicy::Fixed(5),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json), settings);

        // Older records without newer fields still load
        let partial = Settings::from_json(r#"{"difficulty":"hard"}"#);
        assert_eq!(partial.difficulty, Difficulty::Hard);
        assert_eq!(partial.seed, SeedPolicy::Random);

        assert_eq!(Settings::from_json("not json"), Settings::default());
    }

    #[test]
    fn test_store_json_applies_to_next_run() {
        let stored = Settings::store_json(
            r#"{"difficulty":"normal","reduced_motion":true,"seed":{"fixed":1234}}"#,
        );
        assert_eq!(stored.difficulty, Difficulty::Normal);
        assert_eq!(stored.seed, SeedPolicy::Fixed(1234));
        assert_eq!(Settings::from_json(&stored.to_json()), stored);

        let options = stored.engine_options();
        assert_eq!(options.seed, 1234);
        assert!(options.reduced_motion);

        assert_eq!(Settings::store_json("{"), Settings::default());
    }
}
