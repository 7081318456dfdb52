//! Data-driven difficulty tuning
//!
//! Pacing and scoring constants per difficulty tier. The stock table can be
//! replaced wholesale from JSON; a profile is picked once per run.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "low" => Some(Difficulty::Easy),
            "normal" | "medium" | "med" => Some(Difficulty::Normal),
            "hard" | "high" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Tuning constants for one difficulty tier
///
/// Speeds are in pixels per reference frame (16.67 ms); intervals in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub asteroid_speed: f32,
    pub spawn_interval_ms: f32,
    pub projectile_speed: f32,
    pub ship_speed: f32,
    pub fire_cooldown_ms: f32,
    pub score_per_hit: u64,
}

impl DifficultyProfile {
    fn validate(&self, tier: Difficulty) -> Result<(), TuningError> {
        let fields = [
            ("asteroid_speed", self.asteroid_speed),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("projectile_speed", self.projectile_speed),
            ("ship_speed", self.ship_speed),
            ("fire_cooldown_ms", self.fire_cooldown_ms),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::InvalidProfile { tier, field });
            }
        }
        if self.score_per_hit == 0 {
            return Err(TuningError::InvalidProfile {
                tier,
                field: "score_per_hit",
            });
        }
        Ok(())
    }
}

/// Profiles for every tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub easy: DifficultyProfile,
    pub normal: DifficultyProfile,
    pub hard: DifficultyProfile,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile {
                asteroid_speed: 1.8,
                spawn_interval_ms: 900.0,
                projectile_speed: 8.0,
                ship_speed: 5.5,
                fire_cooldown_ms: 170.0,
                score_per_hit: 10,
            },
            normal: DifficultyProfile {
                asteroid_speed: 2.5,
                spawn_interval_ms: 650.0,
                projectile_speed: 9.0,
                ship_speed: 6.5,
                fire_cooldown_ms: 145.0,
                score_per_hit: 15,
            },
            hard: DifficultyProfile {
                asteroid_speed: 3.4,
                spawn_interval_ms: 450.0,
                projectile_speed: 10.0,
                ship_speed: 7.2,
                fire_cooldown_ms: 125.0,
                score_per_hit: 20,
            },
        }
    }
}

impl DifficultyTable {
    /// Parse and validate a table from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let table: DifficultyTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for tier in Difficulty::ALL {
            self.profile(tier).validate(tier)?;
        }
        Ok(())
    }

    pub fn profile(&self, tier: Difficulty) -> DifficultyProfile {
        match tier {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(DifficultyTable::default().validate().is_ok());
    }

    #[test]
    fn test_harder_tiers_pay_more() {
        let table = DifficultyTable::default();
        let easy = table.profile(Difficulty::Easy);
        let normal = table.profile(Difficulty::Normal);
        let hard = table.profile(Difficulty::Hard);
        assert!(easy.score_per_hit < normal.score_per_hit);
        assert!(normal.score_per_hit < hard.score_per_hit);
        assert!(easy.spawn_interval_ms > hard.spawn_interval_ms);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("medium"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str(" low "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("insane"), None);
        for tier in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(tier.as_str()), Some(tier));
        }
    }

    #[test]
    fn test_from_json_round_trip_and_validation() {
        let json = serde_json::to_string(&DifficultyTable::default()).unwrap();
        assert_eq!(
            DifficultyTable::from_json(&json).unwrap(),
            DifficultyTable::default()
        );

        let mut broken = DifficultyTable::default();
        broken.hard.fire_cooldown_ms = 0.0;
        let json = serde_json::to_string(&broken).unwrap();
        match DifficultyTable::from_json(&json) {
            Err(TuningError::InvalidProfile { tier, field }) => {
                assert_eq!(tier, Difficulty::Hard);
                assert_eq!(field, "fire_cooldown_ms");
            }
            other => panic!("expected invalid profile, got {:?}", other),
        }

        assert!(matches!(
            DifficultyTable::from_json("{\"easy\": 1}"),
            Err(TuningError::Parse(_))
        ));
    }
}
