//! Mode policies
//!
//! One engine core, three mini-games. Everything that distinguishes them
//! (gravity, impulses, spawn weights, collision geometry, loss rules) is data
//! in a `ModePolicy`. Velocities are per tick at `consts::TICK_RATE_HZ`.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// The three arcade mini-games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Vertical platformer
    #[default]
    Jumper,
    /// Falling-obstacle dodger
    Dodge,
    /// Gap-navigation flyer
    Flyer,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Jumper, GameMode::Dodge, GameMode::Flyer];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Jumper => "jumper",
            GameMode::Dodge => "dodge",
            GameMode::Flyer => "flyer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jumper" | "jump" => Some(GameMode::Jumper),
            "dodge" | "dodger" => Some(GameMode::Dodge),
            "flyer" | "flappy" | "fly" => Some(GameMode::Flyer),
            _ => None,
        }
    }

    /// Game type reported to the score submission service
    pub fn game_type(&self) -> &'static str {
        match self {
            GameMode::Jumper => "fish_jump",
            GameMode::Dodge => "fish_dodge",
            GameMode::Flyer => "fish_flap",
        }
    }
}

/// What the world is made of, and therefore how it moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFamily {
    /// Static platforms stacked upward
    Platforms,
    /// Obstacles queued above the view and falling into it
    FallingObstacles,
    /// Gap pairs scrolling in from the right
    GapPairs,
}

/// Horizontal world-edge behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Leaving one side re-enters from the other
    Wrap,
    /// Stop at the edge
    Clamp,
}

/// When a `jump()` input is honored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpRule {
    /// Only while standing on the start platform
    FromRest,
    /// Every tap flaps
    Anytime,
    /// No vertical agency
    Never,
}

/// Player/object contact test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactGeometry {
    /// Downward landing on a platform top, foot within `band` of the top edge
    Landing { band: f32 },
    /// Center distance below `scale * (r_player + r_object)`
    Radial { scale: f32 },
    /// Player rectangle against the solid parts of a gap pair
    GapWindow,
}

/// Fatal play-field boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalBounds {
    /// Dropping below the bottom of the camera
    BelowCamera,
    /// Touching the top or bottom wall
    TopBottom,
    None,
}

/// How score accrues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    /// Best height reached, one point per `units_per_point`
    Height { units_per_point: f32 },
    /// One point per obstacle that leaves the screen unhit
    Avoided,
    /// One point per gap passed
    GapsPassed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSpec {
    pub width: f32,
    /// Visible height
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub width: f32,
    pub height: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Lives for modes that use them
    pub max_lives: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPolicy {
    pub gravity: f32,
    /// Added to vx per tick of held input (0 disables steering)
    pub horizontal_accel: f32,
    pub max_horizontal_speed: f32,
    /// vx multiplier per tick without input
    pub damping: f32,
    pub edges: EdgePolicy,
    /// Player stands on the bottom of the world
    pub floor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpulsePolicy {
    /// Normal jump (negative is up)
    pub jump: f32,
    /// Spring super-jump
    pub spring: f32,
    pub rule: JumpRule,
}

/// Platform kind weights. Only ratios matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeights {
    pub normal: f32,
    pub spring: f32,
    pub breakable: f32,
}

impl SpawnWeights {
    pub fn total(&self) -> f32 {
        self.normal + self.spring + self.breakable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPolicy {
    pub family: ObjectFamily,
    pub object_width: f32,
    pub object_height: f32,
    /// Distance between consecutive objects along the advance axis
    pub spacing_min: f32,
    pub spacing_max: f32,
    /// Spacing change per round past the first (negative packs objects tighter)
    pub spacing_per_round: f32,
    /// Bound the spacing approaches as rounds go by
    pub spacing_limit: f32,
    /// Distance kept clear of the world edges when placing objects
    pub lane_inset: f32,
    pub weights: SpawnWeights,
    /// Fall speed (obstacles) or scroll speed (gap pairs)
    pub base_speed: f32,
    pub speed_per_round: f32,
    /// Height range of the gap window
    pub gap_min: f32,
    pub gap_max: f32,
    /// Minimum solid height above and below a gap window
    pub gap_margin: f32,
    /// Distance from the reference position to the first seeded object
    pub initial_offset: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub rule: ScoreRule,
    /// Round goes up every time score crosses a multiple of this
    pub round_every: u64,
    /// Default per-run multiplier
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerPolicy {
    pub spring_reset_ms: u32,
    pub hit_cooldown_ms: u32,
}

/// Full data-driven description of one mini-game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub mode: GameMode,
    pub world: WorldSpec,
    pub player: PlayerSpec,
    pub motion: MotionPolicy,
    pub impulses: ImpulsePolicy,
    pub spawn: SpawnPolicy,
    pub contact: ContactGeometry,
    pub fatal: FatalBounds,
    pub scoring: ScoringPolicy,
    pub timers: TimerPolicy,
    /// Minimum generated distance ahead of the reference position
    pub lookahead: f32,
    /// Jumper camera keeps the player this far below its top edge
    pub camera_lead: f32,
}

impl ModePolicy {
    /// Built-in tuning for a mode
    pub fn preset(mode: GameMode) -> Self {
        match mode {
            GameMode::Jumper => Self::jumper(),
            GameMode::Dodge => Self::dodge(),
            GameMode::Flyer => Self::flyer(),
        }
    }

    fn jumper() -> Self {
        Self {
            mode: GameMode::Jumper,
            world: WorldSpec {
                width: 400.0,
                height: 600.0,
            },
            player: PlayerSpec {
                width: 40.0,
                height: 40.0,
                start_x: 180.0,
                start_y: 480.0,
                max_lives: None,
            },
            motion: MotionPolicy {
                gravity: 0.4,
                horizontal_accel: 0.6,
                max_horizontal_speed: 6.0,
                damping: 0.9,
                edges: EdgePolicy::Wrap,
                floor: false,
            },
            impulses: ImpulsePolicy {
                jump: -10.0,
                spring: -15.0,
                rule: JumpRule::FromRest,
            },
            spawn: SpawnPolicy {
                family: ObjectFamily::Platforms,
                object_width: 70.0,
                object_height: 15.0,
                spacing_min: 60.0,
                spacing_max: 90.0,
                spacing_per_round: 4.0,
                // Normal jump apex is ~125 units
                spacing_limit: 110.0,
                lane_inset: 10.0,
                weights: SpawnWeights {
                    normal: 0.5,
                    spring: 0.4,
                    breakable: 0.1,
                },
                base_speed: 0.0,
                speed_per_round: 0.0,
                gap_min: 0.0,
                gap_max: 0.0,
                gap_margin: 0.0,
                initial_offset: 0.0,
            },
            contact: ContactGeometry::Landing { band: 10.0 },
            fatal: FatalBounds::BelowCamera,
            scoring: ScoringPolicy {
                rule: ScoreRule::Height {
                    units_per_point: 10.0,
                },
                round_every: 250,
                multiplier: 1,
            },
            timers: TimerPolicy {
                spring_reset_ms: 300,
                hit_cooldown_ms: 0,
            },
            lookahead: 300.0,
            camera_lead: 240.0,
        }
    }

    fn dodge() -> Self {
        Self {
            mode: GameMode::Dodge,
            world: WorldSpec {
                width: 400.0,
                height: 600.0,
            },
            player: PlayerSpec {
                width: 50.0,
                height: 40.0,
                start_x: 175.0,
                start_y: 560.0,
                max_lives: Some(crate::consts::START_LIVES),
            },
            motion: MotionPolicy {
                gravity: 1.2,
                horizontal_accel: 1.2,
                max_horizontal_speed: 8.0,
                damping: 0.85,
                edges: EdgePolicy::Clamp,
                floor: true,
            },
            impulses: ImpulsePolicy {
                jump: 0.0,
                spring: 0.0,
                rule: JumpRule::Never,
            },
            spawn: SpawnPolicy {
                family: ObjectFamily::FallingObstacles,
                object_width: 40.0,
                object_height: 40.0,
                spacing_min: 120.0,
                spacing_max: 200.0,
                spacing_per_round: -10.0,
                spacing_limit: 60.0,
                lane_inset: 10.0,
                weights: SpawnWeights {
                    normal: 1.0,
                    spring: 0.0,
                    breakable: 0.0,
                },
                base_speed: 3.0,
                speed_per_round: 0.5,
                gap_min: 0.0,
                gap_max: 0.0,
                gap_margin: 0.0,
                initial_offset: 80.0,
            },
            contact: ContactGeometry::Radial { scale: 0.8 },
            fatal: FatalBounds::None,
            scoring: ScoringPolicy {
                rule: ScoreRule::Avoided,
                round_every: 10,
                multiplier: 1,
            },
            timers: TimerPolicy {
                spring_reset_ms: 0,
                hit_cooldown_ms: 500,
            },
            lookahead: 300.0,
            camera_lead: 0.0,
        }
    }

    fn flyer() -> Self {
        Self {
            mode: GameMode::Flyer,
            world: WorldSpec {
                width: 400.0,
                height: 600.0,
            },
            player: PlayerSpec {
                width: 40.0,
                height: 30.0,
                start_x: 80.0,
                start_y: 280.0,
                max_lives: None,
            },
            motion: MotionPolicy {
                gravity: 0.45,
                horizontal_accel: 0.0,
                max_horizontal_speed: 0.0,
                damping: 0.0,
                edges: EdgePolicy::Clamp,
                floor: false,
            },
            impulses: ImpulsePolicy {
                jump: -7.5,
                spring: -7.5,
                rule: JumpRule::Anytime,
            },
            spawn: SpawnPolicy {
                family: ObjectFamily::GapPairs,
                object_width: 60.0,
                object_height: 600.0,
                spacing_min: 200.0,
                spacing_max: 240.0,
                spacing_per_round: -8.0,
                spacing_limit: 160.0,
                lane_inset: 0.0,
                weights: SpawnWeights {
                    normal: 1.0,
                    spring: 0.0,
                    breakable: 0.0,
                },
                base_speed: 2.5,
                speed_per_round: 0.25,
                gap_min: 150.0,
                gap_max: 190.0,
                gap_margin: 60.0,
                initial_offset: 320.0,
            },
            contact: ContactGeometry::GapWindow,
            fatal: FatalBounds::TopBottom,
            scoring: ScoringPolicy {
                rule: ScoreRule::GapsPassed,
                round_every: 5,
                multiplier: 1,
            },
            timers: TimerPolicy {
                spring_reset_ms: 0,
                hit_cooldown_ms: 0,
            },
            lookahead: 450.0,
            camera_lead: 0.0,
        }
    }

    /// Reject tunings the engine cannot run
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(SettingsError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };

        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return invalid("world", "dimensions must be positive");
        }
        if self.player.width <= 0.0 || self.player.height <= 0.0 {
            return invalid("player", "size must be positive");
        }
        if self.player.width > self.world.width {
            return invalid("player.width", "player is wider than the world");
        }
        let motion = &self.motion;
        if !motion.gravity.is_finite() {
            return invalid("motion.gravity", "must be finite");
        }
        if !motion.horizontal_accel.is_finite() || motion.horizontal_accel < 0.0 {
            return invalid("motion.horizontal_accel", "must be finite and non-negative");
        }
        if !motion.max_horizontal_speed.is_finite() || motion.max_horizontal_speed < 0.0 {
            return invalid("motion.max_horizontal_speed", "must be finite and non-negative");
        }
        if !(0.0..=1.0).contains(&motion.damping) {
            return invalid("motion.damping", "must be within 0..=1");
        }
        if !self.impulses.jump.is_finite() || !self.impulses.spring.is_finite() {
            return invalid("impulses", "must be finite");
        }
        if self.spawn.object_width <= 0.0 || self.spawn.object_height <= 0.0 {
            return invalid("spawn", "object size must be positive");
        }
        if self.spawn.spacing_min <= 0.0 || self.spawn.spacing_max < self.spawn.spacing_min {
            return invalid("spawn.spacing", "need 0 < spacing_min <= spacing_max");
        }
        if self.spawn.spacing_limit <= 0.0 {
            return invalid("spawn.spacing_limit", "must be positive");
        }
        if self.spawn.lane_inset * 2.0 + self.spawn.object_width > self.world.width {
            return invalid("spawn.lane_inset", "no room left for objects");
        }
        if self.spawn.family == ObjectFamily::Platforms {
            let w = &self.spawn.weights;
            if w.normal < 0.0 || w.spring < 0.0 || w.breakable < 0.0 || w.total() <= 0.0 {
                return invalid("spawn.weights", "need non-negative weights with a positive sum");
            }
        }
        if self.spawn.family == ObjectFamily::GapPairs {
            if self.spawn.gap_min <= 0.0 || self.spawn.gap_max < self.spawn.gap_min {
                return invalid("spawn.gap", "need 0 < gap_min <= gap_max");
            }
            if self.spawn.gap_max + 2.0 * self.spawn.gap_margin > self.world.height {
                return invalid("spawn.gap_margin", "gap window does not fit the world");
            }
        }
        if self.scoring.round_every == 0 {
            return invalid("scoring.round_every", "must be at least 1");
        }
        if let ScoreRule::Height { units_per_point } = self.scoring.rule {
            if units_per_point <= 0.0 {
                return invalid("scoring.units_per_point", "must be positive");
            }
        }
        if !self.lookahead.is_finite() || self.lookahead <= 0.0 {
            return invalid("lookahead", "must be positive and finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for mode in GameMode::ALL {
            let policy = ModePolicy::preset(mode);
            assert_eq!(policy.mode, mode);
            policy.validate().unwrap();
        }
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str("FLAPPY"), Some(GameMode::Flyer));
        assert_eq!(GameMode::from_str("tetris"), None);
    }

    #[test]
    fn test_validate_rejects_empty_weights() {
        let mut policy = ModePolicy::preset(GameMode::Jumper);
        policy.spawn.weights = SpawnWeights {
            normal: 0.0,
            spring: 0.0,
            breakable: 0.0,
        };
        assert!(matches!(
            policy.validate(),
            Err(SettingsError::Invalid { field: "spawn.weights", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_motion() {
        let mut policy = ModePolicy::preset(GameMode::Jumper);
        policy.motion.max_horizontal_speed = -1.0;
        assert!(matches!(
            policy.validate(),
            Err(SettingsError::Invalid { field: "motion.max_horizontal_speed", .. })
        ));

        let mut policy = ModePolicy::preset(GameMode::Jumper);
        policy.motion.horizontal_accel = f32::NAN;
        assert!(matches!(
            policy.validate(),
            Err(SettingsError::Invalid { field: "motion.horizontal_accel", .. })
        ));

        let mut policy = ModePolicy::preset(GameMode::Dodge);
        policy.motion.gravity = f32::INFINITY;
        assert!(matches!(
            policy.validate(),
            Err(SettingsError::Invalid { field: "motion.gravity", .. })
        ));

        let mut policy = ModePolicy::preset(GameMode::Flyer);
        policy.motion.damping = f32::NAN;
        assert!(matches!(
            policy.validate(),
            Err(SettingsError::Invalid { field: "motion.damping", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_round_threshold() {
        let mut policy = ModePolicy::preset(GameMode::Flyer);
        policy.scoring.round_every = 0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_json_override() {
        let mut policy = ModePolicy::preset(GameMode::Dodge);
        policy.motion.gravity = 2.0;
        let json = serde_json::to_string(&policy).unwrap();
        let back: ModePolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.motion.gravity, 2.0);
        assert_eq!(back.contact, ContactGeometry::Radial { scale: 0.8 });
    }
}
