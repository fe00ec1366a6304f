//! Scene configuration.
//!
//! Every tunable of the lava scene lives here: palette, platform layout,
//! animation timings, camera framing, particle behaviour and quiz rules.
//! Defaults reproduce the classic lava level; a host page may override any
//! subset through JSON (missing fields fall back to their defaults).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Letters drawn above the platforms, indexed by platform index.
pub const PLATFORM_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Number of answer platforms in a scene.
pub const PLATFORM_COUNT: usize = 4;

/// Errors produced while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scene config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scene config: {0}")]
    Invalid(String),
}

/// Colors as `0xRRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: u32,
    pub lava: u32,
    pub lava_bright: u32,
    pub platform: u32,
    pub platform_hover: u32,
    pub platform_correct: u32,
    pub platform_wrong: u32,
    pub platform_selected: u32,
    pub character: u32,
    pub label: u32,
    pub confetti: Vec<u32>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: 0x87_ce_eb,
            lava: 0xff_45_00,
            lava_bright: 0xff_a5_00,
            platform: 0x1e_88_e5,
            platform_hover: 0x42_a5_f5,
            platform_correct: 0x4c_af_50,
            platform_wrong: 0xf4_43_36,
            platform_selected: 0xff_eb_3b,
            character: 0x8b_45_13,
            label: 0xff_ff_ff,
            confetti: vec![
                0xff_6b_6b, 0x4e_cd_c4, 0xff_e6_6d, 0x95_e1_d3, 0xf3_81_81, 0xaa_96_da, 0xfc_ba_d3,
            ],
        }
    }
}

/// World-space dimensions of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub platform_width: f32,
    pub platform_height: f32,
    pub platform_depth: f32,
    /// Distance between neighbouring platform centres along X.
    pub platform_gap: f32,
    pub lava_width: f32,
    pub lava_depth: f32,
    pub lava_y: f32,
    pub character_radius: f32,
    pub character_height: f32,
    /// Z of the character's home spot, in front of the platform row.
    pub character_home_z: f32,
    /// Height of the letter labels above the platform top.
    pub label_offset: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            platform_width: 3.0,
            platform_height: 0.8,
            platform_depth: 2.5,
            platform_gap: 4.0,
            lava_width: 60.0,
            lava_depth: 40.0,
            lava_y: -4.0,
            character_radius: 0.6,
            character_height: 1.6,
            character_home_z: -6.0,
            label_offset: 0.8,
        }
    }
}

impl Geometry {
    /// X coordinate of platform `index` in a row of `count` platforms.
    pub fn platform_x(&self, index: usize, count: usize) -> f32 {
        let centre = (count.saturating_sub(1)) as f32 / 2.0;
        self.platform_gap * (index as f32 - centre)
    }

    /// Y coordinate of a platform's top face at its baseline.
    pub fn platform_top(&self) -> f32 {
        self.platform_height / 2.0
    }

    /// Character origin height when standing on a platform top.
    pub fn standing_y(&self) -> f32 {
        self.platform_top() + self.character_radius
    }

    /// Half extents of a platform box at unit scale.
    pub fn platform_half_extents(&self) -> [f32; 3] {
        [
            self.platform_width / 2.0,
            self.platform_height / 2.0,
            self.platform_depth / 2.0,
        ]
    }
}

/// Animation durations (seconds) and amplitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub jump_duration: f32,
    pub jump_arc_height: f32,
    pub bounce_duration: f32,
    /// Y scale at the bottom of a bounce (X/Z widen by the inverse).
    pub bounce_squash: f32,
    pub sink_duration: f32,
    pub sink_distance: f32,
    pub fall_duration: f32,
    pub fall_distance: f32,
    pub camera_pan_duration: f32,
    pub lava_pulse_speed: f32,
    pub idle_bob_speed: f32,
    pub idle_bob_amount: f32,
    pub idle_rotate_speed: f32,
    pub idle_rotate_amount: f32,
    pub platform_highlight_scale: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            jump_duration: 0.5,
            jump_arc_height: 3.0,
            bounce_duration: 0.4,
            bounce_squash: 0.75,
            sink_duration: 1.0,
            sink_distance: 5.0,
            fall_duration: 1.0,
            fall_distance: 5.0,
            camera_pan_duration: 0.8,
            lava_pulse_speed: 2.0,
            idle_bob_speed: 2.5,
            idle_bob_amount: 0.06,
            idle_rotate_speed: 1.0,
            idle_rotate_amount: 0.04,
            platform_highlight_scale: 1.15,
        }
    }
}

/// Orthographic camera framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    /// Half of the visible world height on desktop viewports.
    pub half_height: f32,
    /// Half height used below `mobile_breakpoint` pixels of width.
    pub mobile_half_height: f32,
    pub mobile_breakpoint: f32,
    pub near: f32,
    pub far: f32,
    /// Maximum yaw offset (radians) applied per question.
    pub question_yaw_jitter: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [22.0, 24.0, 22.0],
            look_at: [0.0, 0.0, 0.0],
            half_height: 22.0,
            mobile_half_height: 26.0,
            mobile_breakpoint: 768.0,
            near: 1.0,
            far: 1000.0,
            question_yaw_jitter: 0.35,
        }
    }
}

impl CameraConfig {
    /// Half height appropriate for a viewport of the given pixel width.
    pub fn half_height_for_width(&self, width: f32) -> f32 {
        if width < self.mobile_breakpoint {
            self.mobile_half_height
        } else {
            self.half_height
        }
    }
}

/// Confetti particle behaviour. Rates are per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiConfig {
    pub count: usize,
    pub size: f32,
    pub spawn_half_width: f32,
    pub spawn_half_depth: f32,
    pub spawn_min_y: f32,
    pub spawn_max_y: f32,
    pub horizontal_speed: f32,
    pub min_rise_speed: f32,
    pub max_rise_speed: f32,
    pub spin_speed: f32,
    pub gravity: f32,
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    /// Particles falling below this height are removed early.
    pub floor_y: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 80,
            size: 0.3,
            spawn_half_width: 5.0,
            spawn_half_depth: 2.5,
            spawn_min_y: 5.0,
            spawn_max_y: 10.0,
            horizontal_speed: 9.0,
            min_rise_speed: 6.0,
            max_rise_speed: 18.0,
            spin_speed: 6.0,
            gravity: 28.8,
            min_lifetime: 1.04,
            max_lifetime: 2.08,
            floor_y: -10.0,
        }
    }
}

/// Embers drifting up from the lava.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub ember_count: usize,
    pub min_rise_speed: f32,
    pub max_rise_speed: f32,
    /// Embers wrap back to the lava surface above this height.
    pub ceiling_y: f32,
    pub sway_amount: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            ember_count: 24,
            min_rise_speed: 0.4,
            max_rise_speed: 1.2,
            ceiling_y: 4.0,
            sway_amount: 0.3,
        }
    }
}

/// Celebration behaviour once the quiz is won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryConfig {
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Radians per second.
    pub orbit_speed: f32,
    /// Radians per second.
    pub spin_speed: f32,
    pub burst_interval: f32,
}

impl Default for VictoryConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 28.0,
            orbit_height: 18.0,
            orbit_speed: 0.6,
            spin_speed: 4.0,
            burst_interval: 0.5,
        }
    }
}

/// Quiz rules and the pacing of the game flow (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizRules {
    pub total_questions: usize,
    pub lives: u32,
    pub correct_advance_delay: f32,
    pub wrong_reveal_delay: f32,
    pub wrong_advance_delay: f32,
    pub victory_overlay_delay: f32,
    pub victory_duration: f32,
}

impl Default for QuizRules {
    fn default() -> Self {
        Self {
            total_questions: 15,
            lives: 3,
            correct_advance_delay: 2.0,
            wrong_reveal_delay: 2.0,
            wrong_advance_delay: 4.0,
            victory_overlay_delay: 2.5,
            victory_duration: 5.5,
        }
    }
}

/// Complete configuration of a lava scene session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub palette: Palette,
    pub geometry: Geometry,
    pub timing: Timing,
    pub camera: CameraConfig,
    pub confetti: ConfettiConfig,
    pub ambient: AmbientConfig,
    pub victory: VictoryConfig,
    pub quiz: QuizRules,
}

impl SceneConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make the scene degenerate.
    ///
    /// Zero or negative animation durations are accepted; such tasks complete
    /// on their first tick. Every range the scene samples from must be
    /// non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        positive("geometry platform_width", g.platform_width)?;
        positive("geometry platform_height", g.platform_height)?;
        positive("geometry platform_depth", g.platform_depth)?;
        if g.platform_gap < g.platform_width {
            return Err(ConfigError::Invalid(format!(
                "platform_gap {} is smaller than platform_width {}",
                g.platform_gap, g.platform_width
            )));
        }
        non_negative("geometry lava_width", g.lava_width)?;
        non_negative("geometry lava_depth", g.lava_depth)?;

        let a = &self.ambient;
        ordered("ambient rise speed", a.min_rise_speed, a.max_rise_speed)?;
        ordered("ambient height (lava_y to ceiling_y)", g.lava_y, a.ceiling_y)?;

        let c = &self.confetti;
        ordered("confetti lifetime", c.min_lifetime, c.max_lifetime)?;
        ordered("confetti rise speed", c.min_rise_speed, c.max_rise_speed)?;
        ordered("confetti spawn height", c.spawn_min_y, c.spawn_max_y)?;
        non_negative("confetti spawn_half_width", c.spawn_half_width)?;
        non_negative("confetti spawn_half_depth", c.spawn_half_depth)?;
        non_negative("confetti horizontal_speed", c.horizontal_speed)?;
        non_negative("confetti spin_speed", c.spin_speed)?;
        if self.palette.confetti.is_empty() {
            return Err(ConfigError::Invalid("confetti palette is empty".to_string()));
        }

        positive("victory burst_interval", self.victory.burst_interval)?;
        if !self.camera.question_yaw_jitter.is_finite() {
            return Err(ConfigError::Invalid(
                "camera question_yaw_jitter must be finite".to_string(),
            ));
        }
        positive("camera half_height", self.camera.half_height)?;
        positive("camera mobile_half_height", self.camera.mobile_half_height)?;
        if self.quiz.total_questions == 0 {
            return Err(ConfigError::Invalid("quiz needs at least one question".to_string()));
        }
        Ok(())
    }
}

/// `min..=max` must be a non-empty range.
fn ordered(name: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name}: minimum {min} exceeds maximum {max}")))
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

/// `-value..=value` must be a non-empty range.
fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")))
    }
}
