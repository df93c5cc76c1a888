//! Knobs steering strategy selection, screen margins and settle delays.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use waypoint_core::AreaId;

/// Errors raised while loading a [`MovementTuning`].
#[derive(Debug, Error)]
pub enum TuningError {
    /// The TOML document could not be parsed.
    #[error("failed to parse movement tuning")]
    Parse(#[from] toml::de::Error),
    /// Walk speed must be a finite positive number.
    #[error("walk speed must be positive, got {0}")]
    WalkSpeed(f32),
    /// The HUD divisor must be greater than one so the line stays on screen.
    #[error("hud exclusion divisor must be greater than 1, got {0}")]
    HudDivisor(f32),
    /// A distance knob was negative.
    #[error("{knob} must not be negative, got {value}")]
    Negative {
        /// Name of the offending knob.
        knob: &'static str,
        /// Rejected value.
        value: i32,
    },
    /// A distance knob exceeded its ceiling.
    #[error("{knob} must not exceed {max}, got {value}")]
    TooLarge {
        /// Name of the offending knob.
        knob: &'static str,
        /// Rejected value.
        value: i32,
        /// Largest accepted value.
        max: i32,
    },
}

/// Largest accepted stuck-recovery radius in world units.
pub const MAX_FALLBACK_RADIUS: i32 = 1_000;

/// Whether the low-level protocol channel replaces simulated input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolCasting {
    /// Teleport through the protocol sender instead of right-clicking.
    pub use_for_teleport: bool,
    /// Bind the teleport skill through the protocol sender before casting.
    pub use_for_skill_selection: bool,
}

/// Tuning consumed by the movement planner.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementTuning {
    /// Protocol channel toggles.
    pub protocol: ProtocolCasting,
    /// Protocol teleports landing this close (world units) to the area's
    /// bounding rectangle are cast with a right click instead.
    pub boundary_threshold: i32,
    /// Path cells walked per second of walk duration; bounds how far along
    /// the path a single walk command aims.
    pub walk_speed: f32,
    /// Viewport height is divided by this to find the HUD line; raising it
    /// reserves more of the screen bottom.
    pub hud_exclusion_divisor: f32,
    /// Screen margin in pixels that stuck-recovery targets must keep from the
    /// viewport edges.
    pub fallback_margin: i32,
    /// Radius of the first directional recovery pass; the second pass uses
    /// double this.
    pub fallback_radius: i32,
    /// Areas where protocol teleports are never used.
    pub click_teleport_areas: Vec<AreaId>,
    /// Pause after a walk command.
    pub walk_settle_ms: u64,
    /// Pause after a directional recovery step.
    pub directional_settle_ms: u64,
    /// Pause after a random recovery click.
    pub random_settle_ms: u64,
    /// Pause after binding the teleport skill.
    pub skill_select_settle_ms: u64,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            protocol: ProtocolCasting::default(),
            boundary_threshold: 60,
            walk_speed: 25.0,
            hud_exclusion_divisor: 1.19,
            fallback_margin: 50,
            fallback_radius: 5,
            click_teleport_areas: vec![
                AreaId::FLAYER_JUNGLE,
                AreaId::LOWER_KURAST,
                AreaId::RIVER_OF_FLAME,
            ],
            walk_settle_ms: 50,
            directional_settle_ms: 150,
            random_settle_ms: 100,
            skill_select_settle_ms: 50,
        }
    }
}

impl MovementTuning {
    /// Parses tuning from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, TuningError> {
        let tuning: Self = toml::from_str(contents)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Checks that every knob holds a usable value.
    pub fn validate(&self) -> Result<(), TuningError> {
        if !self.walk_speed.is_finite() || self.walk_speed <= 0.0 {
            return Err(TuningError::WalkSpeed(self.walk_speed));
        }
        if !self.hud_exclusion_divisor.is_finite() || self.hud_exclusion_divisor <= 1.0 {
            return Err(TuningError::HudDivisor(self.hud_exclusion_divisor));
        }
        for (knob, value) in [
            ("boundary_threshold", self.boundary_threshold),
            ("fallback_margin", self.fallback_margin),
            ("fallback_radius", self.fallback_radius),
        ] {
            if value < 0 {
                return Err(TuningError::Negative { knob, value });
            }
        }
        if self.fallback_radius > MAX_FALLBACK_RADIUS {
            return Err(TuningError::TooLarge {
                knob: "fallback_radius",
                value: self.fallback_radius,
                max: MAX_FALLBACK_RADIUS,
            });
        }
        Ok(())
    }

    /// Reports whether protocol teleports are barred from the area.
    #[must_use]
    pub fn is_click_teleport_area(&self, area: AreaId) -> bool {
        self.click_teleport_areas.contains(&area)
    }

    pub(crate) fn walk_settle(&self) -> Duration {
        Duration::from_millis(self.walk_settle_ms)
    }

    pub(crate) fn directional_settle(&self) -> Duration {
        Duration::from_millis(self.directional_settle_ms)
    }

    pub(crate) fn random_settle(&self) -> Duration {
        Duration::from_millis(self.random_settle_ms)
    }

    pub(crate) fn skill_select_settle(&self) -> Duration {
        Duration::from_millis(self.skill_select_settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let tuning = MovementTuning::from_toml_str("").expect("defaults");
        assert_eq!(tuning, MovementTuning::default());
        assert!(tuning.is_click_teleport_area(AreaId::LOWER_KURAST));
        assert!(!tuning.is_click_teleport_area(AreaId::ARCANE_SANCTUARY));
    }

    #[test]
    fn partial_document_overrides_selected_knobs() {
        let tuning = MovementTuning::from_toml_str(
            r#"
                boundary_threshold = 40
                click_teleport_areas = [74]

                [protocol]
                use_for_teleport = true
            "#,
        )
        .expect("tuning");

        assert_eq!(tuning.boundary_threshold, 40);
        assert!(tuning.protocol.use_for_teleport);
        assert!(!tuning.protocol.use_for_skill_selection);
        assert_eq!(tuning.click_teleport_areas, vec![AreaId::ARCANE_SANCTUARY]);
        assert_eq!(tuning.walk_settle_ms, 50);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            MovementTuning::from_toml_str("walk_speed = 0.0"),
            Err(TuningError::WalkSpeed(_))
        ));
        assert!(matches!(
            MovementTuning::from_toml_str("hud_exclusion_divisor = 0.5"),
            Err(TuningError::HudDivisor(_))
        ));
        assert!(matches!(
            MovementTuning::from_toml_str("fallback_radius = -1"),
            Err(TuningError::Negative {
                knob: "fallback_radius",
                ..
            })
        ));
        assert!(matches!(
            MovementTuning::from_toml_str("fallback_radius = 1500000000"),
            Err(TuningError::TooLarge {
                knob: "fallback_radius",
                max: MAX_FALLBACK_RADIUS,
                ..
            })
        ));
        assert!(MovementTuning::from_toml_str("fallback_radius = 1000").is_ok());
        assert!(matches!(
            MovementTuning::from_toml_str("walk_sped = 3.0"),
            Err(TuningError::Parse(_))
        ));
    }
}
