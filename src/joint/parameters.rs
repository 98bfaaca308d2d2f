use serde::{Deserialize, Serialize};
use tracing::warn;

use super::JointKind;
use crate::error::{ParameterError, Result};

/// Where the positive prism sits across the intersection width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    /// Centred on the region's X midpoint.
    #[default]
    Centered,
    /// Flush with the region's minimum X.
    Edge,
}

/// How the positive prism is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Sizing {
    /// Width is a share of the intersection width; depth and height follow
    /// the intersection region.
    Percent { intersection_percent: f64 },
    /// Width and depth in millimetres; height follows the estimated joint
    /// extension.
    Absolute { width: f64, depth: f64 },
}

impl Default for Sizing {
    fn default() -> Self {
        Self::Percent {
            intersection_percent: DEFAULT_INTERSECTION_PERCENT,
        }
    }
}

pub const DEFAULT_WIDTH: f64 = 20.0;
pub const DEFAULT_DEPTH: f64 = 30.0;
pub const DEFAULT_CLEARANCE: f64 = 0.1;
pub const DEFAULT_TAIL_ANGLE: f64 = 15.0;
pub const DEFAULT_NUMBER_OF_FINGERS: u32 = 3;
pub const DEFAULT_INTERSECTION_PERCENT: f64 = 50.0;

const WIDTH_RANGE: (f64, f64) = (5.0, 100.0);
const DEPTH_RANGE: (f64, f64) = (5.0, 100.0);
const CLEARANCE_RANGE: (f64, f64) = (0.05, 1.0);
const TAIL_ANGLE_RANGE: (f64, f64) = (5.0, 45.0);

/// User-facing joint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointParameters {
    pub sizing: Sizing,
    /// Fit allowance in millimetres added to the negative prism.
    pub clearance: f64,
    pub position_mode: PositionMode,
    /// Dovetail flare in degrees.
    pub tail_angle: f64,
    /// Reserved for finger and box joints.
    pub number_of_fingers: u32,
}

impl Default for JointParameters {
    fn default() -> Self {
        Self {
            sizing: Sizing::default(),
            clearance: DEFAULT_CLEARANCE,
            position_mode: PositionMode::default(),
            tail_angle: DEFAULT_TAIL_ANGLE,
            number_of_fingers: DEFAULT_NUMBER_OF_FINGERS,
        }
    }
}

/// A value outside the range the joint presets are tuned for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advisory {
    pub parameter: &'static str,
    pub value: f64,
    pub recommended: (f64, f64),
}

impl JointParameters {
    /// Defaults with the sizing style `kind` uses out of the box.
    #[must_use]
    pub fn for_kind(kind: JointKind) -> Self {
        let sizing = match kind {
            JointKind::Dovetail => Sizing::Absolute {
                width: DEFAULT_WIDTH,
                depth: DEFAULT_DEPTH,
            },
            _ => Sizing::default(),
        };
        Self {
            sizing,
            ..Self::default()
        }
    }

    /// Parses a JSON parameter document and validates it. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of
    /// range.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json).map_err(ParameterError::from)?;
        params.validate()?;
        Ok(params)
    }

    /// Renders the parameters as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(ParameterError::from)?)
    }

    /// Checks the hard invariants on every value.
    ///
    /// # Errors
    ///
    /// Returns the first offending parameter.
    pub fn validate(&self) -> std::result::Result<(), ParameterError> {
        check_finite("clearance", self.clearance)?;
        if self.clearance < 0.0 {
            return Err(out_of_range("clearance", self.clearance, 0.0, f64::INFINITY));
        }
        check_finite("tail_angle", self.tail_angle)?;
        if !(0.0..90.0).contains(&self.tail_angle) {
            return Err(out_of_range("tail_angle", self.tail_angle, 0.0, 90.0));
        }
        match self.sizing {
            Sizing::Percent {
                intersection_percent,
            } => {
                check_finite("intersection_percent", intersection_percent)?;
                if intersection_percent <= 0.0 || intersection_percent > 100.0 {
                    return Err(out_of_range(
                        "intersection_percent",
                        intersection_percent,
                        0.0,
                        100.0,
                    ));
                }
            }
            Sizing::Absolute { width, depth } => {
                for (name, value) in [("width", width), ("depth", depth)] {
                    check_finite(name, value)?;
                    if value <= 0.0 {
                        return Err(out_of_range(name, value, 0.0, f64::INFINITY));
                    }
                }
            }
        }
        Ok(())
    }

    /// Values that pass validation but fall outside the recommended ranges.
    #[must_use]
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut checks = vec![
            ("clearance", self.clearance, CLEARANCE_RANGE),
            ("tail_angle", self.tail_angle, TAIL_ANGLE_RANGE),
        ];
        if let Sizing::Absolute { width, depth } = self.sizing {
            checks.push(("width", width, WIDTH_RANGE));
            checks.push(("depth", depth, DEPTH_RANGE));
        }
        checks
            .into_iter()
            .filter(|(_, value, (min, max))| value < min || value > max)
            .map(|(parameter, value, recommended)| Advisory {
                parameter,
                value,
                recommended,
            })
            .collect()
    }

    pub(crate) fn log_advisories(&self) {
        for a in self.advisories() {
            warn!(
                parameter = a.parameter,
                value = a.value,
                min = a.recommended.0,
                max = a.recommended.1,
                "joint parameter outside recommended range"
            );
        }
    }
}

fn check_finite(parameter: &'static str, value: f64) -> std::result::Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NotFinite { parameter, value })
    }
}

fn out_of_range(parameter: &'static str, value: f64, min: f64, max: f64) -> ParameterError {
    ParameterError::OutOfRange {
        parameter,
        value,
        min,
        max,
    }
}
