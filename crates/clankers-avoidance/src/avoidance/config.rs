//! Per-link avoidance parameters and their defaults.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::jacobian::ChainJacobianSolver;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Shape of the sigmoid push-away ramp.
///
/// The ramp is centred `shift` scale units from contact and the scale is
/// chosen so that `avoidance_distance` falls `zero_point` units past the
/// centre, where the ramp has all but vanished.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SigmoidShape {
    pub shift: f64,
    pub zero_point: f64,
}

impl SigmoidShape {
    /// Scale units between contact and `avoidance_distance`.
    pub fn span(&self) -> f64 {
        self.zero_point + self.shift
    }

    /// Both offsets must be finite and leave a ramp that falls with distance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shift.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "shape.shift",
                value: self.shift,
            });
        }
        if !self.zero_point.is_finite() || self.span() <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "shape.zero_point",
                value: self.zero_point,
            });
        }
        Ok(())
    }
}

impl Default for SigmoidShape {
    fn default() -> Self {
        Self {
            shift: 5.0,
            zero_point: 10.0,
        }
    }
}

/// Values given to every newly registered link.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AvoidanceDefaults {
    pub weight: f64,
    /// Distance below which a link counts as violating the constraint.
    pub min_distance: f64,
    /// Distance beyond which the push-away error is negligible.
    pub avoidance_distance: f64,
    /// Push-away error at contact.
    pub amplitude: f64,
    pub shape: SigmoidShape,
}

impl Default for AvoidanceDefaults {
    fn default() -> Self {
        Self {
            weight: 1.0,
            min_distance: 0.1,
            avoidance_distance: 0.3,
            amplitude: 0.3,
            shape: SigmoidShape::default(),
        }
    }
}

impl AvoidanceDefaults {
    /// Check every field against the same rules the per-link setters apply.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validated("weight", self.weight)?;
        validated("min_distance", self.min_distance)?;
        validated_positive("avoidance_distance", self.avoidance_distance)?;
        validated("amplitude", self.amplitude)?;
        self.shape.validate()
    }
}

// ---------------------------------------------------------------------------
// LinkAvoidance
// ---------------------------------------------------------------------------

/// Avoidance settings for one monitored link.
///
/// Joint counts and the Jacobian solver are filled in by initialization;
/// before that the link has no solver and both counts are zero.
#[derive(Debug, Clone)]
pub struct LinkAvoidance {
    link_name: String,
    weight: f64,
    min_distance: f64,
    avoidance_distance: f64,
    amplitude: f64,
    num_robot_joints: usize,
    num_inboard_joints: usize,
    jacobian_solver: Option<ChainJacobianSolver>,
}

impl LinkAvoidance {
    pub fn new(link_name: impl Into<String>, defaults: &AvoidanceDefaults) -> Self {
        Self {
            link_name: link_name.into(),
            weight: defaults.weight,
            min_distance: defaults.min_distance,
            avoidance_distance: defaults.avoidance_distance,
            amplitude: defaults.amplitude,
            num_robot_joints: 0,
            num_inboard_joints: 0,
            jacobian_solver: None,
        }
    }

    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    pub const fn weight(&self) -> f64 {
        self.weight
    }

    pub const fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub const fn avoidance_distance(&self) -> f64 {
        self.avoidance_distance
    }

    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Length of the full joint vector.
    pub const fn num_robot_joints(&self) -> usize {
        self.num_robot_joints
    }

    /// Joints between the robot base and this link.
    pub const fn num_inboard_joints(&self) -> usize {
        self.num_inboard_joints
    }

    /// Solver for the base-to-link sub-chain, once initialized.
    pub const fn jacobian_solver(&self) -> Option<&ChainJacobianSolver> {
        self.jacobian_solver.as_ref()
    }

    pub(crate) fn set_weight(&mut self, value: f64) -> Result<(), ConfigError> {
        self.weight = validated("weight", value)?;
        Ok(())
    }

    pub(crate) fn set_min_distance(&mut self, value: f64) -> Result<(), ConfigError> {
        self.min_distance = validated("min_distance", value)?;
        Ok(())
    }

    pub(crate) fn set_avoidance_distance(&mut self, value: f64) -> Result<(), ConfigError> {
        self.avoidance_distance = validated_positive("avoidance_distance", value)?;
        Ok(())
    }

    pub(crate) fn set_amplitude(&mut self, value: f64) -> Result<(), ConfigError> {
        self.amplitude = validated("amplitude", value)?;
        Ok(())
    }

    /// Take ownership of the sub-chain solver. Any previous solver is dropped.
    pub(crate) fn bind(&mut self, solver: ChainJacobianSolver, num_robot_joints: usize) {
        self.num_inboard_joints = solver.dof();
        self.num_robot_joints = num_robot_joints;
        self.jacobian_solver = Some(solver);
    }

    /// Drop the solver and forget the joint counts.
    pub(crate) fn release(&mut self) {
        self.jacobian_solver = None;
        self.num_inboard_joints = 0;
        self.num_robot_joints = 0;
    }
}

fn validated(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

/// Divisors of the sigmoid scale must be strictly positive.
fn validated_positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 {
        validated(field, value)
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
