//! Damped Least Squares (Levenberg-Marquardt) velocity steps over
//! constraint rows.
//!
//! Stands in for the outer IK solver: evaluates a constraint, solves the
//! damped system for a joint update and repeats until the constraint
//! reports itself satisfied.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use clankers_avoidance::{AllowedCollisionMatrix, CollisionService, Constraint, ConstraintError, ConstraintResults, SolverState};
use clankers_urdf::JointLimits;

/// Configuration for the DLS stepper.
#[derive(Debug, Clone)]
pub struct DlsConfig {
    /// Maximum solver iterations.
    pub max_iterations: u32,
    /// Damping factor (lambda). Higher = more robust near singularities,
    /// but slower convergence.
    pub damping: f64,
    /// Largest joint update norm allowed per iteration (radians).
    pub max_step: f64,
}

impl Default for DlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            damping: 0.05,
            max_step: 0.1,
        }
    }
}

/// Result of driving a constraint to satisfaction.
#[derive(Debug, Clone)]
pub struct EscapeResult {
    /// Final joint positions.
    pub joint_positions: Vec<f64>,
    /// Whether the constraint reported itself satisfied.
    pub satisfied: bool,
    /// Number of joint updates applied.
    pub iterations: u32,
    /// Norm of the constraint error at the last evaluation.
    pub error_norm: f64,
}

/// Damped Least Squares stepper.
pub struct DlsSolver {
    config: DlsConfig,
    /// Per-joint position limits. Joints past the end are unbounded.
    joint_limits: Vec<JointLimits>,
}

impl DlsSolver {
    /// Create a new solver with the given configuration.
    pub const fn new(config: DlsConfig) -> Self {
        Self {
            config,
            joint_limits: Vec::new(),
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DlsConfig::default())
    }

    /// Clamp every update to `limits`, given in joint-vector order.
    #[must_use]
    pub fn with_joint_limits(mut self, limits: Vec<JointLimits>) -> Self {
        self.joint_limits = limits;
        self
    }

    /// Clamp joint positions to their limits.
    pub fn clamp_joints(&self, q: &mut DVector<f64>) {
        for (value, limits) in q.iter_mut().zip(&self.joint_limits) {
            if let Some(lower) = limits.lower {
                *value = value.max(lower);
            }
            if let Some(upper) = limits.upper {
                *value = value.min(upper);
            }
        }
    }

    /// Joint update for one block of constraint rows, clamped to
    /// `max_step`. `None` if the damped system is singular.
    pub fn step(&self, results: &ConstraintResults) -> Option<DVector<f64>> {
        let jacobian = &results.jacobian;
        if results.is_empty() {
            return Some(DVector::zeros(jacobian.ncols()));
        }
        let m = jacobian.nrows();

        // DLS: dq = J^T (J J^T + lambda^2 I)^{-1} * error
        let jjt = jacobian * jacobian.transpose();
        let damped = jjt + DMatrix::identity(m, m) * (self.config.damping * self.config.damping);
        let damped_inv = damped.try_inverse()?;
        let mut dq = jacobian.transpose() * damped_inv * &results.error;

        let norm = dq.norm();
        if norm > self.config.max_step {
            dq *= self.config.max_step / norm;
        }
        Some(dq)
    }

    /// Step `constraint` from `q_init` until it is satisfied or the
    /// iteration budget runs out.
    pub fn escape(
        &self,
        constraint: &dyn Constraint,
        collision: &dyn CollisionService,
        allowed: &AllowedCollisionMatrix,
        q_init: &[f64],
    ) -> Result<EscapeResult, ConstraintError> {
        let mut q = DVector::from_column_slice(q_init);

        for iteration in 0..self.config.max_iterations {
            let results = constraint.evaluate(&SolverState::new(&q, collision, allowed))?;
            let error_norm = results.error.norm();
            debug!("iteration {iteration}: error norm {error_norm:.4}, satisfied {}", results.status);

            if results.status {
                return Ok(EscapeResult {
                    joint_positions: q.as_slice().to_vec(),
                    satisfied: true,
                    iterations: iteration,
                    error_norm,
                });
            }

            let Some(dq) = self.step(&results) else {
                // Singular even with damping: give up
                return Ok(EscapeResult {
                    joint_positions: q.as_slice().to_vec(),
                    satisfied: false,
                    iterations: iteration,
                    error_norm,
                });
            };
            q += dq;
            self.clamp_joints(&mut q);
        }

        let results = constraint.evaluate(&SolverState::new(&q, collision, allowed))?;
        Ok(EscapeResult {
            joint_positions: q.as_slice().to_vec(),
            satisfied: results.status,
            iterations: self.config.max_iterations,
            error_norm: results.error.norm(),
        })
    }
}
