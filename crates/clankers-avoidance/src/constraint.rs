//! The interface every IK constraint exposes to the outer solver.
//!
//! The outer solver owns the iteration loop. On each iteration it builds a
//! [`SolverState`] and asks every constraint for a [`ConstraintResults`]
//! block: error rows, matching Jacobian rows, and whether the constraint is
//! satisfied. Combining blocks across constraints is the solver's job.

use nalgebra::{DMatrix, DVector, RowDVector};

use crate::collision::{AllowedCollisionMatrix, CollisionService};
use crate::error::{ConfigWarning, ConstraintError};
use crate::kinematics::RobotKinematics;

// ---------------------------------------------------------------------------
// SolverState
// ---------------------------------------------------------------------------

/// What a constraint may look at during one solver iteration.
#[derive(Clone, Copy)]
pub struct SolverState<'a> {
    /// Current joint positions, in the main chain's joint order.
    pub joints: &'a DVector<f64>,
    /// Geometry engine answering distance queries.
    pub collision: &'a dyn CollisionService,
    /// Pairs the distance queries should ignore.
    pub allowed_collisions: &'a AllowedCollisionMatrix,
}

impl<'a> SolverState<'a> {
    pub const fn new(
        joints: &'a DVector<f64>,
        collision: &'a dyn CollisionService,
        allowed_collisions: &'a AllowedCollisionMatrix,
    ) -> Self {
        Self {
            joints,
            collision,
            allowed_collisions,
        }
    }
}

impl std::fmt::Debug for SolverState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverState")
            .field("joints", &self.joints.as_slice())
            .field("allowed_collisions", &self.allowed_collisions.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ConstraintResults
// ---------------------------------------------------------------------------

/// Stacked rows produced by a constraint.
///
/// Row `i` of `error` pairs with row `i` of `jacobian`. The Jacobian has one
/// column per robot joint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintResults {
    pub error: DVector<f64>,
    pub jacobian: DMatrix<f64>,
    /// True iff every stacked block was satisfied.
    pub status: bool,
}

impl ConstraintResults {
    /// No rows, satisfied.
    pub fn empty(num_joints: usize) -> Self {
        Self {
            error: DVector::zeros(0),
            jacobian: DMatrix::zeros(0, num_joints),
            status: true,
        }
    }

    /// A single row.
    pub fn row(error: f64, jacobian: RowDVector<f64>, status: bool) -> Self {
        Self {
            error: DVector::from_element(1, error),
            jacobian: DMatrix::from_rows(&[jacobian]),
            status,
        }
    }

    pub fn rows(&self) -> usize {
        self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty()
    }

    /// Stack `other` below `self`; status becomes the AND of both.
    ///
    /// # Panics
    ///
    /// Panics if both blocks are non-empty and their column counts differ.
    pub fn append(&mut self, other: Self) {
        self.status &= other.status;
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.error = other.error;
            self.jacobian = other.jacobian;
            return;
        }
        assert_eq!(
            self.jacobian.ncols(),
            other.jacobian.ncols(),
            "stacked constraint rows must share the joint count"
        );

        let top = self.rows();
        let rows = top + other.rows();
        let cols = self.jacobian.ncols();

        let mut jacobian = DMatrix::zeros(rows, cols);
        jacobian.rows_mut(0, top).copy_from(&self.jacobian);
        jacobian.rows_mut(top, other.rows()).copy_from(&other.jacobian);

        self.error = DVector::from_iterator(rows, self.error.iter().chain(other.error.iter()).copied());
        self.jacobian = jacobian;
    }
}

// ---------------------------------------------------------------------------
// Constraint
// ---------------------------------------------------------------------------

/// Problems absorbed while loading parameters.
#[derive(Debug, Default)]
pub struct ParameterReport {
    pub warnings: Vec<ConfigWarning>,
}

impl ParameterReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A single constraint type, as seen by the outer IK solver.
pub trait Constraint {
    /// Human-readable name for this constraint.
    fn name(&self) -> &str;

    /// Apply parameters from a configuration table. Problems are absorbed
    /// with defaults and reported, never fatal.
    fn load_parameters(&mut self, params: &toml::Table) -> ParameterReport;

    /// One-time setup against the robot's kinematics.
    fn initialize(&mut self, kinematics: &RobotKinematics) -> Result<(), ConstraintError>;

    /// Whether the last [`initialize`](Self::initialize) call succeeded.
    fn is_initialized(&self) -> bool;

    /// Error rows, Jacobian rows and status for the current iteration.
    fn evaluate(&self, state: &SolverState<'_>) -> Result<ConstraintResults, ConstraintError>;
}
