//! Obstacle-avoidance constraint for velocity-level inverse kinematics.
//!
//! Provides kinematic chains and geometric Jacobians for URDF robot models,
//! a batched distance-query seam, and a constraint that turns "distance to
//! nearest obstacle" into error rows, Jacobian rows and a satisfaction
//! status for an outer weighted least-squares IK solver.
//!
//! # Architecture
//!
//! ```text
//! RobotModel ──► RobotKinematics ──► AvoidObstacles::initialize
//!                                          │
//! SolverState ──► CollisionService ──► AvoidanceSnapshot
//!                                          │
//!                  per link: sigmoid error + projected Jacobian row + status
//!                                          │
//!                                          ▼
//!                                  ConstraintResults
//! ```
//!
//! The [`KinematicChain`] for each monitored link is extracted from the
//! [`RobotModel`](clankers_urdf::RobotModel) at initialization time and
//! owned by that link's configuration. Every evaluation issues exactly one
//! distance query covering all monitored links.

pub mod avoidance;
pub mod chain;
pub mod collision;
pub mod constraint;
pub mod error;
pub mod jacobian;
pub mod kinematics;

#[cfg(test)]
mod test_fixtures;

pub use avoidance::{
    AvoidObstacles, AvoidObstaclesParams, AvoidanceDefaults, AvoidanceSnapshot, DistanceSample, LinkAvoidance,
    SigmoidShape,
};
pub use chain::KinematicChain;
pub use collision::{
    AllowedCollisionMatrix, CollisionService, DistanceMap, DistanceResult, LinkSet, Obstacle, SphereScene,
};
pub use constraint::{Constraint, ConstraintResults, ParameterReport, SolverState};
pub use error::{ConfigError, ConfigWarning, ConstraintError, KinematicsError};
pub use jacobian::{ChainJacobianSolver, Jacobian};
pub use kinematics::RobotKinematics;
