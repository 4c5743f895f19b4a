//! Shared URDF definitions and helpers for Clankers avoidance demos.

pub mod dls;

/// 6-DOF articulated arm: 6 revolute joints with alternating axes and
/// collision shapes on the base, upper arm, forearm and end-effector.
pub const SIX_DOF_ARM_URDF: &str = include_str!("../urdf/six_dof_arm.urdf");

/// Avoidance parameters for the 6-DOF arm.
pub const ARM_AVOIDANCE_TOML: &str = include_str!("../config/avoidance.toml");
