//! Maps joint velocities to the rate at which a link's closest point moves
//! along its avoidance direction.

use nalgebra::RowDVector;

use super::config::LinkAvoidance;
use super::snapshot::DistanceSample;
use crate::error::{ConstraintError, KinematicsError};

/// Jacobian row for one link, `num_robot_joints` wide.
///
/// The sub-chain Jacobian is evaluated at the link's inboard joints, its
/// reference point moved to the closest point and its linear rows projected
/// onto the avoidance direction. The projected values fill the leading
/// columns; outboard joints cannot move the link and stay zero. With no
/// sample the whole row is zero.
pub fn jacobian_row(
    link: &LinkAvoidance,
    joints: &[f64],
    sample: Option<&DistanceSample>,
) -> Result<RowDVector<f64>, ConstraintError> {
    let num_robot_joints = link.num_robot_joints();
    let mut row = RowDVector::zeros(num_robot_joints);
    let Some(sample) = sample else {
        return Ok(row);
    };

    let solver = link.jacobian_solver().ok_or(ConstraintError::NotInitialized)?;
    let inboard = link.num_inboard_joints();
    if joints.len() < inboard {
        return Err(KinematicsError::JointCount {
            expected: inboard,
            got: joints.len(),
        }
        .into());
    }

    let mut jacobian = solver.jacobian(&joints[..inboard])?;
    jacobian.move_ref_point_to(&sample.closest_point);
    let projected = jacobian.project_linear(&sample.avoidance_direction);

    for (column, value) in projected.into_iter().enumerate().take(num_robot_joints) {
        row[column] = value;
    }
    Ok(row)
}
