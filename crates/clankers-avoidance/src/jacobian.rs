//! Geometric Jacobians of kinematic chains.
//!
//! [`ChainJacobianSolver`] owns a [`KinematicChain`] and evaluates its 6×N
//! Jacobian: rows 0..3 map joint velocities to the linear velocity of a
//! reference point, rows 3..6 to the angular velocity of the tip link. Both
//! are expressed in the chain's base frame. The reference point starts at
//! the tip frame origin and can be moved anywhere on the tip body with
//! [`Jacobian::change_ref_point`].

use nalgebra::{DMatrix, Dyn, MatrixView, Point3, U1, U3, Vector3};

use crate::chain::KinematicChain;
use crate::error::KinematicsError;

/// A 6×N chain Jacobian together with its reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    data: DMatrix<f64>,
    ref_point: Point3<f64>,
}

impl Jacobian {
    /// Number of joint columns.
    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    /// The full 6×N matrix.
    pub const fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Point (in the base frame) whose linear velocity rows 0..3 describe.
    pub const fn ref_point(&self) -> &Point3<f64> {
        &self.ref_point
    }

    /// Linear-velocity rows.
    pub fn linear(&self) -> MatrixView<'_, f64, U3, Dyn, U1, Dyn> {
        self.data.fixed_rows::<3>(0)
    }

    /// Angular-velocity rows.
    pub fn angular(&self) -> MatrixView<'_, f64, U3, Dyn, U1, Dyn> {
        self.data.fixed_rows::<3>(3)
    }

    /// Shift the reference point by `offset` (base frame).
    ///
    /// Rigid-body velocity transport: for each column,
    /// `v_new = v_old + ω × offset`. Angular rows are unchanged.
    pub fn change_ref_point(&mut self, offset: &Vector3<f64>) {
        for mut column in self.data.column_iter_mut() {
            let omega = Vector3::new(column[3], column[4], column[5]);
            let shift = omega.cross(offset);
            column[0] += shift.x;
            column[1] += shift.y;
            column[2] += shift.z;
        }
        self.ref_point += *offset;
    }

    /// Move the reference point to `point` (base frame).
    pub fn move_ref_point_to(&mut self, point: &Point3<f64>) {
        let offset = *point - self.ref_point;
        self.change_ref_point(&offset);
    }

    /// Project the linear rows onto `direction`: one dot product per column.
    pub fn project_linear(&self, direction: &Vector3<f64>) -> Vec<f64> {
        self.linear()
            .column_iter()
            .map(|column| column.dot(direction))
            .collect()
    }
}

/// Jacobian evaluator bound to one chain.
#[derive(Debug, Clone)]
pub struct ChainJacobianSolver {
    chain: KinematicChain,
}

impl ChainJacobianSolver {
    pub const fn new(chain: KinematicChain) -> Self {
        Self { chain }
    }

    /// The chain this solver evaluates.
    pub const fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    /// Number of joint columns this solver produces.
    pub fn dof(&self) -> usize {
        self.chain.dof()
    }

    /// Jacobian at `q`, referenced at the tip frame origin.
    pub fn jacobian(&self, q: &[f64]) -> Result<Jacobian, KinematicsError> {
        let frames = self.chain.joint_frames(q)?;
        let tip = Point3::from(frames.tip.translation.vector);
        let mut data = DMatrix::zeros(6, self.chain.dof());

        for (i, joint) in self.chain.joints().iter().enumerate() {
            let z_i = frames.axes[i].into_inner();

            if joint.is_prismatic {
                // Pure translation along the axis; angular rows stay zero.
                data.fixed_view_mut::<3, 1>(0, i).copy_from(&z_i);
            } else {
                let r = tip - frames.origins[i];
                data.fixed_view_mut::<3, 1>(0, i).copy_from(&z_i.cross(&r));
                data.fixed_view_mut::<3, 1>(3, i).copy_from(&z_i);
            }
        }

        Ok(Jacobian {
            data,
            ref_point: tip,
        })
    }
}
