//! Kinematic chain extracted from a URDF [`RobotModel`].
//!
//! A [`KinematicChain`] is an ordered list of actuated joints from a base
//! link to a tip link. It stores the static transforms (origins) and joint
//! axes needed for forward kinematics and Jacobian computation.

use nalgebra::{Isometry3, Matrix3, Point3, Translation3, UnitQuaternion, UnitVector3, Vector3};

use clankers_urdf::{JointType, Origin, RobotModel};

use crate::error::KinematicsError;

/// A single joint in the kinematic chain.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    /// Name of this joint (from URDF).
    pub name: String,
    /// Static transform from the parent link frame to this joint frame,
    /// with any preceding fixed joints folded in.
    pub origin: Isometry3<f64>,
    /// Joint axis in the joint's local frame.
    pub axis: UnitVector3<f64>,
    /// Whether this is a prismatic joint (false = revolute).
    pub is_prismatic: bool,
}

/// Joint origins and axes in the base frame at one configuration.
#[derive(Debug, Clone)]
pub struct ChainFrames {
    /// Origin of each joint frame, before the joint's own motion.
    pub origins: Vec<Point3<f64>>,
    /// Axis of each joint.
    pub axes: Vec<UnitVector3<f64>>,
    /// Pose of the tip link frame.
    pub tip: Isometry3<f64>,
}

/// An ordered kinematic chain from a base link to a tip link.
///
/// Only actuated joints (revolute, continuous, prismatic) become chain
/// joints; fixed joints have their transforms folded into the next actuated
/// joint's origin, or into the tip offset when they trail the last one.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    base_link: String,
    tip_link: String,
    joints: Vec<ChainJoint>,
    /// Transform from the last joint's child link to the tip frame.
    tip_offset: Isometry3<f64>,
}

impl KinematicChain {
    /// Build the chain from `base_link` down to `tip_link`.
    pub fn from_model(
        model: &RobotModel,
        base_link: &str,
        tip_link: &str,
    ) -> Result<Self, KinematicsError> {
        for link in [base_link, tip_link] {
            if !model.has_link(link) {
                return Err(KinematicsError::UnknownLink(link.into()));
            }
        }
        let path =
            model
                .joint_path(base_link, tip_link)
                .ok_or_else(|| KinematicsError::Unreachable {
                    from: base_link.into(),
                    to: tip_link.into(),
                })?;

        let mut joints = Vec::new();
        let mut accumulated_fixed = Isometry3::identity();

        for joint_name in &path {
            let joint = model
                .joint(joint_name)
                .map_err(|_| KinematicsError::Unreachable {
                    from: base_link.into(),
                    to: tip_link.into(),
                })?;
            let joint_origin = origin_to_isometry(&joint.origin);

            if joint.joint_type.is_actuated() {
                let combined_origin = accumulated_fixed * joint_origin;
                accumulated_fixed = Isometry3::identity();

                joints.push(ChainJoint {
                    name: joint.name.clone(),
                    origin: combined_origin,
                    axis: UnitVector3::new_normalize(Vector3::from(joint.axis)),
                    is_prismatic: joint.joint_type == JointType::Prismatic,
                });
            } else {
                accumulated_fixed *= joint_origin;
            }
        }

        Ok(Self {
            base_link: base_link.into(),
            tip_link: tip_link.into(),
            joints,
            tip_offset: accumulated_fixed,
        })
    }

    /// Number of actuated degrees of freedom.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Name of the link the chain starts from.
    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    /// Name of the link the chain ends at.
    pub fn tip_link(&self) -> &str {
        &self.tip_link
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    /// Access the joint definitions.
    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    /// Tip offset after the last joint.
    pub const fn tip_offset(&self) -> &Isometry3<f64> {
        &self.tip_offset
    }

    fn check_len(&self, q: &[f64]) -> Result<(), KinematicsError> {
        if q.len() == self.dof() {
            Ok(())
        } else {
            Err(KinematicsError::JointCount {
                expected: self.dof(),
                got: q.len(),
            })
        }
    }

    /// Forward kinematics: pose of the tip frame in the base frame.
    pub fn forward_kinematics(&self, q: &[f64]) -> Result<Isometry3<f64>, KinematicsError> {
        self.check_len(q)?;

        let mut transform = Isometry3::identity();
        for (joint, &position) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }
        Ok(transform * self.tip_offset)
    }

    /// Per-joint origins and axes in the base frame, plus the tip pose.
    pub fn joint_frames(&self, q: &[f64]) -> Result<ChainFrames, KinematicsError> {
        self.check_len(q)?;

        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(self.dof());
        let mut axes = Vec::with_capacity(self.dof());

        for (joint, &position) in self.joints.iter().zip(q) {
            transform *= joint.origin;

            // Recorded before the joint's own motion, which does not move
            // its origin or axis.
            origins.push(Point3::from(transform.translation.vector));
            axes.push(transform.rotation * joint.axis);

            transform *= joint_transform(&joint.axis, joint.is_prismatic, position);
        }

        Ok(ChainFrames {
            origins,
            axes,
            tip: transform * self.tip_offset,
        })
    }
}

/// Convert a URDF [`Origin`] (xyz + rpy) to an [`Isometry3`].
pub fn origin_to_isometry(origin: &Origin) -> Isometry3<f64> {
    let translation = Translation3::new(origin.xyz[0], origin.xyz[1], origin.xyz[2]);
    let rotation = UnitQuaternion::from_matrix(&rotation_matrix_from_rpy(
        origin.rpy[0],
        origin.rpy[1],
        origin.rpy[2],
    ));
    Isometry3::from_parts(translation, rotation)
}

/// Build a rotation matrix from roll-pitch-yaw (intrinsic XYZ / extrinsic ZYX).
fn rotation_matrix_from_rpy(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

/// Compute the transform for a single joint at a given position.
fn joint_transform(axis: &UnitVector3<f64>, is_prismatic: bool, position: f64) -> Isometry3<f64> {
    if is_prismatic {
        Isometry3::from_parts(
            Translation3::from(axis.into_inner() * position),
            UnitQuaternion::identity(),
        )
    } else {
        Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, position),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
