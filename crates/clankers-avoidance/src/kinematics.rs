//! The robot's main kinematic chain and the queries constraints make on it.
//!
//! [`RobotKinematics`] pairs a [`RobotModel`] with a chosen base and tip
//! link. The actuated joints between them are the solver's joint vector,
//! in chain order.

use nalgebra::Isometry3;

use clankers_urdf::{JointLimits, RobotModel};

use crate::chain::KinematicChain;
use crate::error::KinematicsError;

/// Kinematic model handed to constraints at initialization.
#[derive(Debug, Clone)]
pub struct RobotKinematics {
    model: RobotModel,
    chain: KinematicChain,
    /// Links strictly below the base along the main chain, base to tip.
    link_names: Vec<String>,
    base_in_world: Isometry3<f64>,
}

impl RobotKinematics {
    /// Build the main chain from `base_link` to `tip_link`.
    ///
    /// The base frame coincides with the world frame until
    /// [`with_base_in_world`](Self::with_base_in_world) says otherwise.
    pub fn new(model: RobotModel, base_link: &str, tip_link: &str) -> Result<Self, KinematicsError> {
        let chain = KinematicChain::from_model(&model, base_link, tip_link)?;
        let link_names = model
            .joint_path(base_link, tip_link)
            .unwrap_or_default()
            .iter()
            .filter_map(|joint| model.joint(joint).ok())
            .map(|joint| joint.child.clone())
            .collect();

        Ok(Self {
            model,
            chain,
            link_names,
            base_in_world: Isometry3::identity(),
        })
    }

    /// Place the base link in the world frame.
    #[must_use]
    pub fn with_base_in_world(mut self, base_in_world: Isometry3<f64>) -> Self {
        self.base_in_world = base_in_world;
        self
    }

    pub const fn model(&self) -> &RobotModel {
        &self.model
    }

    /// The main chain, base to tip.
    pub const fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    pub fn base_link_name(&self) -> &str {
        self.chain.base_link()
    }

    pub fn tip_link_name(&self) -> &str {
        self.chain.tip_link()
    }

    /// Pose of the base link in the world frame.
    pub const fn base_in_world(&self) -> &Isometry3<f64> {
        &self.base_in_world
    }

    /// Length of the solver's joint vector.
    pub fn num_joints(&self) -> usize {
        self.chain.dof()
    }

    /// Actuated joint names in joint-vector order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.chain.joint_names()
    }

    /// Position limits of the actuated joints, in joint-vector order.
    pub fn joint_limits(&self) -> Vec<JointLimits> {
        self.joint_names()
            .into_iter()
            .map(|name| self.model.joint(name).map(|joint| joint.limits).unwrap_or_default())
            .collect()
    }

    /// Every link along the main chain below the base, base to tip.
    pub fn link_names(&self) -> &[String] {
        &self.link_names
    }

    /// Chain from the base link to `link`.
    pub fn sub_chain(&self, link: &str) -> Result<KinematicChain, KinematicsError> {
        KinematicChain::from_model(&self.model, self.base_link_name(), link)
    }

    /// Like [`sub_chain`](Self::sub_chain), but also requires the sub-chain's
    /// joints to be the leading joints of the main chain, so its Jacobian
    /// columns line up with the first columns of the joint vector.
    pub fn inboard_chain(&self, link: &str) -> Result<KinematicChain, KinematicsError> {
        let chain = self.sub_chain(link)?;
        let robot_joints = self.chain.joint_names();
        let link_joints = chain.joint_names();
        if !robot_joints.starts_with(&link_joints) {
            return Err(KinematicsError::NotInboard(link.into()));
        }
        Ok(chain)
    }

    /// Pose of `link` in the world frame at main-chain joint positions `q`.
    pub fn link_pose(&self, link: &str, q: &[f64]) -> Result<Isometry3<f64>, KinematicsError> {
        if q.len() != self.num_joints() {
            return Err(KinematicsError::JointCount {
                expected: self.num_joints(),
                got: q.len(),
            });
        }
        let chain = self.inboard_chain(link)?;
        Ok(self.base_in_world * chain.forward_kinematics(&q[..chain.dof()])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::SIX_DOF_ARM;
    use approx::assert_relative_eq;
    use clankers_urdf::parse_string;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    fn arm() -> RobotKinematics {
        RobotKinematics::new(parse_string(SIX_DOF_ARM).unwrap(), "base", "end_effector").unwrap()
    }

    #[test]
    fn main_chain_summary() {
        let kin = arm();
        assert_eq!(kin.num_joints(), 6);
        assert_eq!(kin.base_link_name(), "base");
        assert_eq!(kin.tip_link_name(), "end_effector");
        assert_eq!(
            kin.link_names(),
            [
                "shoulder_link",
                "upper_arm",
                "elbow_link",
                "forearm",
                "wrist_link",
                "end_effector"
            ]
        );
        assert_eq!(kin.joint_names()[0], "j1_base_yaw");
    }

    #[test]
    fn joint_limits_follow_joint_order() {
        let limits = arm().joint_limits();
        assert_eq!(limits.len(), 6);
        assert_relative_eq!(limits[1].lower.unwrap(), -1.5708);
        assert_relative_eq!(limits[1].upper.unwrap(), 2.356);
        assert_relative_eq!(limits[4].upper.unwrap(), 2.094);
    }

    #[test]
    fn base_defaults_to_world() {
        let kin = arm();
        assert_relative_eq!(kin.base_in_world().translation.vector.norm(), 0.0);

        let placed = arm().with_base_in_world(Isometry3::from_parts(
            Translation3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5),
        ));
        assert_relative_eq!(placed.base_in_world().translation.x, 1.0);
    }

    #[test]
    fn sub_chain_counts_inboard_joints() {
        let kin = arm();
        assert_eq!(kin.sub_chain("upper_arm").unwrap().dof(), 2);
        assert_eq!(kin.inboard_chain("forearm").unwrap().dof(), 4);
        assert_eq!(kin.sub_chain("base").unwrap().dof(), 0);
    }

    #[test]
    fn side_branch_is_not_inboard() {
        let kin = arm();
        // Reachable from the base, but driven by a joint outside the main chain.
        assert_eq!(kin.sub_chain("camera").unwrap().dof(), 2);
        assert_eq!(
            kin.inboard_chain("camera").unwrap_err(),
            KinematicsError::NotInboard("camera".into())
        );
    }

    #[test]
    fn link_pose_in_world() {
        let q = [0.3, 0.0, 0.0, 0.0, 0.0, 0.0];
        let kin = arm();
        let upper = kin.link_pose("upper_arm", &q).unwrap();
        assert_relative_eq!(upper.translation.z, 0.25, epsilon = 1e-12);

        let placed = arm().with_base_in_world(Isometry3::translation(0.0, 0.0, 1.0));
        let lifted = placed.link_pose("upper_arm", &q).unwrap();
        assert_relative_eq!(lifted.translation.z, 1.25, epsilon = 1e-12);
        assert_eq!(
            kin.link_pose("upper_arm", &q[..3]).unwrap_err(),
            KinematicsError::JointCount { expected: 6, got: 3 }
        );
    }

    #[test]
    fn unknown_link_fails() {
        let kin = arm();
        assert_eq!(
            kin.sub_chain("ghost").unwrap_err(),
            KinematicsError::UnknownLink("ghost".into())
        );
    }

    #[test]
    fn bad_main_chain_fails() {
        let model = parse_string(SIX_DOF_ARM).unwrap();
        assert!(RobotKinematics::new(model, "end_effector", "base").is_err());
    }
}
