//! Integration test for the arm avoidance demo.
//!
//! Runs the demo scene headless and verifies:
//! - The arm starts with its forearm inside the minimum distance
//! - DLS steps on the avoidance constraint clear every monitored link
//! - Clearance never shrinks from one iteration to the next

use clankers_avoidance::avoidance::params;
use clankers_avoidance::{
    AllowedCollisionMatrix, AvoidObstacles, CollisionService, Constraint, LinkSet, Obstacle, RobotKinematics,
    SolverState, SphereScene,
};
use clankers_demos::dls::DlsSolver;
use clankers_demos::{ARM_AVOIDANCE_TOML, SIX_DOF_ARM_URDF};
use nalgebra::{DVector, Point3};

struct Scene {
    kinematics: RobotKinematics,
    scene: SphereScene,
    allowed: AllowedCollisionMatrix,
    constraint: AvoidObstacles,
}

fn build() -> Scene {
    let model = clankers_urdf::parse_string(SIX_DOF_ARM_URDF).unwrap();
    let kinematics = RobotKinematics::new(model, "base", "end_effector").unwrap();
    let mut scene = SphereScene::from_collision_geometry(&kinematics).unwrap();
    scene.add_obstacle(Obstacle::new("post", Point3::new(0.14, 0.0, 0.70), 0.05));
    let allowed = AllowedCollisionMatrix::new().with_adjacent_links(kinematics.model());

    let mut constraint = AvoidObstacles::new();
    let report = constraint.load_parameters(&params::parse_table(ARM_AVOIDANCE_TOML).unwrap());
    assert!(report.is_clean(), "{:?}", report.warnings);
    constraint.initialize(&kinematics).unwrap();

    Scene {
        kinematics,
        scene,
        allowed,
        constraint,
    }
}

fn forearm_clearance(s: &Scene, q: &[f64]) -> f64 {
    let links: LinkSet = ["forearm".to_owned()].into();
    s.scene.distances(q, &links, &s.allowed)["forearm"].distance
}

#[test]
fn starts_in_violation() {
    let s = build();
    let q = DVector::zeros(s.kinematics.num_joints());
    let r = s
        .constraint
        .evaluate(&SolverState::new(&q, &s.scene, &s.allowed))
        .unwrap();
    assert!(!r.status);
    assert_eq!(r.rows(), 3);
    assert!(forearm_clearance(&s, q.as_slice()) < 0.1);
}

#[test]
fn escape_clears_every_link() {
    let s = build();
    let q_init = vec![0.0; s.kinematics.num_joints()];
    let limits = s.kinematics.joint_limits();
    let result = DlsSolver::with_defaults()
        .with_joint_limits(limits.clone())
        .escape(&s.constraint, &s.scene, &s.allowed, &q_init)
        .unwrap();

    assert!(result.satisfied, "not clear after {} iterations", result.iterations);
    assert!(result.iterations > 0);
    assert!(forearm_clearance(&s, &result.joint_positions) >= 0.1);
    for (q, limit) in result.joint_positions.iter().zip(&limits) {
        assert!(limit.lower.is_none_or(|lower| *q >= lower));
        assert!(limit.upper.is_none_or(|upper| *q <= upper));
    }
}

#[test]
fn clearance_grows_each_step() {
    let s = build();
    let solver = DlsSolver::with_defaults();
    let mut q = DVector::zeros(s.kinematics.num_joints());
    let mut last = forearm_clearance(&s, q.as_slice());

    for _ in 0..5 {
        let r = s
            .constraint
            .evaluate(&SolverState::new(&q, &s.scene, &s.allowed))
            .unwrap();
        if r.status {
            break;
        }
        q += solver.step(&r).unwrap();
        let now = forearm_clearance(&s, q.as_slice());
        assert!(now > last, "clearance fell from {last} to {now}");
        last = now;
    }
}
