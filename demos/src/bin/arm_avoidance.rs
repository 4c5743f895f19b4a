//! 6-DOF arm pushed clear of a spherical obstacle.
//!
//! Places a post right next to the forearm, loads avoidance parameters for
//! three links and runs damped-least-squares velocity steps on the
//! avoidance constraint until every monitored link is back outside its
//! minimum distance.
//!
//! Run: `cargo run -p clankers-demos --bin arm_avoidance`
//! Set `RUST_LOG=debug` to trace every iteration.

use std::error::Error;

use clankers_avoidance::avoidance::params;
use clankers_avoidance::{
    AllowedCollisionMatrix, AvoidObstacles, CollisionService, Constraint, LinkSet, Obstacle, RobotKinematics,
    SphereScene,
};
use clankers_demos::dls::{DlsConfig, DlsSolver};
use clankers_demos::{ARM_AVOIDANCE_TOML, SIX_DOF_ARM_URDF};
use nalgebra::Point3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let model = clankers_urdf::parse_string(SIX_DOF_ARM_URDF)?;
    let kinematics = RobotKinematics::new(model, "base", "end_effector")?;
    info!(
        "arm {} with {} joints: {:?}",
        kinematics.model().name,
        kinematics.num_joints(),
        kinematics.joint_names()
    );

    let mut scene = SphereScene::from_collision_geometry(&kinematics)?;
    scene.add_obstacle(Obstacle::new("post", Point3::new(0.14, 0.0, 0.70), 0.05));
    let allowed = AllowedCollisionMatrix::new().with_adjacent_links(kinematics.model());

    let mut constraint = AvoidObstacles::new();
    let report = constraint.load_parameters(&params::parse_table(ARM_AVOIDANCE_TOML)?);
    if !report.is_clean() {
        warn!("{} parameter warnings, see above", report.warnings.len());
    }
    constraint.initialize(&kinematics)?;

    let q_init = vec![0.0; kinematics.num_joints()];
    print_clearance(&scene, &allowed, constraint.link_set(), &q_init);

    let solver = DlsSolver::new(DlsConfig {
        max_iterations: 50,
        ..DlsConfig::default()
    })
    .with_joint_limits(kinematics.joint_limits());
    let result = solver.escape(&constraint, &scene, &allowed, &q_init)?;

    if result.satisfied {
        info!("clear after {} iterations", result.iterations);
    } else {
        warn!("still in contact after {} iterations", result.iterations);
    }
    info!("joints: {:.3?}", result.joint_positions);
    info!("error norm: {:.4}", result.error_norm);
    print_clearance(&scene, &allowed, constraint.link_set(), &result.joint_positions);

    Ok(())
}

fn print_clearance(scene: &SphereScene, allowed: &AllowedCollisionMatrix, links: &LinkSet, q: &[f64]) {
    let distances = scene.distances(q, links, allowed);
    for link in links {
        match distances.get(link) {
            Some(d) => info!("  {link:<14} {:+.3} m from {}", d.distance, d.nearest_body),
            None => info!("  {link:<14} nothing nearby"),
        }
    }
}
