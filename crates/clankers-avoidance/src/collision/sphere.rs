//! Analytic distance queries over sphere proxies.
//!
//! Each robot link is approximated by one or more spheres fixed in its
//! frame; the environment is a list of static spheres in the world frame.
//! Sphere-sphere distance is exact and cheap, which makes this scene a
//! convenient stand-in for a full geometry engine.

use std::collections::BTreeMap;

use nalgebra::{Point3, UnitVector3, Vector3};
use tracing::debug;

use crate::chain::KinematicChain;
use crate::collision::{AllowedCollisionMatrix, CollisionService, DistanceMap, DistanceResult, LinkSet};
use crate::error::KinematicsError;
use crate::kinematics::RobotKinematics;

/// A static spherical obstacle in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub name: String,
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(name: impl Into<String>, center: Point3<f64>, radius: f64) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
        }
    }
}

#[derive(Debug, Clone)]
struct LinkSpheres {
    chain: KinematicChain,
    /// `(center in link frame, radius)`.
    spheres: Vec<(Point3<f64>, f64)>,
}

/// Sphere-proxy robot and environment.
#[derive(Debug, Clone)]
pub struct SphereScene {
    kinematics: RobotKinematics,
    links: BTreeMap<String, LinkSpheres>,
    obstacles: Vec<Obstacle>,
    max_distance: f64,
}

impl SphereScene {
    /// Pairs farther apart than this are not reported.
    pub const DEFAULT_MAX_DISTANCE: f64 = 1.0;

    /// Empty scene for the given robot.
    pub fn new(kinematics: &RobotKinematics) -> Self {
        Self {
            kinematics: kinematics.clone(),
            links: BTreeMap::new(),
            obstacles: Vec::new(),
            max_distance: Self::DEFAULT_MAX_DISTANCE,
        }
    }

    /// Scene whose link spheres enclose each link's URDF collision shapes.
    ///
    /// Only links along the main chain are covered. Mesh geometry has no
    /// analytic extent and is skipped.
    pub fn from_collision_geometry(kinematics: &RobotKinematics) -> Result<Self, KinematicsError> {
        let mut scene = Self::new(kinematics);
        let model = kinematics.model();
        let mut covered = vec![kinematics.base_link_name().to_owned()];
        covered.extend(kinematics.link_names().iter().cloned());

        for link_name in &covered {
            let Ok(link) = model.link(link_name) else {
                continue;
            };
            for collision in &link.collisions {
                let Some(radius) = collision.geometry.bounding_radius() else {
                    debug!("no sphere proxy for mesh collision on link {link_name}");
                    continue;
                };
                let [x, y, z] = collision.origin.xyz;
                scene.add_link_sphere(link_name, Point3::new(x, y, z), radius)?;
            }
        }
        Ok(scene)
    }

    /// Attach a sphere to `link`, centred at `center` in the link frame.
    pub fn add_link_sphere(
        &mut self,
        link: &str,
        center: Point3<f64>,
        radius: f64,
    ) -> Result<(), KinematicsError> {
        if let Some(entry) = self.links.get_mut(link) {
            entry.spheres.push((center, radius));
            return Ok(());
        }
        let chain = self.kinematics.inboard_chain(link)?;
        self.links.insert(
            link.to_owned(),
            LinkSpheres {
                chain,
                spheres: vec![(center, radius)],
            },
        );
        Ok(())
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Report only pairs within `max_distance`.
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Names of links that carry at least one sphere.
    pub fn link_names(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// World-frame spheres of every link at joint positions `joints`.
    fn world_spheres(&self, joints: &[f64]) -> BTreeMap<&str, Vec<(Point3<f64>, f64)>> {
        let base_in_world = self.kinematics.base_in_world();
        let mut placed = BTreeMap::new();
        for (name, link) in &self.links {
            let dof = link.chain.dof();
            let Some(inboard) = joints.get(..dof) else {
                debug!("link {name} needs {dof} joints, state has {}", joints.len());
                continue;
            };
            let Ok(pose) = link.chain.forward_kinematics(inboard) else {
                continue;
            };
            let world = base_in_world * pose;
            placed.insert(
                name.as_str(),
                link.spheres.iter().map(|(c, r)| (world * c, *r)).collect(),
            );
        }
        placed
    }
}

impl CollisionService for SphereScene {
    fn distances(
        &self,
        joints: &[f64],
        links: &LinkSet,
        allowed: &AllowedCollisionMatrix,
    ) -> DistanceMap {
        let bodies = self.world_spheres(joints);
        let mut results = DistanceMap::new();

        for link in links {
            let Some(own) = bodies.get(link.as_str()) else {
                continue;
            };
            let mut nearest: Option<DistanceResult> = None;

            for (center, radius) in own {
                for obstacle in &self.obstacles {
                    if allowed.is_allowed(link, &obstacle.name) {
                        continue;
                    }
                    keep_nearest(
                        &mut nearest,
                        sphere_distance(center, *radius, &obstacle.center, obstacle.radius, &obstacle.name),
                    );
                }
                for (other, spheres) in &bodies {
                    if *other == link.as_str() || allowed.is_allowed(link, other) {
                        continue;
                    }
                    for (other_center, other_radius) in spheres {
                        keep_nearest(
                            &mut nearest,
                            sphere_distance(center, *radius, other_center, *other_radius, other),
                        );
                    }
                }
            }

            if let Some(result) = nearest.filter(|r| r.distance <= self.max_distance) {
                results.insert(link.clone(), result);
            }
        }
        results
    }
}

fn keep_nearest(nearest: &mut Option<DistanceResult>, candidate: DistanceResult) {
    if nearest
        .as_ref()
        .is_none_or(|current| candidate.distance < current.distance)
    {
        *nearest = Some(candidate);
    }
}

/// Signed distance between two spheres, seen from the first.
fn sphere_distance(
    link_center: &Point3<f64>,
    link_radius: f64,
    other_center: &Point3<f64>,
    other_radius: f64,
    other_name: &str,
) -> DistanceResult {
    let offset = link_center - other_center;
    // Concentric spheres have no preferred direction; push up.
    let direction = UnitVector3::try_new(offset, f64::EPSILON).unwrap_or_else(Vector3::z_axis);
    DistanceResult {
        distance: offset.norm() - link_radius - other_radius,
        link_point: link_center - direction.into_inner() * link_radius,
        obstacle_point: other_center + direction.into_inner() * other_radius,
        avoidance_direction: direction,
        nearest_body: other_name.to_owned(),
    }
}
