//! One batched distance query per evaluation, converted to the base frame.

use std::collections::HashMap;

use nalgebra::{DVector, Isometry3, Point3, UnitVector3};

use crate::collision::{DistanceResult, LinkSet};
use crate::constraint::SolverState;

/// Nearest-obstacle data for one link, in the robot base frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceSample {
    /// Signed separation. Negative when overlapping.
    pub distance: f64,
    /// Point on the link nearest the obstacle.
    pub closest_point: Point3<f64>,
    /// Unit vector pointing away from the obstacle.
    pub avoidance_direction: UnitVector3<f64>,
}

impl DistanceSample {
    /// Express a world-frame result in the base frame.
    pub fn from_world(result: &DistanceResult, world_to_base: &Isometry3<f64>) -> Self {
        let direction = world_to_base.transform_vector(&result.avoidance_direction);
        Self {
            distance: result.distance,
            closest_point: world_to_base.transform_point(&result.link_point),
            avoidance_direction: UnitVector3::new_normalize(direction),
        }
    }
}

/// Joint state plus the distance data for every monitored link, shared by
/// all per-link computations of one evaluation.
#[derive(Debug, Clone)]
pub struct AvoidanceSnapshot<'a> {
    joint_state: &'a DVector<f64>,
    samples: HashMap<String, DistanceSample>,
}

impl<'a> AvoidanceSnapshot<'a> {
    /// Run the batched query for `links` and keep the base-frame samples.
    ///
    /// Links the service reports nothing for are absent from the snapshot.
    pub fn capture(state: &SolverState<'a>, links: &LinkSet, world_to_base: &Isometry3<f64>) -> Self {
        let results = state
            .collision
            .distances(state.joints.as_slice(), links, state.allowed_collisions);

        let samples = results
            .iter()
            .filter(|(link, _)| links.contains(*link))
            .map(|(link, result)| (link.clone(), DistanceSample::from_world(result, world_to_base)))
            .collect();

        Self {
            joint_state: state.joints,
            samples,
        }
    }

    /// Snapshot from samples already in the base frame.
    pub fn from_samples(joint_state: &'a DVector<f64>, samples: HashMap<String, DistanceSample>) -> Self {
        Self { joint_state, samples }
    }

    pub const fn joint_state(&self) -> &DVector<f64> {
        self.joint_state
    }

    pub fn sample(&self, link: &str) -> Option<&DistanceSample> {
        self.samples.get(link)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
