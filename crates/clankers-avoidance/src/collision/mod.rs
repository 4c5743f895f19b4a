//! Distance queries between robot links and their surroundings.
//!
//! The [`CollisionService`] trait is the seam to whatever geometry engine
//! the host solver uses. Queries are batched: one call covers every link in
//! a [`LinkSet`], and results come back in the world frame keyed by link
//! name. [`SphereScene`] is an analytic implementation over sphere proxies.

mod sphere;

use std::collections::{BTreeSet, HashMap};

use nalgebra::{Point3, UnitVector3};

use clankers_urdf::RobotModel;

pub use sphere::{Obstacle, SphereScene};

/// Set of link names a query covers.
pub type LinkSet = BTreeSet<String>;

/// Query results keyed by link name.
pub type DistanceMap = HashMap<String, DistanceResult>;

/// Nearest-obstacle information for one link, in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceResult {
    /// Signed separation. Negative when the bodies overlap.
    pub distance: f64,
    /// Point on the link nearest the obstacle.
    pub link_point: Point3<f64>,
    /// Point on the obstacle nearest the link.
    pub obstacle_point: Point3<f64>,
    /// Unit vector from the obstacle toward the link.
    pub avoidance_direction: UnitVector3<f64>,
    /// Name of the body the link is nearest to.
    pub nearest_body: String,
}

/// Pairs of bodies whose proximity is ignored by distance queries.
///
/// Pairs are unordered: allowing `(a, b)` also allows `(b, a)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedCollisionMatrix {
    pairs: BTreeSet<(String, String)>,
}

impl AllowedCollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        }
    }

    /// Ignore proximity between `a` and `b`.
    pub fn allow(&mut self, a: &str, b: &str) {
        self.pairs.insert(Self::key(a, b));
    }

    /// Stop ignoring proximity between `a` and `b`.
    pub fn disallow(&mut self, a: &str, b: &str) {
        self.pairs.remove(&Self::key(a, b));
    }

    pub fn is_allowed(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Allow every parent/child link pair joined by a joint. Adjacent links
    /// touch by construction.
    #[must_use]
    pub fn with_adjacent_links(mut self, model: &RobotModel) -> Self {
        for joint in model.joints.values() {
            self.allow(&joint.parent, &joint.child);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Batched nearest-distance queries.
pub trait CollisionService {
    /// Nearest-obstacle data for every link in `links` at joint positions
    /// `joints`, skipping pairs in `allowed`. Links with nothing meaningful
    /// nearby are omitted from the map.
    fn distances(
        &self,
        joints: &[f64],
        links: &LinkSet,
        allowed: &AllowedCollisionMatrix,
    ) -> DistanceMap;
}
