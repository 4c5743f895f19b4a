//! Core data types for the in-memory robot model.
//!
//! Only what kinematics and distance queries need is kept: the joint tree,
//! joint origins/axes/limits, and per-link collision geometry. Collections
//! are ordered maps so every enumeration of links or joints is
//! deterministic.

use std::collections::BTreeMap;

use crate::error::UrdfError;

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis, with position limits.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
    /// Unconstrained 6-DOF joint.
    Floating,
    /// Planar motion.
    Planar,
}

impl JointType {
    /// Whether this joint type contributes a column to a chain Jacobian.
    pub const fn is_actuated(self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous | Self::Prismatic)
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Position limits of a joint. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointLimits {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A pose given as position + roll-pitch-yaw, as written in URDF.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Origin {
    /// Translation `[x, y, z]` in meters.
    pub xyz: [f64; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f64; 3],
}

impl Origin {
    /// Pure translation.
    pub const fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            xyz: [x, y, z],
            rpy: [0.0; 3],
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry / Collision
// ---------------------------------------------------------------------------

/// Collision shape of a link.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere { radius: f64 },
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Mesh { filename: String, scale: [f64; 3] },
}

impl Geometry {
    /// Radius of the smallest origin-centred sphere enclosing the shape.
    ///
    /// Meshes have no analytic extent and return `None`.
    pub fn bounding_radius(&self) -> Option<f64> {
        match self {
            Self::Sphere { radius } => Some(*radius),
            Self::Box { size } => {
                Some(0.5 * (size[0] * size[0] + size[1] * size[1] + size[2] * size[2]).sqrt())
            }
            Self::Cylinder { radius, length } => {
                Some((radius * radius + 0.25 * length * length).sqrt())
            }
            Self::Mesh { .. } => None,
        }
    }
}

/// A collision element of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Pose of the geometry in the link frame.
    pub origin: Origin,
    pub geometry: Geometry,
}

// ---------------------------------------------------------------------------
// LinkData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    /// Link name.
    pub name: String,
    /// Collision geometries.
    pub collisions: Vec<Collision>,
}

impl LinkData {
    /// Create a link with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collisions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// JointData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointData {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint origin relative to the parent link.
    pub origin: Origin,
    /// Joint axis in the joint frame (default `[1, 0, 0]` per URDF).
    pub axis: [f64; 3],
    /// Position limits.
    pub limits: JointLimits,
}

// ---------------------------------------------------------------------------
// RobotModel
// ---------------------------------------------------------------------------

/// The robot's kinematic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotModel {
    /// Robot name.
    pub name: String,
    /// All links, keyed by name.
    pub links: BTreeMap<String, LinkData>,
    /// All joints, keyed by name.
    pub joints: BTreeMap<String, JointData>,
    /// Name of the root link (the one never referenced as a child).
    pub root_link: String,
}

impl RobotModel {
    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&LinkData, UrdfError> {
        self.links
            .get(name)
            .ok_or_else(|| UrdfError::MissingLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&JointData, UrdfError> {
        self.joints
            .get(name)
            .ok_or_else(|| UrdfError::MissingJoint(name.into()))
    }

    /// Whether a link with this name exists.
    pub fn has_link(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    /// The joint whose child is `link`, if any. The root link has none.
    pub fn parent_joint(&self, link: &str) -> Option<&JointData> {
        self.joints.values().find(|j| j.child == link)
    }

    /// Joints whose parent is `link`, in name order.
    pub fn child_joints<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a JointData> + 'a {
        self.joints.values().filter(move |j| j.parent == link)
    }

    /// Number of actuated degrees of freedom in the whole tree.
    pub fn dof(&self) -> usize {
        self.joints
            .values()
            .filter(|j| j.joint_type.is_actuated())
            .count()
    }

    /// Names of all links, sorted.
    pub fn link_names(&self) -> Vec<&str> {
        self.links.keys().map(String::as_str).collect()
    }

    /// Ordered joint names from `from_link` down to `to_link`.
    ///
    /// Walks parent joints upward from `to_link`, so the result is unique
    /// in a tree. Returns `None` if either link is missing or `to_link`
    /// does not lie below `from_link`.
    pub fn joint_path(&self, from_link: &str, to_link: &str) -> Option<Vec<String>> {
        if !self.has_link(from_link) || !self.has_link(to_link) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = to_link;
        while current != from_link {
            let joint = self.parent_joint(current)?;
            path.push(joint.name.clone());
            current = &joint.parent;
            if path.len() > self.joints.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
