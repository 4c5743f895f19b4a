//! URDF parsing and robot model representation for Clankers.
//!
//! Provides the robot's kinematic tree (links, joints, collision geometry)
//! as consumed by chain construction and distance queries.

pub mod error;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::UrdfError;
pub use parser::{parse_file, parse_string};
pub use types::{
    Collision, Geometry, JointData, JointLimits, JointType, LinkData, Origin, RobotModel,
};
