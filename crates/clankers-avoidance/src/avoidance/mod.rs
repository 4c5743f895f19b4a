//! Obstacle-avoidance constraint.
//!
//! Each monitored link contributes one row to the constraint output: a
//! sigmoid push-away error that grows as the link nears its closest
//! obstacle, and a Jacobian row mapping joint velocities to the rate at
//! which the link's closest point moves away from that obstacle. A link is
//! satisfied while it stays at least `min_distance` away.
//!
//! # Lifecycle
//!
//! ```text
//! new / load_parameters / add_link / set_*  ──►  initialize  ──►  evaluate*
//! ```
//!
//! Configuration is frozen once [`initialize`](Constraint::initialize)
//! succeeds. Links are evaluated in lexicographic name order.

pub mod config;
pub mod params;
pub mod projector;
pub mod snapshot;
pub mod terms;

use std::collections::BTreeMap;

use nalgebra::Isometry3;
use tracing::{debug, error, info, warn};

use crate::collision::LinkSet;
use crate::constraint::{Constraint, ConstraintResults, ParameterReport, SolverState};
use crate::error::{ConfigError, ConfigWarning, ConstraintError};
use crate::jacobian::ChainJacobianSolver;
use crate::kinematics::RobotKinematics;

pub use config::{AvoidanceDefaults, LinkAvoidance, SigmoidShape};
pub use params::AvoidObstaclesParams;
pub use snapshot::{AvoidanceSnapshot, DistanceSample};

/// Keeps selected robot links away from obstacles.
#[derive(Debug, Clone)]
pub struct AvoidObstacles {
    defaults: AvoidanceDefaults,
    links: BTreeMap<String, LinkAvoidance>,
    /// Registered links present in the model, fixed at initialization.
    link_set: LinkSet,
    world_to_base: Isometry3<f64>,
    num_robot_joints: usize,
    initialized: bool,
}

impl Default for AvoidObstacles {
    fn default() -> Self {
        Self::new()
    }
}

impl AvoidObstacles {
    pub const NAME: &'static str = "avoid_obstacles";

    pub fn new() -> Self {
        Self {
            defaults: AvoidanceDefaults::default(),
            links: BTreeMap::new(),
            link_set: LinkSet::new(),
            world_to_base: Isometry3::identity(),
            num_robot_joints: 0,
            initialized: false,
        }
    }

    /// Newly registered links take their tunables from `defaults`.
    pub fn with_defaults(defaults: AvoidanceDefaults) -> Result<Self, ConfigError> {
        defaults.validate()?;
        Ok(Self {
            defaults,
            ..Self::new()
        })
    }

    pub const fn defaults(&self) -> &AvoidanceDefaults {
        &self.defaults
    }

    /// Register `link_name` with default tunables. Registering a link twice
    /// keeps the existing entry.
    pub fn add_link(&mut self, link_name: &str) -> Result<(), ConfigError> {
        self.ensure_configurable()?;
        if !self.links.contains_key(link_name) {
            self.links
                .insert(link_name.to_owned(), LinkAvoidance::new(link_name, &self.defaults));
        }
        Ok(())
    }

    pub fn set_weight(&mut self, link_name: &str, value: f64) -> Result<(), ConfigError> {
        self.link_mut(link_name)?.set_weight(value)
    }

    pub fn set_min_distance(&mut self, link_name: &str, value: f64) -> Result<(), ConfigError> {
        self.link_mut(link_name)?.set_min_distance(value)
    }

    pub fn set_avoidance_distance(&mut self, link_name: &str, value: f64) -> Result<(), ConfigError> {
        self.link_mut(link_name)?.set_avoidance_distance(value)
    }

    pub fn set_amplitude(&mut self, link_name: &str, value: f64) -> Result<(), ConfigError> {
        self.link_mut(link_name)?.set_amplitude(value)
    }

    pub fn link(&self, link_name: &str) -> Option<&LinkAvoidance> {
        self.links.get(link_name)
    }

    /// Registered links in evaluation order.
    pub fn links(&self) -> impl Iterator<Item = &LinkAvoidance> {
        self.links.values()
    }

    /// Links handed to every distance query.
    pub const fn link_set(&self) -> &LinkSet {
        &self.link_set
    }

    pub const fn num_robot_joints(&self) -> usize {
        self.num_robot_joints
    }

    /// Error, Jacobian row and status for one link against `snapshot`.
    pub fn evaluate_link(
        &self,
        link: &LinkAvoidance,
        snapshot: &AvoidanceSnapshot<'_>,
    ) -> Result<ConstraintResults, ConstraintError> {
        let sample = snapshot.sample(link.link_name());
        let error = terms::link_error(link, sample, &self.defaults.shape);
        let row = projector::jacobian_row(link, snapshot.joint_state().as_slice(), sample)?;
        let status = terms::is_satisfied(sample, link.min_distance());
        Ok(ConstraintResults::row(error, row, status))
    }

    const fn ensure_configurable(&self) -> Result<(), ConfigError> {
        if self.initialized {
            Err(ConfigError::AlreadyInitialized)
        } else {
            Ok(())
        }
    }

    fn link_mut(&mut self, link_name: &str) -> Result<&mut LinkAvoidance, ConfigError> {
        self.ensure_configurable()?;
        self.links
            .get_mut(link_name)
            .ok_or_else(|| ConfigError::UnknownLink(link_name.to_owned()))
    }

    fn apply_params(&mut self, params: &AvoidObstaclesParams, warnings: &mut Vec<ConfigWarning>) {
        type Setter = fn(&mut AvoidObstacles, &str, f64) -> Result<(), ConfigError>;

        if let Some(defaults) = params.defaults {
            if self.initialized {
                warnings.push(ConfigWarning::Rejected {
                    link: params::DEFAULTS.to_owned(),
                    source: ConfigError::AlreadyInitialized,
                });
            } else if let Err(source) = defaults.validate() {
                warnings.push(ConfigWarning::Rejected {
                    link: params::DEFAULTS.to_owned(),
                    source,
                });
            } else {
                self.defaults = defaults;
            }
        }

        let columns: [(Option<&Vec<f64>>, Setter); 4] = [
            (params.amplitude.as_ref(), Self::set_amplitude),
            (params.minimum_distance.as_ref(), Self::set_min_distance),
            (params.avoidance_distance.as_ref(), Self::set_avoidance_distance),
            (params.weight.as_ref(), Self::set_weight),
        ];

        for (i, name) in params.link_names.iter().enumerate() {
            if let Err(source) = self.add_link(name) {
                warnings.push(ConfigWarning::Rejected {
                    link: name.clone(),
                    source,
                });
                continue;
            }
            for (values, setter) in &columns {
                let Some(value) = values.and_then(|v| v.get(i)) else {
                    continue;
                };
                if let Err(source) = setter(self, name, *value) {
                    warnings.push(ConfigWarning::Rejected {
                        link: name.clone(),
                        source,
                    });
                }
            }
        }
    }
}

impl Constraint for AvoidObstacles {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn load_parameters(&mut self, params: &toml::Table) -> ParameterReport {
        let (params, mut warnings) = AvoidObstaclesParams::from_table(params);
        self.apply_params(&params, &mut warnings);
        for warning in &warnings {
            warn!("{}: {warning}", Self::NAME);
        }
        ParameterReport { warnings }
    }

    fn initialize(&mut self, kinematics: &RobotKinematics) -> Result<(), ConstraintError> {
        self.initialized = false;
        self.link_set.clear();
        for link in self.links.values_mut() {
            link.release();
        }

        if self.links.is_empty() {
            warn!(
                "{}: no links configured, monitoring every link of chain {} -> {}",
                Self::NAME,
                kinematics.base_link_name(),
                kinematics.tip_link_name()
            );
            for name in kinematics.link_names() {
                self.links
                    .insert(name.clone(), LinkAvoidance::new(name.as_str(), &self.defaults));
            }
        }

        let num_robot_joints = kinematics.num_joints();
        for (name, link) in &mut self.links {
            match kinematics.inboard_chain(name) {
                Ok(chain) => link.bind(ChainJacobianSolver::new(chain), num_robot_joints),
                Err(source) => {
                    error!("{}: failed to build sub-chain for link {name}: {source}", Self::NAME);
                    return Err(ConstraintError::Initialization {
                        link: name.clone(),
                        source,
                    });
                }
            }
        }

        self.link_set = kinematics
            .model()
            .link_names()
            .into_iter()
            .filter(|name| self.links.contains_key(*name))
            .map(str::to_owned)
            .collect();
        self.world_to_base = kinematics.base_in_world().inverse();
        self.num_robot_joints = num_robot_joints;
        self.initialized = true;

        info!(
            "{}: initialized {} links over {num_robot_joints} joints",
            Self::NAME,
            self.links.len()
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn evaluate(&self, state: &SolverState<'_>) -> Result<ConstraintResults, ConstraintError> {
        if !self.initialized {
            return Err(ConstraintError::NotInitialized);
        }
        if state.joints.len() != self.num_robot_joints {
            return Err(ConstraintError::JointCount {
                expected: self.num_robot_joints,
                got: state.joints.len(),
            });
        }

        let snapshot = AvoidanceSnapshot::capture(state, &self.link_set, &self.world_to_base);
        debug!(
            "{}: distance data for {} of {} links",
            Self::NAME,
            snapshot.len(),
            self.links.len()
        );

        let mut results = ConstraintResults::empty(self.num_robot_joints);
        for link in self.links.values() {
            results.append(self.evaluate_link(link, &snapshot)?);
        }
        Ok(results)
    }
}
