//! Error types for chain construction, configuration and evaluation.

use std::path::PathBuf;

/// Errors raised while building or evaluating kinematic chains.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KinematicsError {
    /// The link does not exist in the robot model.
    #[error("unknown link: {0}")]
    UnknownLink(String),

    /// `to` does not lie below `from` in the joint tree.
    #[error("no kinematic path from '{from}' to '{to}'")]
    Unreachable { from: String, to: String },

    /// A joint vector of the wrong length was supplied.
    #[error("joint count mismatch: expected {expected}, got {got}")]
    JointCount { expected: usize, got: usize },

    /// The link's joints are not the leading joints of the robot chain.
    #[error("link '{0}' is not driven by a prefix of the robot's joint chain")]
    NotInboard(String),
}

/// Recoverable configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setter named a link that was never registered.
    #[error("unknown avoidance link: {0}")]
    UnknownLink(String),

    /// Configuration is frozen once the constraint is initialized.
    #[error("constraint is already initialized")]
    AlreadyInitialized,

    /// Parameter value is outside its allowed range.
    #[error("invalid {field} {value}: out of range")]
    InvalidValue { field: &'static str, value: f64 },

    /// Failed to read a parameter file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parameter file is not valid TOML.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A parameter problem that was absorbed with a fallback to defaults.
#[derive(Debug, thiserror::Error)]
pub enum ConfigWarning {
    /// The member is absent from the parameter table.
    #[error("unable to retrieve '{0}', default parameters will be used")]
    MissingMember(&'static str),

    /// The member exists but has the wrong type.
    #[error("'{member}' is malformed ({reason}), default parameters will be used")]
    InvalidMember { member: &'static str, reason: String },

    /// A parameter array does not line up with `link_names`.
    #[error(
        "'{member}' has {got} entries but link_names has {expected}, default parameters will be used"
    )]
    LengthMismatch {
        member: &'static str,
        expected: usize,
        got: usize,
    },

    /// A value was rejected by a setter; the link keeps its default.
    #[error("rejected parameter for link '{link}': {source}")]
    Rejected { link: String, source: ConfigError },
}

/// Errors surfaced by a constraint to the outer solver.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    /// A configured link's sub-chain could not be built. Fatal.
    #[error("failed to initialize constraint for link '{link}': {source}")]
    Initialization {
        link: String,
        source: KinematicsError,
    },

    /// `evaluate` was called without a successful `initialize`.
    #[error("constraint is not initialized")]
    NotInitialized,

    /// The solver state does not match the robot the constraint was built for.
    #[error("solver state has {got} joints, constraint expects {expected}")]
    JointCount { expected: usize, got: usize },

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            KinematicsError::UnknownLink("ghost".into()).to_string(),
            "unknown link: ghost"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "amplitude",
                value: -1.0
            }
            .to_string(),
            "invalid amplitude -1: must be finite and non-negative"
        );
        assert_eq!(
            ConfigWarning::LengthMismatch {
                member: "amplitude",
                expected: 3,
                got: 2
            }
            .to_string(),
            "'amplitude' has 2 entries but link_names has 3, default parameters will be used"
        );
    }

    #[test]
    fn initialization_error_keeps_source() {
        let e = ConstraintError::Initialization {
            link: "forearm".into(),
            source: KinematicsError::UnknownLink("forearm".into()),
        };
        let source = std::error::Error::source(&e).unwrap();
        assert_eq!(source.to_string(), "unknown link: forearm");
        assert!(e.to_string().contains("forearm"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<KinematicsError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ConfigWarning>();
        assert_send_sync::<ConstraintError>();
    }
}
