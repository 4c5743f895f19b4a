//! Avoidance parameters read from a TOML table.
//!
//! Links are listed in `link_names`; each tunable is an array running
//! parallel to it:
//!
//! ```toml
//! link_names = ["forearm", "upper_arm"]
//! amplitude = [0.3, 0.2]
//! minimum_distance = [0.1, 0.05]
//! avoidance_distance = [0.3, 0.3]
//! weight = [1.0, 1.0]
//!
//! [defaults]          # optional, applies to links without array values
//! amplitude = 0.25
//! ```
//!
//! Problems never abort loading. A missing or malformed member, or an array
//! whose length disagrees with `link_names`, is dropped in full and reported
//! as a [`ConfigWarning`] so every link keeps its default for that value.

use std::path::Path;

use serde::de::DeserializeOwned;

use super::config::AvoidanceDefaults;
use crate::error::{ConfigError, ConfigWarning};

pub const LINK_NAMES: &str = "link_names";
pub const AMPLITUDE: &str = "amplitude";
pub const MINIMUM_DISTANCE: &str = "minimum_distance";
pub const AVOIDANCE_DISTANCE: &str = "avoidance_distance";
pub const WEIGHT: &str = "weight";
pub const DEFAULTS: &str = "defaults";

/// Parameters recovered from a table. Arrays are either absent or exactly
/// as long as `link_names`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvoidObstaclesParams {
    pub link_names: Vec<String>,
    pub amplitude: Option<Vec<f64>>,
    pub minimum_distance: Option<Vec<f64>>,
    pub avoidance_distance: Option<Vec<f64>>,
    pub weight: Option<Vec<f64>>,
    pub defaults: Option<AvoidanceDefaults>,
}

impl AvoidObstaclesParams {
    /// Read every member of `table`, collecting what had to be dropped.
    pub fn from_table(table: &toml::Table) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let link_names = member::<Vec<String>>(table, LINK_NAMES, &mut warnings).unwrap_or_default();
        let expected = link_names.len();
        let mut array = |name: &'static str| {
            member::<Vec<f64>>(table, name, &mut warnings).and_then(|values| {
                if values.len() == expected {
                    Some(values)
                } else {
                    warnings.push(ConfigWarning::LengthMismatch {
                        member: name,
                        expected,
                        got: values.len(),
                    });
                    None
                }
            })
        };

        let amplitude = array(AMPLITUDE);
        let minimum_distance = array(MINIMUM_DISTANCE);
        let avoidance_distance = array(AVOIDANCE_DISTANCE);
        let weight = array(WEIGHT);

        let defaults = match table.get(DEFAULTS) {
            None => None,
            Some(value) => decode(value, DEFAULTS, &mut warnings),
        };

        let params = Self {
            link_names,
            amplitude,
            minimum_distance,
            avoidance_distance,
            weight,
            defaults,
        };
        (params, warnings)
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        Ok(Self::from_table(&parse_table(text)?))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        Ok(Self::from_table(&load_table(path)?))
    }
}

/// Parse TOML text into a table.
pub fn parse_table(text: &str) -> Result<toml::Table, ConfigError> {
    Ok(text.parse::<toml::Table>()?)
}

/// Read a TOML file into a table.
pub fn load_table(path: impl AsRef<Path>) -> Result<toml::Table, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&text)
}

fn member<T: DeserializeOwned>(
    table: &toml::Table,
    name: &'static str,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<T> {
    let Some(value) = table.get(name) else {
        warnings.push(ConfigWarning::MissingMember(name));
        return None;
    };
    decode(value, name, warnings)
}

fn decode<T: DeserializeOwned>(
    value: &toml::Value,
    name: &'static str,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<T> {
    match T::deserialize(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warnings.push(ConfigWarning::InvalidMember {
                member: name,
                reason: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (AvoidObstaclesParams, Vec<ConfigWarning>) {
        AvoidObstaclesParams::from_toml_str(text).unwrap()
    }

    #[test]
    fn complete_table() {
        let (params, warnings) = parse(
            r#"
            link_names = ["forearm", "upper_arm"]
            amplitude = [0.3, 0.2]
            minimum_distance = [0.1, 0.05]
            avoidance_distance = [0.4, 0.3]
            weight = [1, 2]
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(params.link_names, ["forearm", "upper_arm"]);
        assert_eq!(params.amplitude, Some(vec![0.3, 0.2]));
        assert_eq!(params.minimum_distance, Some(vec![0.1, 0.05]));
        assert_eq!(params.avoidance_distance, Some(vec![0.4, 0.3]));
        assert_eq!(params.weight, Some(vec![1.0, 2.0]));
        assert!(params.defaults.is_none());
    }

    #[test]
    fn length_mismatch_drops_whole_array() {
        let (params, warnings) = parse(
            r#"
            link_names = ["a", "b", "c"]
            amplitude = [0.3, 0.2]
            minimum_distance = [0.1, 0.1, 0.1]
            avoidance_distance = [0.3, 0.3, 0.3]
            weight = [1.0, 1.0, 1.0]
            "#,
        );
        assert!(params.amplitude.is_none());
        assert_eq!(params.minimum_distance.as_deref(), Some(&[0.1, 0.1, 0.1][..]));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ConfigWarning::LengthMismatch {
                member: AMPLITUDE,
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn missing_members_are_reported() {
        let (params, warnings) = parse(r#"link_names = ["forearm"]"#);
        assert_eq!(params.link_names, ["forearm"]);
        assert!(params.amplitude.is_none());
        let missing: Vec<_> = warnings
            .iter()
            .filter_map(|w| match w {
                ConfigWarning::MissingMember(name) => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(missing, [AMPLITUDE, MINIMUM_DISTANCE, AVOIDANCE_DISTANCE, WEIGHT]);
    }

    #[test]
    fn missing_link_names_registers_nothing() {
        let (params, warnings) = parse("amplitude = [0.3]");
        assert!(params.link_names.is_empty());
        assert!(matches!(warnings[0], ConfigWarning::MissingMember(LINK_NAMES)));
        // An array cannot line up with zero links.
        assert!(params.amplitude.is_none());
    }

    #[test]
    fn malformed_member_is_reported() {
        let (params, warnings) = parse(
            r#"
            link_names = ["forearm"]
            amplitude = "loud"
            minimum_distance = [0.1]
            avoidance_distance = [0.3]
            weight = [1.0]
            "#,
        );
        assert!(params.amplitude.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ConfigWarning::InvalidMember { member: AMPLITUDE, .. }
        ));
    }

    #[test]
    fn defaults_subtable() {
        let (params, _) = parse(
            r#"
            link_names = []
            [defaults]
            amplitude = 0.25
            "#,
        );
        let defaults = params.defaults.unwrap();
        assert_eq!(defaults.amplitude, 0.25);
        assert_eq!(defaults.min_distance, 0.1);
    }

    #[test]
    fn bad_toml_and_missing_file_are_errors() {
        assert!(matches!(
            AvoidObstaclesParams::from_toml_str("link_names = ["),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            AvoidObstaclesParams::from_file("/nonexistent/avoidance.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
