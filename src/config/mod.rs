//! Vehicle configuration documents.
//!
//! One YAML document per vehicle variant. Subsystems read named parameters
//! and lookup tables through [`ConfigNode`] and never touch the YAML
//! mechanics themselves; a missing required node is a load-time failure,
//! not a runtime default.

use log::info;
use nalgebra::Vector3;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::math::{Table1, Table2};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    File(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required node: {0}")]
    MissingNode(String),

    #[error("Malformed node {node}: {reason}")]
    Malformed { node: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Base data directory, resolved once at startup. All configuration file
/// references are relative to it.
#[derive(Debug, Clone)]
pub struct DataDir(PathBuf);

impl DataDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A parsed configuration document.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> ConfigNode<'_> {
        ConfigNode {
            value: &self.root,
            path: String::new(),
        }
    }
}

/// Read-only view of one node in the configuration tree.
///
/// Tracks its dotted path from the document root so errors name the exact
/// offending node.
#[derive(Debug, Clone)]
pub struct ConfigNode<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> ConfigNode<'a> {
    fn locate(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    fn malformed(&self, name: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::Malformed {
            node: self.locate(name),
            reason: reason.into(),
        }
    }

    /// Required child node.
    pub fn child(&self, name: &str) -> Result<ConfigNode<'a>, ConfigError> {
        self.try_child(name)
            .ok_or_else(|| ConfigError::MissingNode(self.locate(name)))
    }

    /// Optional child node.
    pub fn try_child(&self, name: &str) -> Option<ConfigNode<'a>> {
        self.value.get(name).map(|value| ConfigNode {
            value,
            path: self.locate(name),
        })
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.value.get(name).is_some()
    }

    /// Required sequence child, one node per element.
    pub fn children(&self, name: &str) -> Result<Vec<ConfigNode<'a>>, ConfigError> {
        let node = self.child(name)?;
        let seq = node
            .value
            .as_sequence()
            .ok_or_else(|| self.malformed(name, "expected a sequence"))?;
        Ok(seq
            .iter()
            .enumerate()
            .map(|(i, value)| ConfigNode {
                value,
                path: format!("{}[{}]", node.path, i),
            })
            .collect())
    }

    pub fn f64(&self, name: &str) -> Result<f64, ConfigError> {
        let node = self.child(name)?;
        node.value
            .as_f64()
            .ok_or_else(|| self.malformed(name, "expected a number"))
    }

    /// Scalar with a fallback for optional parameters.
    pub fn f64_or(&self, name: &str, default: f64) -> Result<f64, ConfigError> {
        match self.try_child(name) {
            Some(node) => node
                .value
                .as_f64()
                .ok_or_else(|| self.malformed(name, "expected a number")),
            None => Ok(default),
        }
    }

    pub fn u64_or(&self, name: &str, default: u64) -> Result<u64, ConfigError> {
        match self.try_child(name) {
            Some(node) => node
                .value
                .as_u64()
                .ok_or_else(|| self.malformed(name, "expected a non-negative integer")),
            None => Ok(default),
        }
    }

    pub fn u64(&self, name: &str) -> Result<u64, ConfigError> {
        let node = self.child(name)?;
        node.value
            .as_u64()
            .ok_or_else(|| self.malformed(name, "expected a non-negative integer"))
    }

    pub fn bool(&self, name: &str) -> Result<bool, ConfigError> {
        let node = self.child(name)?;
        node.value
            .as_bool()
            .ok_or_else(|| self.malformed(name, "expected a boolean"))
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.try_child(name) {
            Some(node) => node
                .value
                .as_bool()
                .ok_or_else(|| self.malformed(name, "expected a boolean")),
            None => Ok(default),
        }
    }

    pub fn string(&self, name: &str) -> Result<String, ConfigError> {
        let node = self.child(name)?;
        node.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.malformed(name, "expected a string"))
    }

    /// Three-component vector written as a YAML sequence.
    pub fn vector3(&self, name: &str) -> Result<Vector3<f64>, ConfigError> {
        let values = self.f64_sequence(name)?;
        if values.len() != 3 {
            return Err(self.malformed(name, format!("expected 3 components, got {}", values.len())));
        }
        Ok(Vector3::new(values[0], values[1], values[2]))
    }

    pub fn f64_sequence(&self, name: &str) -> Result<Vec<f64>, ConfigError> {
        let node = self.child(name)?;
        let seq = node
            .value
            .as_sequence()
            .ok_or_else(|| self.malformed(name, "expected a sequence of numbers"))?;
        seq.iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| self.malformed(name, "expected a sequence of numbers"))
            })
            .collect()
    }

    /// 1-D lookup table: `{ breakpoints: [...], values: [...] }`.
    pub fn table1(&self, name: &str) -> Result<Table1, ConfigError> {
        let node = self.child(name)?;
        let breakpoints = node.f64_sequence("breakpoints")?;
        let values = node.f64_sequence("values")?;
        Table1::new(breakpoints, values)
            .map_err(|e| self.malformed(name, e.to_string()))
    }

    /// 2-D lookup table: `{ rows: [...], cols: [...], values: [[...], ...] }`.
    pub fn table2(&self, name: &str) -> Result<Table2, ConfigError> {
        let node = self.child(name)?;
        let rows = node.f64_sequence("rows")?;
        let cols = node.f64_sequence("cols")?;
        let grid_node = node.child("values")?;
        let grid_seq = grid_node
            .value
            .as_sequence()
            .ok_or_else(|| node.malformed("values", "expected a sequence of rows"))?;
        let mut values = Vec::with_capacity(grid_seq.len());
        for (i, row) in grid_seq.iter().enumerate() {
            let row_node = ConfigNode {
                value: row,
                path: format!("{}[{}]", grid_node.path, i),
            };
            let row_seq = row
                .as_sequence()
                .ok_or_else(|| node.malformed("values", "expected a sequence of rows"))?;
            let row_values: Result<Vec<f64>, ConfigError> = row_seq
                .iter()
                .map(|v| {
                    v.as_f64().ok_or_else(|| ConfigError::Malformed {
                        node: row_node.path.clone(),
                        reason: "expected a number".into(),
                    })
                })
                .collect();
            values.push(row_values?);
        }
        Table2::new(rows, cols, values).map_err(|e| self.malformed(name, e.to_string()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const DOC: &str = r#"
vehicle:
  name: test
  mass: 1200.5
  engines: 2
  retractable: true
  position: [1.0, -2.0, 0.5]
governor:
  curve:
    breakpoints: [0.0, 1.0]
    values: [0.0, 2200.0]
"#;

    #[test]
    fn test_scalar_readers() {
        let doc = ConfigDocument::from_str(DOC).unwrap();
        let vehicle = doc.root().child("vehicle").unwrap();

        assert_eq!(vehicle.string("name").unwrap(), "test");
        assert_relative_eq!(vehicle.f64("mass").unwrap(), 1200.5);
        assert_eq!(vehicle.u64("engines").unwrap(), 2);
        assert!(vehicle.bool("retractable").unwrap());
        assert_eq!(
            vehicle.vector3("position").unwrap(),
            Vector3::new(1.0, -2.0, 0.5)
        );
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let doc = ConfigDocument::from_str(DOC).unwrap();
        let err = doc.root().child("vehicle").unwrap().f64("wing_area");

        match err {
            Err(ConfigError::MissingNode(path)) => assert_eq!(path, "vehicle.wing_area"),
            other => panic!("expected MissingNode, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_node_names_path() {
        let doc = ConfigDocument::from_str(DOC).unwrap();
        let err = doc.root().child("vehicle").unwrap().f64("name");

        match err {
            Err(ConfigError::Malformed { node, .. }) => assert_eq!(node, "vehicle.name"),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_table_reader() {
        let doc = ConfigDocument::from_str(DOC).unwrap();
        let governor = doc.root().child("governor").unwrap();
        let curve = governor.table1("curve").unwrap();

        assert_relative_eq!(curve.get(0.5), 1100.0);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", DOC).unwrap();

        let doc = ConfigDocument::load(file.path()).unwrap();
        assert!(doc.root().has_child("vehicle"));
    }

    #[test]
    fn test_data_dir_resolution() {
        let dir = DataDir::new("/tmp/aerodyne-data");
        assert_eq!(
            dir.resolve("c410.yaml"),
            PathBuf::from("/tmp/aerodyne-data/c410.yaml")
        );
    }
}
