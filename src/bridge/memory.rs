//! In-memory parameter bridge backed by a JSON document snapshot.
//!
//! The snapshot is an opaque blob as far as the rest of the crate is
//! concerned: a JSON array of [`Parameter`] records, loaded once at startup
//! and optionally written back. It stands in for a live application session
//! during offline work and in tests.

use std::fs;
use std::path::Path;

use crate::bridge::{BridgeError, BridgeResult, Parameter, ParameterBridge};

/// A [`ParameterBridge`] over an in-memory parameter list.
///
/// Enumeration order is the order parameters were inserted, matching how the
/// host application reports them.
#[derive(Debug, Default)]
pub struct MemoryBridge {
    parameters: Vec<Parameter>,
}

impl MemoryBridge {
    /// Creates a bridge over an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Creates a bridge over an existing parameter list.
    #[must_use]
    pub fn from_snapshot(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Loads a bridge from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// parameter records.
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let contents =
            fs::read_to_string(path).map_err(|e| BridgeError::snapshot_read(path, e))?;

        let parameters: Vec<Parameter> =
            serde_json::from_str(&contents).map_err(|e| BridgeError::SnapshotParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self { parameters })
    }

    /// Writes the current parameter list back to a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> BridgeResult<()> {
        let json = serde_json::to_string_pretty(&self.parameters)
            .map_err(|e| BridgeError::snapshot_write(path, std::io::Error::other(e)))?;

        fs::write(path, json).map_err(|e| BridgeError::snapshot_write(path, e))
    }

    /// Number of parameters in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the document has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Adds a parameter to the document.
    pub fn insert(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    fn find(&self, name: &str) -> BridgeResult<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| BridgeError::not_found(name))
    }

    fn find_writable(&mut self, name: &str) -> BridgeResult<&mut Parameter> {
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| BridgeError::not_found(name))?;

        if param.is_read_only {
            return Err(BridgeError::read_only(name));
        }

        Ok(param)
    }
}

impl ParameterBridge for MemoryBridge {
    fn list_parameters(&self) -> BridgeResult<Vec<Parameter>> {
        Ok(self.parameters.clone())
    }

    fn get_value(&self, name: &str) -> BridgeResult<f64> {
        Ok(self.find(name)?.value)
    }

    fn set_value(&mut self, name: &str, value: f64) -> BridgeResult<()> {
        self.find_writable(name)?.value = value;
        Ok(())
    }

    fn set_comment(&mut self, name: &str, comment: &str) -> BridgeResult<()> {
        self.find_writable(name)?.comment = comment.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, value: f64, read_only: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            value,
            unit: "mm".to_string(),
            expression: format!("{value} mm"),
            comment: String::new(),
            is_read_only: read_only,
        }
    }

    #[test]
    fn list_preserves_insertion_order() {
        let bridge = MemoryBridge::from_snapshot(vec![
            sample("d0", 10.0, false),
            sample("d1", 20.0, false),
        ]);
        let names: Vec<_> = bridge
            .list_parameters()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["d0", "d1"]);
    }

    #[test]
    fn get_and_set_value() {
        let mut bridge = MemoryBridge::from_snapshot(vec![sample("d0", 10.0, false)]);
        assert!((bridge.get_value("d0").unwrap() - 10.0).abs() < f64::EPSILON);

        bridge.set_value("d0", 12.5).unwrap();
        assert!((bridge.get_value("d0").unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let bridge = MemoryBridge::new();
        assert!(matches!(
            bridge.get_value("missing"),
            Err(BridgeError::ParameterNotFound { .. })
        ));
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut bridge = MemoryBridge::from_snapshot(vec![sample("ref", 1.0, true)]);

        assert!(matches!(
            bridge.set_value("ref", 2.0),
            Err(BridgeError::ReadOnly { .. })
        ));
        assert!(matches!(
            bridge.set_comment("ref", "CA0:r"),
            Err(BridgeError::ReadOnly { .. })
        ));

        // Reads still work.
        assert!((bridge.get_value("ref").unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_comment_round_trips() {
        let mut bridge = MemoryBridge::from_snapshot(vec![sample("d0", 10.0, false)]);
        bridge.set_comment("d0", "CA0:L #Length").unwrap();

        let params = bridge.list_parameters().unwrap();
        assert_eq!(params[0].comment, "CA0:L #Length");
    }
}
