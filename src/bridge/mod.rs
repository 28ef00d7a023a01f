//! Access to the externally-owned parameter set.
//!
//! The design parameters live in a document owned by the host CAD
//! application; this crate only ever sees them through the
//! [`ParameterBridge`] trait. A production deployment plugs in a backend that
//! talks to the live application (on Windows, via its automation interface);
//! this crate ships [`MemoryBridge`], an in-memory backend over a JSON
//! document snapshot, used for offline work and tests.
//!
//! The bridge is synchronous and assumed single-session: one document, one
//! application instance, access serialised by the backend itself.

pub mod error;
pub mod memory;

pub use error::{BridgeError, BridgeResult};
pub use memory::MemoryBridge;

use serde::{Deserialize, Serialize};

/// A single named design parameter as reported by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within the document.
    pub name: String,

    /// Current numeric value in the document's database units.
    pub value: f64,

    /// Unit string, `"unitless"` when the application reports none.
    #[serde(default = "default_unit")]
    pub unit: String,

    /// The driving expression, e.g. `"10 mm"` or `"d2 * 2"`.
    pub expression: String,

    /// Free-text comment field; carries the mapping grammar when mapped.
    #[serde(default)]
    pub comment: String,

    /// Derived and reference parameters cannot be written.
    #[serde(default)]
    pub is_read_only: bool,
}

fn default_unit() -> String {
    "unitless".to_string()
}

/// Read/write access to the parameters of a single open document.
pub trait ParameterBridge {
    /// Enumerates all parameters of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is open or enumeration fails.
    fn list_parameters(&self) -> BridgeResult<Vec<Parameter>>;

    /// Reads the current value of one parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter does not exist.
    fn get_value(&self, name: &str) -> BridgeResult<f64>;

    /// Writes a new value to one parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter does not exist or is read-only.
    fn set_value(&mut self, name: &str, value: f64) -> BridgeResult<()>;

    /// Replaces the comment field of one parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter does not exist or is read-only.
    fn set_comment(&mut self, name: &str, comment: &str) -> BridgeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_deserialize_defaults() {
        let json = r#"{"name": "d0", "value": 10.0, "expression": "10 mm"}"#;
        let param: Parameter = serde_json::from_str(json).unwrap();
        assert_eq!(param.unit, "unitless");
        assert_eq!(param.comment, "");
        assert!(!param.is_read_only);
    }

    #[test]
    fn parameter_round_trips_through_json() {
        let param = Parameter {
            name: "L".to_string(),
            value: 42.5,
            unit: "mm".to_string(),
            expression: "42.5 mm".to_string(),
            comment: "CA0:L #Length".to_string(),
            is_read_only: false,
        };
        let json = serde_json::to_string(&param).unwrap();
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, param);
    }
}
