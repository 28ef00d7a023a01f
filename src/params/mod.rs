//! Read/write paths combining the parameter bridge with the mapping codec.
//!
//! On the read path every parameter comment is passed through
//! [`mapping::decode`] so clients see `{symbol, note}` alongside the raw
//! parameter fields. On the write path the requested mapping is validated,
//! encoded with [`mapping::encode`] and written back through the bridge.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::bridge::{BridgeError, Parameter, ParameterBridge};
use crate::mapping;

/// Result type for parameter service operations.
pub type ParamResult<T> = Result<T, ParamError>;

/// Errors on the mapping write path.
///
/// The read path never errors on content: undecodable comments simply yield
/// an unmapped parameter.
#[derive(Debug, Error)]
pub enum ParamError {
    /// The underlying bridge operation failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The requested symbol does not satisfy the mapping grammar.
    #[error("Invalid symbol '{symbol}': {message}")]
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
        /// Description of what's wrong.
        message: String,
    },

    /// The configured namespace does not satisfy the mapping grammar.
    #[error("Invalid namespace '{namespace}': expected CA followed by digits")]
    InvalidNamespace {
        /// The rejected namespace.
        namespace: String,
    },

    /// The symbol is already bound to a different parameter.
    #[error("Symbol '{symbol}' is already mapped to parameter '{existing}'")]
    DuplicateSymbol {
        /// The requested symbol.
        symbol: String,
        /// Name of the parameter already holding the symbol.
        existing: String,
    },
}

/// A parameter merged with its decoded mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedParameter {
    /// Parameter name, unique within the document.
    pub name: String,

    /// Current numeric value.
    pub value: f64,

    /// Unit string.
    pub unit: String,

    /// The driving expression.
    pub expression: String,

    /// Symbol decoded from the comment, if the comment carries a mapping.
    pub symbol: Option<String>,

    /// Note decoded from the comment.
    pub note: Option<String>,

    /// Whether the parameter can be written.
    pub is_read_only: bool,
}

impl From<Parameter> for MappedParameter {
    fn from(param: Parameter) -> Self {
        let record = mapping::decode(&param.comment);
        Self {
            name: param.name,
            value: param.value,
            unit: param.unit,
            expression: param.expression,
            symbol: record.symbol,
            note: record.note,
            is_read_only: param.is_read_only,
        }
    }
}

/// Lists every parameter with its decoded mapping.
///
/// # Errors
///
/// Returns an error if the bridge cannot enumerate the document.
pub fn list_mapped(bridge: &dyn ParameterBridge) -> ParamResult<Vec<MappedParameter>> {
    let parameters = bridge.list_parameters()?;
    Ok(parameters.into_iter().map(MappedParameter::from).collect())
}

/// Returns only the parameters that carry a mapping, as `(symbol, name)` pairs.
///
/// # Errors
///
/// Returns an error if the bridge cannot enumerate the document.
pub fn mapping_table(bridge: &dyn ParameterBridge) -> ParamResult<Vec<(String, String)>> {
    let mapped = list_mapped(bridge)?;
    Ok(mapped
        .into_iter()
        .filter_map(|p| p.symbol.map(|s| (s, p.name)))
        .collect())
}

/// Binds `symbol` (and an optional note) to the named parameter.
///
/// The encoded comment replaces whatever was in the comment field before.
/// Re-applying the same symbol to the same parameter is allowed and updates
/// the note; applying it to a different parameter fails with
/// [`ParamError::DuplicateSymbol`] since symbols are unique within the
/// namespace.
///
/// # Errors
///
/// Returns an error if the symbol or namespace fails validation, the symbol
/// is already bound elsewhere, or the bridge write fails.
pub fn apply_mapping(
    bridge: &mut dyn ParameterBridge,
    name: &str,
    symbol: &str,
    note: Option<&str>,
    namespace: &str,
) -> ParamResult<()> {
    // Decode trims symbols on the way back out, so a padded symbol written
    // here would read back as its trimmed form. Trim once up front and use
    // that form for validation, the duplicate scan and encoding.
    let symbol = symbol.trim();
    validate_symbol(symbol)?;

    if !mapping::is_valid_namespace(namespace) {
        return Err(ParamError::InvalidNamespace {
            namespace: namespace.to_string(),
        });
    }

    if let Some(existing) = mapping_table(bridge)?
        .into_iter()
        .find(|(s, owner)| s == symbol && owner != name)
    {
        return Err(ParamError::DuplicateSymbol {
            symbol: symbol.to_string(),
            existing: existing.1,
        });
    }

    let comment = mapping::encode(Some(symbol), note, namespace);
    debug!(name, %comment, "Writing mapping comment");
    bridge.set_comment(name, &comment)?;
    Ok(())
}

/// Removes any mapping from the named parameter by clearing its comment.
///
/// # Errors
///
/// Returns an error if the bridge write fails.
pub fn clear_mapping(bridge: &mut dyn ParameterBridge, name: &str) -> ParamResult<()> {
    debug!(name, "Clearing mapping comment");
    bridge.set_comment(name, "")?;
    Ok(())
}

/// Reads the current value of one parameter.
///
/// # Errors
///
/// Returns an error if the parameter does not exist.
pub fn get_value(bridge: &dyn ParameterBridge, name: &str) -> ParamResult<f64> {
    Ok(bridge.get_value(name)?)
}

/// Writes a new value to one parameter.
///
/// # Errors
///
/// Returns an error if the parameter does not exist or is read-only.
pub fn set_value(bridge: &mut dyn ParameterBridge, name: &str, value: f64) -> ParamResult<()> {
    debug!(name, value, "Writing parameter value");
    bridge.set_value(name, value)?;
    Ok(())
}

fn validate_symbol(symbol: &str) -> ParamResult<()> {
    if symbol.is_empty() {
        return Err(ParamError::InvalidSymbol {
            symbol: symbol.to_string(),
            message: "symbol must not be empty".to_string(),
        });
    }
    if symbol.contains(':') {
        return Err(ParamError::InvalidSymbol {
            symbol: symbol.to_string(),
            message: "symbol must not contain ':'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MemoryBridge;
    use crate::mapping::DEFAULT_NAMESPACE;

    fn bridge_with(comments: &[(&str, &str)]) -> MemoryBridge {
        let params = comments
            .iter()
            .map(|(name, comment)| Parameter {
                name: (*name).to_string(),
                value: 1.0,
                unit: "mm".to_string(),
                expression: "1 mm".to_string(),
                comment: (*comment).to_string(),
                is_read_only: false,
            })
            .collect();
        MemoryBridge::from_snapshot(params)
    }

    #[test]
    fn list_merges_decoded_mapping() {
        let bridge = bridge_with(&[("d0", "CA0:L #Length"), ("d1", "just a comment")]);
        let mapped = list_mapped(&bridge).unwrap();

        assert_eq!(mapped[0].symbol.as_deref(), Some("L"));
        assert_eq!(mapped[0].note.as_deref(), Some("Length"));
        assert_eq!(mapped[1].symbol, None);
        assert_eq!(mapped[1].note, None);
    }

    #[test]
    fn mapping_table_skips_unmapped() {
        let bridge = bridge_with(&[("d0", "CA0:L"), ("d1", ""), ("d2", "CA1:W #width")]);
        let table = mapping_table(&bridge).unwrap();
        assert_eq!(
            table,
            [
                ("L".to_string(), "d0".to_string()),
                ("W".to_string(), "d2".to_string())
            ]
        );
    }

    #[test]
    fn apply_writes_encoded_comment() {
        let mut bridge = bridge_with(&[("d0", "")]);
        apply_mapping(&mut bridge, "d0", "L", Some("Length"), DEFAULT_NAMESPACE).unwrap();

        let params = bridge.list_parameters().unwrap();
        assert_eq!(params[0].comment, "CA0:L #Length");
    }

    #[test]
    fn apply_rejects_colon_symbol() {
        let mut bridge = bridge_with(&[("d0", "")]);
        let err = apply_mapping(&mut bridge, "d0", "a:b", None, DEFAULT_NAMESPACE).unwrap_err();
        assert!(matches!(err, ParamError::InvalidSymbol { .. }));
    }

    #[test]
    fn apply_rejects_empty_symbol() {
        let mut bridge = bridge_with(&[("d0", "")]);
        let err = apply_mapping(&mut bridge, "d0", "  ", None, DEFAULT_NAMESPACE).unwrap_err();
        assert!(matches!(err, ParamError::InvalidSymbol { .. }));
    }

    #[test]
    fn apply_rejects_bad_namespace() {
        let mut bridge = bridge_with(&[("d0", "")]);
        let err = apply_mapping(&mut bridge, "d0", "L", None, "XY").unwrap_err();
        assert!(matches!(err, ParamError::InvalidNamespace { .. }));
    }

    #[test]
    fn apply_trims_symbol_before_encoding() {
        let mut bridge = bridge_with(&[("d0", "")]);
        apply_mapping(&mut bridge, "d0", " L ", Some("Length"), DEFAULT_NAMESPACE).unwrap();

        let params = bridge.list_parameters().unwrap();
        assert_eq!(params[0].comment, "CA0:L #Length");
    }

    #[test]
    fn apply_padded_symbol_still_collides() {
        // " L " and "L" are the same symbol once decoded; padding must not
        // slip past the uniqueness check.
        let mut bridge = bridge_with(&[("d0", "CA0:L"), ("d1", "")]);
        let err = apply_mapping(&mut bridge, "d1", " L ", None, DEFAULT_NAMESPACE).unwrap_err();
        assert!(matches!(
            err,
            ParamError::DuplicateSymbol { ref existing, .. } if existing == "d0"
        ));
    }

    #[test]
    fn apply_rejects_symbol_bound_elsewhere() {
        let mut bridge = bridge_with(&[("d0", "CA0:L"), ("d1", "")]);
        let err = apply_mapping(&mut bridge, "d1", "L", None, DEFAULT_NAMESPACE).unwrap_err();
        assert!(matches!(
            err,
            ParamError::DuplicateSymbol { ref existing, .. } if existing == "d0"
        ));
    }

    #[test]
    fn apply_same_parameter_updates_note() {
        let mut bridge = bridge_with(&[("d0", "CA0:L #old")]);
        apply_mapping(&mut bridge, "d0", "L", Some("new"), DEFAULT_NAMESPACE).unwrap();

        let params = bridge.list_parameters().unwrap();
        assert_eq!(params[0].comment, "CA0:L #new");
    }

    #[test]
    fn clear_empties_comment() {
        let mut bridge = bridge_with(&[("d0", "CA0:L #Length")]);
        clear_mapping(&mut bridge, "d0").unwrap();

        let params = bridge.list_parameters().unwrap();
        assert_eq!(params[0].comment, "");
        assert_eq!(list_mapped(&bridge).unwrap()[0].symbol, None);
    }

    #[test]
    fn value_passthroughs() {
        let mut bridge = bridge_with(&[("d0", "")]);
        set_value(&mut bridge, "d0", 3.5).unwrap();
        assert!((get_value(&bridge, "d0").unwrap() - 3.5).abs() < f64::EPSILON);

        assert!(matches!(
            get_value(&bridge, "nope"),
            Err(ParamError::Bridge(BridgeError::ParameterNotFound { .. }))
        ));
    }
}
