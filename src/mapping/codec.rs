//! Encoder/decoder for the mapping-comment grammar.
//!
//! # Grammar
//!
//! A mapping comment has the form `{NAMESPACE}:{SYMBOL}` optionally followed
//! by ` #{NOTE}`:
//!
//! - `CA0:L` — symbol `L`, no note
//! - `CA0:L #Length parameter` — symbol `L`, note `Length parameter`
//! - `CA1:T_in #Inlet temperature` — versioned namespace `CA1`
//!
//! The namespace is `CA` followed by one or more decimal digits, allowing the
//! grammar to evolve without breaking detection of older comments. Only the
//! first `#` delimits the note; any further `#` or backtick characters are
//! opaque payload for the client (which may use backtick-quoting as its own
//! escaping convention — the codec does not interpret it).

use serde::{Deserialize, Serialize};

/// Namespace written by [`encode`] callers that don't pick their own.
pub const DEFAULT_NAMESPACE: &str = "CA0";

/// A symbol mapping decoded from a parameter comment.
///
/// The record is transient: it only exists as the decoded/encoded form of a
/// single comment string and is never stored by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Symbol bound to the parameter, unique within the namespace.
    /// `None` when the comment carries no valid mapping.
    pub symbol: Option<String>,

    /// Free-form annotation stored alongside the mapping.
    pub note: Option<String>,
}

impl MappingRecord {
    /// The record decoded from any comment without a valid mapping.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            symbol: None,
            note: None,
        }
    }

    /// Returns `true` if no symbol is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.note.is_none()
    }
}

/// Checks whether `namespace` is `CA` followed by one or more decimal digits.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    let Some(rest) = namespace.strip_prefix("CA") else {
        return false;
    };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

/// Decodes a raw comment string into a [`MappingRecord`].
///
/// This is a total function: any input that doesn't match the grammar
/// (missing namespace, wrong prefix, empty symbol, colon in the symbol)
/// yields [`MappingRecord::empty`]. Comments are user-edited free text, so
/// malformed or legacy-format content must degrade to "no mapping" instead
/// of failing the surrounding read.
///
/// Everything after the first `#` is taken verbatim as the note (leading and
/// trailing whitespace trimmed). A literal `#` inside the note therefore does
/// not need escaping, but cannot itself start a second note.
#[must_use]
pub fn decode(raw: &str) -> MappingRecord {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return MappingRecord::empty();
    }

    // Only the first '#' separates the mapping part from the note.
    let (mapping_part, note) = match trimmed.split_once('#') {
        Some((mapping, rest)) => {
            let rest = rest.trim();
            let note = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (mapping.trim(), note)
        }
        None => (trimmed, None),
    };

    // Namespace is mandatory; without a colon there is no mapping, and any
    // note computed above is discarded with it.
    let Some((namespace, symbol)) = mapping_part.split_once(':') else {
        return MappingRecord::empty();
    };

    if !is_valid_namespace(namespace.trim()) {
        return MappingRecord::empty();
    }

    // Colons are rejected in symbols for expression-engine compatibility.
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.contains(':') {
        return MappingRecord::empty();
    }

    MappingRecord {
        symbol: Some(symbol.to_string()),
        note,
    }
}

/// Builds the canonical comment string for a mapping.
///
/// Without a symbol there is nothing to encode and the result is the empty
/// string - a note can never be stored on its own. The note is trimmed but
/// otherwise written unmodified; the codec performs no escaping.
///
/// `encode` is a canonical constructor, not a validator: it does not check
/// `symbol` or `namespace` against the grammar. Callers that accept untrusted
/// symbols should validate before encoding (see `params::apply_mapping`).
#[must_use]
pub fn encode(symbol: Option<&str>, note: Option<&str>, namespace: &str) -> String {
    let Some(symbol) = symbol.filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let mut comment = format!("{namespace}:{symbol}");

    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        comment.push_str(" #");
        comment.push_str(note);
    }

    comment
}
