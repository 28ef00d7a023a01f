//! Mapping-comment grammar handling.
//!
//! CalcsLive stores its symbol mapping inside each parameter's free-text
//! comment field, using a small namespaced grammar:
//!
//! ```text
//! CA0:L #Length parameter
//! └┬┘ ┬ └───────┬───────┘
//!  │  │         └ optional note (everything after the first '#', verbatim)
//!  │  └ symbol used for formula binding
//!  └ namespace ("CA" + decimal digits)
//! ```
//!
//! Comments are free text owned by the end user in the host CAD application,
//! so the codec is total: malformed input decodes to an empty record rather
//! than producing an error.

mod codec;

pub use codec::{decode, encode, is_valid_namespace, MappingRecord, DEFAULT_NAMESPACE};
