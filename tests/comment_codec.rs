//! Integration tests for the mapping-comment codec.
//!
//! These cover the full grammar: valid mappings, every rejection path, and
//! the encode/decode round-trip guarantees.

use inventor_params_mcp::mapping::{decode, encode, MappingRecord, DEFAULT_NAMESPACE};

fn record(symbol: &str, note: Option<&str>) -> MappingRecord {
    MappingRecord {
        symbol: Some(symbol.to_string()),
        note: note.map(str::to_string),
    }
}

// =============================================================================
// Decode: valid comments
// =============================================================================

#[test]
fn test_decode_valid_comments() {
    let cases: &[(&str, MappingRecord)] = &[
        ("CA0:L", record("L", None)),
        ("CA0:L #Length parameter", record("L", Some("Length parameter"))),
        (
            "CA0:L #`Length #1` #`Design #3`",
            record("L", Some("`Length #1` #`Design #3`")),
        ),
        ("CA0:rho #Density", record("rho", Some("Density"))),
        ("CA0:η #Efficiency", record("η", Some("Efficiency"))),
        ("CA1:T_in #Inlet temperature", record("T_in", Some("Inlet temperature"))),
        ("CA0:L  #  Spaces  ", record("L", Some("Spaces"))),
        (" CA0:L #Note ", record("L", Some("Note"))),
    ];

    for (input, expected) in cases {
        assert_eq!(&decode(input), expected, "input {input:?}");
    }
}

// =============================================================================
// Decode: rejected comments
// =============================================================================

#[test]
fn test_decode_invalid_comments() {
    let cases: &[&str] = &[
        "",                   // empty
        "   ",                // whitespace only
        "L #Note",            // missing namespace
        "XY:L #Note",         // wrong namespace prefix
        "CA:L #Note",         // no digit after CA
        "CAX:L #Note",        // non-digit after CA
        "CA0:ratio:1 #Note",  // colon in symbol
        "CA0:",               // empty symbol
        "CA0: #Note",         // empty symbol with note
        "free text comment",  // plain user comment
        "#just a note",       // note without mapping
    ];

    for input in cases {
        assert_eq!(decode(input), MappingRecord::empty(), "input {input:?}");
    }
}

#[test]
fn test_decode_legacy_format_degrades_to_empty() {
    // Older documents used a differently-delimited convention; under the
    // current grammar they simply decode as unmapped.
    assert_eq!(decode("L=length [mm]"), MappingRecord::empty());
    assert_eq!(decode("sym|L|note"), MappingRecord::empty());
}

#[test]
fn test_decode_note_keeps_payload_verbatim() {
    // Everything after the first '#' is opaque, including further '#',
    // backticks and colons.
    assert_eq!(decode("CA0:L #a # b"), record("L", Some("a # b")));
    assert_eq!(decode("CA0:L #see CA1:W"), record("L", Some("see CA1:W")));
}

// =============================================================================
// Encode
// =============================================================================

#[test]
fn test_encode_comments() {
    let cases: &[(Option<&str>, Option<&str>, &str)] = &[
        (Some("L"), None, "CA0:L"),
        (Some("L"), Some("Length parameter"), "CA0:L #Length parameter"),
        (
            Some("L"),
            Some("`Length #1` #`Design #3`"),
            "CA0:L #`Length #1` #`Design #3`",
        ),
        (Some("rho"), Some("Density"), "CA0:rho #Density"),
        (Some("η"), Some("Efficiency"), "CA0:η #Efficiency"),
        (None, Some("Note"), ""),
        (Some(""), Some("Note"), ""),
    ];

    for &(symbol, note, expected) in cases {
        assert_eq!(
            encode(symbol, note, DEFAULT_NAMESPACE),
            expected,
            "symbol {symbol:?}, note {note:?}"
        );
    }
}

// =============================================================================
// Round-trip
// =============================================================================

#[test]
fn test_round_trip() {
    let cases: &[(&str, Option<&str>)] = &[
        ("L", None),
        ("L", Some("Length parameter")),
        ("L", Some("`Length #1` #`Design #3`")),
        ("rho", Some("Density of water")),
        ("η", Some("Pump efficiency")),
        ("T_in", Some("Inlet temperature")),
    ];

    for &(symbol, note) in cases {
        let comment = encode(Some(symbol), note, DEFAULT_NAMESPACE);
        assert_eq!(
            decode(&comment),
            record(symbol, note),
            "via comment {comment:?}"
        );
    }
}

#[test]
fn test_round_trip_in_versioned_namespace() {
    let comment = encode(Some("W"), Some("Width"), "CA7");
    assert_eq!(comment, "CA7:W #Width");
    assert_eq!(decode(&comment), record("W", Some("Width")));
}

#[test]
fn test_decode_encode_decode_is_idempotent() {
    // Re-encoding a decoded record and decoding again yields the same
    // record, even when the original comment carried extra whitespace.
    let inputs = [
        "CA0:L",
        "CA0:L #Length parameter",
        " CA0:L   #  padded note  ",
        "CA12:x #`a #b` tail",
    ];

    for input in inputs {
        let first = decode(input);
        let reencoded = encode(
            first.symbol.as_deref(),
            first.note.as_deref(),
            DEFAULT_NAMESPACE,
        );
        assert_eq!(decode(&reencoded), first, "input {input:?}");
    }
}

#[test]
fn test_note_never_encodes_without_symbol() {
    // decode(encode(None, note)) must be the empty record for any note.
    for note in ["Note", "#weird", "`quoted #`", "  "] {
        let comment = encode(None, Some(note), DEFAULT_NAMESPACE);
        assert_eq!(comment, "");
        assert_eq!(decode(&comment), MappingRecord::empty());
    }
}
