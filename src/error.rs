//! Codec error types.

use thiserror::Error;

/// Errors that can occur while building, mutating, or decoding binary
/// structures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The buffer ran out before a field got the bytes it declares.
    #[error("short buffer decoding field '{field}': need {needed} bytes, {remaining} remaining")]
    ShortBuffer {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A symbolic name was not found in the relevant symbol table.
    #[error("unknown symbol '{name}' for field '{field}'")]
    UnknownSymbol { field: &'static str, name: String },

    /// The field's value representation does not support the requested
    /// conversion.
    #[error("field '{field}' does not support {operation}")]
    UnsupportedConversion {
        field: &'static str,
        operation: &'static str,
    },

    /// No field with this name exists in the schema.
    #[error("no field named '{0}'")]
    UnknownField(&'static str),

    /// A typed accessor was used on a field of a different kind.
    #[error("field '{field}' is not {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },

    /// A length-bound field references a sibling that is not an earlier
    /// integer field.
    #[error("field '{field}' is length-bound to '{bind}', which is not an earlier integer field")]
    BadBinding {
        field: &'static str,
        bind: &'static str,
    },

    /// A decoded length field is smaller than the fixed header it must cover.
    #[error("field '{field}' holds length {value}, below the {min}-byte fixed header")]
    InvalidLength {
        field: &'static str,
        value: u64,
        min: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_field() {
        let err = CodecError::ShortBuffer {
            field: "length",
            needed: 2,
            remaining: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("length"));
        assert!(msg.contains('2'));
        assert!(msg.contains('1'));

        let err = CodecError::UnknownSymbol {
            field: "group_id",
            name: "NOSUCHGROUP".to_string(),
        };
        assert!(err.to_string().contains("NOSUCHGROUP"));
        assert!(err.to_string().contains("group_id"));

        let err = CodecError::UnsupportedConversion {
            field: "type",
            operation: "symbolic lookup",
        };
        assert!(err.to_string().contains("type"));

        let err = CodecError::InvalidLength {
            field: "length",
            value: 3,
            min: 8,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('8'));
    }
}
