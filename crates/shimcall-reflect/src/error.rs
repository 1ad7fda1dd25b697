//! Error types for runtime introspection and reflective invocation

/// Result type for reflection operations
pub type AbiResult<T> = Result<T, ReflectError>;

/// Reflection error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// A value or instance could not be converted to the required type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Wrong number of arguments supplied to a reflective call
    #[error("Argument count mismatch for {member}: expected {expected}, got {got}")]
    ArgumentCount {
        /// Member being invoked
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// No member matched the lookup
    #[error("Member not found: {type_name}::{member}")]
    MemberNotFound {
        /// Declaring type name
        type_name: String,
        /// Requested member name
        member: String,
    },

    /// More than one member matched the lookup
    #[error("Ambiguous match for {type_name}::{member}: {candidates} candidates")]
    AmbiguousMatch {
        /// Declaring type name
        type_name: String,
        /// Requested member name
        member: String,
        /// Number of matching overloads
        candidates: usize,
    },

    /// Property has no accessor of the requested kind
    #[error("Property {property} has no {accessor} accessor")]
    MissingAccessor {
        /// Property name
        property: String,
        /// "get" or "set"
        accessor: &'static str,
    },
}

impl ReflectError {
    /// Build a type mismatch from two type names
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ReflectError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
