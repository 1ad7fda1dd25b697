//! Shim compilation and invocation errors

use shimcall_reflect::ReflectError;

/// Result type for shim operations
pub type ShimResult<T> = Result<T, ShimError>;

/// Errors raised while resolving, compiling or invoking a shim
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShimError {
    /// Lookup found no member (or more than one) for the request
    #[error("Member not found: {type_name}::{member} ({reason})")]
    MemberNotFound {
        type_name: String,
        member: String,
        reason: String,
    },

    /// The descriptor is absent, or cannot be compiled as requested
    #[error("Invalid member: {0}")]
    InvalidMember(String),

    /// An instance or argument has the wrong runtime type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
}

impl ShimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ShimError::InvalidMember(message.into())
    }
}

impl From<ReflectError> for ShimError {
    fn from(err: ReflectError) -> Self {
        match err {
            ReflectError::TypeMismatch { expected, got } => {
                ShimError::TypeMismatch { expected, got }
            }
            ReflectError::ArgumentCount {
                member,
                expected,
                got,
            } => ShimError::TypeMismatch {
                expected: format!("{} arguments for {}", expected, member),
                got: got.to_string(),
            },
            ReflectError::MemberNotFound { type_name, member } => ShimError::MemberNotFound {
                type_name,
                member,
                reason: "no match".to_string(),
            },
            ReflectError::AmbiguousMatch {
                type_name,
                member,
                candidates,
            } => ShimError::MemberNotFound {
                type_name,
                member,
                reason: format!("ambiguous, {} candidates", candidates),
            },
            err @ ReflectError::MissingAccessor { .. } => ShimError::InvalidMember(err.to_string()),
        }
    }
}
