//! Error types for the algebra kernel
//!
//! This module provides `KernelError`, the error enum every fallible kernel
//! operation reports through. The numeric predicates (`is_zero` etc.) are
//! total booleans and never error.

use std::fmt;

/// Errors reported by kernel operations.
///
/// Every failure propagates synchronously to the caller; the kernel never
/// swallows an error. A failed construction leaves no partial handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KernelError {
    /// Division by exact zero, zero to a non-positive power, overflow in a
    /// bounded numeric representation.
    Arithmetic {
        /// Description of the arithmetic failure.
        msg: String,
    },
    /// A polynomial operation called with non-polynomial arguments, a
    /// relational used where a scalar is required, an invalid conversion.
    Domain {
        /// Description of the domain violation.
        msg: String,
    },
    /// Index out of bounds for `op(i)`, matrix element access or archive id
    /// lookup.
    Range {
        /// Description of the failed access.
        msg: String,
    },
    /// Substitution lists of mismatched lengths, constructing a function
    /// application with the wrong arity, a non-symbol differentiation
    /// variable.
    InvalidArgument {
        /// Description of the invalid argument.
        msg: String,
    },
    /// Recursion limit exceeded, singular matrix during solve/inverse,
    /// unarchive failure (unknown class, truncated stream, bad version).
    Runtime {
        /// Description of the runtime failure.
        msg: String,
    },
}

impl KernelError {
    /// Create an `Arithmetic` error.
    pub fn arithmetic(msg: impl Into<String>) -> Self {
        KernelError::Arithmetic { msg: msg.into() }
    }

    /// Create a `Domain` error.
    pub fn domain(msg: impl Into<String>) -> Self {
        KernelError::Domain { msg: msg.into() }
    }

    /// Create a `Range` error.
    pub fn range(msg: impl Into<String>) -> Self {
        KernelError::Range { msg: msg.into() }
    }

    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        KernelError::InvalidArgument { msg: msg.into() }
    }

    /// Create a `Runtime` error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        KernelError::Runtime { msg: msg.into() }
    }

    /// The recursion-limit failure raised by depth-bounded rewrites.
    pub fn recursion_limit(what: &str) -> Self {
        KernelError::Runtime {
            msg: format!("recursion depth limit exceeded in {what}"),
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Arithmetic { msg } => write!(f, "arithmetic error: {msg}"),
            KernelError::Domain { msg } => write!(f, "domain error: {msg}"),
            KernelError::Range { msg } => write!(f, "range error: {msg}"),
            KernelError::InvalidArgument { msg } => write!(f, "invalid argument: {msg}"),
            KernelError::Runtime { msg } => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for KernelError {}
